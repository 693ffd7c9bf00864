//! Controller firmware download.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Firmware download into the radio.
///
/// The loader switches the controller to `baudrate` as part of the transfer.
/// The returned status is `0` on success and a loader-specific non-zero code
/// otherwise. There is no timeout: a loader that never finishes keeps the
/// bring-up waiting.
#[allow(async_fn_in_trait)]
pub trait FirmwareLoader<U> {
    async fn download(&mut self, uart: &U, baudrate: u32) -> i32;
}

/// Completion slot for callback-driven downloads.
///
/// The vendor routine's completion callback calls [`complete`](Self::complete)
/// from the scheduler; the bring-up task waits on it.
pub struct DownloadCompletion {
    status: Signal<CriticalSectionRawMutex, i32>,
}

impl DownloadCompletion {
    pub const fn new() -> Self {
        Self {
            status: Signal::new(),
        }
    }

    /// Publish the download status.
    pub fn complete(&self, status: i32) {
        self.status.signal(status);
    }

    /// Wait for the download status.
    pub async fn wait(&self) -> i32 {
        self.status.wait().await
    }

    /// Take the status if the download already finished.
    pub fn try_take(&self) -> Option<i32> {
        self.status.try_take()
    }

    /// Drop any stale status.
    pub fn reset(&self) {
        self.status.reset();
    }
}

impl Default for DownloadCompletion {
    fn default() -> Self {
        Self::new()
    }
}

/// Vendor download routine: `(uart, baudrate, completion_callback)`.
///
/// Must return without blocking and call the callback exactly once later.
pub type DownloadFn<U> = fn(&U, u32, fn(i32));

/// [`FirmwareLoader`] for vendor routines that report completion through a
/// plain function callback.
///
/// ```
/// use wiced_radio::bluetooth::{CallbackLoader, DownloadCompletion};
///
/// struct Uart;
///
/// static DOWNLOAD: DownloadCompletion = DownloadCompletion::new();
///
/// fn download_done(status: i32) {
///     DOWNLOAD.complete(status);
/// }
///
/// fn bcm_download_firmware(_uart: &Uart, _baudrate: u32, done: fn(i32)) {
///     done(0);
/// }
///
/// let loader = CallbackLoader::new(bcm_download_firmware, &DOWNLOAD, download_done);
/// # let _ = loader;
/// ```
pub struct CallbackLoader<U: 'static> {
    start: DownloadFn<U>,
    completion: &'static DownloadCompletion,
    callback: fn(i32),
}

impl<U: 'static> CallbackLoader<U> {
    /// `callback` has to forward its status to `completion`.
    pub const fn new(
        start: DownloadFn<U>,
        completion: &'static DownloadCompletion,
        callback: fn(i32),
    ) -> Self {
        Self {
            start,
            completion,
            callback,
        }
    }
}

impl<U: 'static> FirmwareLoader<U> for CallbackLoader<U> {
    async fn download(&mut self, uart: &U, baudrate: u32) -> i32 {
        self.completion.reset();
        debug!("Starting firmware download, main baudrate {}", baudrate);
        (self.start)(uart, baudrate, self.callback);
        let status = self.completion.wait().await;
        debug!("Firmware download finished with status {}", status);
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Uart;

    #[test]
    fn completion_hands_over_status() {
        let done = DownloadCompletion::new();
        assert_eq!(done.try_take(), None);
        done.complete(3);
        assert_eq!(embassy_futures::block_on(done.wait()), 3);
        assert_eq!(done.try_take(), None);
    }

    #[test]
    fn reset_drops_stale_status() {
        let done = DownloadCompletion::default();
        done.complete(1);
        done.reset();
        assert_eq!(done.try_take(), None);
    }

    static OK_DOWNLOAD: DownloadCompletion = DownloadCompletion::new();
    static OK_BAUDRATE: AtomicU32 = AtomicU32::new(0);

    fn ok_done(status: i32) {
        OK_DOWNLOAD.complete(status);
    }

    fn ok_start(_uart: &Uart, baudrate: u32, done: fn(i32)) {
        OK_BAUDRATE.store(baudrate, Ordering::SeqCst);
        done(0);
    }

    #[test]
    fn callback_loader_waits_for_callback() {
        let mut loader = CallbackLoader::new(ok_start, &OK_DOWNLOAD, ok_done);
        let status = embassy_futures::block_on(loader.download(&Uart, 200_000));
        assert_eq!(status, 0);
        assert_eq!(OK_BAUDRATE.load(Ordering::SeqCst), 200_000);
    }

    static FAILED_DOWNLOAD: DownloadCompletion = DownloadCompletion::new();

    fn failed_done(status: i32) {
        FAILED_DOWNLOAD.complete(status);
    }

    fn failed_start(_uart: &Uart, _baudrate: u32, done: fn(i32)) {
        done(-2);
    }

    #[test]
    fn callback_loader_reports_failure_and_ignores_stale_status() {
        // Left over from an earlier attempt.
        FAILED_DOWNLOAD.complete(0);

        let mut loader = CallbackLoader::new(failed_start, &FAILED_DOWNLOAD, failed_done);
        let status = embassy_futures::block_on(loader.download(&Uart, 115_200));
        assert_eq!(status, -2);
    }
}
