//! Bring-up phase machine.

/// Bring-up phase.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Setup steps before the firmware download.
    #[default]
    Setup,
    /// Setup steps done, download not started yet.
    Configured,
    /// Firmware download started, completion pending. Without a completion
    /// the bring-up stays here for good.
    AwaitingFirmware,
    /// Firmware loaded, application started.
    Running,
    /// Terminal. Needs an external reset.
    Failed,
}

/// What the continuation has to do after a download completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Completion {
    /// Download succeeded, start the application.
    StartApplication,
    /// Download failed with the given status.
    Failed(i32),
    /// Not awaiting a download; nothing to do.
    Ignored,
}

impl Phase {
    /// All setup steps succeeded.
    pub(crate) fn finish_setup(&mut self) {
        if *self == Self::Setup {
            *self = Self::Configured;
        }
    }

    /// The download has been started. Only valid once setup is done.
    pub(crate) fn begin_download(&mut self) {
        if *self == Self::Configured {
            *self = Self::AwaitingFirmware;
        }
    }

    /// A setup step failed.
    pub(crate) fn abort(&mut self) {
        if matches!(self, Self::Setup | Self::Configured) {
            *self = Self::Failed;
        }
    }

    /// Apply a firmware download completion. Sole exit from
    /// [`Phase::AwaitingFirmware`].
    pub fn complete(&mut self, status: i32) -> Completion {
        if *self != Self::AwaitingFirmware {
            return Completion::Ignored;
        }
        if status == 0 {
            *self = Self::Running;
            Completion::StartApplication
        } else {
            *self = Self::Failed;
            Completion::Failed(status)
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Running | Self::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn awaiting() -> Phase {
        let mut phase = Phase::default();
        phase.finish_setup();
        phase.begin_download();
        assert_eq!(phase, Phase::AwaitingFirmware);
        phase
    }

    #[test]
    fn success_moves_to_running_once() {
        let mut phase = awaiting();
        assert_eq!(phase.complete(0), Completion::StartApplication);
        assert_eq!(phase, Phase::Running);

        assert_eq!(phase.complete(0), Completion::Ignored);
        assert_eq!(phase.complete(1), Completion::Ignored);
        assert_eq!(phase, Phase::Running);
    }

    #[test]
    fn failure_is_terminal() {
        let mut phase = awaiting();
        assert_eq!(phase.complete(-5), Completion::Failed(-5));
        assert_eq!(phase, Phase::Failed);

        assert_eq!(phase.complete(0), Completion::Ignored);
        assert_eq!(phase, Phase::Failed);
        assert!(phase.is_terminal());
    }

    #[test]
    fn completion_before_download_is_ignored() {
        let mut phase = Phase::default();
        assert_eq!(phase.complete(0), Completion::Ignored);
        assert_eq!(phase, Phase::Setup);
        assert!(!phase.is_terminal());
    }

    #[test]
    fn download_needs_finished_setup() {
        let mut phase = Phase::default();
        phase.begin_download();
        assert_eq!(phase, Phase::Setup);

        phase.finish_setup();
        assert_eq!(phase, Phase::Configured);
        assert_eq!(phase.complete(0), Completion::Ignored);
        phase.begin_download();
        assert_eq!(phase, Phase::AwaitingFirmware);

        phase.finish_setup();
        assert_eq!(phase, Phase::AwaitingFirmware);
    }

    #[test]
    fn abort_only_applies_before_download() {
        let mut phase = Phase::default();
        phase.abort();
        assert_eq!(phase, Phase::Failed);
        phase.finish_setup();
        phase.begin_download();
        assert_eq!(phase, Phase::Failed);

        let mut phase = Phase::default();
        phase.finish_setup();
        phase.abort();
        assert_eq!(phase, Phase::Failed);

        let mut phase = awaiting();
        phase.abort();
        assert_eq!(phase, Phase::AwaitingFirmware);
    }
}
