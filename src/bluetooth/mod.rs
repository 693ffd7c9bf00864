//! Bluetooth subsystem.
//!
//! Brings the combo chip's radio from reset to a running HCI link and then
//! hands it to the application.

pub mod address;
pub(crate) mod config;
pub mod error;
pub mod firmware;
pub mod hci;
pub mod phase;
pub mod platform;
pub mod storage;

pub use address::{derive_controller_address, AddressError, DeviceAddress, MacAddress};
pub use config::{
    BringUpConfig, TransportConfig, TransportKind, UartConfig, NVRAM_GENERATED_MAC_ADDRESS,
};
pub use error::BringUpError;
pub use firmware::{CallbackLoader, DownloadCompletion, DownloadFn, FirmwareLoader};
pub use hci::{EventHandler, StackState};
pub use phase::{Completion, Phase};
pub use platform::{
    Application, BlockingRunLoop, Chipset, DeviceDb, HciStack, HciTransport, LinkKeyDb, RunLoop,
    UartBlock,
};
pub use storage::StorageError;

use embedded_io::Error as _;

/// Collaborators handed to [`BringUp::new`].
pub struct Parts<'a, S: HciStack<'a>, D, F, A> {
    pub stack: S,
    pub chipset: &'a S::Chipset,
    pub uart: &'a S::Uart,
    pub link_keys: &'a S::LinkKeyDb,
    pub device_db: D,
    pub loader: F,
    pub app: A,
}

/// Bring-up context.
///
/// Owns the protocol stack, the device database, the firmware loader and the
/// application for the lifetime of the process, and shares the chipset, UART
/// and link-key handles with the stack.
///
/// # Example
///
/// ```no_run
/// use core::convert::Infallible;
///
/// use wiced_radio::bluetooth::{
///     Application, BlockingRunLoop, BringUp, BringUpConfig, BringUpError, CallbackLoader,
///     Chipset, DeviceAddress, DeviceDb, DownloadCompletion, EventHandler, HciStack,
///     HciTransport, LinkKeyDb, Parts, TransportConfig, UartBlock, UartConfig,
/// };
///
/// struct BcmChipset;
///
/// impl embedded_io::ErrorType for BcmChipset {
///     type Error = Infallible;
/// }
///
/// impl Chipset for BcmChipset {
///     fn init(&self, _config: &TransportConfig) -> Result<(), Infallible> {
///         Ok(())
///     }
/// }
///
/// struct Uart;
///
/// impl embedded_io::ErrorType for Uart {
///     type Error = Infallible;
/// }
///
/// impl UartBlock for Uart {
///     fn init(&self, _config: &UartConfig) -> Result<(), Infallible> {
///         Ok(())
///     }
/// }
///
/// struct H5<'a>(&'a Uart);
///
/// impl<'a> HciTransport<'a, Uart> for H5<'a> {
///     fn new(uart: &'a Uart) -> Self {
///         H5(uart)
///     }
/// }
///
/// struct DctLinkKeys;
///
/// impl LinkKeyDb for DctLinkKeys {
///     fn storage_size(&self) -> u32 {
///         0x3C0
///     }
/// }
///
/// struct DctDeviceDb;
///
/// impl DeviceDb for DctDeviceDb {
///     fn set_start_address(&mut self, _offset: u32) {}
///     fn dump(&self) {}
/// }
///
/// struct BtStack;
///
/// impl embedded_io::ErrorType for BtStack {
///     type Error = Infallible;
/// }
///
/// impl<'a> HciStack<'a> for BtStack {
///     type Uart = Uart;
///     type Chipset = BcmChipset;
///     type LinkKeyDb = DctLinkKeys;
///     type Transport = H5<'a>;
///
///     fn init_memory(&mut self) -> Result<(), Infallible> {
///         Ok(())
///     }
///
///     fn init(
///         &mut self,
///         _transport: H5<'a>,
///         _config: &'a TransportConfig,
///     ) -> Result<(), Infallible> {
///         Ok(())
///     }
///
///     fn set_link_key_db(&mut self, _db: &'a DctLinkKeys) {}
///     fn set_chipset(&mut self, _chipset: &'a BcmChipset) {}
///     fn set_bd_addr(&mut self, _addr: DeviceAddress) {}
///     fn add_event_handler(&mut self, _handler: EventHandler) {}
/// }
///
/// struct Spp;
///
/// impl Application for Spp {
///     fn main(&mut self, _args: &[&str]) {}
/// }
///
/// static CONFIG: BringUpConfig = BringUpConfig::new();
/// static BCM_CHIPSET: BcmChipset = BcmChipset;
/// static UART: Uart = Uart;
/// static DCT_LINK_KEYS: DctLinkKeys = DctLinkKeys;
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
/// let mut bring_up = BringUp::new(&CONFIG, Parts {
///     stack: BtStack,
///     chipset: &BCM_CHIPSET,
///     uart: &UART,
///     link_keys: &DCT_LINK_KEYS,
///     device_db: DctDeviceDb,
///     loader: CallbackLoader::new(bcm_download_firmware, &DOWNLOAD, download_done),
///     app: Spp,
/// });
/// bring_up.start(&mut BlockingRunLoop::new())?;
/// # Ok::<(), BringUpError>(())
/// ```
pub struct BringUp<'a, S: HciStack<'a>, D, F, A> {
    config: &'a BringUpConfig,
    stack: S,
    chipset: &'a S::Chipset,
    uart: &'a S::Uart,
    link_keys: &'a S::LinkKeyDb,
    device_db: D,
    loader: F,
    app: A,
    uart_config: Option<UartConfig>,
    address: Option<DeviceAddress>,
    phase: Phase,
}

impl<'a, S, D, F, A> BringUp<'a, S, D, F, A>
where
    S: HciStack<'a>,
    D: DeviceDb,
    F: FirmwareLoader<S::Uart>,
    A: Application,
{
    pub fn new(config: &'a BringUpConfig, parts: Parts<'a, S, D, F, A>) -> Self {
        let Parts {
            stack,
            chipset,
            uart,
            link_keys,
            device_db,
            loader,
            app,
        } = parts;
        Self {
            config,
            stack,
            chipset,
            uart,
            link_keys,
            device_db,
            loader,
            app,
            uart_config: None,
            address: None,
            phase: Phase::Setup,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Controller address, once derived.
    pub fn address(&self) -> Option<DeviceAddress> {
        self.address
    }

    /// UART parameters, once the byte-transport driver is initialized.
    pub fn uart_config(&self) -> Option<&UartConfig> {
        self.uart_config.as_ref()
    }

    pub fn stack(&self) -> &S {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut S {
        &mut self.stack
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    /// Run the whole bring-up.
    ///
    /// Initializes stack memory and the run loop, performs the setup steps,
    /// then hands the firmware download and its continuation to the run loop.
    /// With a scheduler-backed run loop this does not return on success.
    ///
    /// A failing setup step aborts before the run loop is entered. Only valid
    /// once, on a fresh context.
    pub fn start<R: RunLoop>(&mut self, run_loop: &mut R) -> Result<(), BringUpError> {
        if self.phase != Phase::Setup {
            warn!("Bring-up already started, phase {:?}", self.phase);
            return Err(BringUpError::InvalidPhase(self.phase));
        }
        info!("Bluetooth bring-up on WICED");

        if let Err(e) = self.setup(run_loop) {
            self.phase.abort();
            error!("Bring-up aborted: {}", e);
            return Err(e);
        }

        let mut outcome = Ok(());
        run_loop.execute(async {
            outcome = self.download_firmware().await;
        });
        outcome
    }

    fn setup<R: RunLoop>(&mut self, run_loop: &mut R) -> Result<(), BringUpError> {
        debug!("Step 1: Initializing stack memory");
        self.stack
            .init_memory()
            .map_err(|e| BringUpError::Memory(e.kind()))?;
        if self.config.packet_log {
            self.stack.enable_packet_log();
        }

        debug!("Step 2: Initializing run loop");
        run_loop
            .init()
            .map_err(|e| BringUpError::RunLoop(e.kind()))?;

        self.configure()
    }

    /// Setup steps between run loop init and the firmware download: chipset,
    /// UART, HCI transport and stack, status observer, controller address and
    /// device database placement.
    ///
    /// Moves the bring-up to [`Phase::Configured`], or to [`Phase::Failed`]
    /// when a step fails. Only valid in [`Phase::Setup`].
    pub fn configure(&mut self) -> Result<(), BringUpError> {
        if self.phase != Phase::Setup {
            warn!("Setup requested in phase {:?}", self.phase);
            return Err(BringUpError::InvalidPhase(self.phase));
        }
        match self.configure_steps() {
            Ok(()) => {
                self.phase.finish_setup();
                Ok(())
            }
            Err(e) => {
                self.phase.abort();
                Err(e)
            }
        }
    }

    fn configure_steps(&mut self) -> Result<(), BringUpError> {
        let config = self.config;
        let transport_config = config.transport_config();

        debug!("Step 3: Initializing chipset driver");
        self.chipset
            .init(transport_config)
            .map_err(|e| BringUpError::Chipset(e.kind()))?;

        debug!("Step 4: Initializing UART");
        let uart_config = UartConfig::from_transport(transport_config);
        self.uart
            .init(&uart_config)
            .map_err(|e| BringUpError::Uart(e.kind()))?;
        self.uart_config = Some(uart_config);

        debug!("Step 5: Creating HCI transport");
        let transport = <S::Transport as HciTransport<'a, S::Uart>>::new(self.uart);

        debug!("Step 6: Initializing HCI stack");
        self.stack
            .init(transport, transport_config)
            .map_err(|e| BringUpError::Stack(e.kind()))?;
        self.stack.set_link_key_db(self.link_keys);
        self.stack.set_chipset(self.chipset);

        debug!("Step 7: Registering status observer");
        self.stack.add_event_handler(hci::packet_handler);

        debug!("Step 8: Deriving controller address");
        let address = DeviceAddress::from_factory_str(config.factory_mac)?;
        info!("Controller address {}", address);
        self.stack.set_bd_addr(address);
        self.address = Some(address);

        debug!("Step 9: Placing device database");
        let start = storage::device_db_start(self.link_keys)?;
        debug!("Device database starts at DCT offset {:#x}", start);
        self.device_db.set_start_address(start);
        self.device_db.dump();

        Ok(())
    }

    /// Download the controller firmware, then continue with
    /// [`on_firmware_download_complete`](Self::on_firmware_download_complete).
    ///
    /// Only valid once, in [`Phase::Configured`].
    pub async fn download_firmware(&mut self) -> Result<(), BringUpError> {
        if self.phase != Phase::Configured {
            warn!("Firmware download requested in phase {:?}", self.phase);
            return Err(BringUpError::InvalidPhase(self.phase));
        }
        self.phase.begin_download();

        info!("Phase 1: Download firmware");
        let baudrate = self.config.transport.baudrate_main;
        let status = self.loader.download(self.uart, baudrate).await;

        self.on_firmware_download_complete(status)
    }

    /// Continuation after the firmware download.
    ///
    /// Starts the application on status `0`. Any other status leaves the
    /// bring-up in [`Phase::Failed`]. Calls outside
    /// [`Phase::AwaitingFirmware`] are ignored.
    pub fn on_firmware_download_complete(&mut self, status: i32) -> Result<(), BringUpError> {
        match self.phase.complete(status) {
            Completion::StartApplication => {
                info!("Phase 2: Main app");
                self.app.main(&[]);
                Ok(())
            }
            Completion::Failed(status) => {
                error!("Download firmware failed (status {})", status);
                Err(BringUpError::FirmwareDownload(status))
            }
            Completion::Ignored => {
                warn!("Ignoring firmware download completion in phase {:?}", self.phase);
                Ok(())
            }
        }
    }
}
