//! Collaborator interfaces.
//!
//! The bring-up only sequences these. Drivers, the protocol stack and the
//! persistent databases live elsewhere and are plugged in through the traits
//! below. Fallible collaborators report errors through [`embedded_io::Error`]
//! so failures can be reported by kind.

use core::future::Future;

use embedded_io::ErrorType;

use super::address::DeviceAddress;
use super::config::{TransportConfig, UartConfig};
use super::hci::EventHandler;

/// Cooperative scheduler.
pub trait RunLoop: ErrorType {
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Dispatch `task` and everything it schedules.
    ///
    /// Scheduler-backed implementations do not return.
    fn execute<F: Future<Output = ()>>(&mut self, task: F);
}

/// Run loop that polls the task to completion on the calling thread.
///
/// For ports without an executor, and for host tests.
#[derive(Debug, Default)]
pub struct BlockingRunLoop {
    initialized: bool,
}

impl BlockingRunLoop {
    pub const fn new() -> Self {
        Self { initialized: false }
    }

    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl ErrorType for BlockingRunLoop {
    type Error = core::convert::Infallible;
}

impl RunLoop for BlockingRunLoop {
    fn init(&mut self) -> Result<(), Self::Error> {
        self.initialized = true;
        Ok(())
    }

    fn execute<F: Future<Output = ()>>(&mut self, task: F) {
        embassy_futures::block_on(task)
    }
}

/// Chipset driver (power, reset and patch handling for one radio family).
pub trait Chipset: ErrorType {
    fn init(&self, config: &TransportConfig) -> Result<(), Self::Error>;
}

/// Byte-transport driver towards the radio.
pub trait UartBlock: ErrorType {
    fn init(&self, config: &UartConfig) -> Result<(), Self::Error>;
}

/// HCI packet framing on top of a byte-transport driver (H5 on this module).
pub trait HciTransport<'a, U: 'a> {
    fn new(uart: &'a U) -> Self;
}

/// Persistent link-key database.
pub trait LinkKeyDb {
    /// Start of the reserved region inside the DCT.
    fn storage_offset(&self) -> u32 {
        0
    }

    /// Size of the reserved region in bytes.
    fn storage_size(&self) -> u32;
}

/// Paired-device database stored behind the link keys.
pub trait DeviceDb {
    fn set_start_address(&mut self, offset: u32);

    /// Log the current database contents.
    fn dump(&self);
}

/// Bluetooth protocol stack.
pub trait HciStack<'a>: ErrorType {
    type Uart: UartBlock + 'a;
    type Chipset: Chipset + 'a;
    type LinkKeyDb: LinkKeyDb + 'a;
    type Transport: HciTransport<'a, Self::Uart>;

    /// Set up the stack's memory pools.
    fn init_memory(&mut self) -> Result<(), Self::Error>;

    /// Log all HCI traffic.
    fn enable_packet_log(&mut self) {}

    fn init(
        &mut self,
        transport: Self::Transport,
        config: &'a TransportConfig,
    ) -> Result<(), Self::Error>;

    fn set_link_key_db(&mut self, db: &'a Self::LinkKeyDb);

    /// Chipset used for vendor commands during HCI start-up.
    fn set_chipset(&mut self, chipset: &'a Self::Chipset);

    /// Override the controller's public address.
    fn set_bd_addr(&mut self, addr: DeviceAddress);

    fn add_event_handler(&mut self, handler: EventHandler);
}

/// Application-level Bluetooth logic.
pub trait Application {
    /// Entry point. Called once, with no arguments, after the controller
    /// firmware is running.
    fn main(&mut self, args: &[&str]);
}
