//! Bring-up error types.

use core::fmt;

use embedded_io::ErrorKind;

use super::address::AddressError;
use super::phase::Phase;
use super::storage::StorageError;

/// Error returned by the bring-up sequence.
///
/// Every setup step maps to its own variant. Collaborator errors are reduced
/// to their [`embedded_io::ErrorKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BringUpError {
    /// Protocol stack memory pool init failed.
    Memory(ErrorKind),
    /// Run loop init failed.
    RunLoop(ErrorKind),
    /// Chipset driver rejected the transport configuration.
    Chipset(ErrorKind),
    /// Byte-transport driver init failed.
    Uart(ErrorKind),
    /// Protocol stack init failed.
    Stack(ErrorKind),
    /// Factory network address could not be parsed.
    FactoryAddress(AddressError),
    /// Device database region could not be placed.
    Storage(StorageError),
    /// Firmware download finished with a non-zero status.
    FirmwareDownload(i32),
    /// Operation not allowed in the current phase.
    InvalidPhase(Phase),
}

impl fmt::Display for BringUpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory(k) => write!(f, "stack memory init failed: {:?}", k),
            Self::RunLoop(k) => write!(f, "run loop init failed: {:?}", k),
            Self::Chipset(k) => write!(f, "chipset init failed: {:?}", k),
            Self::Uart(k) => write!(f, "UART init failed: {:?}", k),
            Self::Stack(k) => write!(f, "HCI stack init failed: {:?}", k),
            Self::FactoryAddress(e) => write!(f, "factory address: {}", e),
            Self::Storage(e) => write!(f, "device database: {}", e),
            Self::FirmwareDownload(status) => {
                write!(f, "firmware download failed with status {}", status)
            }
            Self::InvalidPhase(phase) => write!(f, "not allowed in phase {:?}", phase),
        }
    }
}

impl core::error::Error for BringUpError {}

#[cfg(feature = "defmt")]
impl defmt::Format for BringUpError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Memory(k) => defmt::write!(f, "stack memory init failed: {}", k),
            Self::RunLoop(k) => defmt::write!(f, "run loop init failed: {}", k),
            Self::Chipset(k) => defmt::write!(f, "chipset init failed: {}", k),
            Self::Uart(k) => defmt::write!(f, "UART init failed: {}", k),
            Self::Stack(k) => defmt::write!(f, "HCI stack init failed: {}", k),
            Self::FactoryAddress(e) => defmt::write!(f, "factory address: {}", e),
            Self::Storage(e) => defmt::write!(f, "device database: {}", e),
            Self::FirmwareDownload(status) => {
                defmt::write!(f, "firmware download failed with status {}", status)
            }
            Self::InvalidPhase(phase) => defmt::write!(f, "not allowed in phase {}", phase),
        }
    }
}

impl From<AddressError> for BringUpError {
    fn from(e: AddressError) -> Self {
        Self::FactoryAddress(e)
    }
}

impl From<StorageError> for BringUpError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}
