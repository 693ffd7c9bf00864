//! Device configuration table (DCT) layout.
//!
//! The link-key database owns the start of the application DCT area. The
//! device database is packed right behind it.

use core::fmt;

use super::platform::LinkKeyDb;

/// Error placing the device database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Link-key region end does not fit a 32-bit DCT offset.
    RegionOverflow { offset: u32, size: u32 },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegionOverflow { offset, size } => write!(
                f,
                "link-key region {:#x}+{:#x} overflows the DCT offset range",
                offset, size
            ),
        }
    }
}

impl core::error::Error for StorageError {}

/// Start offset of the device database: first byte after the link-key region.
pub fn device_db_start<K: LinkKeyDb + ?Sized>(link_keys: &K) -> Result<u32, StorageError> {
    let offset = link_keys.storage_offset();
    let size = link_keys.storage_size();
    offset
        .checked_add(size)
        .ok_or(StorageError::RegionOverflow { offset, size })
}
