#![cfg_attr(not(test), no_std)]
#![doc = "Bluetooth bring-up for WICED Wi-Fi/Bluetooth combo chips."]
#![doc = ""]
#![doc = "Sequences chipset and UART setup, HCI stack wiring, controller address"]
#![doc = "derivation and the asynchronous firmware download, then hands the"]
#![doc = "controller to the application."]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod bluetooth;

#[cfg(all(test, feature = "log"))]
mod test_log;
