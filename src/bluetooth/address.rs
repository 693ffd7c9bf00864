//! Controller address derivation.
//!
//! The combo module ships with a single factory-programmed network address.
//! Bluetooth uses that address plus one in the last byte so the two radios
//! never share an identifier.

use core::fmt;

use bt_hci::param::BdAddr;

/// Prefix of the factory address string.
pub const FACTORY_MAC_PREFIX: &str = "macaddr=";

/// Error parsing a factory network address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressError {
    /// String is shorter than `macaddr=` plus six hex pairs.
    TooShort,
    /// Byte at the given index is not a two-digit hex number.
    InvalidHex(usize),
    /// Separator after the given byte index is not `:`, `-` or a space.
    InvalidSeparator(usize),
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort => write!(f, "factory address too short"),
            Self::InvalidHex(i) => write!(f, "invalid hex byte at index {}", i),
            Self::InvalidSeparator(i) => write!(f, "invalid separator after byte {}", i),
        }
    }
}

impl core::error::Error for AddressError {}

/// Factory network (Wi-Fi) address, display byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Parse a factory string of the form `macaddr=XX:XX:XX:XX:XX:XX`.
    ///
    /// The six pairs are read starting right after the prefix. Anything after
    /// the last pair is ignored.
    pub fn from_factory_str(nvram: &str) -> Result<Self, AddressError> {
        let text = nvram
            .get(FACTORY_MAC_PREFIX.len()..)
            .ok_or(AddressError::TooShort)?;
        Self::parse(text)
    }

    /// Parse six hex pairs separated by `:`, `-` or a space.
    pub fn parse(text: &str) -> Result<Self, AddressError> {
        let bytes = text.as_bytes();
        if bytes.len() < 17 {
            return Err(AddressError::TooShort);
        }

        let mut addr = [0u8; 6];
        for (i, byte) in addr.iter_mut().enumerate() {
            let pos = i * 3;
            *byte = hex_pair(bytes[pos], bytes[pos + 1]).ok_or(AddressError::InvalidHex(i))?;
            if i < 5 && !matches!(bytes[pos + 2], b':' | b'-' | b' ') {
                return Err(AddressError::InvalidSeparator(i));
            }
        }
        Ok(Self(addr))
    }

    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }
}

fn hex_pair(hi: u8, lo: u8) -> Option<u8> {
    let hi = (hi as char).to_digit(16)?;
    let lo = (lo as char).to_digit(16)?;
    Some((hi << 4 | lo) as u8)
}

/// Derive the controller address from a network address.
///
/// First five bytes are kept, the last is incremented modulo 256: a factory
/// address ending in `0xFF` yields `0x00`.
pub const fn derive_controller_address(network: [u8; 6]) -> [u8; 6] {
    let mut addr = network;
    addr[5] = addr[5].wrapping_add(1);
    addr
}

/// Bluetooth device address of the controller, display byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceAddress(pub [u8; 6]);

impl DeviceAddress {
    pub const fn from_mac(mac: MacAddress) -> Self {
        Self(derive_controller_address(mac.0))
    }

    /// Parse the factory string and derive the controller address in one go.
    pub fn from_factory_str(nvram: &str) -> Result<Self, AddressError> {
        MacAddress::from_factory_str(nvram).map(Self::from_mac)
    }

    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// HCI wire form (least significant byte first).
    pub fn to_bd_addr(self) -> BdAddr {
        let mut raw = self.0;
        raw.reverse();
        BdAddr::new(raw)
    }
}

impl From<DeviceAddress> for BdAddr {
    fn from(addr: DeviceAddress) -> Self {
        addr.to_bd_addr()
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            a[0], a[1], a[2], a[3], a[4], a[5]
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DeviceAddress {
    fn format(&self, f: defmt::Formatter) {
        let a = &self.0;
        defmt::write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            a[0],
            a[1],
            a[2],
            a[3],
            a[4],
            a[5]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generated_factory_address() {
        let mac = MacAddress::from_factory_str("macaddr=02:0A:F7:3d:76:be").unwrap();
        assert_eq!(mac.octets(), [0x02, 0x0A, 0xF7, 0x3D, 0x76, 0xBE]);
    }

    #[test]
    fn derived_address_increments_last_byte() {
        let addr = DeviceAddress::from_factory_str("macaddr=02:0A:F7:3D:76:BE").unwrap();
        assert_eq!(addr.octets(), [0x02, 0x0A, 0xF7, 0x3D, 0x76, 0xBF]);
    }

    #[test]
    fn derived_address_wraps_last_byte() {
        assert_eq!(
            derive_controller_address([0x02, 0x0A, 0xF7, 0x3D, 0x76, 0xFF]),
            [0x02, 0x0A, 0xF7, 0x3D, 0x76, 0x00]
        );
    }

    #[test]
    fn wraparound_does_not_carry() {
        let addr = DeviceAddress::from_factory_str("macaddr=02:0A:F7:3D:FF:FF").unwrap();
        assert_eq!(addr.octets(), [0x02, 0x0A, 0xF7, 0x3D, 0xFF, 0x00]);
    }

    #[test]
    fn accepts_dash_and_space_separators() {
        let mac = MacAddress::parse("00-11-22 33:44:55").unwrap();
        assert_eq!(mac.octets(), [0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    }

    #[test]
    fn ignores_trailing_text() {
        let mac = MacAddress::from_factory_str("macaddr=00:11:22:33:44:55\n").unwrap();
        assert_eq!(mac.octets(), [0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert_eq!(
            MacAddress::from_factory_str("macaddr"),
            Err(AddressError::TooShort)
        );
        assert_eq!(
            MacAddress::from_factory_str("macaddr=02:0A:F7"),
            Err(AddressError::TooShort)
        );
        assert_eq!(
            MacAddress::from_factory_str("macaddr=02:0A:G7:3D:76:BE"),
            Err(AddressError::InvalidHex(2))
        );
        assert_eq!(
            MacAddress::from_factory_str("macaddr=02:0A.F7:3D:76:BE"),
            Err(AddressError::InvalidSeparator(1))
        );
    }

    #[test]
    fn bd_addr_is_little_endian() {
        let addr = DeviceAddress([0x02, 0x0A, 0xF7, 0x3D, 0x76, 0xBF]);
        let bd: BdAddr = addr.into();
        assert_eq!(bd.raw(), &[0xBF, 0x76, 0x3D, 0xF7, 0x0A, 0x02]);
    }

    #[test]
    fn display_is_colon_separated_upper_hex() {
        let addr = DeviceAddress([0x02, 0x0A, 0xF7, 0x3D, 0x76, 0xBF]);
        assert_eq!(addr.to_string(), "02:0A:F7:3D:76:BF");
    }
}
