//! Bring-up configuration types.
//!
//! [`TransportConfig`] is the static HCI transport description shared by the
//! chipset driver and the protocol stack. [`UartConfig`] is derived from it for
//! the byte-transport driver. [`BringUpConfig`] bundles everything one bring-up
//! needs, configured through `const` builder methods.

/// Factory network address programmed at provisioning time.
///
/// Generated into the build from the module's NVRAM image.
pub const NVRAM_GENERATED_MAC_ADDRESS: &str = "macaddr=02:0A:F7:3d:76:be";

/// HCI transport kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportKind {
    /// HCI over a UART.
    Uart,
}

/// Static HCI transport configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransportConfig {
    pub kind: TransportKind,
    /// Baud rate used until the firmware download switches the controller over.
    pub baudrate_init: u32,
    /// Baud rate used after the firmware download.
    pub baudrate_main: u32,
    pub flowcontrol: bool,
    /// Device node for hosted ports. `None` on bare-metal targets.
    pub device_name: Option<&'static str>,
}

impl TransportConfig {
    /// H5 over the module's internal UART.
    ///
    /// 300000 baud and above is not reliable without the 48 MHz UART clock, so
    /// the main rate stays at 200000.
    pub const DEFAULT: Self = Self {
        kind: TransportKind::Uart,
        baudrate_init: 115_200,
        baudrate_main: 200_000,
        flowcontrol: false,
        device_name: None,
    };
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Byte-transport driver parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    pub baudrate: u32,
    pub flowcontrol: bool,
    pub device_name: Option<&'static str>,
}

impl UartConfig {
    /// Derive the pre-download UART parameters.
    ///
    /// Always uses `baudrate_init`. The main rate is only ever handed to the
    /// firmware loader.
    pub const fn from_transport(config: &TransportConfig) -> Self {
        Self {
            baudrate: config.baudrate_init,
            flowcontrol: config.flowcontrol,
            device_name: config.device_name,
        }
    }
}

impl From<&TransportConfig> for UartConfig {
    fn from(config: &TransportConfig) -> Self {
        Self::from_transport(config)
    }
}

/// Complete bring-up configuration.
///
/// # Example
///
/// ```
/// use wiced_radio::bluetooth::{BringUpConfig, TransportConfig};
///
/// const CONFIG: BringUpConfig = BringUpConfig::new()
///     .transport(TransportConfig::DEFAULT)
///     .packet_log(true);
/// assert_eq!(CONFIG.transport_config().baudrate_init, 115_200);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BringUpConfig {
    pub(crate) transport: TransportConfig,
    pub(crate) factory_mac: &'static str,
    pub(crate) packet_log: bool,
}

impl BringUpConfig {
    /// Default transport and the generated factory address, packet log off.
    pub const fn new() -> Self {
        Self {
            transport: TransportConfig::DEFAULT,
            factory_mac: NVRAM_GENERATED_MAC_ADDRESS,
            packet_log: false,
        }
    }

    /// Set the HCI transport configuration.
    pub const fn transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    /// Set the factory network address string (`"macaddr=XX:XX:XX:XX:XX:XX"`).
    pub const fn factory_mac(mut self, nvram: &'static str) -> Self {
        self.factory_mac = nvram;
        self
    }

    /// Route all HCI traffic to the stack's packet log. Useful while porting.
    pub const fn packet_log(mut self, enabled: bool) -> Self {
        self.packet_log = enabled;
        self
    }

    pub const fn transport_config(&self) -> &TransportConfig {
        &self.transport
    }

    pub const fn factory_mac_str(&self) -> &'static str {
        self.factory_mac
    }

    pub const fn packet_log_enabled(&self) -> bool {
        self.packet_log
    }
}

impl Default for BringUpConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_transport_matches_board_port() {
        let cfg = TransportConfig::default();
        assert_eq!(cfg.kind, TransportKind::Uart);
        assert_eq!(cfg.baudrate_init, 115_200);
        assert_eq!(cfg.baudrate_main, 200_000);
        assert!(!cfg.flowcontrol);
        assert_eq!(cfg.device_name, None);
    }

    #[test]
    fn uart_config_uses_initial_baudrate() {
        let transport = TransportConfig {
            kind: TransportKind::Uart,
            baudrate_init: 9_600,
            baudrate_main: 3_000_000,
            flowcontrol: true,
            device_name: Some("/dev/ttyUSB0"),
        };

        let uart = UartConfig::from_transport(&transport);
        assert_eq!(uart.baudrate, 9_600);
        assert!(uart.flowcontrol);
        assert_eq!(uart.device_name, Some("/dev/ttyUSB0"));
        assert_eq!(UartConfig::from(&transport), uart);
    }

    #[test]
    fn uart_config_is_deterministic() {
        let transport = TransportConfig::DEFAULT;
        assert_eq!(
            UartConfig::from_transport(&transport),
            UartConfig::from_transport(&transport)
        );
    }

    #[test]
    fn builder_overrides_defaults() {
        let cfg = BringUpConfig::default()
            .factory_mac("macaddr=00:11:22:33:44:55")
            .packet_log(true);
        assert_eq!(cfg.factory_mac_str(), "macaddr=00:11:22:33:44:55");
        assert!(cfg.packet_log_enabled());
        assert_eq!(*cfg.transport_config(), TransportConfig::DEFAULT);
    }
}
