//! HCI event observer for bring-up status reporting.

use bt_hci::event::EventPacketHeader;
use bt_hci::{FromHciBytes, PacketKind};

/// Stack-internal event carrying the stack state in its first parameter.
pub const STACK_EVENT_STATE: u8 = 0x60;

/// Event handler signature accepted by [`HciStack::add_event_handler`].
///
/// Arguments are the H4 packet type, the channel and the packet bytes.
///
/// [`HciStack::add_event_handler`]: super::platform::HciStack::add_event_handler
pub type EventHandler = fn(packet_type: u8, channel: u16, packet: &[u8]);

/// Protocol stack state as reported by [`STACK_EVENT_STATE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StackState {
    Off = 0,
    Initializing = 1,
    /// Controller is operational.
    Working = 2,
    Halting = 3,
    Sleeping = 4,
    FallingAsleep = 5,
}

impl StackState {
    pub const fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Off),
            1 => Some(Self::Initializing),
            2 => Some(Self::Working),
            3 => Some(Self::Halting),
            4 => Some(Self::Sleeping),
            5 => Some(Self::FallingAsleep),
            _ => None,
        }
    }
}

/// Extract the stack state from a stack-state event.
///
/// Returns `None` for anything that is not an HCI event packet carrying
/// [`STACK_EVENT_STATE`] with a known state.
pub fn stack_state(packet_type: u8, packet: &[u8]) -> Option<StackState> {
    let (kind, _) = PacketKind::from_hci_bytes(&[packet_type]).ok()?;
    if kind != PacketKind::Event {
        return None;
    }

    let (header, params) = EventPacketHeader::from_hci_bytes(packet).ok()?;
    if header.code != STACK_EVENT_STATE {
        return None;
    }

    params.first().copied().and_then(StackState::from_u8)
}

/// Whether the packet announces an operational controller.
pub fn is_operational(packet_type: u8, packet: &[u8]) -> bool {
    stack_state(packet_type, packet) == Some(StackState::Working)
}

/// Bring-up status observer.
///
/// Stateless: reports once per operational state event and ignores
/// everything else.
pub fn packet_handler(packet_type: u8, _channel: u16, packet: &[u8]) {
    if !is_operational(packet_type, packet) {
        return;
    }
    info!("Bluetooth stack up and running.");
}
