//! Classification of raw readout words.

use either::Either::{self, Left, Right};
use tartan_bitfield::bitfield;

/// Marker word opening the sync phase.
pub const SYNC_MARKER: u32 = 0xFFFF_FFFF;

/// First channel-group selector word; selectors for groups `0..12` follow.
pub const GROUP_SELECT: u32 = 0x3000_0000;

/// First fifo selector word; selectors for fifos `0..4` follow.
pub const FIFO_SELECT: u32 = 0x3000_0010;

/// Number of fifo selector words.
pub const FIFOS: usize = 4;

/// Word closing an event, repeated once per channel group.
pub const EVENT_TRAILER: u32 = 0x3F1F_1F1F;

/// Word closing the data of one channel group, repeated three times.
pub const MODULE_FOOTER: u32 = 0x3FFF_FFFF;

/// Error bits which abort decoding when set in an error word.
pub const ERROR_MASK: u32 = 0x0000_0163;

/// A word steering the decoder rather than carrying channel data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Link-switch jitter word; restarts synchronization.
    Jitter,
    /// Selects a channel group directly.
    SelectGroup(u8),
    /// Selects the channel group last announced for a fifo.
    SelectFifo(u8),
    /// One of the words closing an event.
    EventTrailer,
    /// Event header, carrying an 11-bit event id.
    Header(u16),
    /// One of the three words closing a channel group.
    ModuleFooter,
    /// Any other footer-class word.
    Footer,
    /// Error word, with its flag bits.
    Error(u32),
    /// Link test (JTAG) word.
    LinkTest,
}

/// A word carrying 30 bits of channel data for one lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Payload {
    /// Lane within the channel group (0 or 1).
    pub lane: u8,
    /// Payload bits, least significant bit first.
    pub bits: u32,
}

bitfield! {
    struct Lane(u32) {
        [0..30] bits: u32,
        [30..32] kind: u8,
    }
}

bitfield! {
    struct Status(u32) {
        [3..14] event_id: u16,
        [28..32] kind: u8,
    }
}

bitfield! {
    struct Fault(u32) {
        [0..29] flags: u32,
        [29..32] kind: u8,
    }
}

/// Classify a readout word.
///
/// Every 32-bit value belongs to exactly one category.
pub fn classify(word: u32) -> Either<Control, Payload> {
    if word >> 4 == 0x0FF0_0000 {
        return Left(Control::Jitter);
    }

    if (GROUP_SELECT..GROUP_SELECT + 12).contains(&word) {
        return Left(Control::SelectGroup((word - GROUP_SELECT) as u8));
    }

    if (FIFO_SELECT..FIFO_SELECT + FIFOS as u32).contains(&word) {
        return Left(Control::SelectFifo((word - FIFO_SELECT) as u8));
    }

    if word == EVENT_TRAILER {
        return Left(Control::EventTrailer);
    }

    let lane = Lane(word);

    match lane.kind() {
        0b00 => {
            let status = Status(word);

            Left(match status.kind() {
                0x2 => Control::Header(status.event_id()),
                0x3 if word == MODULE_FOOTER => Control::ModuleFooter,
                0x3 => Control::Footer,
                _ => {
                    let fault = Fault(word);
                    debug_assert_eq!(fault.kind(), 0);
                    Control::Error(fault.flags())
                }
            })
        }
        0b01 => Left(Control::LinkTest),
        kind => Right(Payload {
            lane: kind & 1,
            bits: lane.bits(),
        }),
    }
}
