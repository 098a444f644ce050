//! Per-lane bit accumulators.

use super::tables::{CODE_LENGTH, expand_amplitude};

/// Number of data bits carried by one payload word.
pub const PAYLOAD_BITS: u8 = 30;

/// Width of a code selector.
const CODE_BITS: u8 = 3;

/// What the next read from an accumulator yields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Expect {
    /// A 3-bit code selector.
    Code,
    /// The payload announced by the last code selector.
    #[default]
    Payload,
}

/// A decoded charge measurement, not yet attributed to a module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample {
    pub anode: u16,
    pub time_bin: u16,
    pub signal: u16,
}

/// Shift-register state for one lane of one channel group.
///
/// Bits are appended at the high end and consumed from the low end. A fresh
/// accumulator expects a zero-width payload for code 0, so its first step
/// sets the time bin to 0 before the first real code selector is read.
#[derive(Clone, Copy, Debug, Default)]
pub struct Accumulator {
    buffer: u64,
    filled: u8,
    expect: Expect,
    width: u8,
    code: u8,
    anode: u16,
    time_bin: u16,
}

impl Accumulator {
    /// Append the 30 data bits of a payload word.
    pub fn append(&mut self, bits: u32) {
        debug_assert!(self.filled < CODE_LENGTH[1]);

        self.buffer |= u64::from(bits & 0x3FFF_FFFF) << self.filled;
        self.filled += PAYLOAD_BITS;
    }

    /// Whether enough bits are buffered for the next read.
    pub fn is_ready(&self) -> bool {
        self.filled >= self.width
    }

    /// Consume the bits of the next read.
    ///
    /// The caller must check [`Self::is_ready`] first.
    pub fn read_bits(&mut self) -> u32 {
        let mask = (1u64 << self.width) - 1;
        let value = (self.buffer & mask) as u32;

        self.buffer >>= self.width;
        self.filled -= self.width;

        value
    }

    /// Perform one read and interpret it.
    ///
    /// Returns a sample when the read completed an amplitude.
    pub fn step(&mut self, threshold: u16) -> Option<Sample> {
        let value = self.read_bits();

        match self.expect {
            Expect::Code => {
                self.code = (value & 0x7) as u8;
                self.width = CODE_LENGTH[self.code as usize];
                self.expect = Expect::Payload;

                None
            }
            Expect::Payload => {
                self.width = CODE_BITS;
                self.expect = Expect::Code;

                match self.code {
                    0 => {
                        self.time_bin = value as u16;
                        None
                    }
                    1 => {
                        self.time_bin = 0;
                        self.anode = self.anode.wrapping_add(1);
                        None
                    }
                    code => {
                        let compressed = value + (1 << code) + u32::from(threshold);

                        let sample = Sample {
                            anode: self.anode,
                            time_bin: self.time_bin,
                            signal: expand_amplitude(compressed),
                        };

                        self.time_bin = self.time_bin.wrapping_add(1);

                        Some(sample)
                    }
                }
            }
        }
    }

    /// Number of buffered bits not yet consumed.
    pub fn filled(&self) -> u8 {
        self.filled
    }

    /// What the next read yields.
    pub fn expect(&self) -> Expect {
        self.expect
    }

    /// Running anode counter.
    pub fn anode(&self) -> u16 {
        self.anode
    }

    /// Running time-bin counter.
    pub fn time_bin(&self) -> u16 {
        self.time_bin
    }
}
