#![allow(dead_code)]

use anodyne::sans::{DecodeError, Digit, Step, StreamDecoder, tables::CODE_LENGTH};

pub const MARKER: u32 = 0xFFFF_FFFF;
pub const FOOTER: u32 = 0x3FFF_FFFF;
pub const TRAILER: u32 = 0x3F1F_1F1F;
pub const JITTER: u32 = 0xFF00_0003;
pub const LINK_TEST: u32 = 0x4000_0000;

/// Words aligning a link: noise, the marker, and nine skipped words.
pub fn preamble() -> Vec<u32> {
    let mut words = vec![0x1234_5678, 0x0000_0000, MARKER];
    words.extend([0x2000_0000; 9]);
    words
}

pub fn group(group: u8) -> u32 {
    0x3000_0000 + u32::from(group)
}

pub fn fifo(fifo: u8) -> u32 {
    0x3000_0010 + u32::from(fifo)
}

pub fn header(event_id: u16) -> u32 {
    0x2000_0000 | (u32::from(event_id) << 3)
}

/// Packs codes and values into the payload words of one lane.
pub struct LaneWriter {
    lane: u8,
    buffer: u64,
    filled: u32,
    words: Vec<u32>,
}

impl LaneWriter {
    pub fn new(lane: u8) -> Self {
        Self {
            lane,
            buffer: 0,
            filled: 0,
            words: vec![],
        }
    }

    pub fn push(&mut self, value: u32, width: u32) -> &mut Self {
        self.buffer |= (u64::from(value) & ((1u64 << width) - 1)) << self.filled;
        self.filled += width;

        while self.filled >= 30 {
            let word = self.word(self.buffer as u32 & 0x3FFF_FFFF);
            self.words.push(word);
            self.buffer >>= 30;
            self.filled -= 30;
        }

        self
    }

    pub fn code(&mut self, code: u8, value: u32) -> &mut Self {
        self.push(u32::from(code), 3);
        self.push(value, u32::from(CODE_LENGTH[code as usize]))
    }

    pub fn time_bin(&mut self, time_bin: u32) -> &mut Self {
        self.code(0, time_bin)
    }

    pub fn next_anode(&mut self) -> &mut Self {
        self.code(1, 0)
    }

    /// Flush pending bits, zero-padded, into a final word.
    pub fn finish(&mut self) -> Vec<u32> {
        if self.filled != 0 {
            let word = self.word(self.buffer as u32);
            self.words.push(word);
            self.buffer = 0;
            self.filled = 0;
        }

        std::mem::take(&mut self.words)
    }

    fn word(&self, bits: u32) -> u32 {
        ((0b10 | u32::from(self.lane)) << 30) | bits
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Out {
    Digit(Digit),
    Complete(u16),
    Error(DecodeError),
}

/// Feed words from one link, collecting everything produced until the end or
/// the first error.
pub fn feed(decoder: &mut StreamDecoder, words: &[u32], link: i32) -> Vec<Out> {
    let mut out = vec![];

    for &word in words {
        match decoder.advance(word, link) {
            Ok(Step::Continue) => {}
            Ok(Step::Decode) => {
                while let Some(digit) = decoder.next_digit() {
                    out.push(Out::Digit(digit));
                }
            }
            Ok(Step::ModuleComplete(module)) => out.push(Out::Complete(module)),
            Err(err) => {
                out.push(Out::Error(err));
                break;
            }
        }
    }

    out
}

/// A digit read from lane 0.
pub fn digit(module: u16, anode: u16, time_bin: u16, signal: u16) -> Out {
    lane_digit(module, 0, anode, time_bin, signal)
}

pub fn lane_digit(module: u16, lane: u8, anode: u16, time_bin: u16, signal: u16) -> Out {
    Out::Digit(Digit {
        module,
        lane,
        anode,
        time_bin,
        signal,
    })
}
