//! Internal finite-state machine for decoding readout words.
//!
//! This module is intended for applications that deliver words themselves and
//! need fine control over decoder internals. See [`crate::avec`] for drivers
//! covering common sources.
//!
//! # Architecture
//!
//! A [`StreamDecoder`] is fed one word at a time, together with the id of the
//! link it was read from, by calling [`StreamDecoder::advance`]. Control words
//! update the decoder's framing state in place. Payload words are appended to
//! the bit accumulator of the current channel group and lane; afterwards,
//! [`StreamDecoder::next_digit`] must be called until it returns `None`, as a
//! single payload word may complete several digits.
//!
//! The decoder never performs IO and never allocates. All per-channel state
//! lives in fixed-size arrays inside the decoder, so one instance per stream
//! is all a caller needs. The static tables in [`tables`] are shared
//! immutably between instances.
//!
//! Implementers driving the decoder by hand must take care of:
//!
//! - Draining [`StreamDecoder::next_digit`] after every word, before feeding
//! the next one. A word fed too early is rejected with
//! [`DecodeError::Undrained`] and must be fed again after draining.
//!
//! - Stopping once [`StreamDecoder::advance`] returns an error. The decoder
//! stays stopped and reports the same error for every later word.
//!
//! Implementers are recommended to begin by studying the pull loop in
//! [`crate::avec::RawStream`].

pub mod channel;
pub mod stream;
pub mod tables;
pub mod word;

pub use stream::{Config, DecodeError, Digit, Layout, Phase, Step, StreamDecoder};
pub use tables::ModuleId;

/// Entrypoint to the finite-state machine.
pub type Decoder = StreamDecoder;
