#![no_std]

//! An efficient decoder for silicon drift detector raw readout streams.
//!
//! Anodyne turns the 32-bit words delivered by an SDD readout link into digit
//! records (module, lane, anode, time bin, amplitude) and module-completion
//! signals. It copes with multiplexed channel groups, entropy-coded payloads
//! split across words, synchronization and error markers, and the legacy
//! 8-group hardware layout.
//!
//! Most users should begin with the [`avec`] module, which pulls words from a
//! [`WordSource`](avec::WordSource) and yields decoded events. The IO-free
//! state machine underneath is exposed in the [`sans`] module for applications
//! that deliver words themselves (such as those running on embedded systems).
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `derive`: enable derive macros (default).
//! - `std`: enable reader-based word source (default).

#[cfg(feature = "std")]
extern crate std;

pub mod avec;
pub mod sans;
