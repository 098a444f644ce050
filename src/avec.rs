//! Convenience interfaces for common decoding patterns.
//!
//! A [`RawStream`] pulls words from a [`WordSource`] and yields decoded
//! [`Event`]s, one per call. The [`decode`] function drains a whole source
//! into a [`FromDigits`] receiver instead.
//!
//! In many cases, [`FromDigits`] can be derived. See the
//! [`FromDigits`](macro@FromDigits) macro for details.

use core::fmt;

use thiserror::Error;

use crate::sans::{Config, DecodeError, Digit, ModuleId, Step, StreamDecoder};

#[cfg(feature = "std")]
pub mod reader;
pub mod slice;

#[cfg(feature = "std")]
pub use reader::ReaderSource;
pub use slice::SliceSource;

/// Partition selected on a source before decoding.
pub const PARTITION: &str = "ITSSDD";

/// Errors occurring while decoding from a source.
#[derive(Debug, Error)]
pub enum Error {
    /// The stream contained a word the decoder cannot accept.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The source ended part way into a word.
    #[error("Source ended {0} bytes into a word.")]
    TruncatedWord(usize),
    /// An error from the underlying reader.
    #[cfg(feature = "std")]
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Category of an error reported to [`WordSource::log_error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// An error word with reserved bits set.
    DataError,
    /// A word matching no recognized layout.
    FormatError,
    /// A word fed to the decoder before its pending digits were drained.
    Undrained,
}

impl From<&DecodeError> for ErrorKind {
    fn from(err: &DecodeError) -> Self {
        match err {
            DecodeError::Data(_) => Self::DataError,
            DecodeError::Format(_) => Self::FormatError,
            DecodeError::Undrained(_) => Self::Undrained,
        }
    }
}

/// A supplier of readout words in delivery order.
///
/// The default implementation of each optional method does nothing.
#[allow(unused_variables)]
pub trait WordSource {
    /// Read the next word, or `None` once the source is exhausted.
    fn next_word(&mut self) -> Result<Option<u32>, Error>;

    /// Id of the link the last word was read from.
    fn link(&self) -> i32;

    /// Restrict the source to a detector partition and rewind it.
    fn select(&mut self, partition: &str) -> Result<(), Error> {
        Ok(())
    }

    /// Record a non-fatal diagnostic.
    fn log_error(&mut self, kind: ErrorKind, message: fmt::Arguments<'_>) {}
}

impl<S: WordSource + ?Sized> WordSource for &mut S {
    fn next_word(&mut self) -> Result<Option<u32>, Error> {
        (**self).next_word()
    }

    fn link(&self) -> i32 {
        (**self).link()
    }

    fn select(&mut self, partition: &str) -> Result<(), Error> {
        (**self).select(partition)
    }

    fn log_error(&mut self, kind: ErrorKind, message: fmt::Arguments<'_>) {
        (**self).log_error(kind, message)
    }
}

/// A decoded output of a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Record {
    Digit(Digit),
    /// All data of a module has been read. More modules may follow.
    ModuleComplete(ModuleId),
}

/// The result of pulling from a [`RawStream`].
#[derive(Debug)]
pub enum Event {
    Digit(Digit),
    ModuleComplete(ModuleId),
    /// Decoding stopped; nothing more is usable from this stream.
    Error(Error),
    /// The source is exhausted.
    EndOfStream,
}

impl From<Record> for Event {
    fn from(record: Record) -> Self {
        match record {
            Record::Digit(digit) => Self::Digit(digit),
            Record::ModuleComplete(module) => Self::ModuleComplete(module),
        }
    }
}

/// Pull decoder over a word source.
///
/// Also usable as an iterator of records, which ends on exhaustion and after
/// the first error.
#[derive(Debug)]
pub struct RawStream<S> {
    source: S,
    decoder: StreamDecoder,
    done: bool,
}

impl<S: WordSource> RawStream<S> {
    /// Select the SDD partition on a source and prepare to decode it.
    pub fn new(mut source: S, config: Config) -> Result<Self, Error> {
        source.select(PARTITION)?;

        Ok(Self {
            source,
            decoder: StreamDecoder::new(config),
            done: false,
        })
    }

    /// Decode until the next digit, module completion, or end of stream.
    pub fn next_event(&mut self) -> Event {
        if self.done {
            return Event::EndOfStream;
        }

        match self.pull() {
            Ok(Some(record)) => record.into(),
            Ok(None) => {
                self.done = true;
                Event::EndOfStream
            }
            Err(err) => {
                self.done = true;
                Event::Error(err)
            }
        }
    }

    fn pull(&mut self) -> Result<Option<Record>, Error> {
        loop {
            if let Some(digit) = self.decoder.next_digit() {
                return Ok(Some(Record::Digit(digit)));
            }

            let Some(word) = self.source.next_word()? else {
                return Ok(None);
            };

            match self.decoder.advance(word, self.source.link()) {
                Ok(Step::ModuleComplete(module)) => return Ok(Some(Record::ModuleComplete(module))),
                Ok(Step::Continue | Step::Decode) => {}
                Err(err) => {
                    self.source.log_error((&err).into(), format_args!("{err}"));
                    Err(err)?
                }
            }
        }
    }

    pub fn decoder(&self) -> &StreamDecoder {
        &self.decoder
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }
}

impl<S: WordSource> Iterator for RawStream<S> {
    type Item = Result<Record, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_event() {
            Event::Digit(digit) => Some(Ok(Record::Digit(digit))),
            Event::ModuleComplete(module) => Some(Ok(Record::ModuleComplete(module))),
            Event::Error(err) => Some(Err(err)),
            Event::EndOfStream => None,
        }
    }
}

/// Decode every word of a source, publishing to a receiver.
pub fn decode(
    source: &mut impl WordSource,
    config: Config,
    o: &mut impl FromDigits,
) -> Result<(), Error> {
    for record in RawStream::new(source, config)? {
        match record? {
            Record::Digit(digit) => o.add_digit(digit),
            Record::ModuleComplete(module) => o.complete_module(module),
        }
    }

    Ok(())
}

/// Derive [`FromDigits`] for a struct collecting decoded output.
///
/// _Requires Cargo feature `derive`._
///
/// # Examples
///
/// To collect the digits of one module, add the `digits(N)` attribute to a
/// `Vec<Digit>` struct field, where `N` is the module number. Use
/// `digits(all)` to collect every digit. An `Option<Digit>` field keeps only
/// the latest digit instead.
///
/// To record module completions, add the `completed` attribute to a
/// `Vec<ModuleId>` or `Option<ModuleId>` field.
///
/// ```
/// #[derive(Debug, Default, FromDigits)]
/// struct Hits {
///     #[digits(240)]
///     inner: Vec<Digit>,
///     #[digits(all)]
///     last: Option<Digit>,
///     #[completed]
///     modules: Vec<ModuleId>,
/// }
/// ```
///
/// To accumulate into arbitrary types, supply an accumulator closure. Since
/// the element type cannot be inferred, the second argument must be typed.
///
/// ```
/// #[derive(Debug, Default, FromDigits)]
/// struct Charge {
///     #[digits(all, |sum, d: Digit| *sum += u32::from(d.signal))]
///     total: u32,
///     #[completed(|n, _: ModuleId| *n += 1)]
///     modules: usize,
/// }
/// ```
#[cfg(feature = "derive")]
pub use anodyne_derive::FromDigits;

/// Receive decoded output of a stream.
///
/// The default implementation of each method ignores received values.
///
/// See the [`FromDigits`](macro@FromDigits) derive macro for an automatic
/// implementation of this trait.
#[allow(unused_variables)]
pub trait FromDigits {
    /// Add a decoded digit.
    fn add_digit(&mut self, digit: Digit) {}
    /// Note that all digits of a module have been received.
    fn complete_module(&mut self, module: ModuleId) {}
}
