//! Reader-based word source.
//!
//! _Requires Cargo feature `std`._

use std::io::{ErrorKind, Read};

use zerocopy::byteorder::little_endian;

use super::{Error, WordSource};

/// A word source reading little-endian 32-bit words from a single link.
///
/// _Requires Cargo feature `std`._
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
    link: i32,
    words: u64,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R, link: i32) -> Self {
        Self {
            reader,
            link,
            words: 0,
        }
    }

    /// Number of words read so far.
    pub fn words(&self) -> u64 {
        self.words
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> WordSource for ReaderSource<R> {
    fn next_word(&mut self) -> Result<Option<u32>, Error> {
        let mut buf = [0; 4];
        let mut filled = 0;

        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => Err(err)?,
            }
        }

        match filled {
            0 => Ok(None),
            4 => {
                let word: little_endian::U32 = zerocopy::transmute!(buf);
                self.words += 1;
                Ok(Some(word.get()))
            }
            n => Err(Error::TruncatedWord(n)),
        }
    }

    fn link(&self) -> i32 {
        self.link
    }
}
