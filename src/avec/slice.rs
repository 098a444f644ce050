//! Slice-based word source.

use super::{Error, WordSource};

/// Words read from one link.
pub type Segment<'a> = (i32, &'a [u32]);

/// A word source over in-memory words.
///
/// Words may be split into segments read from different links, which are
/// delivered one after another.
#[derive(Clone, Debug)]
pub struct SliceSource<'a> {
    head: Segment<'a>,
    tail: &'a [Segment<'a>],
    segment: usize,
    offset: usize,
}

impl<'a> SliceSource<'a> {
    /// Create a source delivering `words` from a single link.
    pub fn new(words: &'a [u32], link: i32) -> Self {
        Self {
            head: (link, words),
            tail: &[],
            segment: 0,
            offset: 0,
        }
    }

    /// Create a source delivering each segment in turn.
    pub fn from_segments(segments: &'a [Segment<'a>]) -> Self {
        let (head, tail) = match segments.split_first() {
            Some((head, tail)) => (*head, tail),
            None => ((0, &[][..]), segments),
        };

        Self {
            head,
            tail,
            segment: 0,
            offset: 0,
        }
    }

    fn current(&self) -> Option<Segment<'a>> {
        match self.segment {
            0 => Some(self.head),
            i => self.tail.get(i - 1).copied(),
        }
    }

    /// Number of words delivered so far.
    pub fn position(&self) -> usize {
        let before: usize = match self.segment {
            0 => 0,
            i => self.head.1.len() + self.tail[..i - 1].iter().map(|s| s.1.len()).sum::<usize>(),
        };

        before + self.offset
    }
}

impl WordSource for SliceSource<'_> {
    fn next_word(&mut self) -> Result<Option<u32>, Error> {
        while let Some((_, words)) = self.current() {
            if let Some(&word) = words.get(self.offset) {
                self.offset += 1;
                return Ok(Some(word));
            }

            if self.segment == self.tail.len() {
                return Ok(None);
            }

            self.segment += 1;
            self.offset = 0;
        }

        Ok(None)
    }

    fn link(&self) -> i32 {
        self.current().map_or(self.head.0, |(link, _)| link)
    }

    fn select(&mut self, _partition: &str) -> Result<(), Error> {
        self.segment = 0;
        self.offset = 0;
        Ok(())
    }
}
