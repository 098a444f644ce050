//! The word-level stream decoder.

use either::Either::{Left, Right};
use thiserror::Error;

use super::{
    channel::Accumulator,
    tables::{GROUPS, LANES, ModuleId, link_row, module_id},
    word::{Control, ERROR_MASK, FIFOS, Payload, SYNC_MARKER, classify},
};

/// Number of words skipped after the sync marker before data is trusted.
pub const SYNC_SKIP: u8 = 9;

/// Number of module footer words closing a channel group.
const FOOTERS_PER_MODULE: u8 = 3;

/// Channel-group layout of the readout hardware.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Layout {
    /// Twelve channel groups per link.
    #[default]
    Standard,
    /// Eight channel groups per link; words for groups 8 to 11 are stale.
    Legacy,
}

impl Layout {
    /// Number of channel groups carrying data.
    pub fn groups(self) -> u8 {
        match self {
            Layout::Standard => 12,
            Layout::Legacy => 8,
        }
    }

    /// Fifo slot announcing a channel group.
    fn fifo(self, group: u8) -> usize {
        match (self, group) {
            (Layout::Legacy, 0..8) => group as usize / 2,
            _ => group as usize / 3,
        }
    }
}

/// Decoder settings fixed for the lifetime of a stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Channel-group layout of the hardware.
    pub layout: Layout,
    /// Pedestal-threshold offset added to compressed amplitudes, per lane.
    pub thresholds: [u16; LANES],
}

impl Config {
    pub const fn new() -> Self {
        Self {
            layout: Layout::Standard,
            thresholds: [0; LANES],
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_thresholds(mut self, thresholds: [u16; LANES]) -> Self {
        self.thresholds = thresholds;
        self
    }
}

/// A decoded charge measurement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Digit {
    pub module: ModuleId,
    /// Lane of the channel group the digit was read from.
    pub lane: u8,
    pub anode: u16,
    pub time_bin: u16,
    /// Amplitude in the 10-bit linear range.
    pub signal: u16,
}

/// An error ending the decoding of a stream.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// An error word with reserved bits set.
    #[error("Error word {0:#010x} has reserved bits set.")]
    Data(u32),
    /// A word which cannot be attributed to a channel group.
    #[error("Word {0:#010x} arrived before any channel group was selected.")]
    Format(u32),
    /// A word fed while digits of the previous payload word were pending.
    ///
    /// The word is not consumed and the decoder is not stopped.
    #[error("Word {0:#010x} fed before pending digits were drained.")]
    Undrained(u32),
}

/// State of the decoder between words.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Discarding words until the link is aligned.
    Syncing { marker: bool, skipped: u8 },
    /// Waiting for the next word.
    Classifying,
    /// Draining the accumulator of a lane after a payload word.
    Decoding {
        group: u8,
        lane: u8,
        module: ModuleId,
    },
    /// Stopped on an error; no further words are decoded.
    Stopped(DecodeError),
}

/// Outcome of feeding one word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// The word was consumed without producing output.
    Continue,
    /// The word was appended to an accumulator; drain
    /// [`StreamDecoder::next_digit`] before feeding another word.
    Decode,
    /// The third footer word of a channel group was seen.
    ModuleComplete(ModuleId),
}

/// Where the word being classified belongs.
enum Placement {
    /// No channel group has been selected yet.
    Unplaced,
    /// The current channel group has no module attached.
    Stale(u8),
    /// The current channel group and its module.
    Module(u8, ModuleId),
}

/// Finite-state machine decoding the words of one readout stream.
#[derive(Clone, Debug)]
pub struct StreamDecoder {
    config: Config,
    phase: Phase,
    link: Option<i32>,
    row: usize,
    group: Option<u8>,
    fifo: [u8; FIFOS],
    trailers: u8,
    footers: [u8; GROUPS],
    channels: [[Accumulator; LANES]; GROUPS],
    event_id: u16,
    module: Option<ModuleId>,
    previous_module: Option<ModuleId>,
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl StreamDecoder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            phase: Phase::Syncing {
                marker: false,
                skipped: 0,
            },
            link: None,
            row: 0,
            group: None,
            fifo: [0; FIFOS],
            trailers: 0,
            footers: [0; GROUPS],
            channels: Default::default(),
            event_id: 0,
            module: None,
            previous_module: None,
        }
    }

    /// Transition to another state by consuming a word read from `link`.
    ///
    /// While digits of the previous payload word are pending, the word is
    /// rejected with [`DecodeError::Undrained`] and the state is left as is.
    /// After any other error, every later word returns that error again.
    pub fn advance(&mut self, word: u32, link: i32) -> Result<Step, DecodeError> {
        match self.phase {
            Phase::Stopped(err) => return Err(err),
            Phase::Decoding { group, lane, .. }
                if self.channels[group as usize][lane as usize].is_ready() =>
            {
                return Err(DecodeError::Undrained(word));
            }
            _ => {}
        }

        self.switch_link(link);

        if let Phase::Syncing { marker, skipped } = self.phase {
            self.sync(word, marker, skipped);
            return Ok(Step::Continue);
        }

        self.phase = Phase::Classifying;

        let step = match classify(word) {
            Left(control) => self.control(word, control),
            Right(payload) => self.route(word, payload),
        };

        if let Err(err) = step {
            log::warn!("Stopped decoding link {link}: {err}");
            self.phase = Phase::Stopped(err);
        }

        step
    }

    /// Decode the next digit from the lane fed by the last payload word.
    ///
    /// Returns `None` once the lane needs another word.
    pub fn next_digit(&mut self) -> Option<Digit> {
        let Phase::Decoding { group, lane, module } = self.phase else {
            return None;
        };

        let threshold = self.config.thresholds[lane as usize];
        let channel = &mut self.channels[group as usize][lane as usize];

        let sample = loop {
            if !channel.is_ready() {
                self.phase = Phase::Classifying;
                return None;
            }

            if let Some(sample) = channel.step(threshold) {
                break sample;
            }
        };

        self.attribute(module);

        Some(Digit {
            module,
            lane,
            anode: sample.anode,
            time_bin: sample.time_bin,
            signal: sample.signal,
        })
    }

    fn switch_link(&mut self, link: i32) {
        match self.link {
            Some(current) if current == link => return,
            Some(current) => {
                log::debug!("Link switched from {current} to {link}, resetting channels.");
                self.reset();
            }
            None => {}
        }

        self.link = Some(link);
        self.row = link_row(link);

        if usize::try_from(link).ok() != Some(self.row) {
            log::debug!("Link {link} is outside the module map, using row {}.", self.row);
        }
    }

    fn sync(&mut self, word: u32, marker: bool, skipped: u8) {
        let (marker, skipped) = if !marker {
            (word == SYNC_MARKER, 0)
        } else if classify(word) == Left(Control::LinkTest) {
            (true, skipped)
        } else {
            (true, skipped + 1)
        };

        self.phase = if skipped < SYNC_SKIP {
            Phase::Syncing { marker, skipped }
        } else {
            log::debug!("Synchronized on link {:?}.", self.link);
            Phase::Classifying
        };
    }

    fn control(&mut self, word: u32, control: Control) -> Result<Step, DecodeError> {
        let in_event = (self.trailers as usize) < GROUPS;

        match control {
            Control::Jitter => {
                log::debug!("Jitter word on link {:?}, resynchronizing.", self.link);
                self.restart();
            }
            Control::SelectGroup(group) if in_event => {
                self.group = Some(group);
                self.fifo[self.config.layout.fifo(group)] = group;
            }
            Control::SelectFifo(fifo) if in_event => {
                self.group = Some(self.fifo[fifo as usize]);
            }
            Control::SelectGroup(_) | Control::SelectFifo(_) => {}
            Control::EventTrailer => {
                self.trailers = self.trailers.saturating_add(1);
            }
            _ => return self.status(word, control),
        }

        Ok(Step::Continue)
    }

    fn status(&mut self, word: u32, control: Control) -> Result<Step, DecodeError> {
        let placement = self.placement();

        if let Placement::Stale(group) = placement {
            log::trace!("Discarding {word:#010x} for inactive channel group {group}.");
            return Ok(Step::Continue);
        }

        match control {
            Control::Header(event_id) => {
                self.event_id = event_id;
            }
            Control::ModuleFooter => {
                let Placement::Module(group, module) = placement else {
                    Err(DecodeError::Format(word))?
                };

                let count = &mut self.footers[group as usize];
                *count = count.saturating_add(1);

                if *count == FOOTERS_PER_MODULE {
                    log::debug!("Module {module} complete.");
                    self.attribute(module);
                    return Ok(Step::ModuleComplete(module));
                }
            }
            Control::Error(flags) => {
                if flags & ERROR_MASK != 0 {
                    Err(DecodeError::Data(word))?;
                }
            }
            Control::Jitter
            | Control::SelectGroup(_)
            | Control::SelectFifo(_)
            | Control::EventTrailer
            | Control::Footer
            | Control::LinkTest => {}
        }

        Ok(Step::Continue)
    }

    fn route(&mut self, word: u32, Payload { lane, bits }: Payload) -> Result<Step, DecodeError> {
        match self.placement() {
            Placement::Unplaced => Err(DecodeError::Format(word)),
            Placement::Stale(group) => {
                log::trace!("Discarding {word:#010x} for inactive channel group {group}.");
                Ok(Step::Continue)
            }
            Placement::Module(group, module) => {
                self.channels[group as usize][lane as usize].append(bits);
                self.phase = Phase::Decoding {
                    group,
                    lane,
                    module,
                };
                Ok(Step::Decode)
            }
        }
    }

    fn placement(&self) -> Placement {
        let Some(group) = self.group else {
            return Placement::Unplaced;
        };

        if group >= self.config.layout.groups() {
            return Placement::Stale(group);
        }

        match module_id(self.row, group) {
            Some(module) => Placement::Module(group, module),
            None => Placement::Stale(group),
        }
    }

    fn attribute(&mut self, module: ModuleId) {
        self.previous_module = self.module;
        self.module = Some(module);
    }

    /// Start a new event on the same link.
    fn restart(&mut self) {
        self.trailers = 0;
        self.footers = [0; GROUPS];
        self.phase = Phase::Syncing {
            marker: false,
            skipped: 0,
        };
    }

    /// Forget everything learnt from the previous link.
    fn reset(&mut self) {
        self.restart();
        self.group = None;
        self.fifo = [0; FIFOS];
        self.channels = Default::default();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Link id of the last word, as reported by the source.
    pub fn link(&self) -> Option<i32> {
        self.link
    }

    /// Currently selected channel group.
    pub fn group(&self) -> Option<u8> {
        self.group
    }

    /// Event id of the last header word.
    pub fn event_id(&self) -> u16 {
        self.event_id
    }

    /// Module of the last digit or completion.
    pub fn module(&self) -> Option<ModuleId> {
        self.module
    }

    /// Module of the digit or completion before the last one.
    pub fn previous_module(&self) -> Option<ModuleId> {
        self.previous_module
    }

    /// Accumulator of a lane of a channel group.
    pub fn channel(&self, group: u8, lane: u8) -> Option<&Accumulator> {
        self.channels.get(group as usize)?.get(lane as usize)
    }
}
