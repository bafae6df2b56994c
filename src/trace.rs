//! Waveform trace assembly
//!
//! Each fluorescence channel is read from its analyzed-data tag (`DATA` 9-12)
//! when present, falling back to the raw-data tag (`DATA` 1-4). The four
//! channels are then truncated to the shortest non-empty channel so that every
//! sample index is valid in all of them.

use std::fmt;

use crate::entry::TagKey;
use crate::tag::TagResolver;

/// A fluorescence channel, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    G,
    A,
    T,
    C,
}
impl Channel {
    /// All channels in output order `[G, A, T, C]`
    pub const ALL: [Channel; 4] = [Self::G, Self::A, Self::T, Self::C];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::G => "G",
            Self::A => "A",
            Self::T => "T",
            Self::C => "C",
        }
    }

    /// Candidate tags in priority order: analyzed data, then raw data
    #[must_use]
    pub const fn keys(self) -> [TagKey; 2] {
        let idx = self as u32 + 1;
        [TagKey::new(b"DATA", idx + 8), TagKey::new(b"DATA", idx)]
    }
}
impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Four aligned waveform channels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    length: usize,
    g: Vec<i32>,
    a: Vec<i32>,
    t: Vec<i32>,
    c: Vec<i32>,
}
impl Trace {
    /// Builds a trace from channel data in `[G, A, T, C]` order
    ///
    /// The common length is the minimum over non-empty channels (0 when all are
    /// empty); every channel is truncated to it.
    #[must_use]
    pub fn from_channels(channels: [Vec<i32>; 4]) -> Self {
        let length = channels
            .iter()
            .map(Vec::len)
            .filter(|&n| n > 0)
            .min()
            .unwrap_or(0);
        let [mut g, mut a, mut t, mut c] = channels;
        for channel in [&mut g, &mut a, &mut t, &mut c] {
            channel.truncate(length);
        }
        Self { length, g, a, t, c }
    }

    /// Reads the four channels through their tag fallback chains
    #[must_use]
    pub fn assemble(resolver: &TagResolver) -> Self {
        let channels = Channel::ALL.map(|channel| {
            resolver
                .first_present(&channel.keys(), TagResolver::integers)
                .unwrap_or_default()
        });
        Self::from_channels(channels)
    }

    /// Common number of samples per channel
    ///
    /// A channel with no source data stays empty.
    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn channel(&self, channel: Channel) -> &[i32] {
        match channel {
            Channel::G => &self.g,
            Channel::A => &self.a,
            Channel::T => &self.t,
            Channel::C => &self.c,
        }
    }

    /// Consumes the trace, returning channel data in `[G, A, T, C]` order
    #[must_use]
    pub fn into_channels(self) -> [Vec<i32>; 4] {
        [self.g, self.a, self.t, self.c]
    }
}
