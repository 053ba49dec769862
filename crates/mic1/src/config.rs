use mic1_common::Severity;
use typed_builder::TypedBuilder;

use crate::register::clamp_width;

/// Datapath width used when none is configured: 16-bit registers, ALU and
/// shifter.
pub const DEFAULT_WORD_BYTES: u8 = 2;
/// Size of the backing memory in words.
pub const DEFAULT_MEMORY_WORDS: usize = 4096;

/// Construction parameters for a [`Sequencer`](crate::Sequencer).
///
/// ```
/// use mic1::SequencerConfig;
///
/// let config = SequencerConfig::builder().memory_words(256).build();
/// assert_eq!(config.word_bytes, 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, TypedBuilder)]
pub struct SequencerConfig {
    /// Width in bytes of the registers, MAR/MBR, ALU and shifter.
    #[builder(default = DEFAULT_WORD_BYTES)]
    pub word_bytes: u8,
    #[builder(default = DEFAULT_MEMORY_WORDS)]
    pub memory_words: usize,
    /// Threshold for the default `LogSink`. Ignored by `Sequencer::with_sink`.
    #[builder(default = Severity::Trace)]
    pub min_severity: Severity,
}

impl SequencerConfig {
    /// Word width clamped into what a [`Register`](crate::Register) can hold.
    pub(crate) fn datapath_bytes(&self) -> u8 {
        clamp_width(self.word_bytes)
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
