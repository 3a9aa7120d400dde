//! Format descriptors and probe-based format selection.

use std::fmt;

use crate::probe::{self, ProbeData, AVS3_EXTENSION};

/// Codec carried by a raw video format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum CodecId {
    /// AVS3-P2 / IEEE 1857.10
    Avs3,
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecId::Avs3 => write!(f, "avs3"),
        }
    }
}

/// A raw format that can score a probe sample.
///
/// Implementations must be safe to share across threads (`Send + Sync`).
pub trait FormatProbe: Send + Sync {
    /// Short name identifying the format.
    fn name(&self) -> &'static str;

    /// Descriptive name.
    fn long_name(&self) -> &'static str;

    /// Comma separated file extensions.
    fn extensions(&self) -> &'static str;

    /// Codec of the single video stream the format carries.
    fn codec(&self) -> CodecId;

    /// Score the sample, `0` meaning "not this format".
    fn probe(&self, data: &ProbeData<'_>) -> u32;
}

/// Raw AVS3-P2 video elementary stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct Avs3Format;

impl FormatProbe for Avs3Format {
    fn name(&self) -> &'static str {
        "avs3"
    }

    fn long_name(&self) -> &'static str {
        "raw AVS3-P2/IEEE1857.10"
    }

    fn extensions(&self) -> &'static str {
        AVS3_EXTENSION
    }

    fn codec(&self) -> CodecId {
        CodecId::Avs3
    }

    fn probe(&self, data: &ProbeData<'_>) -> u32 {
        probe::probe(data)
    }
}

/// Ordered set of [`FormatProbe`]s.
///
/// [`detect`](Self::detect) asks every format to score the sample and keeps
/// the best one.
pub struct FormatRegistry {
    formats: Vec<Box<dyn FormatProbe>>,
}

impl FormatRegistry {
    /// Registry with no formats.
    pub fn new() -> Self {
        Self {
            formats: Vec::new(),
        }
    }

    /// Registry with every format this crate implements.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(Avs3Format));
        registry
    }

    pub fn register(&mut self, format: Box<dyn FormatProbe>) {
        self.formats.push(format);
    }

    pub fn formats(&self) -> impl Iterator<Item = &dyn FormatProbe> {
        self.formats.iter().map(|f| f.as_ref() as &dyn FormatProbe)
    }

    /// Look up a format by short name.
    pub fn find(&self, name: &str) -> Option<&dyn FormatProbe> {
        self.formats().find(|f| f.name() == name)
    }

    /// Best scoring format for the sample; the first registered wins ties.
    pub fn detect(&self, data: &ProbeData<'_>) -> Option<(&dyn FormatProbe, u32)> {
        let mut best: Option<(&dyn FormatProbe, u32)> = None;

        for format in self.formats() {
            let score = format.probe(data);
            if score == 0 {
                continue;
            }

            tracing::debug!(
                format = format.name(),
                score,
                filename = data.filename,
                "format matched"
            );

            if best.map_or(true, |(_, top)| score > top) {
                best = Some((format, score));
            }
        }

        best
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.formats().map(|format| format.name()))
            .finish()
    }
}
