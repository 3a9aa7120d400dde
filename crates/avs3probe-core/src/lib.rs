//! # avs3probe-core
//!
//! Start code scanning and content based detection of raw AVS3-P2 /
//! IEEE 1857.10 video elementary streams.
//!
//! ## Features
//!
//! - Resumable start code scanner that finds `00 00 01 xx` markers even
//!   when they straddle buffer boundaries
//! - Stream classifier scoring a sample buffer as AVS3 or not
//! - Format registry and a fixed-size packet raw video demuxer
//! - No allocation, I/O or shared state in the scanner and classifier
//!
//! ## Example
//!
//! ```
//! use avs3probe_core::{probe, ProbeData, PROBE_SCORE_MAX};
//!
//! let sample = [
//!     0x00, 0x00, 0x01, 0xB0, 0x20, // sequence header, Main profile
//!     0x00, 0x00, 0x01, 0xB3, 0x00, // intra picture
//! ];
//!
//! assert_eq!(probe(&ProbeData::new("clip.avs3", &sample)), PROBE_SCORE_MAX);
//! assert_eq!(probe(&ProbeData::new("clip.264", &sample)), 0);
//! ```

pub mod demux;
pub mod error;
pub mod ext;
pub mod format;
pub mod probe;
pub mod startcode;
pub mod unit;

pub use demux::{DemuxerOptions, Packet, Rational, RawDemuxer, StreamInfo};
pub use error::{Error, Result};
pub use ext::matches_extension;
pub use format::{Avs3Format, CodecId, FormatProbe, FormatRegistry};
pub use probe::{
    classify, probe, Classification, ProbeData, Rejection, PROBE_SCORE_EXTENSION,
    PROBE_SCORE_MAX,
};
pub use startcode::{find_start_code, ScanState, StartCodes, Unit};
pub use unit::{Profile, StartCode};
