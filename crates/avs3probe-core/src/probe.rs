//! Content based detection of raw AVS3 video streams
//!
//! The classifier walks every start code in a sample buffer and rejects it
//! as soon as something a real AVS3 stream cannot contain shows up:
//!
//! - slice codes going backwards within a picture,
//! - a sequence header whose profile is not Main or Main10,
//! - the undefined start code or anything above the video edit code.
//!
//! A sample is accepted only if it also holds at least one sequence header
//! and one picture header, and the file name carries the `.avs3` extension.

use std::fmt;

use crate::ext::matches_extension;
use crate::startcode::{find_start_code, ScanState};
use crate::unit::{Profile, StartCode, SEQUENCE_HEADER_CODE};

/// Score for "this is certainly the format".
pub const PROBE_SCORE_MAX: u32 = 100;
/// Score a format gets from its file extension alone.
pub const PROBE_SCORE_EXTENSION: u32 = 50;
/// Extension raw AVS3 streams are expected to carry.
pub const AVS3_EXTENSION: &str = "avs3";

/// A sample of the input handed to format probes
#[derive(Debug, Clone, Copy)]
pub struct ProbeData<'a> {
    /// File name or URL of the input
    pub filename: &'a str,
    /// Leading bytes of the input
    pub buf: &'a [u8],
}

impl<'a> ProbeData<'a> {
    pub fn new(filename: &'a str, buf: &'a [u8]) -> Self {
        Self { filename, buf }
    }
}

/// Why a sample was ruled out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum Rejection {
    /// A slice code lower than the previous one in the same picture
    OutOfOrder {
        offset: usize,
        code: u8,
        watermark: u8,
    },
    /// Sequence header with a profile other than Main/Main10, or with no
    /// profile byte left in the sample
    UnsupportedProfile { offset: usize, profile: Option<u8> },
    /// Undefined or out of range start code
    InvalidStartCode { offset: usize, code: u8 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::OutOfOrder {
                offset,
                code,
                watermark,
            } => write!(
                f,
                "slice code 0x{:02X} after 0x{:02X} at offset {}",
                code, watermark, offset
            ),
            Rejection::UnsupportedProfile {
                offset,
                profile: Some(id),
            } => write!(f, "unsupported profile 0x{:02X} at offset {}", id, offset),
            Rejection::UnsupportedProfile {
                offset,
                profile: None,
            } => write!(f, "truncated sequence header at offset {}", offset),
            Rejection::InvalidStartCode { offset, code } => {
                write!(f, "invalid start code 0x{:02X} at offset {}", code, offset)
            }
        }
    }
}

/// Outcome of walking the start codes of a sample
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Classification {
    /// Sequence headers seen before the walk ended
    pub sequence_headers: u32,
    /// Intra and inter picture headers seen before the walk ended
    pub pictures: u32,
    /// Profile of the first sequence header
    pub profile: Option<Profile>,
    /// Set when the walk stopped early
    pub rejection: Option<Rejection>,
}

impl Classification {
    /// Structure alone says this is an AVS3 stream.
    pub fn is_avs3(&self) -> bool {
        self.rejection.is_none() && self.sequence_headers > 0 && self.pictures > 0
    }

    fn reject(mut self, rejection: Rejection) -> Self {
        tracing::debug!(%rejection, "sample rejected");
        self.rejection = Some(rejection);
        self
    }
}

/// Walk every start code in `buf` and check it against AVS3 structure.
///
/// Stops at the first violation; the counters then only cover the units
/// before it.
pub fn classify(buf: &[u8]) -> Classification {
    let mut result = Classification::default();
    let mut state = ScanState::new();
    let mut watermark = 0u8;
    let mut pos = 0;

    while pos < buf.len() {
        pos = find_start_code(buf, pos, &mut state);
        if !state.is_start_code() {
            continue;
        }

        let value = state.code();
        let code = StartCode::from(value);
        let offset = pos - 4;
        tracing::trace!(offset, %code, "start code");

        if value < SEQUENCE_HEADER_CODE {
            if value < watermark {
                return result.reject(Rejection::OutOfOrder {
                    offset,
                    code: value,
                    watermark,
                });
            }
            watermark = value;
        } else {
            watermark = 0;
        }

        if code == StartCode::SequenceHeader {
            result.sequence_headers += 1;
            let id = buf.get(pos).copied();
            match id.and_then(Profile::from_id) {
                Some(profile) => {
                    result.profile.get_or_insert(profile);
                }
                None => {
                    return result.reject(Rejection::UnsupportedProfile {
                        offset,
                        profile: id,
                    })
                }
            }
        } else if code.is_picture() {
            result.pictures += 1;
        } else if code.is_invalid() {
            return result.reject(Rejection::InvalidStartCode {
                offset,
                code: value,
            });
        }
    }

    result
}

/// Score `data` as a raw AVS3 stream: [`PROBE_SCORE_MAX`] or `0`.
pub fn probe(data: &ProbeData<'_>) -> u32 {
    let classification = classify(data.buf);

    if classification.is_avs3() && matches_extension(data.filename, AVS3_EXTENSION) {
        PROBE_SCORE_MAX
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a stream from (start code value, payload) pairs.
    fn stream(units: &[(u8, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        for (code, payload) in units {
            out.extend_from_slice(&[0x00, 0x00, 0x01, *code]);
            out.extend_from_slice(payload);
        }
        out
    }

    const MAIN: &[u8] = &[0x20, 0x40, 0x8F];
    const MAIN10: &[u8] = &[0x22, 0x00];
    const UNKNOWN_PROFILE: &[u8] = &[0x30, 0x40];
    const BODY: &[u8] = &[0x7E, 0x55];
    const EMPTY: &[u8] = &[];

    #[test]
    fn test_minimal_stream_accepted() {
        let buf = stream(&[(0xB0, MAIN), (0xB3, BODY), (0x00, BODY)]);
        let c = classify(&buf);
        assert_eq!(c.sequence_headers, 1);
        assert_eq!(c.pictures, 1);
        assert_eq!(c.profile, Some(Profile::BaselineMain));
        assert!(c.is_avs3());
        assert_eq!(probe(&ProbeData::new("a.avs3", &buf)), PROBE_SCORE_MAX);
    }

    #[test]
    fn test_no_start_codes_scores_zero() {
        let buf = vec![0x42u8; 64];
        let c = classify(&buf);
        assert_eq!(c, Classification::default());
        assert_eq!(probe(&ProbeData::new("a.avs3", &buf)), 0);
        assert_eq!(probe(&ProbeData::new("a.avs3", &[])), 0);
    }

    #[test]
    fn test_out_of_order_slices_rejected() {
        let buf = stream(&[
            (0xB0, MAIN),
            (0xB3, BODY),
            (0x02, BODY),
            (0x05, BODY),
            (0x03, BODY),
        ]);
        let c = classify(&buf);
        assert!(matches!(
            c.rejection,
            Some(Rejection::OutOfOrder {
                code: 0x03,
                watermark: 0x05,
                ..
            })
        ));
        assert_eq!(probe(&ProbeData::new("a.avs3", &buf)), 0);
    }

    #[test]
    fn test_header_resets_watermark() {
        let buf = stream(&[
            (0xB0, MAIN),
            (0xB3, BODY),
            (0x02, BODY),
            (0x05, BODY),
            (0xB0, MAIN),
            (0xB6, BODY),
            (0x03, BODY),
            (0x03, BODY),
        ]);
        let c = classify(&buf);
        assert_eq!(c.rejection, None);
        assert_eq!(c.sequence_headers, 2);
        assert_eq!(c.pictures, 2);
        assert_eq!(probe(&ProbeData::new("a.avs3", &buf)), PROBE_SCORE_MAX);
    }

    #[test]
    fn test_picture_header_resets_watermark() {
        let buf = stream(&[(0xB0, MAIN), (0xB3, BODY), (0x09, BODY), (0xB6, BODY), (0x01, BODY)]);
        assert!(classify(&buf).is_avs3());
    }

    #[test]
    fn test_unsupported_profile_rejected() {
        let buf = stream(&[(0xB0, UNKNOWN_PROFILE), (0xB3, BODY)]);
        let c = classify(&buf);
        assert_eq!(
            c.rejection,
            Some(Rejection::UnsupportedProfile {
                offset: 0,
                profile: Some(0x30),
            })
        );
        assert_eq!(c.pictures, 0);
        assert_eq!(probe(&ProbeData::new("a.avs3", &buf)), 0);
    }

    #[test]
    fn test_main10_profile_accepted() {
        let buf = stream(&[(0xB0, MAIN10), (0xB3, BODY)]);
        let c = classify(&buf);
        assert_eq!(c.profile, Some(Profile::BaselineMain10));
        assert!(c.is_avs3());
    }

    #[test]
    fn test_truncated_sequence_header_rejected() {
        let buf = stream(&[(0xB3, BODY), (0xB0, EMPTY)]);
        assert_eq!(
            classify(&buf).rejection,
            Some(Rejection::UnsupportedProfile {
                offset: 6,
                profile: None,
            })
        );
    }

    #[test]
    fn test_header_without_pictures_scores_zero() {
        let buf = stream(&[(0xB0, MAIN), (0xB5, BODY), (0xB2, BODY)]);
        let c = classify(&buf);
        assert_eq!(c.rejection, None);
        assert_eq!(c.pictures, 0);
        assert_eq!(probe(&ProbeData::new("a.avs3", &buf)), 0);
    }

    #[test]
    fn test_pictures_without_header_scores_zero() {
        let buf = stream(&[(0xB3, BODY), (0x00, BODY), (0xB6, BODY)]);
        let c = classify(&buf);
        assert_eq!(c.sequence_headers, 0);
        assert_eq!(c.pictures, 2);
        assert_eq!(probe(&ProbeData::new("a.avs3", &buf)), 0);
    }

    #[test]
    fn test_extension_gate() {
        let buf = stream(&[(0xB0, MAIN), (0xB3, BODY)]);
        assert_eq!(probe(&ProbeData::new("a.avs3", &buf)), PROBE_SCORE_MAX);
        assert_eq!(probe(&ProbeData::new("a.AVS3", &buf)), PROBE_SCORE_MAX);
        assert_eq!(probe(&ProbeData::new("a.avs", &buf)), 0);
        assert_eq!(probe(&ProbeData::new("a", &buf)), 0);
    }

    #[test]
    fn test_undefined_start_code_rejected() {
        let buf = stream(&[(0xB0, MAIN), (0xB3, BODY), (0xB4, BODY)]);
        assert_eq!(
            classify(&buf).rejection,
            Some(Rejection::InvalidStartCode {
                offset: 13,
                code: 0xB4,
            })
        );
        assert_eq!(probe(&ProbeData::new("a.avs3", &buf)), 0);
    }

    #[test]
    fn test_out_of_range_start_code_rejected() {
        for code in [0xB8, 0xBA, 0xE0, 0xFF] {
            let buf = stream(&[(code, BODY), (0xB0, MAIN), (0xB3, BODY)]);
            let c = classify(&buf);
            assert_eq!(
                c.rejection,
                Some(Rejection::InvalidStartCode { offset: 0, code })
            );
            assert_eq!(c.sequence_headers, 0);
        }
    }

    #[test]
    fn test_video_edit_and_extension_allowed() {
        let buf = stream(&[(0xB0, MAIN), (0xB5, BODY), (0xB7, BODY), (0xB6, BODY), (0xB1, EMPTY)]);
        assert!(classify(&buf).is_avs3());
    }

    #[test]
    fn test_rejection_display() {
        let r = Rejection::UnsupportedProfile {
            offset: 12,
            profile: Some(0x30),
        };
        assert_eq!(r.to_string(), "unsupported profile 0x30 at offset 12");
    }
}
