//! AVS3 start code values and profile ids

use std::fmt;

/// Start code value of a sequence header.
pub const SEQUENCE_HEADER_CODE: u8 = 0xB0;
/// Highest valid start code value (video edit).
pub const VIDEO_EDIT_CODE: u8 = 0xB7;

/// AVS3 start code values (the byte after `00 00 01`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum StartCode {
    /// Slice of the current picture; the value is the slice position
    Slice(u8),
    /// Sequence header
    SequenceHeader,
    /// End of sequence
    SequenceEnd,
    /// User data
    UserData,
    /// Intra coded picture header
    IntraPicture,
    /// Reserved, never valid in a stream
    Undefined,
    /// Extension data
    Extension,
    /// Inter coded picture header
    InterPicture,
    /// Video edit marker
    VideoEdit,
    /// Values above the video edit code
    Reserved(u8),
}

impl From<u8> for StartCode {
    fn from(value: u8) -> Self {
        match value {
            0x00..=0xAF => StartCode::Slice(value),
            0xB0 => StartCode::SequenceHeader,
            0xB1 => StartCode::SequenceEnd,
            0xB2 => StartCode::UserData,
            0xB3 => StartCode::IntraPicture,
            0xB4 => StartCode::Undefined,
            0xB5 => StartCode::Extension,
            0xB6 => StartCode::InterPicture,
            0xB7 => StartCode::VideoEdit,
            v => StartCode::Reserved(v),
        }
    }
}

impl From<StartCode> for u8 {
    fn from(code: StartCode) -> Self {
        match code {
            StartCode::Slice(v) | StartCode::Reserved(v) => v,
            StartCode::SequenceHeader => 0xB0,
            StartCode::SequenceEnd => 0xB1,
            StartCode::UserData => 0xB2,
            StartCode::IntraPicture => 0xB3,
            StartCode::Undefined => 0xB4,
            StartCode::Extension => 0xB5,
            StartCode::InterPicture => 0xB6,
            StartCode::VideoEdit => 0xB7,
        }
    }
}

impl StartCode {
    /// Slice codes sit below the sequence header value.
    pub fn is_slice(self) -> bool {
        matches!(self, StartCode::Slice(_))
    }

    /// Intra or inter picture header.
    pub fn is_picture(self) -> bool {
        matches!(self, StartCode::IntraPicture | StartCode::InterPicture)
    }

    /// Values that can never appear in a valid stream.
    pub fn is_invalid(self) -> bool {
        matches!(self, StartCode::Undefined | StartCode::Reserved(_))
    }

    /// Short human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            StartCode::Slice(_) => "slice",
            StartCode::SequenceHeader => "sequence header",
            StartCode::SequenceEnd => "sequence end",
            StartCode::UserData => "user data",
            StartCode::IntraPicture => "intra picture",
            StartCode::Undefined => "undefined",
            StartCode::Extension => "extension",
            StartCode::InterPicture => "inter picture",
            StartCode::VideoEdit => "video edit",
            StartCode::Reserved(_) => "reserved",
        }
    }
}

impl fmt::Display for StartCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartCode::Slice(pos) => write!(f, "slice {}", pos),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Profiles accepted in a sequence header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[repr(u8)]
pub enum Profile {
    /// Baseline Main (8 bit)
    BaselineMain = 0x20,
    /// Baseline Main10 (10 bit)
    BaselineMain10 = 0x22,
}

impl Profile {
    /// Map a `profile_id` byte, `None` for anything not accepted.
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0x20 => Some(Profile::BaselineMain),
            0x22 => Some(Profile::BaselineMain10),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Luma sample bit depth the profile is limited to.
    pub fn bit_depth(self) -> u8 {
        match self {
            Profile::BaselineMain => 8,
            Profile::BaselineMain10 => 10,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::BaselineMain => write!(f, "Main"),
            Profile::BaselineMain10 => write!(f, "Main10"),
        }
    }
}
