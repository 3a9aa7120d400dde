//! Start code scanning
//!
//! AVS3 elementary streams delimit every syntax unit with the three byte
//! marker `00 00 01` followed by a one byte start code value. The scanner
//! below keeps the last four bytes it has seen in a [`ScanState`] so a
//! marker split across two separately supplied buffers is still found.

use crate::unit::StartCode;

/// Rolling window over the last four bytes read by [`find_start_code`].
///
/// A fresh state holds all ones, which can never look like a start code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanState(u32);

impl ScanState {
    /// State for the beginning of a scan pass.
    pub const fn new() -> Self {
        Self(u32::MAX)
    }

    /// Raw accumulator value, most recent byte in the low eight bits.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Whether the window ends with a complete start code (marker + value).
    pub const fn is_start_code(self) -> bool {
        self.0 & 0xFFFF_FF00 == 0x100
    }

    /// The most recent byte; the start code value when
    /// [`is_start_code`](Self::is_start_code) holds.
    pub const fn code(self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

impl Default for ScanState {
    fn default() -> Self {
        Self::new()
    }
}

/// Find the next start code in `buf[cursor..]`.
///
/// Returns the index just past the start code value byte, or `buf.len()`
/// if the buffer ran out first. Check [`ScanState::is_start_code`] after
/// the call to tell the two apart. Calling again from the returned index
/// with the same state continues the scan, also across buffers.
///
/// # Panics
///
/// Panics if `cursor > buf.len()`.
pub fn find_start_code(buf: &[u8], cursor: usize, state: &mut ScanState) -> usize {
    let end = buf.len();
    assert!(cursor <= end, "scan cursor {cursor} past end {end}");

    let mut pos = cursor;
    if pos == end {
        return end;
    }

    // Up to three bytes go through the accumulator so a marker started in
    // a previous buffer is completed here.
    for _ in 0..3 {
        let shifted = state.0 << 8;
        state.0 = shifted | u32::from(buf[pos]);
        pos += 1;
        if shifted == 0x100 || pos == end {
            return pos;
        }
    }

    // pos - 3 >= cursor from here on.
    while pos < end {
        if buf[pos - 1] > 1 {
            pos += 3;
        } else if buf[pos - 2] != 0 {
            pos += 2;
        } else if buf[pos - 3] != 0 || buf[pos - 1] != 1 {
            pos += 1;
        } else {
            pos += 1;
            break;
        }
    }

    let window = pos.min(end) - 4;
    state.0 = u32::from_be_bytes([
        buf[window],
        buf[window + 1],
        buf[window + 2],
        buf[window + 3],
    ]);

    window + 4
}

/// A start code located by [`StartCodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Unit {
    /// Start code value
    pub code: StartCode,
    /// Index of the first `00` of the marker
    pub offset: usize,
    /// Index of the first byte after the start code value
    pub payload: usize,
}

/// Iterator over every start code in a buffer.
///
/// ```
/// use avs3probe_core::startcode::StartCodes;
/// use avs3probe_core::StartCode;
///
/// let data = [0x00, 0x00, 0x01, 0xB0, 0x20, 0x00, 0x00, 0x01, 0xB3];
/// let codes: Vec<_> = StartCodes::new(&data).map(|u| u.code).collect();
/// assert_eq!(codes, vec![StartCode::SequenceHeader, StartCode::IntraPicture]);
/// ```
#[derive(Debug, Clone)]
pub struct StartCodes<'a> {
    buf: &'a [u8],
    pos: usize,
    state: ScanState,
}

impl<'a> StartCodes<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            state: ScanState::new(),
        }
    }
}

impl Iterator for StartCodes<'_> {
    type Item = Unit;

    fn next(&mut self) -> Option<Unit> {
        while self.pos < self.buf.len() {
            self.pos = find_start_code(self.buf, self.pos, &mut self.state);
            if self.state.is_start_code() {
                return Some(Unit {
                    code: StartCode::from(self.state.code()),
                    offset: self.pos - 4,
                    payload: self.pos,
                });
            }
        }
        None
    }
}
