//! File extension matching

/// Check whether `filename` ends in one of the comma separated `extensions`.
///
/// The extension is whatever follows the last `.` in the whole string,
/// and the comparison ignores ASCII case.
///
/// ```
/// use avs3probe_core::matches_extension;
///
/// assert!(matches_extension("clip.AVS3", "avs3"));
/// assert!(!matches_extension("clip.mkv", "avs3"));
/// ```
pub fn matches_extension(filename: &str, extensions: &str) -> bool {
    let Some((_, ext)) = filename.rsplit_once('.') else {
        return false;
    };

    extensions
        .split(',')
        .any(|candidate| !candidate.is_empty() && candidate.eq_ignore_ascii_case(ext))
}
