//! Filename sanitization.

/// Characters that are never written into a filename
pub const UNSAFE_FILENAME_CHARS: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Remove path separators and other characters that are unsafe in filenames.
///
/// Characters are deleted, not replaced; everything else passes through unchanged.
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|ch| !UNSAFE_FILENAME_CHARS.contains(ch))
        .collect()
}
