//! Portable filename sanitization.

/// Characters rejected by at least one mainstream filesystem (Windows is the strictest).
const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Removes characters that are illegal in file names.
///
/// - Drops `< > : " / \ | ? *` and control characters (they are removed, not replaced)
/// - Trims leading/trailing spaces and trailing dots
/// - Limits length to 255 bytes (NAME_MAX)
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !ILLEGAL_CHARS.contains(c) && !c.is_control())
        .collect();

    let trimmed = cleaned.trim_start_matches(' ');
    truncate_name(trimmed, NAME_MAX).to_string()
}

/// Longest file name most filesystems accept, in bytes.
pub const NAME_MAX: usize = 255;

/// Cuts `name` to at most `max` bytes on a char boundary, then drops trailing spaces and dots.
pub(crate) fn truncate_name(name: &str, max: usize) -> &str {
    let mut take = name.len().min(max);
    while take > 0 && !name.is_char_boundary(take) {
        take -= 1;
    }
    name[..take].trim_end_matches([' ', '.'])
}

/// True if `name` contains no character that [`sanitize_file_name`] would remove.
pub fn is_legal_file_name(name: &str) -> bool {
    !name
        .chars()
        .any(|c| ILLEGAL_CHARS.contains(&c) || c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_path_separators() {
        assert_eq!(sanitize_file_name("AC/DC - Back\\In Black"), "ACDC - BackIn Black");
    }

    #[test]
    fn removes_windows_reserved_punctuation() {
        assert_eq!(
            sanitize_file_name("What? <Live> \"Remix\": part|2*"),
            "What Live Remix part2"
        );
    }

    #[test]
    fn removes_control_chars() {
        assert_eq!(sanitize_file_name("tab\there\x00nul"), "tabherenul");
    }

    #[test]
    fn trims_edges() {
        assert_eq!(sanitize_file_name("  intro...  "), "intro");
    }

    #[test]
    fn keeps_unicode() {
        assert_eq!(sanitize_file_name("Café del Mar"), "Café del Mar");
        assert!(is_legal_file_name("Café del Mar"));
    }

    #[test]
    fn caps_length_on_char_boundary() {
        let long = "é".repeat(200);
        let out = sanitize_file_name(&long);
        assert!(out.len() <= 255);
        assert!(out.chars().all(|c| c == 'é'));
    }

    #[test]
    fn truncation_retrims_trailing_dots_and_spaces() {
        assert_eq!(truncate_name("abc. .def", 5), "abc");
        assert_eq!(truncate_name("abc", 10), "abc");
        assert_eq!(truncate_name("ééé", 3), "é");
    }
}
