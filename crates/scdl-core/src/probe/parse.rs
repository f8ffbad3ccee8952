//! Parse HTTP response header lines into HeadResult.

use super::HeadResult;

/// Parse collected header lines into HeadResult.
pub(crate) fn parse_headers(lines: &[String]) -> HeadResult {
    let mut content_length = None;

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.parse::<u64>() {
                    content_length = Some(n);
                }
            }
        }
    }

    HeadResult { content_length }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_headers_content_length() {
        let lines = [
            "HTTP/1.1 200 OK".to_string(),
            "Content-Length: 12345".to_string(),
            "Content-Type: audio/mpeg".to_string(),
        ];
        let r = parse_headers(&lines);
        assert_eq!(r.content_length, Some(12345));
    }

    #[test]
    fn parse_headers_case_insensitive() {
        let lines = ["content-length:  77 ".to_string()];
        assert_eq!(parse_headers(&lines).content_length, Some(77));
    }

    #[test]
    fn parse_headers_missing_or_garbage_length() {
        let lines = ["Content-Length: lots".to_string(), "Server: test".to_string()];
        let r = parse_headers(&lines);
        assert_eq!(r.content_length, None);
    }
}
