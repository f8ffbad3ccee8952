//! Decoding of JSON-style `\uXXXX` escapes left in page markup.

use once_cell::sync::Lazy;
use regex::Regex;

static ESCAPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\u([0-9A-Fa-f]{4})").unwrap());

/// Replaces every `\uXXXX` escape with the character it encodes.
///
/// UTF-16 surrogate pairs written as two adjacent escapes are joined into one code point.
/// A lone surrogate cannot be represented in a Rust string and is left as literal text.
/// Text without escapes is returned unchanged, so decoding is idempotent on decoded text.
pub fn decode_unicode_escapes(s: &str) -> String {
    if !s.contains("\\u") {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut last = 0usize;
    // High surrogate waiting for its low half: (unit, literal start, literal end).
    let mut pending: Option<(u32, usize, usize)> = None;

    for caps in ESCAPE_RE.captures_iter(s) {
        let Some(m) = caps.get(0) else { continue };
        let unit = u32::from_str_radix(&caps[1], 16).unwrap_or(0);

        if let Some((high, start, end)) = pending.take() {
            if end == m.start() && is_low_surrogate(unit) {
                let cp = 0x10000 + ((high - 0xD800) << 10) + (unit - 0xDC00);
                if let Some(c) = char::from_u32(cp) {
                    out.push(c);
                    last = m.end();
                    continue;
                }
            }
            out.push_str(&s[start..end]);
            last = end;
        }

        out.push_str(&s[last..m.start()]);
        last = m.start();
        if is_high_surrogate(unit) {
            pending = Some((unit, m.start(), m.end()));
            last = m.end();
            continue;
        }
        match char::from_u32(unit) {
            Some(c) => out.push(c),
            None => out.push_str(m.as_str()),
        }
        last = m.end();
    }

    if let Some((_, start, end)) = pending {
        out.push_str(&s[start..end]);
    }
    out.push_str(&s[last..]);
    out
}

fn is_high_surrogate(u: u32) -> bool {
    (0xD800..=0xDBFF).contains(&u)
}

fn is_low_surrogate(u: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&u)
}
