//! Printable renderings of raw bytes for the debug dump.

/// Render `c` the way it would be written inside a C character literal.
///
/// Printable ASCII other than `'` and `\` is returned unchanged, the usual
/// control characters get their short escapes and anything else becomes a
/// three digit hex (`\x001`) or octal (`\001`) escape.
pub fn escape_byte(c: u8, prefer_hex: bool) -> String {
    match c {
        b'\\' => "\\\\".to_string(),
        b'\'' => "\\'".to_string(),
        b' '..=b'~' => (c as char).to_string(),
        b'\n' => "\\n".to_string(),
        b'\t' => "\\t".to_string(),
        b'\r' => "\\r".to_string(),
        0x08 => "\\b".to_string(),
        0x0c => "\\f".to_string(),
        _ if prefer_hex => format!("\\x{:03x}", c),
        _ => format!("\\{:03o}", c),
    }
}

/// Escape every byte of `text` and keep at most `max_len` output characters.
///
/// An escape sequence that does not fit is cut short rather than dropped.
pub fn escape_str(text: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(max_len);
    for byte in text.bytes() {
        for ch in escape_byte(byte, true).chars() {
            if out.len() >= max_len {
                return out;
            }
            out.push(ch);
        }
    }
    out
}
