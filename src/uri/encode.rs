//! URL encoding and decoding.
//!
//! Kept as standalone free functions rather than folded into the request type.

/// Returns true for bytes in the unreserved set: `ALPHA / DIGIT / '-' / '_' / '.' / '~'`.
fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~')
}

/// Percent-encodes every byte outside the unreserved set as `%HH` with upper-case hex.
pub fn url_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.as_bytes() {
        if is_unreserved(*byte) {
            out.push(*byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Decodes `%HH` escapes. A trailing `%` with fewer than two following hex digits is
/// dropped silently rather than treated as an error.
pub fn url_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let remaining = bytes.len() - (i + 1);
            if remaining < 2 {
                // Truncated: the string ends before a full two-digit escape could
                // appear. Drop the '%' along with whatever partial digits follow.
                i += 1 + remaining;
                continue;
            }
            match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                (Some(hi), Some(lo)) => {
                    out.push(hi * 16 + lo);
                    i += 3;
                }
                // Malformed but not truncated: drop only the '%' and keep scanning.
                _ => i += 1,
            }
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
