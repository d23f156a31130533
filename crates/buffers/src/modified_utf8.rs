//! Modified UTF-8, the string encoding of `java.io.DataInput`.
//!
//! Differs from standard UTF-8 in two ways: U+0000 is written as the two
//! bytes `C0 80`, and characters outside the BMP are written as a UTF-16
//! surrogate pair, each half taking three bytes.

use crate::BufferError;

/// Decodes modified UTF-8 into a `String`.
///
/// Unpaired surrogates, which the encoding permits, become U+FFFD.
///
/// # Example
///
/// ```
/// use serialysis_buffers::decode_modified_utf8;
///
/// assert_eq!(decode_modified_utf8(b"abc").unwrap(), "abc");
/// assert_eq!(decode_modified_utf8(&[0xc0, 0x80]).unwrap(), "\0");
/// ```
pub fn decode_modified_utf8(bytes: &[u8]) -> Result<String, BufferError> {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            units.push(b as u16);
            i += 1;
        } else if b >> 5 == 0b110 {
            let b2 = continuation(bytes, i + 1)?;
            units.push((((b & 0x1f) as u16) << 6) | b2);
            i += 2;
        } else if b >> 4 == 0b1110 {
            let b2 = continuation(bytes, i + 1)?;
            let b3 = continuation(bytes, i + 2)?;
            units.push((((b & 0x0f) as u16) << 12) | (b2 << 6) | b3);
            i += 3;
        } else {
            return Err(BufferError::InvalidModifiedUtf8);
        }
    }
    Ok(char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}

fn continuation(bytes: &[u8], i: usize) -> Result<u16, BufferError> {
    match bytes.get(i) {
        Some(&b) if b & 0xc0 == 0x80 => Ok((b & 0x3f) as u16),
        _ => Err(BufferError::InvalidModifiedUtf8),
    }
}

/// Number of bytes `s` takes in modified UTF-8.
pub fn modified_utf8_len(s: &str) -> usize {
    s.encode_utf16()
        .map(|u| match u {
            0x0001..=0x007f => 1,
            0x0000 | 0x0080..=0x07ff => 2,
            _ => 3,
        })
        .sum()
}

/// Encodes `s` as modified UTF-8.
///
/// # Example
///
/// ```
/// use serialysis_buffers::encode_modified_utf8;
///
/// assert_eq!(encode_modified_utf8("a\0"), vec![b'a', 0xc0, 0x80]);
/// ```
pub fn encode_modified_utf8(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(modified_utf8_len(s));
    for u in s.encode_utf16() {
        match u {
            0x0001..=0x007f => out.push(u as u8),
            0x0000 | 0x0080..=0x07ff => {
                out.push(0xc0 | (u >> 6) as u8);
                out.push(0x80 | (u & 0x3f) as u8);
            }
            _ => {
                out.push(0xe0 | (u >> 12) as u8);
                out.push(0x80 | ((u >> 6) & 0x3f) as u8);
                out.push(0x80 | (u & 0x3f) as u8);
            }
        }
    }
    out
}
