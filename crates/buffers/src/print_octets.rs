//! Debug utility for printing octets as hex strings.

/// Formats a byte slice as a hex string for debugging.
///
/// At most `max` bytes are shown; the rest are summarised by count.
///
/// # Example
///
/// ```
/// use serialysis_buffers::print_octets;
///
/// assert_eq!(print_octets(&[0xac, 0xed, 0x00, 0x05], 16), "ac ed 00 05");
/// assert_eq!(print_octets(&[], 16), "");
/// ```
pub fn print_octets(octets: &[u8], max: usize) -> String {
    let mut result = String::with_capacity(octets.len().min(max) * 3);
    for (i, byte) in octets.iter().take(max).enumerate() {
        if i > 0 {
            result.push(' ');
        }
        result.push_str(&format!("{byte:02x}"));
    }
    if octets.len() > max {
        result.push_str(&format!("... ({} more)", octets.len() - max));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_octets_single() {
        assert_eq!(print_octets(&[0x70], 16), "70");
    }

    #[test]
    fn test_print_octets_truncated() {
        let data: Vec<u8> = (0..20).collect();
        let result = print_octets(&data, 10);
        assert!(result.starts_with("00 01 02"));
        assert!(result.ends_with("... (10 more)"));
    }

    #[test]
    fn test_print_octets_zero_max() {
        assert_eq!(print_octets(&[1, 2], 0), "... (2 more)");
    }
}
