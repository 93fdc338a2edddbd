//! Binary-content sniffing.

/// Heuristic binary detection over the first 8 KiB of content.
///
/// Any NUL byte marks the content binary; otherwise a high share of
/// non-text control bytes does.
pub fn is_binary(content: &[u8]) -> bool {
    let sample = &content[..content.len().min(8192)];

    if sample.contains(&0) {
        return true;
    }

    let non_text = sample
        .iter()
        .filter(|&&b| b < 0x20 && b != b'\n' && b != b'\r' && b != b'\t')
        .count();

    non_text * 8 > sample.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_not_binary() {
        assert!(!is_binary(b"hello world\n"));
        assert!(!is_binary(b"line one\r\n\tline two\n"));
        assert!(!is_binary("déjà vu".as_bytes()));
        assert!(!is_binary(b""));
    }

    #[test]
    fn test_nul_byte_means_binary() {
        assert!(is_binary(b"\x00"));
        assert!(is_binary(b"mostly text but\x00one nul"));
    }

    #[test]
    fn test_control_heavy_content_is_binary() {
        let junk: Vec<u8> = (0..256).map(|i| (i % 32) as u8 + 1).collect();
        assert!(is_binary(&junk));
    }

    #[test]
    fn test_nul_past_sample_window_is_not_seen() {
        let mut content = vec![b'a'; 9000];
        content.push(0);
        assert!(!is_binary(&content));
    }
}
