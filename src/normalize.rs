use unicode_normalization::UnicodeNormalization;

/// Prepare raw input for line classification: strip a leading BOM, apply
/// NFKC, fold CRLF/CR line endings to LF, and trim trailing whitespace
/// from each line. Every parser runs on the output of this pass.
pub fn clean_lines(text: &str) -> Vec<String> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let text: String = text.nfkc().collect();
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    text.split('\n')
        .map(|l| l.trim_end().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crlf_folding() {
        assert_eq!(clean_lines("a\r\nb"), vec!["a", "b"]);
    }

    #[test]
    fn test_bare_cr_folding() {
        assert_eq!(clean_lines("a\rb"), vec!["a", "b"]);
    }

    #[test]
    fn test_bom_stripped() {
        assert_eq!(clean_lines("\u{FEFF}$ HP: 100"), vec!["$ HP: 100"]);
    }

    #[test]
    fn test_trailing_whitespace_trimmed() {
        assert_eq!(clean_lines("INT. BAR   \ntext\t"), vec!["INT. BAR", "text"]);
    }

    #[test]
    fn test_nfkc_applied() {
        // fi ligature folds to "fi"
        assert_eq!(clean_lines("\u{FB01}ght"), vec!["fight"]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean_lines(""), vec![""]);
    }
}
