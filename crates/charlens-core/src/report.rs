//! Plain-text rendering of a [`ConversionResult`], as shown in the raw view
//! and written by "save results".

use crate::character::CharacterEncodingResult;
use crate::convert::ConversionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Print bytes as `E4 B8 AD` instead of `E4B8AD`.
    pub spaced_hex: bool,
    /// Include per-character failures, not only successes.
    pub show_failures: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { spaced_hex: false, show_failures: true }
    }
}

fn hex_of(result: &CharacterEncodingResult, opts: &ReportOptions) -> Option<String> {
    let bytes = result.encoded()?;
    if !opts.spaced_hex {
        return Some(bytes.hex_bytes.clone());
    }
    let mut out = String::with_capacity(bytes.hex_bytes.len() * 3 / 2);
    for (i, pair) in bytes.hex_bytes.as_bytes().chunks(2).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(std::str::from_utf8(pair).unwrap_or("??"));
    }
    Some(out)
}

pub fn render(result: &ConversionResult) -> String {
    render_with(result, &ReportOptions::default())
}

pub fn render_with(result: &ConversionResult, opts: &ReportOptions) -> String {
    let stats = &result.stats;
    let mut out = String::new();
    out.push_str(&format!("Text: {:?}\n", result.original_text));
    out.push_str(&format!("Characters: {}\n", stats.codepoint_length));
    out.push_str(&format!("UTF-8 bytes: {}\n", stats.utf8_byte_length));
    out.push_str(&format!("Unique characters: {}\n", stats.unique_codepoint_count));
    out.push_str(&format!("Lines: {}\n", stats.line_count));

    out.push_str("\n=== Overall ===\n");
    for (id, encoded) in &result.overall_by_encoding {
        let label = id.to_uppercase();
        match (hex_of(encoded, opts), encoded.encoded()) {
            (Some(hex), Some(bytes)) => {
                out.push_str(&format!("{label}: {hex} ({} bytes)\n", bytes.byte_length));
            }
            _ => {
                let reason = encoded.error_reason().map(|r| r.as_str()).unwrap_or("failed");
                out.push_str(&format!("{label}: encoding failed ({reason})\n"));
            }
        }
    }

    out.push_str("\n=== Characters ===\n");
    for info in &result.per_character {
        out.push_str(&format!(
            "\n[{}] {:?} {} {}\n",
            info.position, info.character, info.codepoint_label, info.unicode_name
        ));
        for (id, encoded) in &info.per_encoding_results {
            match hex_of(encoded, opts) {
                Some(hex) => out.push_str(&format!("  {}: {hex}\n", id.to_uppercase())),
                None if opts.show_failures => out.push_str(&format!("  {}: N/A\n", id.to_uppercase())),
                None => {}
            }
        }
    }

    if result.is_truncated() {
        let hidden = stats.codepoint_length - result.per_character.len();
        out.push_str(&format!("\n... {hidden} more characters not shown\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConverterConfig;
    use crate::convert::TextConverter;

    #[test]
    fn renders_overall_and_characters() {
        let result = TextConverter::default().convert("A中", &["utf-8", "ascii"]).unwrap();
        let text = render(&result);
        assert!(text.contains("UTF-8: 41E4B8AD (4 bytes)"));
        assert!(text.contains("ASCII: encoding failed (encoding_unrepresentable)"));
        assert!(text.contains("[1] '中' U+4E2D CJK UNIFIED IDEOGRAPH-4E2D"));
        assert!(text.contains("  ASCII: N/A"));
    }

    #[test]
    fn spaced_hex_and_hidden_failures() {
        let result = TextConverter::default().convert("中", &["utf-8", "ascii"]).unwrap();
        let opts = ReportOptions { spaced_hex: true, show_failures: false };
        let text = render_with(&result, &opts);
        assert!(text.contains("  UTF-8: E4 B8 AD"));
        assert!(!text.contains("N/A"));
    }

    #[test]
    fn header_lists_stats_line_by_line() {
        let result = TextConverter::default().convert("ab\nc", &["ascii"]).unwrap();
        let text = render(&result);
        assert!(text.starts_with("Text: \"ab\\nc\"\nCharacters: 4\nUTF-8 bytes: 4\nUnique characters: 4\nLines: 2\n"));
        assert!(text.contains("\n=== Overall ===\nASCII: 61620A63 (4 bytes)\n"));
    }

    #[test]
    fn notes_truncation() {
        let converter = TextConverter::new(ConverterConfig::default().with_char_limit(2));
        let result = converter.convert("abcde", &["ascii"]).unwrap();
        assert!(render(&result).ends_with("... 3 more characters not shown\n"));
    }
}
