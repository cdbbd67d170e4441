//! Whole-text and per-character conversion against a set of target encodings.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::character::{encode_char_as, CharacterEncodingResult, EncodedBytes};
use crate::config::ConverterConfig;
use crate::detect::{DetectionResult, Detector};
use crate::error::{Error, Result};
use crate::TextEncoding;

pub const UNKNOWN_NAME: &str = "UNKNOWN";
pub const PRIVATE_USE_NAME: &str = "PRIVATE USE";

/// Results keyed by registry id, in id order.
pub type EncodingResults = BTreeMap<&'static str, CharacterEncodingResult>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStats {
    pub codepoint_length: usize,
    pub utf8_byte_length: usize,
    pub unique_codepoint_count: usize,
    /// `'\n'` count plus one; zero for empty text.
    pub line_count: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        let line_count = if text.is_empty() { 0 } else { text.matches('\n').count() + 1 };
        Self {
            codepoint_length: text.chars().count(),
            utf8_byte_length: text.len(),
            unique_codepoint_count: text.chars().collect::<HashSet<_>>().len(),
            line_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterInfo {
    pub character: char,
    pub codepoint_label: String,
    pub unicode_name: String,
    pub position: usize,
    pub per_encoding_results: EncodingResults,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub per_character: Vec<CharacterInfo>,
    pub overall_by_encoding: EncodingResults,
    pub stats: TextStats,
    pub original_text: String,
}

impl ConversionResult {
    /// Overall hex for `encoding`, for export paths. `None` when the encoding
    /// was not requested or the text could not be encoded.
    pub fn export_hex(&self, encoding: &str) -> Option<&str> {
        let encoding: TextEncoding = encoding.parse().ok()?;
        self.overall_by_encoding
            .get(encoding.id())?
            .encoded()
            .map(|bytes| bytes.hex_bytes.as_str())
    }

    /// Whether the per-character breakdown stops short of the full text.
    pub fn is_truncated(&self) -> bool {
        self.per_character.len() < self.stats.codepoint_length
    }
}

/// `"U+XXXX"`, uppercase, at least four digits.
pub fn codepoint_label(ch: char) -> String {
    format!("U+{:04X}", ch as u32)
}

/// Unicode character name, or a sentinel when the character has none.
pub fn unicode_name(ch: char) -> String {
    match unicode_names2::name(ch) {
        Some(name) => name.to_string(),
        None if ch as u32 >= 0xE000 => PRIVATE_USE_NAME.to_string(),
        None => UNKNOWN_NAME.to_string(),
    }
}

/// Keeps registered ids in first-seen order and drops the rest.
fn resolve_targets<S: AsRef<str>>(targets: &[S]) -> Vec<TextEncoding> {
    let mut resolved = Vec::with_capacity(targets.len());
    for target in targets {
        match target.as_ref().parse::<TextEncoding>() {
            Ok(encoding) if !resolved.contains(&encoding) => resolved.push(encoding),
            Ok(_) => {}
            Err(_) => log::debug!("skipping unsupported target encoding {:?}", target.as_ref()),
        }
    }
    resolved
}

#[derive(Debug, Clone, Default)]
pub struct TextConverter {
    config: ConverterConfig,
}

impl TextConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn detector(&self) -> Detector {
        Detector::with_sample_size(self.config.detect_sample_limit)
    }

    pub fn detect(&self, bytes: &[u8]) -> DetectionResult {
        self.detector().detect(bytes)
    }

    /// Converts `text` into every registered encoding in `targets`; unknown
    /// ids are skipped. Empty or whitespace-only text is rejected.
    pub fn convert<S: AsRef<str>>(&self, text: &str, targets: &[S]) -> Result<ConversionResult> {
        if text.trim().is_empty() {
            return Err(Error::EmptyInput);
        }
        let encodings = resolve_targets(targets);

        let per_character = text
            .chars()
            .take(self.config.char_limit)
            .enumerate()
            .map(|(position, ch)| CharacterInfo {
                character: ch,
                codepoint_label: codepoint_label(ch),
                unicode_name: unicode_name(ch),
                position,
                per_encoding_results: encodings
                    .iter()
                    .map(|&encoding| (encoding.id(), encode_char_as(ch, encoding)))
                    .collect(),
            })
            .collect();

        let overall_by_encoding = encodings
            .iter()
            .map(|&encoding| (encoding.id(), self.encode_overall(text, encoding)))
            .collect();

        let stats = TextStats::of(text);
        log::debug!(
            "converted {} code points into {} encodings ({} detailed)",
            stats.codepoint_length,
            encodings.len(),
            stats.codepoint_length.min(self.config.char_limit)
        );

        Ok(ConversionResult {
            per_character,
            overall_by_encoding,
            stats,
            original_text: text.to_string(),
        })
    }

    fn encode_overall(&self, text: &str, encoding: TextEncoding) -> CharacterEncodingResult {
        encoding
            .encode(text)
            .map(|bytes| EncodedBytes::truncated(bytes, self.config.overall_byte_limit))
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorReason;

    #[test]
    fn rejects_blank_text() {
        let converter = TextConverter::default();
        assert_eq!(converter.convert("", &["utf-8"]).unwrap_err(), Error::EmptyInput);
        assert_eq!(converter.convert(" \n\t", &["utf-8"]).unwrap_err(), Error::EmptyInput);
    }

    #[test]
    fn stats_count_code_points_not_bytes() {
        let stats = TextStats::of("a中a\nb");
        assert_eq!(stats.codepoint_length, 5);
        assert_eq!(stats.utf8_byte_length, 7);
        assert_eq!(stats.unique_codepoint_count, 4);
        assert_eq!(stats.line_count, 2);
        assert_eq!(TextStats::of("").line_count, 0);
    }

    #[test]
    fn labels_and_names() {
        assert_eq!(codepoint_label('A'), "U+0041");
        assert_eq!(codepoint_label('😀'), "U+1F600");
        assert_eq!(unicode_name('A'), "LATIN CAPITAL LETTER A");
        assert_eq!(unicode_name('中'), "CJK UNIFIED IDEOGRAPH-4E2D");
        assert_eq!(unicode_name('\u{E000}'), PRIVATE_USE_NAME);
        assert_eq!(unicode_name('\u{0007}'), UNKNOWN_NAME);
    }

    #[test]
    fn per_character_failures_stay_inline() {
        let result = TextConverter::default().convert("A中", &["ascii", "gbk"]).unwrap();
        let zhong = &result.per_character[1];
        assert_eq!(zhong.position, 1);
        assert_eq!(
            zhong.per_encoding_results["ascii"].error_reason(),
            Some(ErrorReason::EncodingUnrepresentable)
        );
        assert!(zhong.per_encoding_results["gbk"].is_success());
        assert!(!result.overall_by_encoding["ascii"].is_success());
        assert_eq!(result.export_hex("gbk"), Some("41D6D0"));
        assert_eq!(result.export_hex("ascii"), None);
    }

    #[test]
    fn unknown_and_duplicate_targets_are_dropped() {
        let result = TextConverter::default().convert("x", &["utf-8", "klingon", "UTF-8"]).unwrap();
        assert_eq!(result.overall_by_encoding.len(), 1);
        assert_eq!(result.per_character[0].per_encoding_results.len(), 1);
    }

    #[test]
    fn overall_bytes_are_truncated_for_display_only() {
        let converter = TextConverter::new(ConverterConfig::default().with_overall_byte_limit(3));
        let result = converter.convert("abcdef", &["ascii"]).unwrap();
        let overall = result.overall_by_encoding["ascii"].encoded().unwrap();
        assert_eq!(overall.raw_bytes.bytes, b"abc".to_vec());
        assert!(overall.raw_bytes.truncated);
        assert_eq!(overall.hex_bytes, "616263646566");
        assert_eq!(overall.byte_length, 6);
    }
}
