//! Best-guess encoding detection for bytes of unknown origin.
//!
//! Byte order marks and clean 7-bit or UTF-8 input are settled up front; only
//! the remaining legacy-encoded input goes through `chardetng`.

use encoding_rs::Encoding;
use serde::Serialize;

use crate::TextEncoding;

const ESC: u8 = 0x1B;
const ISO_2022_KR_DESIGNATOR: [u8; 4] = [ESC, b'$', b')', b'C'];

/// Label reported when nothing better can be said.
pub const FALLBACK_ENCODING: &str = "utf-8";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    /// Registry id when the guess is a registered encoding, otherwise the
    /// lowercased WHATWG name (e.g. `windows-1250`).
    pub guessed_encoding: String,
    /// Heuristic score in `[0, 1]`.
    pub confidence: f64,
    pub language: Option<String>,
}

impl DetectionResult {
    fn fallback() -> Self {
        Self {
            guessed_encoding: FALLBACK_ENCODING.to_string(),
            confidence: 0.0,
            language: None,
        }
    }

    fn certain(encoding: TextEncoding) -> Self {
        Self {
            guessed_encoding: encoding.id().to_string(),
            confidence: 1.0,
            language: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Detector {
    max_sample_size: usize,
}

impl Default for Detector {
    fn default() -> Self {
        Self { max_sample_size: 64 * 1024 }
    }
}

impl Detector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample_size(max_sample_size: usize) -> Self {
        Self { max_sample_size: max_sample_size.max(1) }
    }

    /// Never fails; empty or hopeless input yields `utf-8` with confidence 0.
    pub fn detect(&self, bytes: &[u8]) -> DetectionResult {
        if bytes.is_empty() {
            return DetectionResult::fallback();
        }
        let truncated = bytes.len() > self.max_sample_size;
        let sample = &bytes[..bytes.len().min(self.max_sample_size)];

        if let Some(encoding) = detect_bom(sample) {
            return DetectionResult::certain(encoding);
        }

        if sample.is_ascii() {
            if !sample.contains(&ESC) {
                return DetectionResult::certain(TextEncoding::Ascii);
            }
            // 7-bit escape-switched text would otherwise pass as plain UTF-8.
            if contains(sample, &ISO_2022_KR_DESIGNATOR) {
                return DetectionResult {
                    language: Some("Korean".to_string()),
                    ..DetectionResult::certain(TextEncoding::Iso2022Kr)
                };
            }
            return self.detect_legacy(sample);
        }

        if let Some(multibyte) = utf8_multibyte_count(sample, truncated) {
            return DetectionResult {
                guessed_encoding: TextEncoding::Utf8.id().to_string(),
                confidence: utf8_confidence(multibyte),
                language: None,
            };
        }

        self.detect_legacy(sample)
    }

    /// Detection over the UTF-8 bytes of already-decoded text.
    pub fn detect_text(&self, text: &str) -> DetectionResult {
        self.detect(text.as_bytes())
    }

    fn detect_legacy(&self, sample: &[u8]) -> DetectionResult {
        let mut detector = chardetng::EncodingDetector::new();
        detector.feed(sample, true);
        let (encoding, high_confidence) = detector.guess_assess(None, false);

        let base = if high_confidence { 0.9 } else { 0.5 };
        let confidence = (base * clean_ratio(encoding, sample)).clamp(0.0, 1.0);
        if confidence < 0.01 {
            log::debug!("no usable guess for {} bytes, falling back to {FALLBACK_ENCODING}", sample.len());
            return DetectionResult::fallback();
        }

        let guessed_encoding = match TextEncoding::from_whatwg(encoding) {
            Some(known) => known.id().to_string(),
            None => encoding.name().to_ascii_lowercase(),
        };
        log::debug!("detected {guessed_encoding} (confidence {confidence:.2})");
        DetectionResult {
            guessed_encoding,
            confidence,
            language: language_hint(encoding).map(str::to_string),
        }
    }
}

/// Convenience wrapper around a default [`Detector`].
pub fn detect(bytes: &[u8]) -> DetectionResult {
    Detector::default().detect(bytes)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

fn detect_bom(bytes: &[u8]) -> Option<TextEncoding> {
    // UTF-32LE's BOM starts with UTF-16LE's, so it has to be checked first.
    if bytes.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) || bytes.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
        Some(TextEncoding::Utf32)
    } else if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        Some(TextEncoding::Utf8)
    } else if bytes.starts_with(&[0xFF, 0xFE]) || bytes.starts_with(&[0xFE, 0xFF]) {
        Some(TextEncoding::Utf16)
    } else {
        None
    }
}

/// Number of multi-byte sequences if `bytes` is UTF-8. A sequence cut off by
/// sampling still counts as valid.
fn utf8_multibyte_count(bytes: &[u8], truncated: bool) -> Option<usize> {
    let valid = match std::str::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) if truncated && e.error_len().is_none() => {
            std::str::from_utf8(&bytes[..e.valid_up_to()]).ok()?
        }
        Err(_) => return None,
    };
    Some(valid.chars().filter(|ch| !ch.is_ascii()).count())
}

fn utf8_confidence(multibyte: usize) -> f64 {
    const ONE_CHAR_PROB: f64 = 0.5;
    if multibyte < 6 {
        1.0 - 0.99 * ONE_CHAR_PROB.powi(multibyte as i32)
    } else {
        0.99
    }
}

/// Share of decoded characters that are not replacement characters.
fn clean_ratio(encoding: &'static Encoding, sample: &[u8]) -> f64 {
    let (text, _) = encoding.decode_without_bom_handling(sample);
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let replaced = text.chars().filter(|&ch| ch == char::REPLACEMENT_CHARACTER).count();
    1.0 - replaced as f64 / total as f64
}

fn language_hint(encoding: &'static Encoding) -> Option<&'static str> {
    use encoding_rs::*;

    let language = if encoding == GBK || encoding == GB18030 || encoding == BIG5 {
        "Chinese"
    } else if encoding == SHIFT_JIS || encoding == EUC_JP || encoding == ISO_2022_JP {
        "Japanese"
    } else if encoding == EUC_KR {
        "Korean"
    } else if encoding == WINDOWS_1251 || encoding == KOI8_R || encoding == ISO_8859_5 || encoding == IBM866 {
        "Russian"
    } else if encoding == KOI8_U {
        "Ukrainian"
    } else if encoding == WINDOWS_1253 || encoding == ISO_8859_7 {
        "Greek"
    } else if encoding == WINDOWS_1255 || encoding == ISO_8859_8 {
        "Hebrew"
    } else if encoding == WINDOWS_874 {
        "Thai"
    } else if encoding == WINDOWS_1254 {
        "Turkish"
    } else {
        return None;
    };
    Some(language)
}
