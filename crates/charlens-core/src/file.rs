//! Turning raw file bytes into text, and text back into file bytes.

use serde::Serialize;

use crate::convert::{ConversionResult, TextConverter};
use crate::detect::{Detector, FALLBACK_ENCODING};
use crate::error::Result;
use crate::TextEncoding;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedFile {
    pub text: String,
    /// Encoding actually used to decode `text`.
    pub detected: String,
    pub confidence: f64,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAnalysis {
    pub file: DecodedFile,
    pub conversion: ConversionResult,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileDecoder {
    detector: Detector,
}

impl FileDecoder {
    pub fn new(detector: Detector) -> Self {
        Self { detector }
    }

    /// Detects and decodes lossily. Never fails: an undecodable guess falls
    /// back to lossy UTF-8.
    pub fn decode_file(&self, bytes: &[u8]) -> DecodedFile {
        let detection = self.detector.detect(bytes);
        let (text, detected) = match resolve_decoder(&detection.guessed_encoding) {
            Some(Decoder::Registered(encoding)) => (encoding.decode_lossy(bytes), encoding.id().to_string()),
            Some(Decoder::Whatwg(encoding)) => (
                encoding.decode_without_bom_handling(bytes).0.into_owned(),
                detection.guessed_encoding.clone(),
            ),
            None => {
                log::warn!(
                    "cannot decode with detected {:?}, using {FALLBACK_ENCODING}",
                    detection.guessed_encoding
                );
                (String::from_utf8_lossy(bytes).into_owned(), FALLBACK_ENCODING.to_string())
            }
        };
        DecodedFile {
            text: strip_bom(text),
            detected,
            confidence: detection.confidence,
            size: bytes.len(),
        }
    }

    /// Lossy decode with a caller-chosen encoding; detection is skipped.
    pub fn decode_file_as(&self, bytes: &[u8], encoding: &str) -> Result<DecodedFile> {
        let encoding: TextEncoding = encoding.parse()?;
        Ok(DecodedFile {
            text: strip_bom(encoding.decode_lossy(bytes)),
            detected: encoding.id().to_string(),
            confidence: 1.0,
            size: bytes.len(),
        })
    }

    /// Decodes the file and runs it through `converter`.
    pub fn analyze_file<S: AsRef<str>>(
        &self,
        bytes: &[u8],
        targets: &[S],
        converter: &TextConverter,
    ) -> Result<FileAnalysis> {
        let file = self.decode_file(bytes);
        let conversion = converter.convert(&file.text, targets)?;
        Ok(FileAnalysis { file, conversion })
    }
}

enum Decoder {
    Registered(TextEncoding),
    Whatwg(&'static encoding_rs::Encoding),
}

fn resolve_decoder(label: &str) -> Option<Decoder> {
    if let Ok(encoding) = label.parse::<TextEncoding>() {
        return Some(Decoder::Registered(encoding));
    }
    encoding_rs::Encoding::for_label(label.as_bytes()).map(Decoder::Whatwg)
}

fn strip_bom(text: String) -> String {
    match text.strip_prefix('\u{FEFF}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

/// Re-encodes a file: lossy decode with `from`, strict encode with `to`.
pub fn transcode(bytes: &[u8], from: &str, to: &str) -> Result<Vec<u8>> {
    let from: TextEncoding = from.parse()?;
    let to: TextEncoding = to.parse()?;
    let text = strip_bom(from.decode_lossy(bytes));
    to.encode(&text)
}

/// [`FileDecoder::decode_file`] with default detection settings.
pub fn decode_file(bytes: &[u8]) -> DecodedFile {
    FileDecoder::default().decode_file(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn decodes_gbk_file() {
        let (bytes, _, _) = encoding_rs::GBK.encode("文件编码检测：这是一段用来测试的简体中文文本。");
        let file = decode_file(&bytes);
        assert!(file.detected == "gbk" || file.detected == "gb18030");
        assert_eq!(file.text, "文件编码检测：这是一段用来测试的简体中文文本。");
        assert_eq!(file.size, bytes.len());
    }

    #[test]
    fn garbage_still_decodes() {
        let bytes: Vec<u8> = (0u8..=255).rev().cycle().take(1024).collect();
        let file = decode_file(&bytes);
        assert!(!file.detected.is_empty());
        assert!((0.0..=1.0).contains(&file.confidence));
    }

    #[test]
    fn empty_file_is_utf8() {
        let file = decode_file(b"");
        assert_eq!(file.detected, "utf-8");
        assert_eq!(file.confidence, 0.0);
        assert!(file.text.is_empty());
    }

    #[test]
    fn bom_is_not_part_of_text() {
        let file = decode_file(&[0xEF, 0xBB, 0xBF, b'h', b'i']);
        assert_eq!(file.text, "hi");
        let file = decode_file(&[0xFF, 0xFE, b'h', 0, b'i', 0]);
        assert_eq!(file.detected, "utf-16");
        assert_eq!(file.text, "hi");
    }

    #[test]
    fn explicit_encoding() {
        let file = FileDecoder::default().decode_file_as(&[0x82, 0xA0], "shift_jis").unwrap();
        assert_eq!(file.text, "あ");
        assert!(FileDecoder::default().decode_file_as(b"x", "nope").is_err());
    }

    #[test]
    fn unregistered_whatwg_guess_is_still_decoded() {
        match resolve_decoder("windows-1250") {
            Some(Decoder::Whatwg(encoding)) => assert_eq!(encoding, encoding_rs::WINDOWS_1250),
            _ => panic!("expected a WHATWG decoder"),
        }
        assert!(resolve_decoder("x-unheard-of").is_none());
    }

    #[test]
    fn transcodes_between_encodings() {
        let gbk = transcode("中文".as_bytes(), "utf-8", "gbk").unwrap();
        assert_eq!(gbk, vec![0xD6, 0xD0, 0xCE, 0xC4]);
        let err = transcode("中文".as_bytes(), "utf-8", "latin-1").unwrap_err();
        assert_eq!(err, Error::EncodingUnrepresentable { ch: '中', encoding: "latin-1" });
    }
}
