//! Single-character encoding and explicit-kind byte decoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, ErrorReason, Result};
use crate::TextEncoding;

/// Bytes as returned to callers, possibly cut short for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBytes {
    pub bytes: Vec<u8>,
    pub truncated: bool,
}

/// Serialized as a plain list, with a trailing `"..."` when truncated.
impl Serialize for RawBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let len = self.bytes.len() + usize::from(self.truncated);
        let mut seq = serializer.serialize_seq(Some(len))?;
        for byte in &self.bytes {
            seq.serialize_element(byte)?;
        }
        if self.truncated {
            seq.serialize_element("...")?;
        }
        seq.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedBytes {
    pub hex_bytes: String,
    pub raw_bytes: RawBytes,
    pub base64: String,
    pub byte_length: usize,
}

impl EncodedBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self::truncated(bytes, usize::MAX)
    }

    /// Keeps at most `limit` entries in `raw_bytes`; the hex, base64 and length
    /// fields always describe the full sequence.
    pub fn truncated(mut bytes: Vec<u8>, limit: usize) -> Self {
        let hex_bytes = hex::encode_upper(&bytes);
        let base64 = STANDARD.encode(&bytes);
        let byte_length = bytes.len();
        let truncated = byte_length > limit;
        if truncated {
            bytes.truncate(limit);
        }
        Self {
            hex_bytes,
            raw_bytes: RawBytes { bytes, truncated },
            base64,
            byte_length,
        }
    }

    /// Size in MiB, rounded to four decimals.
    pub fn size_mb(&self) -> f64 {
        (self.byte_length as f64 / (1024.0 * 1024.0) * 10_000.0).round() / 10_000.0
    }
}

/// Outcome for one (character or text, encoding) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharacterEncodingResult {
    Encoded(EncodedBytes),
    Failed(ErrorReason),
}

impl CharacterEncodingResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Encoded(_))
    }

    pub fn encoded(&self) -> Option<&EncodedBytes> {
        match self {
            Self::Encoded(bytes) => Some(bytes),
            Self::Failed(_) => None,
        }
    }

    pub fn error_reason(&self) -> Option<ErrorReason> {
        match self {
            Self::Encoded(_) => None,
            Self::Failed(reason) => Some(*reason),
        }
    }
}

impl From<Result<EncodedBytes>> for CharacterEncodingResult {
    fn from(result: Result<EncodedBytes>) -> Self {
        match result {
            Ok(bytes) => Self::Encoded(bytes),
            Err(e) => Self::Failed(e.reason()),
        }
    }
}

impl Serialize for CharacterEncodingResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Encoded(bytes) => {
                let mut st = serializer.serialize_struct("CharacterEncodingResult", 6)?;
                st.serialize_field("success", &true)?;
                st.serialize_field("hexBytes", &bytes.hex_bytes)?;
                st.serialize_field("rawBytes", &bytes.raw_bytes)?;
                st.serialize_field("base64", &bytes.base64)?;
                st.serialize_field("byteLength", &bytes.byte_length)?;
                st.serialize_field("sizeMb", &bytes.size_mb())?;
                st.end()
            }
            Self::Failed(reason) => {
                let mut st = serializer.serialize_struct("CharacterEncodingResult", 2)?;
                st.serialize_field("success", &false)?;
                st.serialize_field("errorReason", reason)?;
                st.end()
            }
        }
    }
}

/// Encodes one code point; failures are returned inline, never raised.
pub fn encode_char(ch: char, encoding: &str) -> CharacterEncodingResult {
    match encoding.parse::<TextEncoding>() {
        Ok(encoding) => encode_char_as(ch, encoding),
        Err(e) => CharacterEncodingResult::Failed(e.reason()),
    }
}

pub fn encode_char_as(ch: char, encoding: TextEncoding) -> CharacterEncodingResult {
    let mut buf = [0u8; 4];
    encoding.encode(ch.encode_utf8(&mut buf)).map(EncodedBytes::new).into()
}

/// How a decode payload is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Raw,
    Hex,
    Base64,
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Raw => "raw",
            Self::Hex => "hex",
            Self::Base64 => "base64",
        })
    }
}

impl DataKind {
    /// Turns the payload into bytes. Hex and base64 text may contain ASCII
    /// whitespace between groups.
    pub fn to_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        let compact = || -> Vec<u8> { data.iter().copied().filter(|b| !b.is_ascii_whitespace()).collect() };
        let decoded = match self {
            Self::Raw => return Ok(data.to_vec()),
            Self::Hex => hex::decode(compact()).map_err(|e| e.to_string()),
            Self::Base64 => STANDARD.decode(compact()).map_err(|e| e.to_string()),
        };
        decoded.map_err(|detail| Error::InvalidDataKind { kind: *self, detail })
    }
}

/// Strict decode of a payload whose spelling is declared by `kind`.
pub fn decode_bytes(data: &[u8], kind: DataKind, encoding: &str) -> Result<String> {
    let encoding: TextEncoding = encoding.parse()?;
    let bytes = kind.to_bytes(data)?;
    encoding.decode(&bytes)
}

/// Wire shape of a [`decode_bytes`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DecodeResult {
    Decoded { success: bool, text: String },
    Failed {
        success: bool,
        #[serde(rename = "errorReason")]
        error_reason: ErrorReason,
    },
}

impl From<Result<String>> for DecodeResult {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(text) => Self::Decoded { success: true, text },
            Err(e) => Self::Failed { success: false, error_reason: e.reason() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_ascii_letter() {
        let result = encode_char('A', "ascii");
        let bytes = result.encoded().unwrap();
        assert_eq!(bytes.hex_bytes, "41");
        assert_eq!(bytes.raw_bytes.bytes, vec![65]);
        assert_eq!(bytes.base64, "QQ==");
        assert_eq!(bytes.byte_length, 1);
    }

    #[test]
    fn reports_unrepresentable_and_unknown() {
        assert_eq!(encode_char('中', "ascii").error_reason(), Some(ErrorReason::EncodingUnrepresentable));
        assert_eq!(encode_char('A', "ebcdic").error_reason(), Some(ErrorReason::UnknownEncoding));
    }

    #[test]
    fn encodes_multibyte() {
        assert_eq!(encode_char('中', "gbk").encoded().unwrap().hex_bytes, "D6D0");
        assert_eq!(encode_char('中', "utf-8").encoded().unwrap().hex_bytes, "E4B8AD");
        assert_eq!(encode_char('中', "utf-16").encoded().unwrap().hex_bytes, "FFFE2D4E");
        assert_eq!(encode_char('中', "big5").encoded().unwrap().hex_bytes, "A4A4");
        assert_eq!(encode_char('あ', "shift_jis").encoded().unwrap().hex_bytes, "82A0");
    }

    #[test]
    fn decodes_each_kind() {
        assert_eq!(decode_bytes(&[0xD6, 0xD0], DataKind::Raw, "gbk").unwrap(), "中");
        assert_eq!(decode_bytes(b"d6 d0", DataKind::Hex, "gbk").unwrap(), "中");
        assert_eq!(decode_bytes(b"1tA=", DataKind::Base64, "gbk").unwrap(), "中");
    }

    #[test]
    fn kind_names_are_exact() {
        let kind: DataKind = serde_json::from_str("\"base64\"").unwrap();
        assert_eq!(kind, DataKind::Base64);
        assert!(serde_json::from_str::<DataKind>("\"b64\"").is_err());
        assert!(serde_json::from_str::<DataKind>("\"binary\"").is_err());
    }

    #[test]
    fn kind_is_never_guessed() {
        // "4142" is valid hex and valid base64; the declared kind decides.
        assert_eq!(decode_bytes(b"4142", DataKind::Hex, "ascii").unwrap(), "AB");
        let as_base64 = decode_bytes(b"4142", DataKind::Base64, "latin-1").unwrap();
        assert_eq!(as_base64, "\u{E3}\u{5E}\u{36}");
    }

    #[test]
    fn decode_failures_are_typed() {
        let err = decode_bytes(b"zz", DataKind::Hex, "utf-8").unwrap_err();
        assert_eq!(err.reason(), ErrorReason::InvalidDataKind);
        let err = decode_bytes(&[0xFF], DataKind::Raw, "utf-8").unwrap_err();
        assert_eq!(err.reason(), ErrorReason::DecodingError);
        let err = decode_bytes(b"41", DataKind::Hex, "nope").unwrap_err();
        assert_eq!(err.reason(), ErrorReason::UnknownEncoding);
    }

    #[test]
    fn truncation_keeps_full_hex() {
        let bytes = EncodedBytes::truncated(vec![1, 2, 3, 4], 2);
        assert_eq!(bytes.raw_bytes, RawBytes { bytes: vec![1, 2], truncated: true });
        assert_eq!(bytes.hex_bytes, "01020304");
        assert_eq!(bytes.byte_length, 4);
        let json = serde_json::to_value(&bytes.raw_bytes).unwrap();
        assert_eq!(json, serde_json::json!([1, 2, "..."]));
    }

    #[test]
    fn size_in_mebibytes() {
        assert_eq!(EncodedBytes::new(vec![0; 1024 * 1024]).size_mb(), 1.0);
        assert_eq!(EncodedBytes::new(vec![0; 52_429]).size_mb(), 0.05);
    }

    #[test]
    fn result_wire_shape() {
        let ok = serde_json::to_value(encode_char('A', "ascii")).unwrap();
        assert_eq!(
            ok,
            serde_json::json!({"success": true, "hexBytes": "41", "rawBytes": [65], "base64": "QQ==", "byteLength": 1, "sizeMb": 0.0})
        );
        let failed = serde_json::to_value(encode_char('中', "ascii")).unwrap();
        assert_eq!(failed, serde_json::json!({"success": false, "errorReason": "encoding_unrepresentable"}));
        let decoded = serde_json::to_value(DecodeResult::from(Ok("A".to_string()))).unwrap();
        assert_eq!(decoded, serde_json::json!({"success": true, "text": "A"}));
    }
}
