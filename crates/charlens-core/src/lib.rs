//! Core functionalities: encoding registry, detection, per-character and
//! whole-text conversion, file decoding.
//!
//! The free functions at the crate root are the request/response surface
//! used by presentation layers; they run with [`ConverterConfig::default`].

pub mod character;
pub mod config;
pub mod convert;
pub mod detect;
pub mod encoding;
pub mod error;
pub mod file;
pub mod registry;
pub mod report;

mod codec;

pub use character::{CharacterEncodingResult, DataKind, DecodeResult, EncodedBytes, RawBytes};
pub use config::ConverterConfig;
pub use convert::{CharacterInfo, ConversionResult, TextConverter, TextStats};
pub use detect::{DetectionResult, Detector};
pub use encoding::TextEncoding;
pub use error::{Error, ErrorReason, Result};
pub use file::{DecodedFile, FileAnalysis, FileDecoder};
pub use registry::{Capability, EncodingDescriptor};

pub fn list_supported_encodings() -> &'static [EncodingDescriptor] {
    registry::list_encodings()
}

pub fn detect_encoding(bytes: &[u8]) -> DetectionResult {
    detect::detect(bytes)
}

pub fn convert_text<S: AsRef<str>>(text: &str, target_encodings: &[S]) -> Result<ConversionResult> {
    TextConverter::default().convert(text, target_encodings)
}

pub fn decode_file_bytes(bytes: &[u8]) -> DecodedFile {
    file::decode_file(bytes)
}

pub fn encode_character(ch: char, encoding: &str) -> CharacterEncodingResult {
    character::encode_char(ch, encoding)
}

pub fn decode_bytes(data: &[u8], kind: DataKind, encoding: &str) -> Result<String> {
    character::decode_bytes(data, kind, encoding)
}
