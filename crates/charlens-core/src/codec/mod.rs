//! Byte-level codec backends behind [`TextEncoding`](crate::TextEncoding).
//!
//! Most ids are served by `encoding_rs`. The rest (UTF-16/32 with explicit BOM
//! handling, strict ASCII and Latin-1, the IBM OEM pages and ISO-2022-KR) are
//! implemented in the submodules.

mod iso2022kr;
mod single_byte;
mod unicode;

use encoding_rs::{DecoderResult, Encoding, EncoderResult};

use crate::error::{Error, Result};

pub(crate) use single_byte::{OemTable, CP437, CP850};

/// Two-byte rows accepted by a restricted multi-byte codec.
///
/// GB2312 and EUC-KR are strict subsets of the GBK / UHC tables that
/// `encoding_rs` ships: only pairs whose bytes fall in these ranges belong to
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DoubleByteRows {
    pub lead_min: u8,
    pub lead_max: u8,
    pub trail_min: u8,
    pub trail_max: u8,
}

impl DoubleByteRows {
    pub const GB2312: Self = Self { lead_min: 0xA1, lead_max: 0xF7, trail_min: 0xA1, trail_max: 0xFE };
    pub const KS_X_1001: Self = Self { lead_min: 0xA1, lead_max: 0xFE, trail_min: 0xA1, trail_max: 0xFE };

    fn contains(&self, lead: u8, trail: u8) -> bool {
        (self.lead_min..=self.lead_max).contains(&lead)
            && (self.trail_min..=self.trail_max).contains(&trail)
    }

    /// Offset of the first byte that does not belong to these rows.
    fn first_invalid(&self, bytes: &[u8]) -> Option<usize> {
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] < 0x80 {
                i += 1;
                continue;
            }
            match bytes.get(i + 1) {
                Some(&trail) if self.contains(bytes[i], trail) => i += 2,
                _ => return Some(i),
            }
        }
        None
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Codec {
    Whatwg(&'static Encoding),
    Restricted(&'static Encoding, DoubleByteRows),
    Utf16 { big_endian: bool, bom: bool },
    Utf32 { big_endian: bool, bom: bool },
    Ascii,
    Latin1,
    Oem(&'static OemTable),
    Iso2022Kr,
}

impl Codec {
    /// Strict encode; `name` is the registry id used in error values.
    pub fn encode(&self, text: &str, name: &'static str) -> Result<Vec<u8>> {
        match *self {
            Self::Whatwg(encoding) => encode_whatwg(encoding, text, name),
            Self::Restricted(encoding, rows) => {
                let mut out = Vec::with_capacity(text.len() * 2);
                let mut buf = [0u8; 4];
                for ch in text.chars() {
                    let bytes = encode_whatwg(encoding, ch.encode_utf8(&mut buf), name)?;
                    if rows.first_invalid(&bytes).is_some() {
                        return Err(Error::EncodingUnrepresentable { ch, encoding: name });
                    }
                    out.extend_from_slice(&bytes);
                }
                Ok(out)
            }
            Self::Utf16 { big_endian, bom } => Ok(unicode::encode_utf16(text, big_endian, bom)),
            Self::Utf32 { big_endian, bom } => Ok(unicode::encode_utf32(text, big_endian, bom)),
            Self::Ascii => single_byte::encode_limited(text, 0x7F, name),
            Self::Latin1 => single_byte::encode_limited(text, 0xFF, name),
            Self::Oem(table) => single_byte::encode_oem(table, text, name),
            Self::Iso2022Kr => iso2022kr::encode(text, name),
        }
    }

    /// Strict decode: any malformed sequence fails with `DecodingError`.
    pub fn decode(&self, bytes: &[u8], name: &'static str) -> Result<String> {
        match *self {
            Self::Whatwg(encoding) => decode_whatwg(encoding, bytes, name),
            Self::Restricted(encoding, rows) => match rows.first_invalid(bytes) {
                Some(offset) => Err(Error::DecodingError { encoding: name, offset }),
                None => decode_whatwg(encoding, bytes, name),
            },
            Self::Utf16 { big_endian, bom } => unicode::decode_utf16(bytes, big_endian, bom, name),
            Self::Utf32 { big_endian, bom } => unicode::decode_utf32(bytes, big_endian, bom, name),
            Self::Ascii => single_byte::decode_ascii(bytes, name),
            Self::Latin1 => Ok(single_byte::decode_latin1(bytes)),
            Self::Oem(table) => Ok(single_byte::decode_oem(table, bytes)),
            Self::Iso2022Kr => iso2022kr::decode(bytes, name),
        }
    }

    /// Decode that substitutes U+FFFD for malformed input and never fails.
    pub fn decode_lossy(&self, bytes: &[u8]) -> String {
        match *self {
            Self::Whatwg(encoding) | Self::Restricted(encoding, _) => {
                encoding.decode_without_bom_handling(bytes).0.into_owned()
            }
            Self::Utf16 { big_endian, bom } => unicode::decode_utf16_lossy(bytes, big_endian, bom),
            Self::Utf32 { big_endian, bom } => unicode::decode_utf32_lossy(bytes, big_endian, bom),
            Self::Ascii => single_byte::decode_ascii_lossy(bytes),
            Self::Latin1 => single_byte::decode_latin1(bytes),
            Self::Oem(table) => single_byte::decode_oem(table, bytes),
            Self::Iso2022Kr => iso2022kr::decode_lossy(bytes),
        }
    }
}

fn encode_whatwg(encoding: &'static Encoding, text: &str, name: &'static str) -> Result<Vec<u8>> {
    let mut encoder = encoding.new_encoder();
    let mut out = Vec::new();
    let mut input = text;
    loop {
        let needed = encoder
            .max_buffer_length_from_utf8_without_replacement(input.len())
            .unwrap_or(input.len() * 4 + 16);
        out.reserve(needed);
        let (result, read) = encoder.encode_from_utf8_to_vec_without_replacement(input, &mut out, true);
        input = &input[read..];
        match result {
            EncoderResult::InputEmpty => return Ok(out),
            EncoderResult::OutputFull => continue,
            EncoderResult::Unmappable(ch) => {
                return Err(Error::EncodingUnrepresentable { ch, encoding: name })
            }
        }
    }
}

fn decode_whatwg(encoding: &'static Encoding, bytes: &[u8], name: &'static str) -> Result<String> {
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let mut out = String::new();
    let mut consumed = 0;
    loop {
        let rest = &bytes[consumed..];
        let needed = decoder
            .max_utf8_buffer_length_without_replacement(rest.len())
            .unwrap_or(rest.len() * 3 + 16);
        out.reserve(needed);
        let (result, read) = decoder.decode_to_string_without_replacement(rest, &mut out, true);
        consumed += read;
        match result {
            DecoderResult::InputEmpty => return Ok(out),
            DecoderResult::OutputFull => continue,
            DecoderResult::Malformed(bad, after) => {
                let offset = consumed.saturating_sub(bad as usize + after as usize);
                return Err(Error::DecodingError { encoding: name, offset });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whatwg_rejects_unmappable() {
        let err = encode_whatwg(encoding_rs::WINDOWS_1252, "a中", "cp1252").unwrap_err();
        assert_eq!(err, Error::EncodingUnrepresentable { ch: '中', encoding: "cp1252" });
    }

    #[test]
    fn whatwg_reports_malformed_offset() {
        // 0xFF is never a valid Shift_JIS lead byte.
        let err = decode_whatwg(encoding_rs::SHIFT_JIS, b"ab\xFF", "shift_jis").unwrap_err();
        assert_eq!(err, Error::DecodingError { encoding: "shift_jis", offset: 2 });
    }

    #[test]
    fn restricted_rows_reject_gbk_extensions() {
        let gb2312 = Codec::Restricted(encoding_rs::GBK, DoubleByteRows::GB2312);
        assert_eq!(gb2312.encode("中", "gb2312").unwrap(), vec![0xD6, 0xD0]);
        // U+4E02 only exists in the GBK extension rows (0x8140).
        assert!(gb2312.encode("丂", "gb2312").is_err());
        assert!(gb2312.decode(&[0x81, 0x40], "gb2312").is_err());
        assert_eq!(gb2312.decode(&[0xD6, 0xD0], "gb2312").unwrap(), "中");
    }

    #[test]
    fn restricted_rows_reject_uhc_extensions() {
        let euc_kr = Codec::Restricted(encoding_rs::EUC_KR, DoubleByteRows::KS_X_1001);
        assert_eq!(euc_kr.encode("가", "euc-kr").unwrap(), vec![0xB0, 0xA1]);
        // U+AC02 is a UHC-only syllable.
        assert!(euc_kr.encode("갂", "euc-kr").is_err());
    }

    #[test]
    fn lossy_never_fails() {
        let text = Codec::Whatwg(encoding_rs::UTF_8).decode_lossy(b"a\xFFb");
        assert_eq!(text, "a\u{FFFD}b");
    }
}
