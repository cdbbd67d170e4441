//! The fixed table of supported encodings.
//!
//! The table is a `static` built at compile time; nothing here allocates or
//! mutates, so lookups are safe from any thread.
//!
//! ```
//! use charlens_core::registry;
//!
//! assert!(registry::is_supported("gbk"));
//! assert_eq!(registry::describe("big5").unwrap().display_name, "BIG5");
//! ```

use std::borrow::Cow;

use serde::Serialize;

use crate::TextEncoding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    EncodeOnly,
    DecodeOnly,
    Both,
}

impl Capability {
    pub fn can_encode(&self) -> bool {
        matches!(self, Self::EncodeOnly | Self::Both)
    }

    pub fn can_decode(&self) -> bool {
        matches!(self, Self::DecodeOnly | Self::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodingDescriptor {
    pub id: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub capability: Capability,
    #[serde(skip)]
    pub encoding: TextEncoding,
}

const fn entry(
    encoding: TextEncoding,
    id: &'static str,
    display_name: &'static str,
    description: &'static str,
) -> EncodingDescriptor {
    EncodingDescriptor { id, display_name, description, capability: Capability::Both, encoding }
}

static ENCODINGS: [EncodingDescriptor; 30] = [
    entry(TextEncoding::Utf8, "utf-8", "UTF-8", "Unicode (UTF-8), variable-length 1-4 bytes"),
    entry(TextEncoding::Utf16, "utf-16", "UTF-16", "Unicode (UTF-16) with byte order mark"),
    entry(TextEncoding::Utf16Le, "utf-16le", "UTF-16LE", "Unicode (UTF-16 little endian)"),
    entry(TextEncoding::Utf16Be, "utf-16be", "UTF-16BE", "Unicode (UTF-16 big endian)"),
    entry(TextEncoding::Utf32, "utf-32", "UTF-32", "Unicode (UTF-32) with byte order mark"),
    entry(TextEncoding::Utf32Le, "utf-32le", "UTF-32LE", "Unicode (UTF-32 little endian)"),
    entry(TextEncoding::Utf32Be, "utf-32be", "UTF-32BE", "Unicode (UTF-32 big endian)"),
    entry(TextEncoding::Ascii, "ascii", "ASCII", "ASCII, 7-bit"),
    entry(TextEncoding::Latin1, "latin-1", "LATIN-1", "Latin-1 (ISO 8859-1)"),
    entry(TextEncoding::Cp1252, "cp1252", "CP1252", "Windows-1252 (Western European)"),
    entry(TextEncoding::Iso8859_1, "iso-8859-1", "ISO-8859-1", "ISO 8859-1, Western European"),
    entry(TextEncoding::Iso8859_15, "iso-8859-15", "ISO-8859-15", "ISO 8859-15, Western European with euro sign"),
    entry(TextEncoding::Gbk, "gbk", "GBK", "GBK, Chinese"),
    entry(TextEncoding::Gb2312, "gb2312", "GB2312", "GB2312, Simplified Chinese"),
    entry(TextEncoding::Gb18030, "gb18030", "GB18030", "GB18030, Chinese national standard covering all of Unicode"),
    entry(TextEncoding::Big5, "big5", "BIG5", "Big5, Traditional Chinese"),
    entry(TextEncoding::Big5Hkscs, "big5hkscs", "BIG5HKSCS", "Big5 with Hong Kong Supplementary Character Set"),
    entry(TextEncoding::ShiftJis, "shift_jis", "SHIFT_JIS", "Shift JIS, Japanese"),
    entry(TextEncoding::Cp932, "cp932", "CP932", "Windows-31J, Japanese"),
    entry(TextEncoding::EucJp, "euc-jp", "EUC-JP", "EUC-JP, Japanese"),
    entry(TextEncoding::Iso2022Jp, "iso-2022-jp", "ISO-2022-JP", "ISO-2022-JP, 7-bit Japanese"),
    entry(TextEncoding::EucKr, "euc-kr", "EUC-KR", "EUC-KR, Korean"),
    entry(TextEncoding::Cp949, "cp949", "CP949", "Unified Hangul Code, Korean"),
    entry(TextEncoding::Iso2022Kr, "iso-2022-kr", "ISO-2022-KR", "ISO-2022-KR, 7-bit Korean"),
    entry(TextEncoding::Koi8R, "koi8-r", "KOI8-R", "KOI8-R, Russian"),
    entry(TextEncoding::Cp1251, "cp1251", "CP1251", "Windows-1251 (Cyrillic)"),
    entry(TextEncoding::Iso8859_5, "iso-8859-5", "ISO-8859-5", "ISO 8859-5, Cyrillic"),
    entry(TextEncoding::Cp437, "cp437", "CP437", "IBM PC code page 437 (DOS US)"),
    entry(TextEncoding::Cp850, "cp850", "CP850", "IBM code page 850 (DOS Western European)"),
    entry(TextEncoding::Cp866, "cp866", "CP866", "IBM code page 866 (DOS Cyrillic)"),
];

/// All descriptors, in display order.
pub fn list_encodings() -> &'static [EncodingDescriptor] {
    &ENCODINGS
}

pub fn is_supported(id: &str) -> bool {
    describe(id).is_some()
}

pub fn describe(id: &str) -> Option<&'static EncodingDescriptor> {
    let encoding = id.parse::<TextEncoding>().ok()?;
    descriptor(encoding)
}

pub fn descriptor(encoding: TextEncoding) -> Option<&'static EncodingDescriptor> {
    ENCODINGS.iter().find(|d| d.encoding == encoding)
}

/// Description for any id, falling back to a generic `"<ID> encoding"`.
pub fn description_for(id: &str) -> Cow<'static, str> {
    match describe(id) {
        Some(d) => Cow::Borrowed(d.description),
        None => Cow::Owned(format!("{} encoding", id.trim().to_uppercase())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entry_is_supported_and_named() {
        for d in list_encodings() {
            assert!(is_supported(d.id), "{} not supported", d.id);
            assert!(!d.display_name.is_empty());
            assert_eq!(d.id, d.encoding.id());
            assert_eq!(describe(d.id), Some(d));
        }
    }

    #[test]
    fn table_follows_enum_order() {
        let ids: Vec<_> = list_encodings().iter().map(|d| d.encoding).collect();
        assert_eq!(ids, TextEncoding::ALL.to_vec());
    }

    #[test]
    fn unknown_ids_get_generic_description() {
        assert!(!is_supported("utf-7"));
        assert_eq!(description_for("utf-7"), "UTF-7 encoding");
        assert_eq!(description_for("koi8-r"), "KOI8-R, Russian");
    }

    #[test]
    fn serializes_camel_case_without_enum() {
        let json = serde_json::to_value(describe("gbk").unwrap()).unwrap();
        assert_eq!(json["displayName"], "GBK");
        assert_eq!(json["capability"], "both");
        assert!(json.get("encoding").is_none());
    }
}
