use encoding_rs::{
    Encoding, BIG5, EUC_JP, EUC_KR, GB18030, GBK, IBM866, ISO_2022_JP, ISO_8859_15, ISO_8859_5, KOI8_R,
    SHIFT_JIS, UTF_8, WINDOWS_1251, WINDOWS_1252,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::{Codec, DoubleByteRows, CP437, CP850};
use crate::error::{Error, Result};

/// Every encoding the converter knows, in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextEncoding {
    Utf8,
    Utf16,
    Utf16Le,
    Utf16Be,
    Utf32,
    Utf32Le,
    Utf32Be,
    Ascii,
    Latin1,
    Cp1252,
    Iso8859_1,
    Iso8859_15,
    Gbk,
    Gb2312,
    Gb18030,
    Big5,
    Big5Hkscs,
    ShiftJis,
    Cp932,
    EucJp,
    Iso2022Jp,
    EucKr,
    Cp949,
    Iso2022Kr,
    Koi8R,
    Cp1251,
    Iso8859_5,
    Cp437,
    Cp850,
    Cp866,
}

impl TextEncoding {
    pub const ALL: [TextEncoding; 30] = [
        Self::Utf8,
        Self::Utf16,
        Self::Utf16Le,
        Self::Utf16Be,
        Self::Utf32,
        Self::Utf32Le,
        Self::Utf32Be,
        Self::Ascii,
        Self::Latin1,
        Self::Cp1252,
        Self::Iso8859_1,
        Self::Iso8859_15,
        Self::Gbk,
        Self::Gb2312,
        Self::Gb18030,
        Self::Big5,
        Self::Big5Hkscs,
        Self::ShiftJis,
        Self::Cp932,
        Self::EucJp,
        Self::Iso2022Jp,
        Self::EucKr,
        Self::Cp949,
        Self::Iso2022Kr,
        Self::Koi8R,
        Self::Cp1251,
        Self::Iso8859_5,
        Self::Cp437,
        Self::Cp850,
        Self::Cp866,
    ];

    /// Registry id, e.g. `"shift_jis"`.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf16 => "utf-16",
            Self::Utf16Le => "utf-16le",
            Self::Utf16Be => "utf-16be",
            Self::Utf32 => "utf-32",
            Self::Utf32Le => "utf-32le",
            Self::Utf32Be => "utf-32be",
            Self::Ascii => "ascii",
            Self::Latin1 => "latin-1",
            Self::Cp1252 => "cp1252",
            Self::Iso8859_1 => "iso-8859-1",
            Self::Iso8859_15 => "iso-8859-15",
            Self::Gbk => "gbk",
            Self::Gb2312 => "gb2312",
            Self::Gb18030 => "gb18030",
            Self::Big5 => "big5",
            Self::Big5Hkscs => "big5hkscs",
            Self::ShiftJis => "shift_jis",
            Self::Cp932 => "cp932",
            Self::EucJp => "euc-jp",
            Self::Iso2022Jp => "iso-2022-jp",
            Self::EucKr => "euc-kr",
            Self::Cp949 => "cp949",
            Self::Iso2022Kr => "iso-2022-kr",
            Self::Koi8R => "koi8-r",
            Self::Cp1251 => "cp1251",
            Self::Iso8859_5 => "iso-8859-5",
            Self::Cp437 => "cp437",
            Self::Cp850 => "cp850",
            Self::Cp866 => "cp866",
        }
    }

    pub(crate) fn codec(&self) -> Codec {
        match self {
            Self::Utf8 => Codec::Whatwg(UTF_8),
            Self::Utf16 => Codec::Utf16 { big_endian: false, bom: true },
            Self::Utf16Le => Codec::Utf16 { big_endian: false, bom: false },
            Self::Utf16Be => Codec::Utf16 { big_endian: true, bom: false },
            Self::Utf32 => Codec::Utf32 { big_endian: false, bom: true },
            Self::Utf32Le => Codec::Utf32 { big_endian: false, bom: false },
            Self::Utf32Be => Codec::Utf32 { big_endian: true, bom: false },
            Self::Ascii => Codec::Ascii,
            Self::Latin1 | Self::Iso8859_1 => Codec::Latin1,
            Self::Cp1252 => Codec::Whatwg(WINDOWS_1252),
            Self::Iso8859_15 => Codec::Whatwg(ISO_8859_15),
            Self::Gbk => Codec::Whatwg(GBK),
            Self::Gb2312 => Codec::Restricted(GBK, DoubleByteRows::GB2312),
            Self::Gb18030 => Codec::Whatwg(GB18030),
            Self::Big5 | Self::Big5Hkscs => Codec::Whatwg(BIG5),
            Self::ShiftJis | Self::Cp932 => Codec::Whatwg(SHIFT_JIS),
            Self::EucJp => Codec::Whatwg(EUC_JP),
            Self::Iso2022Jp => Codec::Whatwg(ISO_2022_JP),
            Self::EucKr => Codec::Restricted(EUC_KR, DoubleByteRows::KS_X_1001),
            Self::Cp949 => Codec::Whatwg(EUC_KR),
            Self::Iso2022Kr => Codec::Iso2022Kr,
            Self::Koi8R => Codec::Whatwg(KOI8_R),
            Self::Cp1251 => Codec::Whatwg(WINDOWS_1251),
            Self::Iso8859_5 => Codec::Whatwg(ISO_8859_5),
            Self::Cp437 => Codec::Oem(&CP437),
            Self::Cp850 => Codec::Oem(&CP850),
            Self::Cp866 => Codec::Whatwg(IBM866),
        }
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        self.codec().encode(text, self.id())
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        self.codec().decode(bytes, self.id())
    }

    pub fn decode_lossy(&self, bytes: &[u8]) -> String {
        self.codec().decode_lossy(bytes)
    }

    /// Registry entry that uses the full table of a WHATWG encoding, if any.
    ///
    /// Row-restricted entries never match, so `EUC-KR` maps to `cp949` rather
    /// than `euc-kr`. Otherwise the first entry wins: `Shift_JIS` maps to
    /// `shift_jis` rather than `cp932`.
    pub fn from_whatwg(encoding: &'static Encoding) -> Option<Self> {
        if encoding == encoding_rs::UTF_16LE {
            return Some(Self::Utf16Le);
        }
        if encoding == encoding_rs::UTF_16BE {
            return Some(Self::Utf16Be);
        }
        Self::ALL
            .into_iter()
            .find(|candidate| matches!(candidate.codec(), Codec::Whatwg(backing) if backing == encoding))
    }
}

/// Lowercases and folds `_` into `-` so `Shift-JIS` and `shift_jis` agree.
fn normalize(id: &str) -> String {
    id.trim().to_ascii_lowercase().replace('_', "-")
}

impl std::str::FromStr for TextEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|encoding| normalize(encoding.id()) == wanted)
            .ok_or_else(|| Error::UnknownEncoding(s.to_string()))
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl Serialize for TextEncoding {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl<'de> Deserialize<'de> for TextEncoding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        id.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ids_loosely() {
        assert_eq!("UTF-8".parse::<TextEncoding>().unwrap(), TextEncoding::Utf8);
        assert_eq!("Shift-JIS".parse::<TextEncoding>().unwrap(), TextEncoding::ShiftJis);
        assert_eq!(" euc_kr ".parse::<TextEncoding>().unwrap(), TextEncoding::EucKr);
        assert_eq!(
            "ebcdic".parse::<TextEncoding>().unwrap_err(),
            Error::UnknownEncoding("ebcdic".into())
        );
    }

    #[test]
    fn ids_are_unique() {
        for (i, a) in TextEncoding::ALL.iter().enumerate() {
            for b in &TextEncoding::ALL[i + 1..] {
                assert_ne!(a.id(), b.id());
            }
        }
    }

    #[test]
    fn whatwg_lookup_prefers_canonical_entry() {
        assert_eq!(TextEncoding::from_whatwg(GBK), Some(TextEncoding::Gbk));
        assert_eq!(TextEncoding::from_whatwg(SHIFT_JIS), Some(TextEncoding::ShiftJis));
        assert_eq!(TextEncoding::from_whatwg(EUC_KR), Some(TextEncoding::Cp949));
        assert_eq!(TextEncoding::from_whatwg(encoding_rs::BIG5), Some(TextEncoding::Big5));
        assert_eq!(TextEncoding::from_whatwg(encoding_rs::WINDOWS_1250), None);
    }

    #[test]
    fn decodes_gbk_and_gb2312() {
        let bytes = [0xC4, 0xE3, 0xBA, 0xC3];
        assert_eq!(TextEncoding::Gbk.decode(&bytes).unwrap(), "你好");
        assert_eq!(TextEncoding::Gb2312.decode(&bytes).unwrap(), "你好");
    }

    #[test]
    fn serializes_as_id() {
        let json = serde_json::to_string(&TextEncoding::Big5Hkscs).unwrap();
        assert_eq!(json, "\"big5hkscs\"");
        let parsed: TextEncoding = serde_json::from_str("\"KOI8-R\"").unwrap();
        assert_eq!(parsed, TextEncoding::Koi8R);
    }
}
