//! UTF-16 and UTF-32 in both byte orders, with optional BOM.
//!
//! The BOM-carrying forms write a little-endian BOM and, when decoding, follow
//! whichever BOM is present (little-endian if none is).

use crate::error::{Error, Result};

const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;

pub(super) fn encode_utf16(text: &str, big_endian: bool, bom: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2 + 2);
    if bom {
        out.extend_from_slice(&[0xFF, 0xFE]);
    }
    let big_endian = big_endian && !bom;
    for unit in text.encode_utf16() {
        let bytes = if big_endian { unit.to_be_bytes() } else { unit.to_le_bytes() };
        out.extend_from_slice(&bytes);
    }
    out
}

pub(super) fn encode_utf32(text: &str, big_endian: bool, bom: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 4 + 4);
    if bom {
        out.extend_from_slice(&[0xFF, 0xFE, 0x00, 0x00]);
    }
    let big_endian = big_endian && !bom;
    for ch in text.chars() {
        let value = ch as u32;
        let bytes = if big_endian { value.to_be_bytes() } else { value.to_le_bytes() };
        out.extend_from_slice(&bytes);
    }
    out
}

/// Strips a UTF-16 BOM when `bom` is set and returns the body with its order.
fn utf16_body(bytes: &[u8], big_endian: bool, bom: bool) -> (&[u8], bool, usize) {
    if bom {
        match bytes {
            [0xFF, 0xFE, rest @ ..] => return (rest, false, 2),
            [0xFE, 0xFF, rest @ ..] => return (rest, true, 2),
            _ => return (bytes, false, 0),
        }
    }
    (bytes, big_endian, 0)
}

fn utf32_body(bytes: &[u8], big_endian: bool, bom: bool) -> (&[u8], bool, usize) {
    if bom {
        match bytes {
            [0xFF, 0xFE, 0x00, 0x00, rest @ ..] => return (rest, false, 4),
            [0x00, 0x00, 0xFE, 0xFF, rest @ ..] => return (rest, true, 4),
            _ => return (bytes, false, 0),
        }
    }
    (bytes, big_endian, 0)
}

fn units(body: &[u8], big_endian: bool) -> impl Iterator<Item = u16> + '_ {
    body.chunks_exact(2).map(move |pair| {
        let pair = [pair[0], pair[1]];
        if big_endian { u16::from_be_bytes(pair) } else { u16::from_le_bytes(pair) }
    })
}

pub(super) fn decode_utf16(bytes: &[u8], big_endian: bool, bom: bool, name: &'static str) -> Result<String> {
    let (body, big_endian, start) = utf16_body(bytes, big_endian, bom);
    let mut out = String::with_capacity(body.len() / 2);
    let mut offset = start;
    for decoded in char::decode_utf16(units(body, big_endian)) {
        match decoded {
            Ok(ch) => {
                out.push(ch);
                offset += ch.len_utf16() * 2;
            }
            Err(_) => return Err(Error::DecodingError { encoding: name, offset }),
        }
    }
    if body.len() % 2 != 0 {
        return Err(Error::DecodingError { encoding: name, offset: bytes.len() - 1 });
    }
    Ok(out)
}

pub(super) fn decode_utf16_lossy(bytes: &[u8], big_endian: bool, bom: bool) -> String {
    let (body, big_endian, _) = utf16_body(bytes, big_endian, bom);
    let mut out: String = char::decode_utf16(units(body, big_endian))
        .map(|r| r.unwrap_or(REPLACEMENT))
        .collect();
    if body.len() % 2 != 0 {
        out.push(REPLACEMENT);
    }
    out
}

fn scalar(quad: &[u8], big_endian: bool) -> Option<char> {
    let quad = [quad[0], quad[1], quad[2], quad[3]];
    let value = if big_endian { u32::from_be_bytes(quad) } else { u32::from_le_bytes(quad) };
    char::from_u32(value)
}

pub(super) fn decode_utf32(bytes: &[u8], big_endian: bool, bom: bool, name: &'static str) -> Result<String> {
    let (body, big_endian, start) = utf32_body(bytes, big_endian, bom);
    let mut out = String::with_capacity(body.len() / 4);
    for (index, quad) in body.chunks_exact(4).enumerate() {
        match scalar(quad, big_endian) {
            Some(ch) => out.push(ch),
            None => return Err(Error::DecodingError { encoding: name, offset: start + index * 4 }),
        }
    }
    if body.len() % 4 != 0 {
        let offset = start + body.len() - body.len() % 4;
        return Err(Error::DecodingError { encoding: name, offset });
    }
    Ok(out)
}

pub(super) fn decode_utf32_lossy(bytes: &[u8], big_endian: bool, bom: bool) -> String {
    let (body, big_endian, _) = utf32_body(bytes, big_endian, bom);
    let mut out: String = body
        .chunks_exact(4)
        .map(|quad| scalar(quad, big_endian).unwrap_or(REPLACEMENT))
        .collect();
    if body.len() % 4 != 0 {
        out.push(REPLACEMENT);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf16_variants() {
        assert_eq!(encode_utf16("A", false, true), vec![0xFF, 0xFE, 0x41, 0x00]);
        assert_eq!(encode_utf16("A", false, false), vec![0x41, 0x00]);
        assert_eq!(encode_utf16("A", true, false), vec![0x00, 0x41]);
        assert_eq!(encode_utf16("😀", true, false), vec![0xD8, 0x3D, 0xDE, 0x00]);
    }

    #[test]
    fn utf16_bom_selects_order() {
        assert_eq!(decode_utf16(&[0xFE, 0xFF, 0x4E, 0x2D], false, true, "utf-16").unwrap(), "中");
        assert_eq!(decode_utf16(&[0xFF, 0xFE, 0x2D, 0x4E], false, true, "utf-16").unwrap(), "中");
        assert_eq!(decode_utf16(&[0x2D, 0x4E], false, true, "utf-16").unwrap(), "中");
    }

    #[test]
    fn utf16_lone_surrogate_fails() {
        let err = decode_utf16(&[0x41, 0x00, 0x00, 0xD8], false, false, "utf-16le").unwrap_err();
        assert_eq!(err, Error::DecodingError { encoding: "utf-16le", offset: 2 });
        assert_eq!(decode_utf16_lossy(&[0x41, 0x00, 0x00, 0xD8], false, false), "A\u{FFFD}");
    }

    #[test]
    fn utf16_odd_length_fails() {
        assert!(decode_utf16(&[0x41, 0x00, 0x42], false, false, "utf-16le").is_err());
        assert_eq!(decode_utf16_lossy(&[0x41, 0x00, 0x42], false, false), "A\u{FFFD}");
    }

    #[test]
    fn utf32_variants() {
        assert_eq!(encode_utf32("A", false, true), vec![0xFF, 0xFE, 0, 0, 0x41, 0, 0, 0]);
        assert_eq!(encode_utf32("A", true, false), vec![0, 0, 0, 0x41]);
        assert_eq!(decode_utf32(&[0, 0, 0xFE, 0xFF, 0, 0, 0x4E, 0x2D], false, true, "utf-32").unwrap(), "中");
        let err = decode_utf32(&[0, 0, 0x11, 0x00], false, false, "utf-32le").unwrap_err();
        assert_eq!(err, Error::DecodingError { encoding: "utf-32le", offset: 0 });
    }
}
