//! ISO-2022-KR: KS X 1001 in 7-bit form, designated once with `ESC $ ) C`
//! and switched in and out with SO / SI.

use encoding_rs::EUC_KR;

use crate::error::{Error, Result};

const DESIGNATOR: [u8; 4] = [0x1B, b'$', b')', b'C'];
const SO: u8 = 0x0E;
const SI: u8 = 0x0F;

pub(super) fn encode(text: &str, name: &'static str) -> Result<Vec<u8>> {
    let mut out = DESIGNATOR.to_vec();
    let mut shifted = false;
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        if ch.is_ascii() {
            if matches!(ch as u8, 0x1B | SO | SI) {
                return Err(Error::EncodingUnrepresentable { ch, encoding: name });
            }
            if shifted {
                out.push(SI);
                shifted = false;
            }
            out.push(ch as u8);
            continue;
        }
        let (bytes, _, unmappable) = EUC_KR.encode(ch.encode_utf8(&mut buf));
        match *bytes {
            [lead, trail] if !unmappable && lead >= 0xA1 && trail >= 0xA1 => {
                if !shifted {
                    out.push(SO);
                    shifted = true;
                }
                out.push(lead & 0x7F);
                out.push(trail & 0x7F);
            }
            _ => return Err(Error::EncodingUnrepresentable { ch, encoding: name }),
        }
    }
    if shifted {
        out.push(SI);
    }
    Ok(out)
}

fn decode_pair(lead: u8, trail: u8) -> Option<char> {
    if !(0x21..=0x7E).contains(&lead) || !(0x21..=0x7E).contains(&trail) {
        return None;
    }
    let pair = [lead | 0x80, trail | 0x80];
    let text = EUC_KR.decode_without_bom_handling_and_without_replacement(&pair)?;
    text.chars().next()
}

/// Shared state machine; `on_error` decides whether to bail or substitute.
fn run(bytes: &[u8], mut on_error: impl FnMut(usize, &mut String) -> bool) -> Option<String> {
    let mut out = String::with_capacity(bytes.len());
    let mut designated = false;
    let mut shifted = false;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if bytes[i..].starts_with(&DESIGNATOR) {
            designated = true;
            i += DESIGNATOR.len();
            continue;
        }
        let step = match b {
            SO if designated => {
                shifted = true;
                1
            }
            SI => {
                shifted = false;
                1
            }
            b'\n' | b'\r' => {
                shifted = false;
                out.push(b as char);
                1
            }
            _ if shifted && b > 0x20 => match bytes.get(i + 1).and_then(|&trail| decode_pair(b, trail)) {
                Some(ch) => {
                    out.push(ch);
                    2
                }
                None if on_error(i, &mut out) => 1,
                None => return None,
            },
            0x00..=0x7F if b != 0x1B && b != SO => {
                out.push(b as char);
                1
            }
            _ if on_error(i, &mut out) => 1,
            _ => return None,
        };
        i += step;
    }
    Some(out)
}

pub(super) fn decode(bytes: &[u8], name: &'static str) -> Result<String> {
    let mut failed_at = 0;
    run(bytes, |offset, _| {
        failed_at = offset;
        false
    })
    .ok_or(Error::DecodingError { encoding: name, offset: failed_at })
}

pub(super) fn decode_lossy(bytes: &[u8]) -> String {
    run(bytes, |_, out| {
        out.push(char::REPLACEMENT_CHARACTER);
        true
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_hangul_with_shifts() {
        let bytes = encode("a가", "iso-2022-kr").unwrap();
        assert_eq!(bytes, vec![0x1B, b'$', b')', b'C', b'a', SO, 0x30, 0x21, SI]);
    }

    #[test]
    fn decodes_what_it_encodes() {
        let bytes = encode("한국어 text", "iso-2022-kr").unwrap();
        assert_eq!(decode(&bytes, "iso-2022-kr").unwrap(), "한국어 text");
    }

    #[test]
    fn pairs_map_through_the_ks_x_1001_table() {
        assert_eq!(decode_pair(0x30, 0x21), Some('가'));
        assert_eq!(decode_pair(0x20, 0x21), None);
    }

    #[test]
    fn shift_without_designator_fails() {
        let err = decode(&[SO, 0x30, 0x21], "iso-2022-kr").unwrap_err();
        assert_eq!(err, Error::DecodingError { encoding: "iso-2022-kr", offset: 0 });
        assert_eq!(decode_lossy(&[SO, b'a']), "\u{FFFD}a");
    }

    #[test]
    fn rejects_characters_outside_ks_x_1001() {
        assert!(encode("갂", "iso-2022-kr").is_err());
        assert!(encode("ก", "iso-2022-kr").is_err());
    }
}
