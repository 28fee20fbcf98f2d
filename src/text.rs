//! ETSI EN 300 468 Annex A byte-to-UTF-8 text decoding.
//!
//! Grounded on `en-300-468-reader`, which reaches for `encoding_rs` to cover the ISO-8859
//! family rather than hand-rolling a codec table. This crate only needs the default (Latin-1)
//! leg fully implemented; the control-character-selected alternative tables are acknowledged but
//! not translated, matching the specification's "MAY be stubbed to unsupported" allowance.

use crate::error::{Error, Result};

/// Decodes an EN 300 468 Annex A text field to a `String`.
///
/// - Empty input yields an empty string.
/// - If the first byte is `>= 0x20`, the whole buffer is decoded as ISO-8859-1.
/// - A leading byte in `0x01..=0x0F` selects one of the other Annex A single-byte tables; a
///   leading `0x10` is followed by a 2-byte code page selector; a leading byte in `0x11..=0x1F`
///   selects a multi-byte table. None of those are implemented here: they decode to a
///   diagnostic placeholder rather than to the "true" text.
pub fn decode(data: &[u8]) -> Result<String> {
    if data.is_empty() {
        return Ok(String::new());
    }
    let first = data[0];
    if first >= 0x20 {
        return Ok(encoding_rs::mem::decode_latin1(data).into_owned());
    }
    if first == 0x10 {
        if data.len() < 3 {
            return Err(Error::InvalidArgument(
                "0x10 control prefix needs a 2-byte code page selector".into(),
            ));
        }
        return Ok(unsupported_placeholder(data));
    }
    // 0x01..=0x0F and 0x11..=0x1F: other Annex A tables, not implemented.
    Ok(unsupported_placeholder(data))
}

fn unsupported_placeholder(data: &[u8]) -> String {
    format!("<unsupported EN 300 468 text, {} byte(s)>", data.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_empty() {
        assert_eq!(decode(&[]).unwrap(), "");
    }

    #[test]
    fn plain_latin1() {
        assert_eq!(decode(b"TEST").unwrap(), "TEST");
    }

    #[test]
    fn control_prefix_is_stubbed() {
        let got = decode(&[0x05, 0x41, 0x42]).unwrap();
        assert!(got.contains("unsupported"));
    }

    #[test]
    fn code_page_prefix_needs_selector() {
        assert!(decode(&[0x10, 0x00]).is_err());
        assert!(decode(&[0x10, 0x00, 0x01, 0x41]).is_ok());
    }
}
