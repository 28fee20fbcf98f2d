//! Multilingual Network Name descriptor (0x5B): repeating `(lang:24, name_length:8, name)`,
//! pre-indexed at construction.

use crate::descriptor::{require_len, tag, Descriptor};
use crate::error::Result;
use crate::text;

#[derive(Debug, Clone)]
pub struct MultilingualNetworkNameEntry {
    pub lang: [u8; 3],
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct MultilingualNetworkName {
    pub entries: Vec<MultilingualNetworkNameEntry>,
}

impl MultilingualNetworkName {
    pub fn decode(desc: &Descriptor<'_>) -> Result<MultilingualNetworkName> {
        debug_assert_eq!(desc.tag, tag::MULTILINGUAL_NETWORK_NAME);
        let data: &[u8] = &desc.data;
        let mut entries = Vec::new();
        let mut offset = 0;
        while offset + 4 <= data.len() {
            let lang = [data[offset], data[offset + 1], data[offset + 2]];
            let len = usize::from(data[offset + 3]);
            require_len(desc.tag, data, offset + 4 + len)?;
            let name = text::decode(&data[offset + 4..offset + 4 + len])?;
            entries.push(MultilingualNetworkNameEntry { lang, name });
            offset += 4 + len;
        }
        Ok(MultilingualNetworkName { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn decodes_two_languages() {
        let data = [
            b'e', b'n', b'g', 2, b'U', b'K', b'f', b'r', b'a', 2, b'F', b'R',
        ];
        let d = Descriptor {
            tag: tag::MULTILINGUAL_NETWORK_NAME,
            data: Cow::Borrowed(&data[..]),
        };
        let mnn = MultilingualNetworkName::decode(&d).unwrap();
        assert_eq!(mnn.entries.len(), 2);
        assert_eq!(&mnn.entries[0].lang, b"eng");
        assert_eq!(mnn.entries[0].name, "UK");
        assert_eq!(&mnn.entries[1].lang, b"fra");
        assert_eq!(mnn.entries[1].name, "FR");
    }
}
