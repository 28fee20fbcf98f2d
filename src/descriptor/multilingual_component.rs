//! Multilingual Component descriptor (0x5E): one `component_tag:8` followed by repeating
//! `(lang:24, text_length:8, text)`.

use crate::descriptor::{require_len, tag, Descriptor};
use crate::error::Result;
use crate::text;

#[derive(Debug, Clone)]
pub struct MultilingualComponentEntry {
    pub lang: [u8; 3],
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct MultilingualComponent {
    pub component_tag: u8,
    pub entries: Vec<MultilingualComponentEntry>,
}

impl MultilingualComponent {
    pub fn decode(desc: &Descriptor<'_>) -> Result<MultilingualComponent> {
        debug_assert_eq!(desc.tag, tag::MULTILINGUAL_COMPONENT);
        let data: &[u8] = &desc.data;
        require_len(desc.tag, data, 1)?;
        let component_tag = data[0];

        let mut entries = Vec::new();
        let mut offset = 1;
        while offset + 4 <= data.len() {
            let lang = [data[offset], data[offset + 1], data[offset + 2]];
            let len = usize::from(data[offset + 3]);
            require_len(desc.tag, data, offset + 4 + len)?;
            let text = text::decode(&data[offset + 4..offset + 4 + len])?;
            entries.push(MultilingualComponentEntry { lang, text });
            offset += 4 + len;
        }
        Ok(MultilingualComponent {
            component_tag,
            entries,
        })
    }
}
