//! Short Event descriptor (0x4D): `lang:24, event_name_length:8, event_name, text_length:8, text`.

use crate::descriptor::{require_len, tag, Descriptor};
use crate::error::Result;
use crate::text;

#[derive(Debug, Clone)]
pub struct ShortEvent {
    pub lang: [u8; 3],
    pub event_name: String,
    pub text: String,
}

impl ShortEvent {
    pub fn decode(desc: &Descriptor<'_>) -> Result<ShortEvent> {
        debug_assert_eq!(desc.tag, tag::SHORT_EVENT);
        let data: &[u8] = &desc.data;
        require_len(desc.tag, data, 4)?;

        let lang = [data[0], data[1], data[2]];
        let name_len = usize::from(data[3]);
        require_len(desc.tag, data, 4 + name_len + 1)?;
        let event_name = text::decode(&data[4..4 + name_len])?;

        let text_len_offset = 4 + name_len;
        let text_len = usize::from(data[text_len_offset]);
        require_len(desc.tag, data, text_len_offset + 1 + text_len)?;
        let text = text::decode(&data[text_len_offset + 1..text_len_offset + 1 + text_len])?;

        Ok(ShortEvent {
            lang,
            event_name,
            text,
        })
    }
}
