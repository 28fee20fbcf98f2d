//! Extended Event descriptor (0x4E).
//!
//! `descriptor_number:4, last_descriptor_number:4, lang:24, items_length:8, items[…],
//! text_length:8, text`, each item `description_length:8, description, item_length:8, item`.
//! Items are pre-indexed at construction (offsets collected into a `Vec`) so [`ExtendedEvent::item`]
//! is O(1) instead of walking the TLV chain per lookup, replacing the original's linked-list item
//! traversal.

use crate::descriptor::{require_len, tag, Descriptor};
use crate::error::Result;
use crate::text;

#[derive(Debug, Clone)]
pub struct ExtendedEventItem {
    pub description: String,
    pub item: String,
}

#[derive(Debug, Clone)]
pub struct ExtendedEvent {
    pub descriptor_number: u8,
    pub last_descriptor_number: u8,
    pub lang: [u8; 3],
    pub items: Vec<ExtendedEventItem>,
    pub text: String,
}

impl ExtendedEvent {
    pub fn decode(desc: &Descriptor<'_>) -> Result<ExtendedEvent> {
        debug_assert_eq!(desc.tag, tag::EXTENDED_EVENT);
        let data: &[u8] = &desc.data;
        require_len(desc.tag, data, 5)?;

        let descriptor_number = data[0] >> 4;
        let last_descriptor_number = data[0] & 0x0f;
        let lang = [data[1], data[2], data[3]];
        let items_len = usize::from(data[4]);
        require_len(desc.tag, data, 5 + items_len + 1)?;

        let mut items = Vec::new();
        let mut offset = 5;
        let items_end = 5 + items_len;
        while offset < items_end {
            require_len(desc.tag, data, offset + 1)?;
            let desc_len = usize::from(data[offset]);
            require_len(desc.tag, data, offset + 1 + desc_len + 1)?;
            let description = text::decode(&data[offset + 1..offset + 1 + desc_len])?;

            let item_len_offset = offset + 1 + desc_len;
            let item_len = usize::from(data[item_len_offset]);
            require_len(desc.tag, data, item_len_offset + 1 + item_len)?;
            let item = text::decode(&data[item_len_offset + 1..item_len_offset + 1 + item_len])?;

            items.push(ExtendedEventItem { description, item });
            offset = item_len_offset + 1 + item_len;
        }

        let text_len_offset = items_end;
        let text_len = usize::from(data[text_len_offset]);
        require_len(desc.tag, data, text_len_offset + 1 + text_len)?;
        let text = text::decode(&data[text_len_offset + 1..text_len_offset + 1 + text_len])?;

        Ok(ExtendedEvent {
            descriptor_number,
            last_descriptor_number,
            lang,
            items,
            text,
        })
    }

    /// O(1) access to a pre-indexed item.
    pub fn item(&self, index: usize) -> Option<&ExtendedEventItem> {
        self.items.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn decodes_items_and_text() {
        let mut data = vec![0x12u8, b'e', b'n', b'g'];
        let item1 = [4u8, b'D', b'e', b's', b'1', 2, b'I', b'1'];
        let item2 = [4u8, b'D', b'e', b's', b'2', 2, b'I', b'2'];
        let items_len = (item1.len() + item2.len()) as u8;
        data.push(items_len);
        data.extend_from_slice(&item1);
        data.extend_from_slice(&item2);
        data.push(3);
        data.extend_from_slice(b"Txt");

        let d = Descriptor {
            tag: tag::EXTENDED_EVENT,
            data: Cow::Borrowed(&data[..]),
        };
        let ee = ExtendedEvent::decode(&d).unwrap();
        assert_eq!(ee.descriptor_number, 1);
        assert_eq!(ee.last_descriptor_number, 2);
        assert_eq!(ee.items.len(), 2);
        assert_eq!(ee.item(0).unwrap().description, "Des1");
        assert_eq!(ee.item(1).unwrap().item, "I2");
        assert_eq!(ee.text, "Txt");
    }

    #[test]
    fn rejects_truncated_item_chain() {
        let data = [0x00u8, b'e', b'n', b'g', 5, 4, b'D', b'e', b's'];
        let d = Descriptor {
            tag: tag::EXTENDED_EVENT,
            data: Cow::Borrowed(&data[..]),
        };
        assert!(ExtendedEvent::decode(&d).is_err());
    }
}
