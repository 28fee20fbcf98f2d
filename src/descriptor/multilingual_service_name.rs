//! Multilingual Service Name descriptor (0x5D): repeating
//! `(lang:24, provider_name_length:8, provider_name, service_name_length:8, service_name)`,
//! pre-indexed at construction.

use crate::descriptor::{require_len, tag, Descriptor};
use crate::error::Result;
use crate::text;

#[derive(Debug, Clone)]
pub struct MultilingualServiceNameEntry {
    pub lang: [u8; 3],
    pub provider_name: String,
    pub service_name: String,
}

#[derive(Debug, Clone)]
pub struct MultilingualServiceName {
    pub entries: Vec<MultilingualServiceNameEntry>,
}

impl MultilingualServiceName {
    pub fn decode(desc: &Descriptor<'_>) -> Result<MultilingualServiceName> {
        debug_assert_eq!(desc.tag, tag::MULTILINGUAL_SERVICE_NAME);
        let data: &[u8] = &desc.data;
        let mut entries = Vec::new();
        let mut offset = 0;
        while offset + 4 <= data.len() {
            let lang = [data[offset], data[offset + 1], data[offset + 2]];
            let l1 = usize::from(data[offset + 3]);
            require_len(desc.tag, data, offset + 4 + l1 + 1)?;
            let provider_name = text::decode(&data[offset + 4..offset + 4 + l1])?;

            let l2_offset = offset + 4 + l1;
            let l2 = usize::from(data[l2_offset]);
            require_len(desc.tag, data, l2_offset + 1 + l2)?;
            let service_name = text::decode(&data[l2_offset + 1..l2_offset + 1 + l2])?;

            entries.push(MultilingualServiceNameEntry {
                lang,
                provider_name,
                service_name,
            });
            offset = l2_offset + 1 + l2;
        }
        Ok(MultilingualServiceName { entries })
    }
}
