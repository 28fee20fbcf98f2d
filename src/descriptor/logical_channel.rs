//! Logical Channel descriptor: repeating 4-byte records `(service_id:16, visible:1, reserved:5,
//! lcn:10)`. Carried under the standard tag 0x83 and the common private alias 0x9C; both decode
//! identically.

use crate::descriptor::{tag, Descriptor};
use crate::error::Result;

#[derive(Debug, Clone, Copy)]
pub struct LogicalChannelEntry {
    pub service_id: u16,
    pub visible: bool,
    pub lcn: u16,
}

#[derive(Debug, Clone)]
pub struct LogicalChannel {
    pub entries: Vec<LogicalChannelEntry>,
}

impl LogicalChannel {
    pub fn decode(desc: &Descriptor<'_>) -> Result<LogicalChannel> {
        debug_assert!(desc.tag == tag::LOGICAL_CHANNEL || desc.tag == tag::LOGICAL_CHANNEL_PRIVATE);
        let data: &[u8] = &desc.data;
        let mut entries = Vec::with_capacity(data.len() / 4);
        let mut offset = 0;
        while offset + 4 <= data.len() {
            let service_id = u16::from_be_bytes([data[offset], data[offset + 1]]);
            let word = u16::from_be_bytes([data[offset + 2], data[offset + 3]]);
            entries.push(LogicalChannelEntry {
                service_id,
                visible: word & 0x8000 != 0,
                lcn: word & 0x03ff,
            });
            offset += 4;
        }
        Ok(LogicalChannel { entries })
    }
}
