//! Local Time Offset descriptor (0x58): repeating 13-byte records
//! `(country:24, region_id:6, reserved:1, polarity:1, offset:16, time_of_change_mjd:40,
//! next_offset:16)`.

use crate::descriptor::{tag, Descriptor};
use crate::error::Result;

#[derive(Debug, Clone, Copy)]
pub struct LocalTimeOffsetEntry {
    pub country: [u8; 3],
    pub region_id: u8,
    /// `true` for a negative (west of Greenwich) offset.
    pub negative: bool,
    /// BCD-encoded HHMM offset from UTC, as carried on the wire.
    pub offset_bcd: u16,
    /// MJD + BCD time at which `next_offset_bcd` takes effect.
    pub time_of_change: u64,
    pub next_offset_bcd: u16,
}

#[derive(Debug, Clone)]
pub struct LocalTimeOffset {
    pub entries: Vec<LocalTimeOffsetEntry>,
}

impl LocalTimeOffset {
    pub fn decode(desc: &Descriptor<'_>) -> Result<LocalTimeOffset> {
        debug_assert_eq!(desc.tag, tag::LOCAL_TIME_OFFSET);
        let data: &[u8] = &desc.data;
        let mut entries = Vec::with_capacity(data.len() / 13);
        let mut offset = 0;
        while offset + 13 <= data.len() {
            let country = [data[offset], data[offset + 1], data[offset + 2]];
            let region_id = data[offset + 3] >> 2;
            let negative = data[offset + 3] & 0x01 != 0;
            let offset_bcd = u16::from_be_bytes([data[offset + 4], data[offset + 5]]);
            let mut time_bytes = [0u8; 8];
            time_bytes[3..8].copy_from_slice(&data[offset + 6..offset + 11]);
            let time_of_change = u64::from_be_bytes(time_bytes);
            let next_offset_bcd = u16::from_be_bytes([data[offset + 11], data[offset + 12]]);
            entries.push(LocalTimeOffsetEntry {
                country,
                region_id,
                negative,
                offset_bcd,
                time_of_change,
                next_offset_bcd,
            });
            offset += 13;
        }
        Ok(LocalTimeOffset { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn decodes_single_entry() {
        let data = [
            b'g', b'b', b'r', // country
            0b0000_0101, // region_id=1, reserved bit, polarity=1 (negative)
            0x01, 0x00, // offset_bcd = 0x0100
            0x00, 0x00, 0xDA, 0x6C, 0x00, // time_of_change_mjd 40-bit
            0x02, 0x00, // next_offset_bcd
        ];
        let d = Descriptor {
            tag: tag::LOCAL_TIME_OFFSET,
            data: Cow::Borrowed(&data[..]),
        };
        let lto = LocalTimeOffset::decode(&d).unwrap();
        assert_eq!(lto.entries.len(), 1);
        let e = &lto.entries[0];
        assert_eq!(&e.country, b"gbr");
        assert_eq!(e.region_id, 1);
        assert!(e.negative);
        assert_eq!(e.offset_bcd, 0x0100);
        assert_eq!(e.next_offset_bcd, 0x0200);
    }
}
