//! Event Information Table, grounded on `SectionList::buildEit` in
//! `original_source/sectionparser/src/sectionlist.cpp`.
//!
//! The original's scrambled-bit extraction masks `payload[10] & 0x8`, which falls inside the
//! `descriptors_loop_length` high nibble rather than the `free_ca_mode` bit (`0x10`) the section
//! layout actually assigns it. This builder uses `0x10`, matching the layout `running_status:3,
//! free_ca_mode:1, descriptors_loop_length:12` and the same bit this crate's SDT builder already
//! uses for `Service::scrambled`.

use crate::bytes::Bytes;
use crate::descriptor::parse_descriptors;
use crate::error::{Error, Result};
use crate::group::OwnedSection;
use crate::table::{OwnedDescriptors, TableHeader};

#[derive(Debug, Clone)]
pub struct Event {
    pub event_id: u16,
    pub start_time_mjd_bcd: u64,
    pub duration_bcd: u32,
    pub running_status: u8,
    pub free_ca_mode: bool,
    pub nvod: bool,
    pub descriptors: OwnedDescriptors,
}

impl Event {
    pub fn scrambled(&self) -> bool {
        self.free_ca_mode
    }
}

#[derive(Debug, Clone)]
pub struct Eit {
    pub header: TableHeader,
    pub service_id: u16,
    pub transport_stream_id: u16,
    pub network_id: u16,
    pub last_table_id: u8,
    pub events: Vec<Event>,
}

impl Eit {
    pub fn build(header: TableHeader, sections: &[OwnedSection]) -> Result<Eit> {
        let first = sections
            .first()
            .ok_or_else(|| Error::InvalidArgument("empty section group".into()))?;
        if first.payload.len() < 6 {
            return Err(Error::TruncatedSection {
                need: 6,
                have: first.payload.len(),
            });
        }
        let fb = Bytes::new(&first.payload);
        let transport_stream_id = fb.u16(0)?;
        let network_id = fb.u16(2)?;
        let last_table_id = fb.u8(5)?;

        let mut events = Vec::new();
        for section in sections {
            let payload = &section.payload;
            let mut offset = 6;
            while offset + 12 <= payload.len() {
                let b = Bytes::new(payload);
                let event_id = b.u16(offset)?;
                let start_time_mjd_bcd = b.u40(offset + 2)?;
                let duration_bcd = b.u24(offset + 7)?;
                let flags = payload[offset + 10];
                let running_status = flags >> 5;
                let free_ca_mode = flags & 0x10 != 0;
                let desc_len = (usize::from(flags & 0x0f) << 8) | usize::from(payload[offset + 11]);
                offset += 12;
                if offset + desc_len > payload.len() {
                    break;
                }
                let nvod = (start_time_mjd_bcd & 0xFFFFF000) == 0xFFFFF000 && running_status == 0;
                let descriptors: OwnedDescriptors =
                    parse_descriptors(&payload[offset..offset + desc_len])
                        .into_iter()
                        .map(|d| d.to_owned_descriptor())
                        .collect();
                events.push(Event {
                    event_id,
                    start_time_mjd_bcd,
                    duration_bcd,
                    running_status,
                    free_ca_mode,
                    nvod,
                    descriptors,
                });
                offset += desc_len;
            }
        }

        Ok(Eit {
            header,
            service_id: header.extension_id,
            transport_stream_id,
            network_id,
            last_table_id,
            events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::table_id;

    #[test]
    fn builds_one_event() {
        let mut payload = vec![0x00, 0x01, 0x00, 0x02, 0x00, 0x03]; // ts_id, net_id, seg_last, last_table_id
        payload.extend_from_slice(&[
            0x00, 0x05, // event_id
            0x00, 0x00, 0xDA, 0x6C, 0x00, // start_time mjd+bcd (40 bit)
            0x00, 0x01, 0x00, // duration
            0x30, 0x00, // running_status=1, scrambled, desc_len=0
        ]);
        let section = OwnedSection {
            table_id: table_id::EIT_PF,
            long_form: true,
            extension_id: 9,
            version: 0,
            current: true,
            number: 0,
            last_number: 0,
            payload,
        };
        let header = TableHeader {
            table_id: table_id::EIT_PF,
            extension_id: 9,
            version: 0,
            current: true,
        };
        let eit = Eit::build(header, &[section]).unwrap();
        assert_eq!(eit.service_id, 9);
        assert_eq!(eit.transport_stream_id, 1);
        assert_eq!(eit.network_id, 2);
        assert_eq!(eit.last_table_id, 3);
        assert_eq!(eit.events.len(), 1);
        assert_eq!(eit.events[0].event_id, 5);
        assert_eq!(eit.events[0].running_status, 1);
        assert!(eit.events[0].scrambled());
    }
}
