//! Service Description Table, grounded on `SectionList::buildSdt` in
//! `original_source/sectionparser/src/sectionlist.cpp`.
//!
//! `free_ca_mode` is exposed unchanged from the wire rather than pre-negated: the original's
//! `DvbService::isScrambled()` and its EIT counterpart disagreed on polarity, a divergence no
//! test in the original ever exercised. `scrambled()` is a straight passthrough here and on
//! `eit::Event`.

use crate::bytes::Bytes;
use crate::descriptor::parse_descriptors;
use crate::error::{Error, Result};
use crate::group::OwnedSection;
use crate::table::{OwnedDescriptors, TableHeader};

#[derive(Debug, Clone)]
pub struct Service {
    pub service_id: u16,
    pub eit_schedule_flag: bool,
    pub eit_pf_flag: bool,
    pub running_status: u8,
    pub free_ca_mode: bool,
    pub descriptors: OwnedDescriptors,
}

impl Service {
    pub fn scrambled(&self) -> bool {
        self.free_ca_mode
    }
}

#[derive(Debug, Clone)]
pub struct Sdt {
    pub header: TableHeader,
    pub transport_stream_id: u16,
    pub original_network_id: u16,
    pub services: Vec<Service>,
}

impl Sdt {
    pub fn build(header: TableHeader, sections: &[OwnedSection]) -> Result<Sdt> {
        let first = sections
            .first()
            .ok_or_else(|| Error::InvalidArgument("empty section group".into()))?;
        if first.payload.len() < 2 {
            return Err(Error::TruncatedSection {
                need: 2,
                have: first.payload.len(),
            });
        }
        let original_network_id = Bytes::new(&first.payload).u16(0)?;

        let mut services = Vec::new();
        for section in sections {
            let payload = &section.payload;
            let mut offset = 3;
            while payload.len() >= offset + 5 {
                let service_id = Bytes::new(payload).u16(offset)?;
                let flags = payload[offset + 2];
                let eit_schedule_flag = flags & 0x02 != 0;
                let eit_pf_flag = flags & 0x01 != 0;
                let running_byte = payload[offset + 3];
                let running_status = running_byte >> 5;
                let free_ca_mode = running_byte & 0x10 != 0;
                let desc_len =
                    (usize::from(running_byte & 0x0f) << 8) | usize::from(payload[offset + 4]);
                offset += 5;
                if offset + desc_len > payload.len() {
                    break;
                }
                let descriptors: OwnedDescriptors = parse_descriptors(&payload[offset..offset + desc_len])
                    .into_iter()
                    .map(|d| d.to_owned_descriptor())
                    .collect();
                services.push(Service {
                    service_id,
                    eit_schedule_flag,
                    eit_pf_flag,
                    running_status,
                    free_ca_mode,
                    descriptors,
                });
                offset += desc_len;
            }
        }

        Ok(Sdt {
            header,
            transport_stream_id: header.extension_id,
            original_network_id,
            services,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::table_id;

    #[test]
    fn builds_one_service() {
        let mut payload = vec![0x00, 0x09, 0x00]; // original_network_id=9, reserved
        payload.extend_from_slice(&[0x00, 0x05, 0x01, 0x30, 0x00]); // service_id=5, flags, running/scrambled, len=0
        let section = OwnedSection {
            table_id: table_id::SDT,
            long_form: true,
            extension_id: 7,
            version: 0,
            current: true,
            number: 0,
            last_number: 0,
            payload,
        };
        let header = TableHeader {
            table_id: table_id::SDT,
            extension_id: 7,
            version: 0,
            current: true,
        };
        let sdt = Sdt::build(header, &[section]).unwrap();
        assert_eq!(sdt.original_network_id, 9);
        assert_eq!(sdt.transport_stream_id, 7);
        assert_eq!(sdt.services.len(), 1);
        assert_eq!(sdt.services[0].service_id, 5);
        assert!(sdt.services[0].eit_pf_flag);
        assert!(!sdt.services[0].eit_schedule_flag);
        assert!(sdt.services[0].scrambled());
        assert_eq!(sdt.services[0].running_status, 1);
    }
}
