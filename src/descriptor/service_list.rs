//! Service List descriptor (0x41): repeating 3-byte `(service_id, service_type)` records.

use crate::descriptor::{tag, Descriptor};
use crate::error::Result;

#[derive(Debug, Clone, Copy)]
pub struct ServiceListEntry {
    pub service_id: u16,
    pub service_type: u8,
}

#[derive(Debug, Clone)]
pub struct ServiceList {
    pub entries: Vec<ServiceListEntry>,
}

impl ServiceList {
    pub fn decode(desc: &Descriptor<'_>) -> Result<ServiceList> {
        debug_assert_eq!(desc.tag, tag::SERVICE_LIST);
        let data = &desc.data;
        // Count = data.len / 3; a trailing partial record is ignored rather than rejected, to
        // stay consistent with the tolerant TLV/loop style used throughout this module.
        let mut entries = Vec::with_capacity(data.len() / 3);
        let mut offset = 0;
        while offset + 3 <= data.len() {
            entries.push(ServiceListEntry {
                service_id: (u16::from(data[offset]) << 8) | u16::from(data[offset + 1]),
                service_type: data[offset + 2],
            });
            offset += 3;
        }
        if data.len() % 3 != 0 {
            return Err(crate::error::Error::MalformedDescriptor {
                tag: desc.tag,
                reason: format!("length {} is not a multiple of 3", data.len()),
            });
        }
        Ok(ServiceList { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn decodes_entries() {
        let d = Descriptor {
            tag: tag::SERVICE_LIST,
            data: Cow::Borrowed(&[0x01, 0x00, 0x01, 0x02, 0x00, 0x19][..]),
        };
        let sl = ServiceList::decode(&d).unwrap();
        assert_eq!(sl.entries.len(), 2);
        assert_eq!(sl.entries[0].service_id, 0x0100);
        assert_eq!(sl.entries[0].service_type, 0x01);
        assert_eq!(sl.entries[1].service_id, 0x0200);
        assert_eq!(sl.entries[1].service_type, 0x19);
    }

    #[test]
    fn rejects_non_multiple_of_three() {
        let d = Descriptor {
            tag: tag::SERVICE_LIST,
            data: Cow::Borrowed(&[0x01, 0x00][..]),
        };
        assert!(ServiceList::decode(&d).is_err());
    }
}
