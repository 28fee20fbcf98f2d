//! Time and Date / Time Offset Table, grounded on `SectionList::buildTot` in
//! `original_source/sectionparser/src/sectionlist.cpp`. TDT (0x70) carries only the timestamp;
//! TOT (0x73) additionally carries a descriptor loop (used for Local Time Offset, 0x58).

use crate::bytes::Bytes;
use crate::descriptor::parse_descriptors;
use crate::error::{Error, Result};
use crate::group::OwnedSection;
use crate::table::{table_id, OwnedDescriptors, TableHeader};

#[derive(Debug, Clone)]
pub struct Tot {
    pub header: TableHeader,
    pub utc_mjd_bcd: u64,
    pub descriptors: OwnedDescriptors,
}

impl Tot {
    pub fn build(header: TableHeader, sections: &[OwnedSection]) -> Result<Tot> {
        let first = sections
            .first()
            .ok_or_else(|| Error::InvalidArgument("empty section group".into()))?;
        let payload = &first.payload;
        if payload.len() < 5 {
            return Err(Error::TruncatedSection {
                need: 5,
                have: payload.len(),
            });
        }
        let utc_mjd_bcd = Bytes::new(payload).u40(0)?;

        let descriptors = if header.table_id == table_id::TOT && payload.len() >= 7 {
            let desc_len = usize::from(Bytes::new(payload).u16(5)? & 0x0fff);
            if 7 + desc_len <= payload.len() {
                parse_descriptors(&payload[7..7 + desc_len])
                    .into_iter()
                    .map(|d| d.to_owned_descriptor())
                    .collect()
            } else {
                Vec::new()
            }
        } else {
            Vec::new()
        };

        Ok(Tot {
            header,
            utc_mjd_bcd,
            descriptors,
        })
    }
}
