//! Bouquet Association Table, grounded on `SectionList::buildBat` in
//! `original_source/sectionparser/src/sectionlist.cpp`. Shares its section-body shape
//! (descriptors loop then transport-stream loop) with the NIT builder.

use crate::error::{Error, Result};
use crate::group::OwnedSection;
use crate::table::nit::{parse_descriptors_then_streams, TransportStream};
use crate::table::{OwnedDescriptors, TableHeader};

#[derive(Debug, Clone)]
pub struct Bat {
    pub header: TableHeader,
    pub bouquet_id: u16,
    pub descriptors: OwnedDescriptors,
    pub streams: Vec<TransportStream>,
}

impl Bat {
    pub fn build(header: TableHeader, sections: &[OwnedSection]) -> Result<Bat> {
        if sections.is_empty() {
            return Err(Error::InvalidArgument("empty section group".into()));
        }
        let mut descriptors = Vec::new();
        let mut streams = Vec::new();
        for section in sections {
            let (d, s) = parse_descriptors_then_streams(&section.payload)?;
            descriptors.extend(d);
            streams.extend(s);
        }
        Ok(Bat {
            header,
            bouquet_id: header.extension_id,
            descriptors,
            streams,
        })
    }
}
