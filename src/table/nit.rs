//! Network Information Table, grounded on `SectionList::buildNit` in
//! `original_source/sectionparser/src/sectionlist.cpp`. Also backs the BAT builder in
//! `src/table/bat.rs`, which shares the same network/bouquet-descriptors-then-transport-loop
//! shape.

use crate::bytes::Bytes;
use crate::descriptor::{parse_descriptors, Descriptor};
use crate::error::{Error, Result};
use crate::group::OwnedSection;
use crate::table::{OwnedDescriptors, TableHeader};

#[derive(Debug, Clone)]
pub struct TransportStream {
    pub ts_id: u16,
    pub original_network_id: u16,
    pub descriptors: OwnedDescriptors,
}

#[derive(Debug, Clone)]
pub struct Nit {
    pub header: TableHeader,
    pub network_id: u16,
    pub descriptors: OwnedDescriptors,
    pub streams: Vec<TransportStream>,
}

/// Shared by the NIT and BAT builders: reads the leading 12-bit-length descriptor loop from
/// `payload`, then the transport-stream loop that follows it.
pub(crate) fn parse_descriptors_then_streams(
    payload: &[u8],
) -> Result<(OwnedDescriptors, Vec<TransportStream>)> {
    let b = Bytes::new(payload);
    if payload.len() < 2 {
        return Ok((Vec::new(), Vec::new()));
    }
    let desc_len = usize::from(b.u16(0)? & 0x0fff);
    let desc_start = 2;
    if desc_start + desc_len + 2 > payload.len() {
        return Ok((Vec::new(), Vec::new()));
    }
    let descriptors: OwnedDescriptors = parse_descriptors(&payload[desc_start..desc_start + desc_len])
        .into_iter()
        .map(|d: Descriptor<'_>| d.to_owned_descriptor())
        .collect();

    let ts_loop_start = desc_start + desc_len;
    let ts_loop_len = usize::from(Bytes::new(payload).u16(ts_loop_start)? & 0x0fff);
    let mut offset = ts_loop_start + 2;
    let ts_loop_end = (offset + ts_loop_len).min(payload.len());

    let mut streams = Vec::new();
    while offset + 6 <= ts_loop_end {
        let ts_id = Bytes::new(payload).u16(offset)?;
        let original_network_id = Bytes::new(payload).u16(offset + 2)?;
        let ts_desc_len = usize::from(Bytes::new(payload).u16(offset + 4)? & 0x0fff);
        offset += 6;
        if offset + ts_desc_len > payload.len() {
            break;
        }
        let descriptors: OwnedDescriptors = parse_descriptors(&payload[offset..offset + ts_desc_len])
            .into_iter()
            .map(|d: Descriptor<'_>| d.to_owned_descriptor())
            .collect();
        streams.push(TransportStream {
            ts_id,
            original_network_id,
            descriptors,
        });
        offset += ts_desc_len;
    }

    Ok((descriptors, streams))
}

impl Nit {
    pub fn build(header: TableHeader, sections: &[OwnedSection]) -> Result<Nit> {
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
        Ok(Nit {
            header,
            network_id: header.extension_id,
            descriptors,
            streams,
        })
    }
}
