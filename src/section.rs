//! Shared section header parsing, common to every SI table (NIT/BAT/SDT/EIT/TDT/TOT).
//!
//! Generalises the header-field extraction every per-table parser in the teacher crate repeats
//! inline (`tstools::psi::eit::EventInformationSection::parse`,
//! `tstools::psi::sdt::ServiceDescriptionSection::parse`) into one shared record, since this
//! crate's table builders only need the header once reassembly has already grouped sections by
//! `(table_id, extension_id)`.

use crate::bytes::Bytes;
use crate::error::{Error, Result};

/// A parsed section header plus its payload, short or long form.
#[derive(Debug, Clone)]
pub struct Section<'a> {
    pub table_id: u8,
    pub section_syntax_indicator: bool,
    /// `service_id`/`network_id`/`transport_stream_id`/`bouquet_id` depending on table kind.
    /// `None` for short-form sections (section_syntax_indicator == 0).
    pub extension_id: Option<u16>,
    pub version_number: u8,
    pub current_next_indicator: bool,
    pub section_number: u8,
    pub last_section_number: u8,
    /// Table-body bytes after the shared header, up to and including any trailing CRC32 the
    /// source buffer carried.
    pub payload: &'a [u8],
}

impl<'a> Section<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Section<'a>> {
        let b = Bytes::new(bytes);
        if bytes.len() < 3 {
            return Err(Error::TruncatedSection {
                need: 3,
                have: bytes.len(),
            });
        }
        let table_id = b.u8(0)?;
        let second = b.u8(1)?;
        let section_syntax_indicator = second & 0x80 != 0;
        let section_length = ((usize::from(second & 0x0f)) << 8) | usize::from(b.u8(2)?);
        if section_length + 3 > bytes.len() {
            return Err(Error::TruncatedSection {
                need: section_length + 3,
                have: bytes.len(),
            });
        }

        if section_syntax_indicator {
            if bytes.len() < 8 {
                return Err(Error::TruncatedSection {
                    need: 8,
                    have: bytes.len(),
                });
            }
            let extension_id = b.u16(3)?;
            let fifth = b.u8(5)?;
            let version_number = (fifth >> 1) & 0x1f;
            let current_next_indicator = fifth & 0x1 != 0;
            let section_number = b.u8(6)?;
            let last_section_number = b.u8(7)?;
            Ok(Section {
                table_id,
                section_syntax_indicator,
                extension_id: Some(extension_id),
                version_number,
                current_next_indicator,
                section_number,
                last_section_number,
                payload: &bytes[8..section_length + 3],
            })
        } else {
            Ok(Section {
                table_id,
                section_syntax_indicator,
                extension_id: None,
                version_number: 0,
                current_next_indicator: true,
                section_number: 0,
                last_section_number: 0,
                payload: &bytes[3..section_length + 3],
            })
        }
    }
}
