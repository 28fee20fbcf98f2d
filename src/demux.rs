//! Section demultiplexer: routes incoming sections to their sub-table group by
//! `(table_id, extension_id)` and publishes completed tables to a registered sink.
//!
//! Grounded on `tstools::cmd::common`'s dispatch-by-table-id loop, generalised from a one-shot
//! PMT search into a persistent map of in-flight sub-tables, and on
//! `original_source/sectionparser/include/sectionparser.h`'s supported table-id set.

use std::collections::HashMap;

use log::warn;

use crate::error::Result;
use crate::group::SectionGroup;
use crate::section::Section;
use crate::table::{is_eit, table_id, Table};

fn is_supported(id: u8) -> bool {
    matches!(
        id,
        table_id::NIT
            | table_id::NIT_OTHER
            | table_id::SDT
            | table_id::SDT_OTHER
            | table_id::BAT
            | table_id::TDT
            | table_id::TOT
    ) || is_eit(id)
}

/// Owns every in-flight sub-table, keyed by `(table_id, extension_id)`. Short-form tables
/// (TDT/TOT) use `extension_id = 0`, since they have no extension-id field on the wire.
#[derive(Default)]
pub struct Demux {
    groups: HashMap<(u8, u16), SectionGroup>,
}

impl Demux {
    pub fn new() -> Demux {
        Demux::default()
    }

    /// Feeds one raw section into the demultiplexer. Calls `sink` at most once, with the newly
    /// completed table, if this section completed (or re-completed, after a version bump) its
    /// sub-table. Empty input, unsupported table-ids, and malformed section headers are all
    /// dropped silently with a WARN log; parsing/decoding errors never propagate past this call.
    pub fn feed<F: FnOnce(&Table)>(&mut self, bytes: &[u8], sink: F) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        let section = match Section::parse(bytes) {
            Ok(section) => section,
            Err(err) => {
                warn!("dropping unparsable section: {err}");
                return Ok(());
            }
        };
        if !is_supported(section.table_id) {
            warn!("dropping unsupported table_id 0x{:02x}", section.table_id);
            return Ok(());
        }

        let key = (section.table_id, section.extension_id.unwrap_or(0));
        let group = self.groups.entry(key).or_insert_with(SectionGroup::new);
        if group.add(&section) && group.is_complete() {
            let table = group.build_table()?;
            sink(&table);
        }
        Ok(())
    }
}
