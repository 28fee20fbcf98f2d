//! Sub-table reassembly: groups sections sharing a `(table_id, extension_id)` key, tracks
//! version/duplicate/completeness, and builds the typed table once complete.
//!
//! Grounded directly on `SectionList` in `original_source/sectionparser/src/sectionlist.cpp`
//! (`init`/`add`/`insert`/`complete`), translated from its linked-list walk into an ordered
//! `Vec` kept sorted by `section_number`.

use crate::error::Result;
use crate::section::Section;
use crate::table::{is_eit, table_id, Bat, Eit, Nit, Sdt, Table, TableHeader, Tot};

/// A section with its payload cloned off the inbound buffer so it can outlive a single
/// `demux` call. Short-form sections (`long_form == false`) are stored with `extension_id = 0`.
#[derive(Debug, Clone)]
pub struct OwnedSection {
    pub table_id: u8,
    pub long_form: bool,
    pub extension_id: u16,
    pub version: u8,
    pub current: bool,
    pub number: u8,
    pub last_number: u8,
    pub payload: Vec<u8>,
}

impl OwnedSection {
    fn from_section(section: &Section<'_>) -> OwnedSection {
        OwnedSection {
            table_id: section.table_id,
            long_form: section.section_syntax_indicator,
            extension_id: section.extension_id.unwrap_or(0),
            version: section.version_number,
            current: section.current_next_indicator,
            number: section.section_number,
            last_number: section.last_section_number,
            payload: section.payload.to_vec(),
        }
    }
}

/// An in-progress or completed sub-table: an ordered, deduplicated run of sections plus the
/// bookkeeping needed to know when it is complete.
#[derive(Debug, Clone, Default)]
pub struct SectionGroup {
    sections: Vec<OwnedSection>,
    first_received_number: u8,
    complete: bool,
}

impl SectionGroup {
    pub fn new() -> SectionGroup {
        SectionGroup::default()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Adds `section` to the group. Returns `true` if the group's state changed (a new section
    /// was accepted, or the group was reinitialised); `false` if the section was rejected as a
    /// mismatch or redundant duplicate.
    pub fn add(&mut self, section: &Section<'_>) -> bool {
        let is_eit_table = is_eit(section.table_id);
        let owned = OwnedSection::from_section(section);

        let Some(first) = self.sections.first() else {
            self.init(owned, is_eit_table);
            return true;
        };

        if !first.long_form {
            // Short-form sub-tables never accumulate: every arrival replaces the group.
            self.init(owned, is_eit_table);
            return true;
        }

        if first.extension_id != owned.extension_id {
            return false;
        }

        if first.version != owned.version || first.last_number != owned.last_number {
            self.init(owned, is_eit_table);
            return true;
        }

        if self.complete {
            return false;
        }

        let new_number = owned.number;
        self.insert_sorted(owned);
        self.complete = if is_eit_table {
            self.eit_complete(new_number)
        } else {
            self.non_eit_complete()
        };
        true
    }

    fn init(&mut self, section: OwnedSection, is_eit_table: bool) {
        self.first_received_number = section.number;
        let long_form = section.long_form;
        self.sections.clear();
        self.sections.push(section);
        self.complete = if !long_form {
            true
        } else if is_eit_table {
            false
        } else {
            self.non_eit_complete()
        };
    }

    fn insert_sorted(&mut self, section: OwnedSection) {
        match self
            .sections
            .binary_search_by_key(&section.number, |s| s.number)
        {
            Ok(_) => {}
            Err(pos) => self.sections.insert(pos, section),
        }
    }

    fn non_eit_complete(&self) -> bool {
        let Some(first) = self.sections.first() else {
            return false;
        };
        if self.sections.len() != usize::from(first.last_number) + 1 {
            return false;
        }
        self.sections
            .iter()
            .enumerate()
            .all(|(i, s)| usize::from(s.number) == i)
    }

    /// EIT completeness is only asserted once a full receive cycle has elapsed, then confirmed
    /// by walking past each schedule segment boundary to see if the final section ever arrived.
    fn eit_complete(&self, new_section_number: u8) -> bool {
        if new_section_number != self.first_received_number {
            return false;
        }
        let Some(first) = self.sections.first() else {
            return false;
        };
        let last_section_number = first.last_number;

        let mut i = 0;
        while i < self.sections.len() {
            if self.sections[i].number == last_section_number {
                return true;
            }
            let segment_last = self.sections[i].payload.get(4).copied();
            if segment_last == Some(self.sections[i].number) {
                while i + 1 < self.sections.len()
                    && self.sections[i + 1].number < last_section_number
                {
                    i += 1;
                }
            }
            i += 1;
        }
        false
    }

    /// Builds the typed table once `is_complete()` is true. Dispatches on the stored `table_id`.
    pub fn build_table(&self) -> Result<Table> {
        let first = self
            .sections
            .first()
            .ok_or_else(|| crate::error::Error::InvalidArgument("empty section group".into()))?;
        let header = TableHeader {
            table_id: first.table_id,
            extension_id: first.extension_id,
            version: first.version,
            current: first.current,
        };
        match first.table_id {
            table_id::NIT | table_id::NIT_OTHER => {
                Ok(Table::Nit(Nit::build(header, &self.sections)?))
            }
            table_id::BAT => Ok(Table::Bat(Bat::build(header, &self.sections)?)),
            table_id::SDT | table_id::SDT_OTHER => {
                Ok(Table::Sdt(Sdt::build(header, &self.sections)?))
            }
            table_id::TDT | table_id::TOT => Ok(Table::Tot(Tot::build(header, &self.sections)?)),
            id if is_eit(id) => Ok(Table::Eit(Eit::build(header, &self.sections)?)),
            other => Err(crate::error::Error::UnknownTableId(other)),
        }
    }
}
