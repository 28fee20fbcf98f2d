//! Typed SI table values, built by [`crate::group::SectionGroup::build_table`] once a sub-table
//! is complete.

use crate::descriptor::Descriptor;

pub mod bat;
pub mod eit;
pub mod nit;
pub mod sdt;
pub mod tot;

pub use bat::Bat;
pub use eit::{Eit, Event};
pub use nit::{Nit, TransportStream};
pub use sdt::{Sdt, Service};
pub use tot::Tot;

/// Wire table-id ranges this crate recognises, grounded on
/// `original_source/sectionparser/include/sectionlist.h`'s `TableId` enum.
pub mod table_id {
    pub const NIT: u8 = 0x40;
    pub const NIT_OTHER: u8 = 0x41;
    pub const SDT: u8 = 0x42;
    pub const SDT_OTHER: u8 = 0x46;
    pub const BAT: u8 = 0x4A;
    pub const EIT_PF: u8 = 0x4E;
    pub const EIT_PF_OTHER: u8 = 0x4F;
    pub const EIT_SCHED_START: u8 = 0x50;
    pub const EIT_SCHED_OTHER_END: u8 = 0x6F;
    pub const TDT: u8 = 0x70;
    pub const TOT: u8 = 0x73;
}

/// True for every EIT table-id (present/following, actual or other, and every schedule segment).
pub fn is_eit(id: u8) -> bool {
    id == table_id::EIT_PF
        || id == table_id::EIT_PF_OTHER
        || (table_id::EIT_SCHED_START..=table_id::EIT_SCHED_OTHER_END).contains(&id)
}

/// `true` when `id` is one of the present/following EIT table-ids (as opposed to a schedule
/// segment); used by the cache's `is_present_following` key component.
pub fn is_eit_present_following(id: u8) -> bool {
    id == table_id::EIT_PF || id == table_id::EIT_PF_OTHER
}

/// Fields every typed table carries, regardless of kind.
#[derive(Debug, Clone, Copy)]
pub struct TableHeader {
    pub table_id: u8,
    pub extension_id: u16,
    pub version: u8,
    pub current: bool,
}

#[derive(Debug, Clone)]
pub enum Table {
    Nit(Nit),
    Bat(Bat),
    Sdt(Sdt),
    Eit(Eit),
    Tot(Tot),
}

impl Table {
    pub fn header(&self) -> TableHeader {
        match self {
            Table::Nit(t) => t.header,
            Table::Bat(t) => t.header,
            Table::Sdt(t) => t.header,
            Table::Eit(t) => t.header,
            Table::Tot(t) => t.header,
        }
    }
}

/// Owned descriptor list: every table value owns `Descriptor<'static>`, since it must outlive
/// the section buffer it was parsed from.
pub type OwnedDescriptors = Vec<Descriptor<'static>>;
