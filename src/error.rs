use thiserror::Error;

/// Taxonomy of error kinds the core distinguishes, per the DVB SI error handling design.
///
/// Most of these never propagate past the component boundary that detects them: parsing and
/// decoding failures become drop-with-log (see `log::warn!` call sites in `section.rs`,
/// `group.rs`, and `descriptor/mod.rs`). The variants exist so a caller that does want to
/// inspect *why* something was dropped can do so, and so unit tests can assert on the exact
/// failure kind instead of matching strings.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Error {
    /// A null/absent buffer, a zero length, a length shorter than a required header, or a
    /// descriptor accessor called on a too-short `data`.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `section_length + 3 > input.len()`. Dropped silently by the caller with a warning.
    #[error("truncated section: need {need} bytes, have {have}")]
    TruncatedSection { need: usize, have: usize },

    /// `table_id` is not one of the table ids this crate understands. Dropped silently by the
    /// caller with a warning; `is_table_supported` is the gatekeeper.
    #[error("unknown table id: 0x{0:02x}")]
    UnknownTableId(u8),

    /// A descriptor's tag byte isn't one of the tags this crate has a typed decoder for. The raw
    /// descriptor is still kept around; only typed decoding is unavailable.
    #[error("unknown descriptor tag: 0x{0:02x}")]
    UnknownDescriptorTag(u8),

    /// A descriptor's fixed-prefix bounds check failed. The individual descriptor is dropped;
    /// the rest of the loop continues.
    #[error("malformed descriptor (tag 0x{tag:02x}): {reason}")]
    MalformedDescriptor { tag: u8, reason: String },

    /// The relational store's underlying file could not be opened or is unusable; the caller
    /// should drop it and recreate from scratch.
    #[error("storage full or unusable: {0}")]
    StorageFull(String),

    /// The relational store file is corrupt; the caller should drop and recreate it.
    #[error("storage corrupt: {0}")]
    StorageCorrupt(String),

    /// The latest known event's `start_time + duration` is in the past and a TDT/TOT has been
    /// observed since: the schema should be dropped and recreated.
    #[error("stale store detected")]
    StaleStore,
}

pub type Result<T> = std::result::Result<T, Error>;
