//! Section reassembly, descriptor decoding, and scan/storage control for DVB SI tables
//! (NIT/BAT/SDT/EIT/TDT/TOT).
//!
//! This crate is a library, not a binary: there is no CLI surface and no `main`. An embedding
//! application supplies a [`tuner::Tuner`] and a [`scan::settings::SettingsSource`], feeds raw
//! MPEG-2 sections into a [`demux::Demux`], and drives [`scan::ScanController`] and [`db::Store`]
//! to turn a tuned multiplex into queryable transport/service/event rows.
//!
//! Module layout mirrors the parse pipeline: [`bytes`] and [`text`] are the low-level byte/text
//! primitives; [`bcd`] converts the wire's BCD/MJD timestamp encodings; [`section`] and [`group`]
//! reassemble raw sections into complete sub-tables; [`table`] and [`descriptor`] give those
//! sub-tables and their TLV descriptors typed shape; [`demux`] is the entry point that wires
//! section bytes to completed [`table::Table`] values; [`cache`] and [`db`] are the two storage
//! tiers (latest-version-only in-memory cache, durable relational store); [`scan`], [`tuner`], and
//! [`clock`] are the controller, hardware seam, and system-clock seam described above.

pub mod bcd;
pub mod bytes;
pub mod cache;
pub mod clock;
pub mod crc;
pub mod db;
pub mod demux;
pub mod descriptor;
pub mod error;
pub mod group;
pub mod modulation;
pub mod scan;
pub mod section;
pub mod table;
pub mod text;
pub mod tuner;

pub use cache::Cache;
pub use clock::ClockSetter;
pub use db::Store;
pub use demux::Demux;
pub use error::{Error, Result};
pub use modulation::{CableModulation, Modulation};
pub use scan::settings::{MapSettingsSource, ProcessEnvSettingsSource, Settings, SettingsSource};
pub use scan::{ScanController, ScanState};
pub use table::Table;
pub use tuner::Tuner;
