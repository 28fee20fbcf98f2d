//! System clock adapter, grounded on `DvbSiStorage::handleTotEvent` in
//! `original_source/sistorage/src/dvbsistorage.cpp`, which calls `settimeofday` from the TDT
//! branch of an `if/else` whose second branch tests `TableId::TDT` again instead of `TableId::TOT`
//! (so the TOT branch is dead code). Per REDESIGN FLAG 3 this crate calls the clock setter exactly
//! once per accepted TDT *or* TOT section instead of reproducing that branch bug.

use crate::bcd::mjd_to_unix_time;
use crate::table::Tot;

/// The system clock, abstracted to a single operation so the core never calls `settimeofday` (or
/// any other OS primitive) directly. An embedding application supplies a real implementation;
/// tests use a fake that just records the last value it was given.
pub trait ClockSetter {
    /// Sets the system clock to `unix_time` (seconds since the Unix epoch, UTC).
    fn set_utc(&self, unix_time: i64) -> anyhow::Result<()>;
}

/// Derives a Unix timestamp from a TDT or TOT table and calls `setter` once. Returns the
/// timestamp so the caller can also flip its "a TOT/TDT has been observed" bit, which the storage
/// controller's stale-store audit needs (see [`crate::db::Store::set_tot_received`]).
pub fn on_tdt_or_tot(tot: &Tot, setter: &dyn ClockSetter) -> anyhow::Result<i64> {
    let unix_time = mjd_to_unix_time(tot.utc_mjd_bcd);
    setter.set_utc(unix_time)?;
    Ok(unix_time)
}
