//! Tuner contract, grounded on `hiroshiyui-epgrab/src/tuner.rs`'s `Tuner::tune` — the only pack
//! repo that actually drives a DVB frontend. That `Tuner` is a concrete struct wrapping a
//! `/dev/dvb/adapterN/frontend0` file descriptor and DVBv5 property ioctls; implementing any
//! tuner hardware is an explicit non-goal here; instead this module reduces it to the two-call
//! contract the scan controller actually needs.

use crate::modulation::Modulation;

/// A single RF front end. `tune` is expected to block until the carrier is locked (or report
/// failure); the core only assumes that once it returns `Ok(())`, SI sections from that carrier
/// begin flowing into the demultiplexer. `untune` releases the front end between retunes.
pub trait Tuner {
    fn tune(&mut self, frequency_hz: u32, modulation: Modulation, symbol_rate: u32) -> anyhow::Result<()>;
    fn untune(&mut self) -> anyhow::Result<()>;
}
