//! Modulation enums used by the cable-delivery descriptor and the public tuner contract.
//!
//! Grounded on `rdvb`'s `mpeg/descriptors/terrestrial_delivery_system.rs`, which maps a small
//! wire enum to a Rust enum by hand instead of pulling in a derive-macro crate for it.

/// The modulation scheme as carried on the wire inside a Cable Delivery System descriptor
/// (tag 0x44). Only cable modulations are representable on that wire; the broader
/// [`Modulation`] enum below is what the public tuner API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CableModulation {
    Undefined,
    Qam16,
    Qam32,
    Qam64,
    Qam128,
    Qam256,
    Reserved(u8),
}

impl CableModulation {
    pub fn from_wire(v: u8) -> Self {
        match v {
            0 => CableModulation::Undefined,
            1 => CableModulation::Qam16,
            2 => CableModulation::Qam32,
            3 => CableModulation::Qam64,
            4 => CableModulation::Qam128,
            5 => CableModulation::Qam256,
            other => CableModulation::Reserved(other),
        }
    }

    /// Inverse of [`CableModulation::from_wire`], used when persisting a transport row.
    pub fn to_wire(self) -> u8 {
        match self {
            CableModulation::Undefined => 0,
            CableModulation::Qam16 => 1,
            CableModulation::Qam32 => 2,
            CableModulation::Qam64 => 3,
            CableModulation::Qam128 => 4,
            CableModulation::Qam256 => 5,
            CableModulation::Reserved(v) => v,
        }
    }

    pub fn to_modulation(self) -> Modulation {
        match self {
            CableModulation::Undefined | CableModulation::Reserved(_) => Modulation::Undefined,
            CableModulation::Qam16 => Modulation::Qam16,
            CableModulation::Qam32 => Modulation::Qam32,
            CableModulation::Qam64 => Modulation::Qam64,
            CableModulation::Qam128 => Modulation::Qam128,
            CableModulation::Qam256 => Modulation::Qam256,
        }
    }
}

/// The broader modulation enum exposed by the public tuner API (`Tuner::tune`), spanning every
/// scheme the receiver's front end might support across cable, satellite, and terrestrial plants
/// even though this crate only ever builds [`CableModulation`] values off the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modulation {
    Undefined,
    Qpsk,
    Bpsk,
    Oqpsk,
    Vsb8,
    Vsb16,
    Qam16,
    Qam32,
    Qam64,
    Qam128,
    Qam256,
    Qam512,
    Qam1024,
    QamNtsc,
}

impl Modulation {
    /// Wire encoding for the cable delivery descriptor's modulation nibble, the inverse of
    /// [`CableModulation::to_modulation`]. Variants with no cable wire encoding (terrestrial,
    /// satellite) serialise as `Undefined`, since they never arise from a cable delivery
    /// descriptor in the first place.
    pub fn to_cable_wire(self) -> u8 {
        match self {
            Modulation::Qam16 => 1,
            Modulation::Qam32 => 2,
            Modulation::Qam64 => 3,
            Modulation::Qam128 => 4,
            Modulation::Qam256 => 5,
            _ => 0,
        }
    }
}
