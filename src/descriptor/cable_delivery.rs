//! Cable Delivery System descriptor (0x44).
//!
//! Layout: `frequency_bcd:32, reserved:12, fec_outer:4, modulation:8, symbol_rate_bcd:28,
//! fec_inner:4` (11 bytes). `frequency` and `symbol_rate` are derived by regrouping the packed
//! BCD digits the way the worked example in the original specification's NIT scenario requires
//! (474 MHz / 6,875,000 baud); see DESIGN.md for the digit-grouping note.

use crate::bcd::bcd_to_dec;
use crate::descriptor::{require_len, tag, Descriptor};
use crate::error::Result;
use crate::modulation::CableModulation;

#[derive(Debug, Clone, Copy)]
pub struct CableDeliverySystem {
    /// Carrier frequency in Hz.
    pub frequency: u32,
    /// Raw 4-bit outer FEC code, as carried on the wire (EN 300 468 table 50).
    pub fec_outer: u8,
    pub modulation: CableModulation,
    /// Symbol rate in symbols/second.
    pub symbol_rate: u32,
    /// Raw 4-bit inner FEC code, as carried on the wire (EN 300 468 table 51).
    pub fec_inner: u8,
}

impl CableDeliverySystem {
    pub fn decode(desc: &Descriptor<'_>) -> Result<CableDeliverySystem> {
        debug_assert_eq!(desc.tag, tag::CABLE_DELIVERY_SYSTEM);
        let data: &[u8] = &desc.data;
        require_len(desc.tag, data, 11)?;

        // frequency_bcd: 32 bits, split into two 16-bit (4 BCD digit) halves.
        let freq_hi = bcd_to_dec(u64::from(u16::from_be_bytes([data[0], data[1]]))) as u32;
        let freq_lo = bcd_to_dec(u64::from(u16::from_be_bytes([data[2], data[3]]))) as u32;
        let frequency = freq_hi * 1_000_000 + freq_lo * 100;

        // reserved:12, fec_outer:4 share bytes 4-5.
        let fec_outer = data[5] & 0x0f;

        let modulation = CableModulation::from_wire(data[6]);

        // symbol_rate_bcd: 28 bits (7 BCD digits) across bytes 7-10, split 4+2+1 digits;
        // fec_inner: the trailing 4 bits of byte 10.
        let sym_digits_hi =
            bcd_to_dec(u64::from(u16::from_be_bytes([data[7], data[8]]))) as u32;
        let sym_digits_mid = bcd_to_dec(u64::from(data[9])) as u32;
        let sym_digit_lo = u32::from(data[10] >> 4);
        let symbol_rate = (sym_digits_hi * 1000 + sym_digits_mid * 10 + sym_digit_lo) * 100;
        let fec_inner = data[10] & 0x0f;

        Ok(CableDeliverySystem {
            frequency,
            fec_outer,
            modulation,
            symbol_rate,
            fec_inner,
        })
    }
}
