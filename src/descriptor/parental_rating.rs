//! Parental Rating descriptor (0x55): repeating `(country_code:24, rating:8)` records.

use crate::descriptor::{tag, Descriptor};
use crate::error::Result;

#[derive(Debug, Clone, Copy)]
pub struct ParentalRatingEntry {
    pub country_code: [u8; 3],
    pub rating: u8,
}

#[derive(Debug, Clone)]
pub struct ParentalRating {
    pub entries: Vec<ParentalRatingEntry>,
}

impl ParentalRating {
    pub fn decode(desc: &Descriptor<'_>) -> Result<ParentalRating> {
        debug_assert_eq!(desc.tag, tag::PARENTAL_RATING);
        let data: &[u8] = &desc.data;
        let mut entries = Vec::with_capacity(data.len() / 4);
        let mut offset = 0;
        while offset + 4 <= data.len() {
            entries.push(ParentalRatingEntry {
                country_code: [data[offset], data[offset + 1], data[offset + 2]],
                rating: data[offset + 3],
            });
            offset += 4;
        }
        Ok(ParentalRating { entries })
    }
}
