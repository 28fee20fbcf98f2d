//! Network Name (0x40) and Bouquet Name (0x47) descriptors.
//!
//! Both have the same on-wire layout (the entire descriptor payload is the name), so one
//! decoder backs both typed wrappers.

use crate::descriptor::{tag, Descriptor};
use crate::error::Result;
use crate::text;

#[derive(Debug, Clone)]
pub struct NetworkName {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct BouquetName {
    pub name: String,
}

fn decode_name(desc: &Descriptor<'_>) -> Result<String> {
    text::decode(&desc.data)
}

impl NetworkName {
    pub fn decode(desc: &Descriptor<'_>) -> Result<NetworkName> {
        debug_assert_eq!(desc.tag, tag::NETWORK_NAME);
        Ok(NetworkName {
            name: decode_name(desc)?,
        })
    }
}

impl BouquetName {
    pub fn decode(desc: &Descriptor<'_>) -> Result<BouquetName> {
        debug_assert_eq!(desc.tag, tag::BOUQUET_NAME);
        Ok(BouquetName {
            name: decode_name(desc)?,
        })
    }
}
