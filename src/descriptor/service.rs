//! Service descriptor (0x48): `service_type:8, provider_name[L1], service_name[L2]`.

use crate::descriptor::{require_len, tag, Descriptor};
use crate::error::Result;
use crate::text;

#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub service_type: u8,
    pub provider_name: String,
    pub service_name: String,
}

impl ServiceDescriptor {
    pub fn decode(desc: &Descriptor<'_>) -> Result<ServiceDescriptor> {
        debug_assert_eq!(desc.tag, tag::SERVICE);
        let data: &[u8] = &desc.data;
        require_len(desc.tag, data, 2)?;

        let service_type = data[0];
        let l1 = usize::from(data[1]);
        require_len(desc.tag, data, 2 + l1 + 1)?;
        let provider_name = text::decode(&data[2..2 + l1])?;

        let l2 = usize::from(data[2 + l1]);
        require_len(desc.tag, data, 2 + l1 + 1 + l2)?;
        let service_name = text::decode(&data[2 + l1 + 1..2 + l1 + 1 + l2])?;

        Ok(ServiceDescriptor {
            service_type,
            provider_name,
            service_name,
        })
    }
}
