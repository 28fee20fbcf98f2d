//! Component descriptor (0x50): `reserved:4, stream_content:4, component_type:8, component_tag:8,
//! lang:24, text`.

use crate::descriptor::{require_len, tag, Descriptor};
use crate::error::Result;
use crate::text;

#[derive(Debug, Clone)]
pub struct Component {
    pub stream_content: u8,
    pub component_type: u8,
    pub component_tag: u8,
    pub lang: [u8; 3],
    pub text: String,
}

impl Component {
    pub fn decode(desc: &Descriptor<'_>) -> Result<Component> {
        debug_assert_eq!(desc.tag, tag::COMPONENT);
        let data: &[u8] = &desc.data;
        require_len(desc.tag, data, 6)?;

        let stream_content = data[0] & 0x0f;
        let component_type = data[1];
        let component_tag = data[2];
        let lang = [data[3], data[4], data[5]];
        let text = text::decode(&data[6..])?;

        Ok(Component {
            stream_content,
            component_type,
            component_tag,
            lang,
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn decodes_component() {
        let data = [0x01u8, 0x02, 0x03, b'e', b'n', b'g', b'D', b'e', b's', b'c'];
        let d = Descriptor {
            tag: tag::COMPONENT,
            data: Cow::Borrowed(&data[..]),
        };
        let c = Component::decode(&d).unwrap();
        assert_eq!(c.stream_content, 1);
        assert_eq!(c.component_type, 2);
        assert_eq!(c.component_tag, 3);
        assert_eq!(&c.lang, b"eng");
        assert_eq!(c.text, "Desc");
    }

    #[test]
    fn rejects_short_payload() {
        let d = Descriptor {
            tag: tag::COMPONENT,
            data: Cow::Borrowed(&[0u8; 3][..]),
        };
        assert!(Component::decode(&d).is_err());
    }
}
