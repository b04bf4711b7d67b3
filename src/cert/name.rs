//! Distinguished name rendering.
//!
//! Names are rendered one RDN at a time in encoded order as `SHORTNAME=value`,
//! separated by `", "`, e.g.
//! `C=US, ST=Michigan, L=Ann Arbor, O=University of Michigan and the EFF, CN=example.com`.
//! Multi-valued RDNs join their attributes with `" + "`. Attributes without a
//! known short name use the dotted OID, and values that are not character
//! strings are written as `#` followed by the hex of their DER encoding.

use const_oid::ObjectIdentifier;
use der::asn1::Any;
use der::{Encode, Tag, Tagged};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::Name;

pub const COMMON_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
pub const SERIAL_NUMBER: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.5");
pub const COUNTRY: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");
pub const LOCALITY: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.7");
pub const STATE_OR_PROVINCE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.8");
pub const STREET: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.9");
pub const ORGANIZATION: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");
pub const ORGANIZATIONAL_UNIT: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.11");
pub const TITLE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.12");
pub const SURNAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.4");
pub const GIVEN_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.42");
pub const DOMAIN_COMPONENT: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("0.9.2342.19200300.100.1.25");
pub const EMAIL_ADDRESS: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.1");

const SHORT_NAMES: &[(ObjectIdentifier, &str)] = &[
    (COUNTRY, "C"),
    (STATE_OR_PROVINCE, "ST"),
    (LOCALITY, "L"),
    (ORGANIZATION, "O"),
    (ORGANIZATIONAL_UNIT, "OU"),
    (COMMON_NAME, "CN"),
    (EMAIL_ADDRESS, "emailAddress"),
    (SERIAL_NUMBER, "serialNumber"),
    (STREET, "street"),
    (DOMAIN_COMPONENT, "DC"),
    (TITLE, "title"),
    (GIVEN_NAME, "GN"),
    (SURNAME, "SN"),
];

pub fn short_name(oid: &ObjectIdentifier) -> Option<&'static str> {
    SHORT_NAMES
        .iter()
        .find(|(known, _)| known == oid)
        .map(|(_, short)| *short)
}

/// Decodes a directory string attribute value.
///
/// Returns `None` for values that are not character strings.
pub fn attribute_string(value: &Any) -> Option<String> {
    match value.tag() {
        Tag::Utf8String
        | Tag::PrintableString
        | Tag::Ia5String
        | Tag::TeletexString
        | Tag::VisibleString => std::str::from_utf8(value.value()).ok().map(str::to_owned),
        Tag::BmpString => {
            if value.value().len() % 2 != 0 {
                return None;
            }
            let units: Vec<u16> = value
                .value()
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).ok()
        }
        _ => None,
    }
}

/// Value of the first attribute of type `oid`, if any.
pub fn find_attribute(name: &Name, oid: ObjectIdentifier) -> Option<String> {
    name.0
        .iter()
        .flat_map(|rdn| rdn.0.iter())
        .find(|attr| attr.oid == oid)
        .and_then(|attr| attribute_string(&attr.value))
}

pub fn render_name(name: &Name) -> String {
    name.0
        .iter()
        .map(|rdn| {
            rdn.0
                .iter()
                .map(render_attribute)
                .collect::<Vec<_>>()
                .join(" + ")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_attribute(attr: &AttributeTypeAndValue) -> String {
    let key = short_name(&attr.oid)
        .map(str::to_owned)
        .unwrap_or_else(|| attr.oid.to_string());
    let value = attribute_string(&attr.value).unwrap_or_else(|| {
        let der = attr.value.to_der().unwrap_or_default();
        let hex: String = der.iter().map(|b| format!("{b:02X}")).collect();
        format!("#{hex}")
    });
    format!("{key}={value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use der::asn1::SetOfVec;
    use x509_cert::name::{RdnSequence, RelativeDistinguishedName};

    fn attribute(oid: ObjectIdentifier, tag: Tag, value: &[u8]) -> AttributeTypeAndValue {
        AttributeTypeAndValue {
            oid,
            value: Any::new(tag, value).unwrap(),
        }
    }

    #[test]
    fn test_render_keeps_encoded_order() {
        let name = RdnSequence(vec![
            RelativeDistinguishedName(
                SetOfVec::try_from(vec![attribute(COUNTRY, Tag::PrintableString, b"US")])
                    .unwrap(),
            ),
            RelativeDistinguishedName(
                SetOfVec::try_from(vec![attribute(COMMON_NAME, Tag::Utf8String, b"example.com")])
                    .unwrap(),
            ),
        ]);
        assert_eq!(render_name(&name), "C=US, CN=example.com");
        assert_eq!(
            find_attribute(&name, COMMON_NAME).as_deref(),
            Some("example.com")
        );
        assert_eq!(find_attribute(&name, ORGANIZATION), None);
    }

    #[test]
    fn test_render_unknown_attribute_and_binary_value() {
        let oid = ObjectIdentifier::new_unwrap("1.2.3.4");
        let name = RdnSequence(vec![RelativeDistinguishedName(
            SetOfVec::try_from(vec![attribute(oid, Tag::OctetString, &[0x01, 0x02])]).unwrap(),
        )]);
        assert_eq!(render_name(&name), "1.2.3.4=#04020102");
    }

    #[test]
    fn test_bmp_string_value() {
        let value = Any::new(Tag::BmpString, [0x00, b'h', 0x00, b'i'].as_slice()).unwrap();
        assert_eq!(attribute_string(&value).as_deref(), Some("hi"));
    }

    #[test]
    fn test_odd_length_bmp_string_renders_as_hex() {
        let value = Any::new(Tag::BmpString, [0x00, b'h', 0x00].as_slice()).unwrap();
        assert_eq!(attribute_string(&value), None);

        let name = RdnSequence(vec![RelativeDistinguishedName(
            SetOfVec::try_from(vec![attribute(
                COMMON_NAME,
                Tag::BmpString,
                &[0x00, b'h', 0x00],
            )])
            .unwrap(),
        )]);
        assert_eq!(render_name(&name), "CN=#1E03006800");
    }
}
