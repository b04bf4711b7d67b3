use bon::Builder;
use const_oid::ObjectIdentifier;
use der::Tag;
use der::asn1::{Any, OctetString, SetOfVec};
use time::Duration;
use time::OffsetDateTime;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};

use super::extensions::ToAndFromX509Extension;
use super::name;
use crate::error::CryptoError;
use crate::key::PublicKey;

/// Parameters for building an X.509 certificate.
///
/// # Fields
/// * `subject` - The distinguished name of the certificate subject.
/// * `subject_public_key` - The public key of the certificate subject.
/// * `is_ca` - Value of the `basicConstraints` CA flag.
/// * `extensions` - Additional X.509 extensions.
#[derive(Clone, Debug, Builder)]
pub struct CertificationRequestInfo {
    pub subject: DistinguishedName,
    pub subject_public_key: PublicKey,
    #[builder(default)]
    pub is_ca: bool,
    #[builder(default)]
    pub extensions: Vec<ExtensionParam>,
}

/// Distinguished name of a certificate subject or issuer.
///
/// Attributes are encoded in the order C, ST, L, O, OU, CN; absent ones are
/// left out.
#[derive(Clone, Debug, Builder, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    pub common_name: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub locality: Option<String>,
    pub organization: Option<String>,
    pub organization_unit: Option<String>,
}

impl DistinguishedName {
    /// Converts the distinguished name to its X.509 form.
    pub fn as_x509_name(&self) -> Result<x509_cert::name::DistinguishedName, CryptoError> {
        let attributes = [
            (name::COUNTRY, &self.country),
            (name::STATE_OR_PROVINCE, &self.state),
            (name::LOCALITY, &self.locality),
            (name::ORGANIZATION, &self.organization),
            (name::ORGANIZATIONAL_UNIT, &self.organization_unit),
            (name::COMMON_NAME, &self.common_name),
        ];

        let rdns = attributes
            .into_iter()
            .filter_map(|(oid, value)| value.as_deref().map(|value| (oid, value)))
            .map(|(oid, value)| {
                // countryName is a PrintableString, everything else a UTF8String
                let tag = if oid == name::COUNTRY {
                    Tag::PrintableString
                } else {
                    Tag::Utf8String
                };
                let attribute = AttributeTypeAndValue {
                    oid,
                    value: Any::new(tag, value.as_bytes())?,
                };
                Ok(RelativeDistinguishedName(SetOfVec::try_from(vec![
                    attribute,
                ])?))
            })
            .collect::<Result<Vec<_>, CryptoError>>()?;

        Ok(RdnSequence(rdns))
    }

    /// Creates a `DistinguishedName` from its X.509 form.
    ///
    /// Attributes other than the six modelled here are dropped.
    pub fn from_x509_name(x509dn: &x509_cert::name::DistinguishedName) -> Self {
        let mut dn = DistinguishedName::default();

        for rdn in x509dn.0.iter() {
            for attr in rdn.0.iter() {
                let slot = match attr.oid {
                    name::COMMON_NAME => &mut dn.common_name,
                    name::COUNTRY => &mut dn.country,
                    name::STATE_OR_PROVINCE => &mut dn.state,
                    name::LOCALITY => &mut dn.locality,
                    name::ORGANIZATION => &mut dn.organization,
                    name::ORGANIZATIONAL_UNIT => &mut dn.organization_unit,
                    _ => continue,
                };
                if slot.is_none() {
                    *slot = name::attribute_string(&attr.value);
                }
            }
        }

        dn
    }
}

/// Subject attributes shared by every self-signed certificate and CSR this
/// crate produces. The common name comes from the first requested domain.
#[derive(Clone, Debug, Builder, PartialEq, Eq)]
pub struct SubjectTemplate {
    pub country: Option<String>,
    pub state: Option<String>,
    pub locality: Option<String>,
    pub organization: Option<String>,
    pub organization_unit: Option<String>,
}

impl Default for SubjectTemplate {
    fn default() -> Self {
        Self {
            country: Some("US".to_string()),
            state: Some("Michigan".to_string()),
            locality: Some("Ann Arbor".to_string()),
            organization: Some("University of Michigan and the EFF".to_string()),
            organization_unit: None,
        }
    }
}

impl SubjectTemplate {
    /// Fills in the template with `common_name`.
    pub fn with_common_name(&self, common_name: &str) -> DistinguishedName {
        DistinguishedName {
            common_name: Some(common_name.to_string()),
            country: self.country.clone(),
            state: self.state.clone(),
            locality: self.locality.clone(),
            organization: self.organization.clone(),
            organization_unit: self.organization_unit.clone(),
        }
    }
}

/// Settings for interim self-signed certificates.
///
/// # Fields
/// * `subject` - Subject attributes besides the common name.
/// * `serial_number` - Serial number written into the certificate.
/// * `validity_days` - Lifetime, starting now.
/// * `is_ca` - Value of the `basicConstraints` CA flag.
#[derive(Clone, Debug, Builder, PartialEq, Eq)]
pub struct SelfSignedParams {
    #[builder(default)]
    pub subject: SubjectTemplate,
    #[builder(default = 1337)]
    pub serial_number: u64,
    #[builder(default = 7)]
    pub validity_days: i64,
    #[builder(default)]
    pub is_ca: bool,
}

impl Default for SelfSignedParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Certificate validity period.
///
/// This struct represents the `notBefore` and `notAfter` fields in a certificate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity period starting now for the given number of days.
    pub fn for_days(days: i64) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            not_before: now,
            not_after: now + Duration::days(days),
        }
    }
}

/// Represents an X.509 extension.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Creates an `ExtensionParam` from a specific extension.
    pub fn from_extension<E: ToAndFromX509Extension>(
        extension: E,
        critical: bool,
    ) -> Result<Self, CryptoError> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes an `ExtensionParam` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E, CryptoError> {
        E::from_x509_extension_value(&self.value)
    }

    pub fn to_x509_extension(&self) -> Result<x509_cert::ext::Extension, CryptoError> {
        Ok(x509_cert::ext::Extension {
            extn_id: self.oid,
            critical: self.critical,
            extn_value: OctetString::new(self.value.clone())?,
        })
    }
}

impl From<&x509_cert::ext::Extension> for ExtensionParam {
    fn from(ext: &x509_cert::ext::Extension) -> Self {
        Self {
            oid: ext.extn_id,
            critical: ext.critical,
            value: ext.extn_value.as_bytes().to_vec(),
        }
    }
}
