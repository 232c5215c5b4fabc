use super::constants::PaDataType;
use crate::error::KrbError;
use der::asn1::OctetString;
use der::{Encode, Sequence};

/// ```text
/// PA-DATA         ::= SEQUENCE {
///         -- NOTE: first tag is [1], not [0]
///         padata-type     [1] Int32,
///         padata-value    [2] OCTET STRING -- might be encoded AP-REQ
/// }
/// ````
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct PaData {
    #[asn1(context_specific = "1")]
    pub padata_type: u32,
    #[asn1(context_specific = "2")]
    pub padata_value: OctetString,
}

impl PaData {
    /// Wrap the DER encoding of `value` as the given padata type.
    pub fn encode_from<T: Encode>(padata_type: PaDataType, value: &T) -> Result<Self, KrbError> {
        let padata_value = value
            .to_der()
            .and_then(OctetString::new)
            .map_err(|_| KrbError::DerEncodeOctetString)?;
        Ok(PaData {
            padata_type: padata_type.into(),
            padata_value,
        })
    }

    pub fn is_type(&self, padata_type: PaDataType) -> bool {
        self.padata_type == u32::from(padata_type)
    }
}

/// Find the first padata of the given type.
pub fn find_padata(padata: &[PaData], padata_type: PaDataType) -> Option<&PaData> {
    padata.iter().find(|pa| pa.is_type(padata_type))
}
