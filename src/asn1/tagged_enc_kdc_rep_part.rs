use super::enc_kdc_rep_part::EncKdcRepPart;
use super::KrbMessage;
use crate::error::{Asn1Error, KrbError};
use der::asn1::AnyRef;
use der::{Decode, Reader, SliceReader, Tag, TagNumber, Tagged};
use tracing::debug;

/// ```text
/// EncASRepPart    ::= [APPLICATION 25] EncKDCRepPart
///
/// EncTGSRepPart   ::= [APPLICATION 26] EncKDCRepPart
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TaggedEncKdcRepPart {
    EncAsRepPart(EncKdcRepPart),
    EncTgsRepPart(EncKdcRepPart),
}

application_choice!(TaggedEncKdcRepPart {
    EncAsRepPart(EncKdcRepPart) = 25,
    EncTgsRepPart(EncKdcRepPart) = 26,
});

const ENC_AS_REP_PART: u32 = 25;
const ENC_TGS_REP_PART: u32 = 26;

impl TaggedEncKdcRepPart {
    pub fn into_inner(self) -> EncKdcRepPart {
        match self {
            TaggedEncKdcRepPart::EncAsRepPart(part) | TaggedEncKdcRepPart::EncTgsRepPart(part) => {
                part
            }
        }
    }
}

impl KrbMessage for TaggedEncKdcRepPart {
    /// Follows the same leniency as [`EncKdcRepPart`], including data after
    /// the application wrapper.
    fn parse(bytes: &[u8]) -> Result<Self, KrbError> {
        let mut reader = SliceReader::new(bytes)?;
        let outer = AnyRef::decode(&mut reader)?;
        if !reader.is_finished() {
            debug!(len = %reader.remaining_len(), "ignoring data after EncKDCRepPart");
        }

        match outer.tag() {
            Tag::Application {
                constructed: true,
                number: TagNumber(ENC_AS_REP_PART),
            } => EncKdcRepPart::parse(outer.value()).map(TaggedEncKdcRepPart::EncAsRepPart),
            Tag::Application {
                constructed: true,
                number: TagNumber(ENC_TGS_REP_PART),
            } => EncKdcRepPart::parse(outer.value()).map(TaggedEncKdcRepPart::EncTgsRepPart),
            tag => {
                debug!(%tag, "not an EncASRepPart or EncTGSRepPart");
                Err(Asn1Error::BadId.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TaggedEncKdcRepPart;
    use crate::asn1::enc_kdc_rep_part::tests::sample_part;
    use crate::asn1::uint32::UInt32;
    use crate::asn1::KrbMessage;
    use crate::error::{Asn1Error, KrbError};
    use der::asn1::AnyRef;
    use der::{Encode, Tag, TagNumber};

    fn application(number: u32, content: &[u8]) -> Vec<u8> {
        let tag = Tag::Application {
            constructed: true,
            number: TagNumber(number),
        };
        AnyRef::new(tag, content)
            .and_then(|any| any.to_der())
            .expect("Failed to encode application wrapper")
    }

    #[test]
    fn tagged_enc_kdc_rep_part_lenient() {
        let part = sample_part();

        let tagged = TaggedEncKdcRepPart::EncTgsRepPart(part.clone());
        let der_bytes = tagged.asn1_encode().expect("Failed to encode");
        assert_eq!(der_bytes[0], 0x7a);
        assert_eq!(TaggedEncKdcRepPart::parse(&der_bytes).expect("Failed to parse"), tagged);

        // Cipher block padding after the structure and an extra field inside
        // the application wrapper.
        let inner = part.asn1_encode().expect("Failed to encode");
        let mut content = inner.clone();
        content.extend_from_slice(&[0x00, 0x00]);
        let mut padded = application(25, &content);
        padded.extend_from_slice(&[0x00; 7]);

        let decoded = TaggedEncKdcRepPart::parse(&padded).expect("Failed to parse");
        assert_eq!(decoded, TaggedEncKdcRepPart::EncAsRepPart(part.clone()));
        assert_eq!(decoded.into_inner().nonce, UInt32(0x9abc_def0));

        let wrong = application(27, &inner);
        assert!(matches!(
            TaggedEncKdcRepPart::parse(&wrong),
            Err(KrbError::Asn1(Asn1Error::BadId))
        ));
    }
}
