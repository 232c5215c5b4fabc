use super::uint32::UInt32;
use der::asn1::OctetString;
use der::Sequence;

/// ```text
/// EncryptedData   ::= SEQUENCE {
///         etype   [0] Int32 -- EncryptionType --,
///         kvno    [1] UInt32 OPTIONAL,
///         cipher  [2] OCTET STRING -- ciphertext
/// }
/// ````
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct EncryptedData {
    #[asn1(context_specific = "0")]
    pub etype: i32,
    #[asn1(context_specific = "1", optional = "true")]
    pub kvno: Option<UInt32>,
    #[asn1(context_specific = "2")]
    pub cipher: OctetString,
}

#[cfg(test)]
mod tests {
    use crate::asn1::constants::EncryptionType;
    use crate::asn1::encrypted_data::EncryptedData;
    use crate::asn1::uint32::UInt32;
    use der::asn1::OctetString;
    use der::{Decode, Encode};

    #[test]
    fn encrypted_data_parse() {
        let blob = "3041a003020112a23a0438a708af058781f75eb72d318ecae2f2830aa8ad4c659faeb477e29e131f923db70a33247ed25aa9d7dda218bcdbdf2203e2125fce1465265e";
        let blob = hex::decode(blob).expect("Failed to decode sample");
        let edata = EncryptedData::from_der(&blob).expect("Failed to decode");
        assert_eq!(edata.etype, EncryptionType::AES256_CTS_HMAC_SHA1_96 as i32);
        assert_eq!(edata.kvno, None);
        let tcipher = hex::decode("a708af058781f75eb72d318ecae2f2830aa8ad4c659faeb477e29e131f923db70a33247ed25aa9d7dda218bcdbdf2203e2125fce1465265e").expect("Failed to decode sample");
        assert_eq!(edata.cipher.as_bytes(), tcipher);

        // Trailing data after the sequence is rejected.
        let mut trailing = blob.clone();
        trailing.push(0x00);
        assert!(EncryptedData::from_der(&trailing).is_err());
    }

    #[test]
    fn encrypted_data_kvno_unsigned() {
        let edata = EncryptedData {
            etype: EncryptionType::RC4_HMAC as i32,
            kvno: Some(UInt32(0x8000_0002)),
            cipher: OctetString::new(vec![1, 2, 3]).expect("Failed to build octet string"),
        };
        let der_bytes = edata.to_der().expect("Failed to encode");
        let decoded = EncryptedData::from_der(&der_bytes).expect("Failed to decode");
        assert_eq!(decoded.kvno, Some(UInt32(0x8000_0002)));
    }
}
