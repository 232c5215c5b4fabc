//! The symmetric cryptography engine is supplied by the caller. Everything in
//! this crate only ever sees it through [`KrbCipher`] and [`KrbChecksum`].

use crate::asn1::checksum::Checksum;
use crate::asn1::constants::{ChecksumType, EncryptionType, KeyUsage, KrbErrorCode};
use crate::asn1::encrypted_data::EncryptedData;
use crate::asn1::encryption_key::EncryptionKey;
use crate::asn1::uint32::UInt32;
use crate::error::KrbError;
use der::asn1::OctetString;
use rand::RngCore;
use std::fmt;
use tracing::{debug, error};

pub trait KrbCipher: Send + Sync {
    fn encrypt(
        &self,
        key: &SessionKey,
        usage: KeyUsage,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, KrbError>;

    fn decrypt(
        &self,
        key: &SessionKey,
        usage: KeyUsage,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, KrbError>;
}

pub trait KrbChecksum: Send + Sync {
    /// The keyed checksum that goes with this key's encryption type.
    fn checksum_type_for(&self, key: &SessionKey) -> Result<ChecksumType, KrbError>;

    fn compute(
        &self,
        key: &SessionKey,
        usage: KeyUsage,
        checksum_type: ChecksumType,
        data: &[u8],
    ) -> Result<Vec<u8>, KrbError>;
}

/// Both halves of the engine, as held by the credential acquisition code.
pub trait KrbCrypto: KrbCipher + KrbChecksum {}

impl<T: KrbCipher + KrbChecksum> KrbCrypto for T {}

#[derive(Clone, PartialEq, Eq)]
pub struct SessionKey {
    pub etype: EncryptionType,
    key: Vec<u8>,
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKey")
            .field("etype", &self.etype)
            .finish_non_exhaustive()
    }
}

impl SessionKey {
    pub fn new(etype: EncryptionType, key: Vec<u8>) -> Result<Self, KrbError> {
        if key.is_empty() && etype != EncryptionType::NULL {
            return Err(KrbError::InvalidEncryptionKey);
        }
        Ok(SessionKey { etype, key })
    }

    /// A fresh random key of `len` bytes, used for sub-session keys.
    pub fn random(etype: EncryptionType, len: usize) -> Self {
        let mut key = vec![0u8; len];
        rand::rng().fill_bytes(&mut key);
        SessionKey { etype, key }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn seal<C: KrbCipher + ?Sized>(
        &self,
        cipher: &C,
        usage: KeyUsage,
        kvno: Option<u32>,
        plaintext: &[u8],
    ) -> Result<EncryptedData, KrbError> {
        let data = cipher.encrypt(self, usage, plaintext)?;
        let cipher = OctetString::new(data).map_err(|_| KrbError::DerEncodeOctetString)?;
        Ok(EncryptedData {
            etype: self.etype.into(),
            kvno: kvno.map(UInt32),
            cipher,
        })
    }

    pub fn unseal<C: KrbCipher + ?Sized>(
        &self,
        cipher: &C,
        usage: KeyUsage,
        enc: &EncryptedData,
    ) -> Result<Vec<u8>, KrbError> {
        if enc.etype != i32::from(self.etype) {
            error!(
                etype = enc.etype,
                key_etype = ?self.etype,
                "encryption type does not match the key"
            );
            return Err(KrbError::ApErr(KrbErrorCode::KdcErrEtypeNosupp));
        }
        cipher.decrypt(self, usage, enc.cipher.as_bytes())
    }

    pub fn checksum<C: KrbChecksum + ?Sized>(
        &self,
        engine: &C,
        usage: KeyUsage,
        data: &[u8],
    ) -> Result<Checksum, KrbError> {
        let checksum_type = engine.checksum_type_for(self)?;
        self.checksum_with(engine, usage, checksum_type, data)
    }

    pub fn checksum_with<C: KrbChecksum + ?Sized>(
        &self,
        engine: &C,
        usage: KeyUsage,
        checksum_type: ChecksumType,
        data: &[u8],
    ) -> Result<Checksum, KrbError> {
        let value = engine.compute(self, usage, checksum_type, data)?;
        Ok(Checksum {
            checksum_type: checksum_type.into(),
            checksum: OctetString::new(value).map_err(|_| KrbError::DerEncodeOctetString)?,
        })
    }

    /// Recompute `expect` over `data`. A checksum type we can't use is
    /// KRB_AP_ERR_INAPP_CKSUM, a different value is KRB_AP_ERR_MODIFIED.
    pub fn verify_checksum<C: KrbChecksum + ?Sized>(
        &self,
        engine: &C,
        usage: KeyUsage,
        expect: &Checksum,
        data: &[u8],
    ) -> Result<(), KrbError> {
        let checksum_type = ChecksumType::try_from(expect.checksum_type).map_err(|_| {
            debug!(checksum_type = expect.checksum_type, "unknown checksum type");
            KrbError::ApErr(KrbErrorCode::KrbApErrInappCksum)
        })?;

        let value = engine.compute(self, usage, checksum_type, data)?;
        if value != expect.checksum.as_bytes() {
            debug!(?usage, "checksum mismatch");
            return Err(KrbError::ApErr(KrbErrorCode::KrbApErrModified));
        }
        Ok(())
    }
}

impl TryFrom<&EncryptionKey> for SessionKey {
    type Error = KrbError;

    fn try_from(value: &EncryptionKey) -> Result<Self, Self::Error> {
        let etype = EncryptionType::try_from(value.key_type).map_err(|_| {
            error!(key_type = value.key_type, "unsupported key type");
            KrbError::UnsupportedEncryption
        })?;
        SessionKey::new(etype, value.key_value.as_bytes().to_vec())
    }
}

impl TryFrom<&SessionKey> for EncryptionKey {
    type Error = KrbError;

    fn try_from(value: &SessionKey) -> Result<Self, Self::Error> {
        Ok(EncryptionKey {
            key_type: value.etype.into(),
            key_value: OctetString::new(value.key.clone())
                .map_err(|_| KrbError::DerEncodeOctetString)?,
        })
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! A keyed but worthless cipher. Good enough to prove which key and usage
    //! a value was sealed with.

    use super::{KrbChecksum, KrbCipher, SessionKey};
    use crate::asn1::constants::{ChecksumType, KeyUsage};
    use crate::error::KrbError;
    use sha1::{Digest, Sha1};

    const TAG_LEN: usize = 4;

    #[derive(Debug, Default)]
    pub(crate) struct FakeCrypto;

    fn mac(key: &SessionKey, usage: KeyUsage, data: &[u8]) -> Vec<u8> {
        let mut hasher = Sha1::new();
        hasher.update(key.key());
        hasher.update(u32::from(usage).to_be_bytes());
        hasher.update(data);
        hasher.finalize().to_vec()
    }

    fn xor(key: &SessionKey, data: &[u8]) -> Vec<u8> {
        data.iter()
            .zip(key.key().iter().cycle())
            .map(|(d, k)| d ^ k)
            .collect()
    }

    impl KrbCipher for FakeCrypto {
        fn encrypt(
            &self,
            key: &SessionKey,
            usage: KeyUsage,
            plaintext: &[u8],
        ) -> Result<Vec<u8>, KrbError> {
            let mut out = mac(key, usage, plaintext)[..TAG_LEN].to_vec();
            out.extend(xor(key, plaintext));
            Ok(out)
        }

        fn decrypt(
            &self,
            key: &SessionKey,
            usage: KeyUsage,
            ciphertext: &[u8],
        ) -> Result<Vec<u8>, KrbError> {
            if ciphertext.len() < TAG_LEN {
                return Err(KrbError::MessageAuthenticationFailed);
            }
            let (tag, body) = ciphertext.split_at(TAG_LEN);
            let plaintext = xor(key, body);
            if mac(key, usage, &plaintext)[..TAG_LEN] != *tag {
                return Err(KrbError::MessageAuthenticationFailed);
            }
            Ok(plaintext)
        }
    }

    impl KrbChecksum for FakeCrypto {
        fn checksum_type_for(&self, _key: &SessionKey) -> Result<ChecksumType, KrbError> {
            Ok(ChecksumType::HMAC_SHA1_96_AES256)
        }

        fn compute(
            &self,
            key: &SessionKey,
            usage: KeyUsage,
            checksum_type: ChecksumType,
            data: &[u8],
        ) -> Result<Vec<u8>, KrbError> {
            let mut input = i32::from(checksum_type).to_be_bytes().to_vec();
            input.extend_from_slice(data);
            Ok(mac(key, usage, &input)[..12].to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeCrypto;
    use super::SessionKey;
    use crate::asn1::constants::{EncryptionType, KeyUsage, KrbErrorCode};
    use crate::asn1::encryption_key::EncryptionKey;
    use crate::error::KrbError;

    #[test]
    fn session_key_seal_and_checksum() {
        let key = SessionKey::new(EncryptionType::AES256_CTS_HMAC_SHA1_96, vec![7; 32])
            .expect("Failed to build key");

        let sealed = key
            .seal(&FakeCrypto, KeyUsage::KrbPrivEncPart, Some(2), b"hello")
            .expect("Failed to seal");
        assert_eq!(sealed.etype, 18);
        assert_eq!(sealed.kvno.map(u32::from), Some(2));

        let plain = key
            .unseal(&FakeCrypto, KeyUsage::KrbPrivEncPart, &sealed)
            .expect("Failed to unseal");
        assert_eq!(plain, b"hello");

        // Wrong usage is an integrity failure.
        assert!(matches!(
            key.unseal(&FakeCrypto, KeyUsage::KrbCredEncPart, &sealed),
            Err(KrbError::MessageAuthenticationFailed)
        ));

        let cksum = key
            .checksum(&FakeCrypto, KeyUsage::KrbSafeChecksum, b"body")
            .expect("Failed to checksum");
        assert!(key
            .verify_checksum(&FakeCrypto, KeyUsage::KrbSafeChecksum, &cksum, b"body")
            .is_ok());
        assert!(matches!(
            key.verify_checksum(&FakeCrypto, KeyUsage::KrbSafeChecksum, &cksum, b"bodY"),
            Err(KrbError::ApErr(KrbErrorCode::KrbApErrModified))
        ));

        let mut bogus = cksum.clone();
        bogus.checksum_type = 9999;
        assert!(matches!(
            key.verify_checksum(&FakeCrypto, KeyUsage::KrbSafeChecksum, &bogus, b"body"),
            Err(KrbError::ApErr(KrbErrorCode::KrbApErrInappCksum))
        ));
    }

    #[test]
    fn session_key_conversion() {
        let key = SessionKey::random(EncryptionType::AES128_CTS_HMAC_SHA1_96, 16);
        assert_eq!(key.key().len(), 16);

        let ek = EncryptionKey::try_from(&key).expect("Failed to convert key");
        assert_eq!(ek.key_type, 17);
        let back = SessionKey::try_from(&ek).expect("Failed to convert key");
        assert_eq!(back, key);

        // Debug never shows the key material.
        let debug = format!("{key:?}");
        assert!(!debug.contains("key:"));

        assert!(SessionKey::new(EncryptionType::AES256_CTS_HMAC_SHA1_96, vec![]).is_err());
    }
}
