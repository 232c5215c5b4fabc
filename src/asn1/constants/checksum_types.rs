use num_enum::{IntoPrimitive, TryFromPrimitive};

/// RFC 3961 section 8 and RFC 4757 checksum type numbers.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum ChecksumType {
    CRC32 = 1,
    RSA_MD4 = 2,
    RSA_MD4_DES = 3,
    DES_MAC = 4,
    DES_MAC_K = 5,
    RSA_MD4_DES_K = 6,
    RSA_MD5 = 7,
    RSA_MD5_DES = 8,
    RSA_MD5_DES3 = 9,
    SHA1 = 10,
    HMAC_SHA1_DES3_KD = 12,
    HMAC_SHA1_DES3 = 13,
    SHA1_2 = 14,
    HMAC_SHA1_96_AES128 = 15,
    HMAC_SHA1_96_AES256 = 16,
    CMAC_CAMELLIA128 = 17,
    CMAC_CAMELLIA256 = 18,
    HMAC_SHA256_128_AES128 = 19,
    HMAC_SHA384_192_AES256 = 20,
    // Microsoft, used by PA-FOR-USER regardless of the session key type.
    HMAC_MD5 = -138,
}
