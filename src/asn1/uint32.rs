use der::{DecodeValue, EncodeValue, FixedTag, Length, Tag, Writer};

/// ```text
/// UInt32          ::= INTEGER (0..4294967295)
/// ```
///
/// Nonces, sequence numbers and key versions are unsigned 32 bit values, but
/// implementations disagree on how to put them on the wire. MIT rejects
/// anything above i32::MAX while Heimdal and Windows happily send negative
/// numbers. We hold the unsigned value, accept any INTEGER that fits in 64
/// bits and keep the low 32 bits (so -1 reads as 0xffffffff), and always send
/// the signed 32 bit two's complement form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UInt32(pub u32);

impl FixedTag for UInt32 {
    const TAG: Tag = Tag::Integer;
}

impl<'a> DecodeValue<'a> for UInt32 {
    type Error = der::Error;

    fn decode_value<R: der::Reader<'a>>(reader: &mut R, header: der::Header) -> der::Result<Self> {
        let value = i64::decode_value(reader, header)?;
        Ok(UInt32(value as u32))
    }
}

impl EncodeValue for UInt32 {
    fn value_len(&self) -> der::Result<Length> {
        (self.0 as i32).value_len()
    }

    fn encode_value(&self, encoder: &mut impl Writer) -> der::Result<()> {
        (self.0 as i32).encode_value(encoder)
    }
}

impl From<u32> for UInt32 {
    fn from(value: u32) -> Self {
        UInt32(value)
    }
}

impl From<UInt32> for u32 {
    fn from(value: UInt32) -> Self {
        value.0
    }
}
