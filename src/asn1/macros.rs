/// Implements the `[APPLICATION n]` explicit wrapper around an inner SEQUENCE.
/// Fields are reached with `as_ref()` or by converting into the inner type.
macro_rules! application_tagged {
    ($wrapper:ident, $inner:ident, $number:expr) => {
        impl ::der::FixedTag for $wrapper {
            const TAG: ::der::Tag = ::der::Tag::Application {
                constructed: true,
                number: ::der::TagNumber($number),
            };
        }

        impl<'a> ::der::DecodeValue<'a> for $wrapper {
            type Error = ::der::Error;

            fn decode_value<R: ::der::Reader<'a>>(
                reader: &mut R,
                _header: ::der::Header,
            ) -> ::der::Result<Self> {
                let inner: $inner = <$inner as ::der::Decode>::decode(reader)?;
                Ok(Self(inner))
            }
        }

        impl ::der::EncodeValue for $wrapper {
            fn value_len(&self) -> ::der::Result<::der::Length> {
                ::der::Encode::encoded_len(&self.0)
            }

            fn encode_value(&self, encoder: &mut impl ::der::Writer) -> ::der::Result<()> {
                ::der::Encode::encode(&self.0, encoder)
            }
        }

        impl From<$inner> for $wrapper {
            fn from(value: $inner) -> $wrapper {
                $wrapper(value)
            }
        }

        impl From<$wrapper> for $inner {
            fn from(value: $wrapper) -> $inner {
                value.0
            }
        }

        impl AsRef<$inner> for $wrapper {
            fn as_ref(&self) -> &$inner {
                &self.0
            }
        }
    };
}

/// Implements the DER BIT STRING form and indexed bit access for a
/// `#[bitmask(u32)]` flag set.
///
/// RFC 4120 numbers bits from the most significant bit of the first octet,
/// while the bitmask uses `1 << n` for bit n, so the value is reversed on the
/// wire. RFC 4120 5.2.8 requires at least 32 bits be sent; longer strings are
/// accepted and anything past bit 31 is ignored, shorter ones are zero padded.
// NOTE: Can't use der::Flagset because it strips all leading zeros.
macro_rules! kerberos_flags {
    ($flags:ident) => {
        impl $flags {
            /// Highest bit index that can be addressed.
            pub const MAX_INDEX: usize = 31;

            fn from_bits(val: u32) -> Self {
                let mut f = $flags::none();
                f.bits = val;
                f
            }

            pub fn get_bit(&self, index: usize) -> Result<bool, $crate::error::KrbError> {
                if index > Self::MAX_INDEX {
                    tracing::debug!(index, "flag index out of range");
                    return Err($crate::error::KrbError::FlagIndexOutOfRange);
                }
                Ok(self.bits() & (1u32 << index) != 0)
            }

            pub fn set_bit(
                &mut self,
                index: usize,
                value: bool,
            ) -> Result<(), $crate::error::KrbError> {
                if index > Self::MAX_INDEX {
                    tracing::debug!(index, "flag index out of range");
                    return Err($crate::error::KrbError::FlagIndexOutOfRange);
                }
                let bits = if value {
                    self.bits() | (1u32 << index)
                } else {
                    self.bits() & !(1u32 << index)
                };
                *self = Self::from_bits(bits);
                Ok(())
            }
        }

        impl<'a> ::der::Decode<'a> for $flags {
            type Error = ::der::Error;

            fn decode<R: ::der::Reader<'a>>(decoder: &mut R) -> ::der::Result<Self> {
                let bs = ::der::asn1::BitStringRef::decode(decoder)?;
                let mut bytes = [0u8; 4];
                for (dst, src) in bytes.iter_mut().zip(bs.raw_bytes()) {
                    *dst = *src;
                }
                let bits = u32::from_be_bytes(bytes);
                Ok($flags::from_bits(bits.reverse_bits()))
            }
        }

        impl ::der::Tagged for $flags {
            fn tag(&self) -> ::der::Tag {
                ::der::Tag::BitString
            }
        }

        impl ::der::EncodeValue for $flags {
            fn value_len(&self) -> ::der::Result<::der::Length> {
                let buff = self.bits().reverse_bits().to_be_bytes();
                let bs = ::der::asn1::BitStringRef::from_bytes(&buff)?;
                bs.value_len()
            }

            fn encode_value(&self, encoder: &mut impl ::der::Writer) -> ::der::Result<()> {
                let buff = self.bits().reverse_bits().to_be_bytes();
                let bs = ::der::asn1::BitStringRef::from_bytes(&buff)?;
                bs.encode_value(encoder)
            }
        }
    };
}

/// Implements DER for an enum whose variants are told apart only by their
/// `[APPLICATION n]` tag, such as AS-REP and TGS-REP.
macro_rules! application_choice {
    ($choice:ident { $($variant:ident($inner:ty) = $number:expr),+ $(,)? }) => {
        impl $choice {
            fn application_tag(&self) -> ::der::Tag {
                match self {
                    $(
                        $choice::$variant(_) => ::der::Tag::Application {
                            constructed: true,
                            number: ::der::TagNumber($number),
                        },
                    )+
                }
            }

            fn inner_encoded_len(&self) -> ::der::Result<::der::Length> {
                match self {
                    $( $choice::$variant(inner) => ::der::Encode::encoded_len(inner), )+
                }
            }
        }

        impl<'a> ::der::Decode<'a> for $choice {
            type Error = ::der::Error;

            fn decode<R: ::der::Reader<'a>>(decoder: &mut R) -> ::der::Result<Self> {
                let header: ::der::Header = decoder.decode()?;

                match header.tag() {
                    $(
                        ::der::Tag::Application {
                            constructed: true,
                            number: ::der::TagNumber($number),
                        } => decoder.read_nested(header.length(), |nested| -> ::der::Result<Self> {
                            let inner: $inner = nested.decode()?;
                            Ok($choice::$variant(inner))
                        }),
                    )+
                    tag => Err(::der::Error::from(::der::ErrorKind::TagUnexpected {
                        expected: None,
                        actual: tag,
                    })),
                }
            }
        }

        impl ::der::Encode for $choice {
            fn encoded_len(&self) -> ::der::Result<::der::Length> {
                let inner_len = self.inner_encoded_len()?;
                ::der::Encode::encoded_len(&self.application_tag())?
                    + ::der::Encode::encoded_len(&inner_len)?
                    + inner_len
            }

            fn encode(&self, writer: &mut impl ::der::Writer) -> ::der::Result<()> {
                ::der::Encode::encode(&self.application_tag(), writer)?;
                ::der::Encode::encode(&self.inner_encoded_len()?, writer)?;
                match self {
                    $( $choice::$variant(inner) => ::der::Encode::encode(inner, writer), )+
                }
            }
        }
    };
}
