#[macro_use]
mod macros;

pub mod ap_options;
pub mod ap_rep;
pub mod ap_req;
pub mod authenticator;
pub mod authorization_data;
pub mod checksum;
pub mod constants;
pub mod enc_ap_rep_part;
pub mod enc_kdc_rep_part;
pub mod enc_ticket_part;
pub mod encrypted_data;
pub mod encryption_key;
pub mod etype_info;
pub mod etype_info2;
pub mod host_address;
pub mod kdc_options;
pub mod kdc_rep;
pub mod kdc_req;
pub mod kdc_req_body;
pub mod kerberos_flags;
pub mod kerberos_string;
pub mod kerberos_time;
pub mod krb_cred;
pub mod krb_error;
pub mod krb_kdc_rep;
pub mod krb_kdc_req;
pub mod krb_priv;
pub mod krb_safe;
pub mod last_req;
pub mod microseconds;
pub mod pa_data;
pub mod pa_enc_ts_enc;
pub mod pa_for_user;
pub mod pa_pac_options;
pub mod principal_name;
pub mod realm;
pub mod tagged_enc_kdc_rep_part;
pub mod tagged_ticket;
pub mod ticket_flags;
pub mod transited_encoding;
pub mod uint32;

pub use der::asn1::Ia5String;
pub use der::DateTime;

use self::constants::{KrbErrorCode, KrbMessageType};
use crate::constants::PROTOCOL_VERSION;
use crate::error::{Asn1Error, KrbError};
use der::{Decode, Encode};
use tracing::debug;

/// A protocol data unit that can be parsed from and encoded to DER.
///
/// `parse` rejects trailing data and then validates the fixed protocol
/// fields (version and message type) that DER alone can't express.
pub trait KrbMessage: Sized + for<'a> Decode<'a, Error = der::Error> + Encode {
    fn validate(&self) -> Result<(), KrbError> {
        Ok(())
    }

    fn parse(bytes: &[u8]) -> Result<Self, KrbError> {
        let message = Self::from_der(bytes)?;
        message.validate()?;
        Ok(message)
    }

    fn asn1_encode(&self) -> Result<Vec<u8>, KrbError> {
        self.to_der().map_err(|err| {
            debug!(?err, "failed to encode");
            KrbError::Asn1(Asn1Error::CannotEncode)
        })
    }
}

pub(crate) fn check_version(vno: i32) -> Result<(), KrbError> {
    if vno != PROTOCOL_VERSION {
        debug!(vno, "protocol version mismatch");
        return Err(KrbError::ApErr(KrbErrorCode::KrbApErrBadversion));
    }
    Ok(())
}

pub(crate) fn check_message(pvno: i32, msg_type: i32, expect: KrbMessageType) -> Result<(), KrbError> {
    check_version(pvno)?;
    if msg_type != i32::from(expect) {
        debug!(msg_type, ?expect, "message type mismatch");
        return Err(KrbError::ApErr(KrbErrorCode::KrbApErrMsgType));
    }
    Ok(())
}
