use super::authorization_data::AuthorizationData;
use super::check_version;
use super::checksum::Checksum;
use super::encryption_key::EncryptionKey;
use super::kerberos_time::{join_system_time, split_system_time, KerberosTime};
use super::microseconds::Microseconds;
use super::principal_name::PrincipalName;
use super::realm::Realm;
use super::uint32::UInt32;
use super::KrbMessage;
use crate::constants::PROTOCOL_VERSION;
use crate::error::KrbError;
use der::Sequence;
use std::time::SystemTime;

/// ```text
/// Authenticator   ::= [APPLICATION 2] SEQUENCE  {
///        authenticator-vno       [0] INTEGER (5),
///        crealm                  [1] Realm,
///        cname                   [2] PrincipalName,
///        cksum                   [3] Checksum OPTIONAL,
///        cusec                   [4] Microseconds,
///        ctime                   [5] KerberosTime,
///        subkey                  [6] EncryptionKey OPTIONAL,
///        seq-number              [7] UInt32 OPTIONAL,
///        authorization-data      [8] AuthorizationData OPTIONAL
/// }
///```
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct AuthenticatorInner {
    #[asn1(context_specific = "0")]
    pub authenticator_vno: i32,
    #[asn1(context_specific = "1")]
    pub crealm: Realm,
    #[asn1(context_specific = "2")]
    pub cname: PrincipalName,
    #[asn1(context_specific = "3", optional = "true")]
    // A checksum of the application data that accompanies the KRB_AP_REQ,
    // computed using a key usage value of 10 in normal application exchanges,
    // or 6 when used in the TGS-REQ PA-TGS-REQ AP-DATA field.
    pub cksum: Option<Checksum>,
    #[asn1(context_specific = "4")]
    pub cusec: Microseconds,
    #[asn1(context_specific = "5")]
    pub ctime: KerberosTime,
    #[asn1(context_specific = "6", optional = "true")]
    // If left out, the session key from the ticket is used.
    pub subkey: Option<EncryptionKey>,
    #[asn1(context_specific = "7", optional = "true")]
    // Initial sequence number for KRB_PRIV or KRB_SAFE messages from the
    // client to the server.
    pub seq_number: Option<UInt32>,
    #[asn1(context_specific = "8", optional = "true")]
    pub authorization_data: Option<AuthorizationData>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Authenticator(pub AuthenticatorInner);

application_tagged!(Authenticator, AuthenticatorInner, 2);

impl Authenticator {
    pub fn new(
        client_name: PrincipalName,
        client_realm: Realm,
        client_time: SystemTime,
        checksum: Option<Checksum>,
        subkey: Option<EncryptionKey>,
        sequence_number: Option<u32>,
        authorization_data: Option<AuthorizationData>,
    ) -> Result<Self, KrbError> {
        let (ctime, cusec) = split_system_time(client_time)?;
        Ok(Authenticator(AuthenticatorInner {
            authenticator_vno: PROTOCOL_VERSION,
            crealm: client_realm,
            cname: client_name,
            cksum: checksum,
            cusec,
            ctime,
            subkey,
            seq_number: sequence_number.map(UInt32),
            authorization_data,
        }))
    }

    /// ctime and cusec combined.
    pub fn client_time(&self) -> SystemTime {
        join_system_time(&self.0.ctime, self.0.cusec)
    }
}

impl KrbMessage for Authenticator {
    fn validate(&self) -> Result<(), KrbError> {
        check_version(self.0.authenticator_vno)
    }
}
