use super::encrypted_data::EncryptedData;
use super::host_address::HostAddresses;
use super::kdc_options::KdcOptions;
use super::kerberos_time::KerberosTime;
use super::principal_name::PrincipalName;
use super::realm::Realm;
use super::tagged_ticket::TaggedTicket;
use super::uint32::UInt32;
use der::Sequence;

/// ```text
/// KDC-REQ-BODY    ::= SEQUENCE {
///         kdc-options             [0] KDCOptions,
///         cname                   [1] PrincipalName OPTIONAL
///                                     -- Used only in AS-REQ --,
///         realm                   [2] Realm
///                                     -- Server's realm
///                                     -- Also client's in AS-REQ --,
///         sname                   [3] PrincipalName OPTIONAL,
///         from                    [4] KerberosTime OPTIONAL,
///         till                    [5] KerberosTime,
///         rtime                   [6] KerberosTime OPTIONAL,
///         nonce                   [7] UInt32,
///         etype                   [8] SEQUENCE OF Int32 -- EncryptionType
///                                     -- in preference order --,
///         addresses               [9] HostAddresses OPTIONAL,
///         enc-authorization-data  [10] EncryptedData OPTIONAL
///                                     -- AuthorizationData --,
///         additional-tickets      [11] SEQUENCE OF Ticket OPTIONAL
///                                         -- NOTE: not empty
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Sequence)]
pub struct KdcReqBody {
    #[asn1(context_specific = "0")]
    pub kdc_options: KdcOptions,
    #[asn1(context_specific = "1", optional = "true")]
    pub cname: Option<PrincipalName>,
    #[asn1(context_specific = "2")]
    pub realm: Realm,
    #[asn1(context_specific = "3", optional = "true")]
    pub sname: Option<PrincipalName>,
    #[asn1(context_specific = "4", optional = "true")]
    pub from: Option<KerberosTime>,
    #[asn1(context_specific = "5")]
    pub till: KerberosTime,
    #[asn1(context_specific = "6", optional = "true")]
    pub rtime: Option<KerberosTime>,
    #[asn1(context_specific = "7")]
    pub nonce: UInt32,
    #[asn1(context_specific = "8")]
    pub etype: Vec<i32>,
    #[asn1(context_specific = "9", optional = "true")]
    pub addresses: Option<HostAddresses>,
    #[asn1(context_specific = "10", optional = "true")]
    pub enc_authorization_data: Option<EncryptedData>,
    #[asn1(context_specific = "11", optional = "true")]
    pub additional_tickets: Option<Vec<TaggedTicket>>,
}
