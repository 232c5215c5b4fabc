use super::{Credentials, Name};
use crate::asn1::ap_options::ApOptions;
use crate::asn1::ap_req::ApReq;
use crate::asn1::authenticator::Authenticator;
use crate::asn1::constants::{EncryptionType, KeyUsage, KrbMessageType, PaDataType};
use crate::asn1::encryption_key::EncryptionKey;
use crate::asn1::kdc_options::KdcOptions;
use crate::asn1::kdc_req::KdcReq;
use crate::asn1::kdc_req_body::KdcReqBody;
use crate::asn1::kerberos_time::to_kerberos_time;
use crate::asn1::krb_kdc_req::KrbKdcReq;
use crate::asn1::pa_data::PaData;
use crate::asn1::principal_name::PrincipalName;
use crate::asn1::realm::Realm;
use crate::asn1::tagged_ticket::TaggedTicket;
use crate::asn1::uint32::UInt32;
use crate::asn1::KrbMessage;
use crate::crypto::{KrbCrypto, SessionKey};
use crate::error::KrbError;
use der::Encode;
use std::time::SystemTime;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct TgsRequestBuilder {
    service: Name,
    options: KdcOptions,
    from: Option<SystemTime>,
    until: SystemTime,
    renew: Option<SystemTime>,
    etypes: Vec<EncryptionType>,
    padata: Vec<PaData>,
    additional_tickets: Vec<TaggedTicket>,
    subkey: Option<SessionKey>,
    expect_client: bool,
}

/// An encoded TGS-REQ and what is needed to check the reply to it.
#[derive(Debug, Clone)]
pub struct TgsRequest {
    pub(crate) nonce: u32,
    pub(crate) service: Name,
    pub(crate) options: KdcOptions,
    pub(crate) tgt_key: SessionKey,
    pub(crate) subkey: Option<SessionKey>,
    /// The client the reply must name. S4U requests check this themselves.
    pub(crate) expected_client: Option<Name>,
    message: KrbKdcReq,
}

impl TgsRequest {
    pub fn builder(service: Name, until: SystemTime) -> TgsRequestBuilder {
        TgsRequestBuilder {
            service,
            options: KdcOptions::none(),
            from: None,
            until,
            renew: None,
            etypes: vec![
                EncryptionType::AES256_CTS_HMAC_SHA1_96,
                EncryptionType::AES128_CTS_HMAC_SHA1_96,
            ],
            padata: Vec::new(),
            additional_tickets: Vec::new(),
            subkey: None,
            expect_client: true,
        }
    }

    pub fn nonce(&self) -> u32 {
        self.nonce
    }

    pub fn service(&self) -> &Name {
        &self.service
    }

    pub fn message(&self) -> &KrbKdcReq {
        &self.message
    }

    pub fn to_der(&self) -> Result<Vec<u8>, KrbError> {
        self.message.asn1_encode()
    }
}

impl TgsRequestBuilder {
    pub fn options(mut self, options: KdcOptions) -> Self {
        self.options |= options;
        self
    }

    pub fn from(mut self, from: Option<SystemTime>) -> Self {
        self.from = from;
        self
    }

    pub fn renew_until(mut self, renew: Option<SystemTime>) -> Self {
        self.renew = renew;
        self
    }

    pub fn etypes(mut self, etypes: Vec<EncryptionType>) -> Self {
        self.etypes = etypes;
        self
    }

    pub fn padata(mut self, padata: PaData) -> Self {
        self.padata.push(padata);
        self
    }

    pub fn additional_ticket(mut self, ticket: TaggedTicket) -> Self {
        self.additional_tickets.push(ticket);
        self
    }

    /// Ask the KDC to encrypt the reply in `subkey` rather than the TGT
    /// session key.
    pub fn subkey(mut self, subkey: SessionKey) -> Self {
        self.subkey = Some(subkey);
        self
    }

    pub(crate) fn without_client_check(mut self) -> Self {
        self.expect_client = false;
        self
    }

    pub fn build<C: KrbCrypto + ?Sized>(
        self,
        crypto: &C,
        tgt: &Credentials,
        now: SystemTime,
    ) -> Result<TgsRequest, KrbError> {
        let TgsRequestBuilder {
            service,
            options,
            from,
            until,
            renew,
            etypes,
            padata,
            additional_tickets,
            subkey,
            expect_client,
        } = self;

        // MIT rejects nonces above i32::MAX with "ASN.1 value too large".
        let nonce = rand::random::<u32>() & 0x7fff_ffff;

        let (sname, realm): (PrincipalName, Realm) = (&service).try_into()?;

        let req_body = KdcReqBody {
            kdc_options: options,
            cname: None,
            realm,
            sname: Some(sname),
            from: from.map(to_kerberos_time).transpose()?,
            till: to_kerberos_time(until)?,
            rtime: renew.map(to_kerberos_time).transpose()?,
            nonce: UInt32(nonce),
            etype: etypes.iter().map(|e| i32::from(*e)).collect(),
            addresses: None,
            enc_authorization_data: None,
            additional_tickets: (!additional_tickets.is_empty()).then_some(additional_tickets),
        };

        // The checksum in the authenticator is over the KDC-REQ-BODY encoding.
        let body_bytes = req_body.to_der().map_err(|err| {
            debug!(?err, "failed to encode KDC-REQ-BODY");
            KrbError::from(err)
        })?;
        let checksum =
            tgt.session_key
                .checksum(crypto, KeyUsage::TgsReqPaTgsReqChecksum, &body_bytes)?;

        let (cname, crealm): (PrincipalName, Realm) = (&tgt.client).try_into()?;
        let subkey_der = subkey.as_ref().map(EncryptionKey::try_from).transpose()?;
        let authenticator =
            Authenticator::new(cname, crealm, now, Some(checksum), subkey_der, None, None)?;
        let authenticator = tgt.session_key.seal(
            crypto,
            KeyUsage::TgsReqPaTgsReqAuthenticator,
            None,
            &authenticator.asn1_encode()?,
        )?;

        let ap_req = ApReq::new(ApOptions::none(), tgt.ticket.clone(), authenticator);

        let mut all_padata = vec![PaData::encode_from(PaDataType::PaTgsReq, &ap_req)?];
        all_padata.extend(padata);

        trace!(%service, nonce, ?options, "built TGS-REQ");

        Ok(TgsRequest {
            nonce,
            options,
            expected_client: expect_client.then(|| tgt.client.clone()),
            service,
            tgt_key: tgt.session_key.clone(),
            subkey,
            message: KrbKdcReq::TgsReq(KdcReq::new(
                KrbMessageType::KrbTgsReq,
                Some(all_padata),
                req_body,
            )),
        })
    }
}
