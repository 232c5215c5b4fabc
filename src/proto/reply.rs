use super::{Credentials, Name, TgsRequest};
use crate::asn1::constants::{KeyUsage, KrbErrorCode};
use crate::asn1::kerberos_flags::KerberosFlags;
use crate::asn1::krb_error::KrbErrorMsg;
use crate::asn1::krb_kdc_rep::KrbKdcRep;
use crate::asn1::tagged_enc_kdc_rep_part::TaggedEncKdcRepPart;
use crate::asn1::KrbMessage;
use crate::crypto::KrbCipher;
use crate::error::KrbError;
use tracing::{debug, error, instrument};

/// Log a KRB-ERROR received from a KDC and turn it into the error surfaced to
/// callers.
pub(crate) fn kdc_error(err: &KrbErrorMsg) -> KrbError {
    let code = err.error_code();
    debug!(
        ?code,
        e_text = ?err.error_text.as_ref().map(|t| t.as_str()),
        e_data = ?err.parse_e_data(),
        "KDC returned an error"
    );
    KrbError::Kdc(code)
}

impl TgsRequest {
    /// Decode the KDC's answer to this request. The encrypted part is read
    /// with the request's sub-session key when one was sent, otherwise with
    /// the TGT session key.
    #[instrument(level = "debug", skip_all, fields(service = %self.service))]
    pub fn read_reply<C: KrbCipher + ?Sized>(
        &self,
        cipher: &C,
        bytes: &[u8],
    ) -> Result<Credentials, KrbError> {
        let rep = match KrbKdcRep::parse(bytes)? {
            KrbKdcRep::TgsRep(rep) => rep,
            KrbKdcRep::ErrRep(err) => return Err(kdc_error(&err)),
            KrbKdcRep::AsRep(_) => {
                error!("received an AS-REP in answer to a TGS-REQ");
                return Err(KrbError::UnexpectedReplyType);
            }
        };

        let (key, usage) = match &self.subkey {
            Some(subkey) => (subkey, KeyUsage::TgsRepEncPartSubkey),
            None => (&self.tgt_key, KeyUsage::TgsRepEncPartSessionKey),
        };

        let plain = key.unseal(cipher, usage, &rep.enc_part)?;
        let part = TaggedEncKdcRepPart::parse(&plain)?.into_inner();

        if part.nonce.0 != self.nonce {
            error!(expect = self.nonce, got = part.nonce.0, "nonce mismatch");
            return Err(KrbError::ApErr(KrbErrorCode::KrbApErrModified));
        }

        // The ticket and the encrypted part must agree on which service this is.
        if !part.server_name.matches(&rep.ticket.0.sname)
            || part.server_realm != rep.ticket.0.realm
        {
            error!("ticket server does not match the encrypted reply");
            return Err(KrbError::ApErr(KrbErrorCode::KrbApErrModified));
        }

        let mut creds = Credentials::from_kdc_reply(&rep, part)?;

        if let Some(expect) = &self.expected_client {
            if !creds.client.matches(expect) {
                error!(expect = %expect, got = %creds.client, "reply is for another client");
                return Err(KrbError::ReplyClientMismatch);
            }
        }

        if !creds.server.matches(&self.service) {
            let canonicalize = self.options.contains(KerberosFlags::Canonicalize);
            let referral = creds.server.krbtgt_target().is_some();
            // Without a direct trust a KDC may answer a TGT request with a TGT
            // for a realm on the way.
            let closer_tgt = referral
                && self.service.krbtgt_target().is_some()
                && creds.server.realm() == self.service.realm();
            if !canonicalize && !closer_tgt {
                error!(expect = %self.service, got = %creds.server, "reply is for another service");
                return Err(KrbError::ReplyServerMismatch);
            }
            if !referral {
                debug!(requested = %self.service, got = %creds.server, "service name canonicalized");
                creds.server_alias = Some(self.service.clone());
            }
        }

        Ok(creds)
    }
}

/// The referral target named by a reply, if the reply is a cross realm TGT
/// rather than the requested service. A service already named in the target
/// realm can still be referred there.
pub(crate) fn referral_realm(requested: &Name, creds: &Credentials) -> Option<String> {
    let to = creds.server.krbtgt_target()?;
    // Asking for a TGT and getting one is an answer, not a referral.
    if creds.server.matches(requested) {
        return None;
    }
    Some(to.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::referral_realm;
    use crate::asn1::constants::{KeyUsage, KrbErrorCode, KrbMessageType};
    use crate::asn1::enc_kdc_rep_part::tests::sample_part;
    use crate::asn1::enc_kdc_rep_part::EncKdcRepPart;
    use crate::asn1::encryption_key::EncryptionKey;
    use crate::asn1::kdc_rep::KdcRep;
    use crate::asn1::kerberos_flags::KerberosFlags;
    use crate::asn1::kerberos_time::{to_kerberos_time, KerberosTime};
    use crate::asn1::krb_error::{KrbErrorMsg, TaggedKrbError};
    use crate::asn1::krb_kdc_rep::KrbKdcRep;
    use crate::asn1::principal_name::PrincipalName;
    use crate::asn1::realm::Realm;
    use crate::asn1::tagged_enc_kdc_rep_part::TaggedEncKdcRepPart;
    use crate::asn1::tagged_ticket::TaggedTicket;
    use crate::asn1::ticket_flags::TicketFlags;
    use crate::asn1::uint32::UInt32;
    use crate::asn1::KrbMessage;
    use crate::constants::PROTOCOL_VERSION;
    use crate::crypto::fake::FakeCrypto;
    use crate::crypto::SessionKey;
    use crate::error::KrbError;
    use crate::proto::credentials::tests::sample_credentials;
    use crate::proto::{Name, TgsRequest};
    use der::asn1::OctetString;
    use std::time::{Duration, SystemTime};

    /// What a KDC would answer to `request`, issuing a ticket for `server` to
    /// `client` sealed under `reply_key`.
    pub(crate) fn tgs_rep_bytes(
        nonce: u32,
        reply_key: &SessionKey,
        client: &Name,
        server: &Name,
        flags: TicketFlags,
        end_time: SystemTime,
    ) -> Vec<u8> {
        let (cname, crealm): (PrincipalName, Realm) =
            client.try_into().expect("Failed to convert client");
        let (sname, srealm): (PrincipalName, Realm) =
            server.try_into().expect("Failed to convert server");

        let mut part: EncKdcRepPart = sample_part();
        part.nonce = UInt32(nonce);
        part.flags = flags;
        part.server_name = sname.clone();
        part.server_realm = srealm.clone();
        part.end_time = to_kerberos_time(end_time).expect("Failed to convert time");
        part.key = EncryptionKey::try_from(&SessionKey::new(
            reply_key.etype,
            format!("{server}").into_bytes(),
        )
        .expect("Failed to build key"))
        .expect("Failed to convert key");

        let plain = TaggedEncKdcRepPart::EncTgsRepPart(part)
            .asn1_encode()
            .expect("Failed to encode part");
        let enc_part = reply_key
            .seal(&FakeCrypto, KeyUsage::TgsRepEncPartSessionKey, None, &plain)
            .expect("Failed to seal part");

        let ticket = TaggedTicket::new(
            srealm,
            sname,
            reply_key
                .seal(&FakeCrypto, KeyUsage::KdcRepTicket, Some(1), b"ticket")
                .expect("Failed to seal ticket"),
        );

        KrbKdcRep::TgsRep(KdcRep::new(
            KrbMessageType::KrbTgsRep,
            None,
            crealm,
            cname,
            ticket,
            enc_part,
        ))
        .asn1_encode()
        .expect("Failed to encode reply")
    }

    pub(crate) fn krb_error_bytes(code: KrbErrorCode) -> Vec<u8> {
        let stime: KerberosTime =
            to_kerberos_time(SystemTime::now()).expect("Failed to convert time");
        TaggedKrbError(KrbErrorMsg {
            pvno: PROTOCOL_VERSION,
            msg_type: KrbMessageType::KrbError.into(),
            ctime: None,
            cusec: None,
            stime,
            susec: 0,
            error_code: code.into(),
            crealm: None,
            cname: None,
            service_realm: Realm::new("EXAMPLE.COM").expect("Failed to build realm"),
            service_name: PrincipalName::try_from(&Name::service_krbtgt("EXAMPLE.COM"))
                .expect("Failed to build name"),
            error_text: None,
            error_data: Some(OctetString::new(vec![0x30, 0x00]).expect("Failed to build e-data")),
            error_checksum: None,
        })
        .asn1_encode()
        .expect("Failed to encode error")
    }

    fn build_request(service: &Name, options: KerberosFlags) -> (TgsRequest, SessionKey, Name) {
        let client = Name::principal("alice", "EXAMPLE.COM");
        let tgt = sample_credentials(
            &client,
            &Name::service_krbtgt("EXAMPLE.COM"),
            TicketFlags::none(),
        );
        let now = SystemTime::now();
        let request = TgsRequest::builder(service.clone(), now + Duration::from_secs(600))
            .options(options)
            .build(&FakeCrypto, &tgt, now)
            .expect("Failed to build request");
        (request, tgt.session_key, client)
    }

    #[test]
    fn tgs_reply_accepts_answer() {
        let service = Name::service("HTTP", "www.example.com", "EXAMPLE.COM");
        let (request, key, client) = build_request(&service, KerberosFlags::none());
        let end = SystemTime::now() + Duration::from_secs(600);

        let bytes = tgs_rep_bytes(
            request.nonce(),
            &key,
            &client,
            &service,
            TicketFlags::Forwardable,
            end,
        );
        let creds = request
            .read_reply(&FakeCrypto, &bytes)
            .expect("Failed to read reply");
        assert_eq!(creds.server, service);
        assert_eq!(creds.client, client);
        assert!(creds.is_forwardable());
        assert!(creds.server_alias.is_none());
    }

    #[test]
    fn tgs_reply_rejects_bad_nonce_and_names() {
        let service = Name::service("HTTP", "www.example.com", "EXAMPLE.COM");
        let (request, key, client) = build_request(&service, KerberosFlags::none());
        let end = SystemTime::now() + Duration::from_secs(600);

        let bytes = tgs_rep_bytes(
            request.nonce().wrapping_add(1),
            &key,
            &client,
            &service,
            TicketFlags::none(),
            end,
        );
        assert!(matches!(
            request.read_reply(&FakeCrypto, &bytes),
            Err(KrbError::ApErr(KrbErrorCode::KrbApErrModified))
        ));

        let mallory = Name::principal("mallory", "EXAMPLE.COM");
        let bytes = tgs_rep_bytes(request.nonce(), &key, &mallory, &service, TicketFlags::none(), end);
        assert!(matches!(
            request.read_reply(&FakeCrypto, &bytes),
            Err(KrbError::ReplyClientMismatch)
        ));

        // A different service is only acceptable when canonicalization was asked for.
        let other = Name::service("HTTP", "other.example.com", "EXAMPLE.COM");
        let bytes = tgs_rep_bytes(request.nonce(), &key, &client, &other, TicketFlags::none(), end);
        assert!(matches!(
            request.read_reply(&FakeCrypto, &bytes),
            Err(KrbError::ReplyServerMismatch)
        ));

        let (canon, key, client) = build_request(&service, KerberosFlags::Canonicalize);
        let bytes = tgs_rep_bytes(canon.nonce(), &key, &client, &other, TicketFlags::none(), end);
        let creds = canon
            .read_reply(&FakeCrypto, &bytes)
            .expect("Failed to read reply");
        assert_eq!(creds.server_alias, Some(service.clone()));

        // A reply sealed with another key fails to open.
        let wrong = SessionKey::new(key.etype, vec![0x22; 32]).expect("Failed to build key");
        let bytes = tgs_rep_bytes(canon.nonce(), &wrong, &client, &service, TicketFlags::none(), end);
        assert!(canon.read_reply(&FakeCrypto, &bytes).is_err());
    }

    #[test]
    fn tgs_reply_kdc_error_and_referral() {
        let service = Name::service("HTTP", "www.b.com", "A.COM");
        let (request, key, client) = build_request(&service, KerberosFlags::Canonicalize);

        let bytes = krb_error_bytes(KrbErrorCode::KdcErrSPrincipalUnknown);
        assert!(matches!(
            request.read_reply(&FakeCrypto, &bytes),
            Err(KrbError::Kdc(KrbErrorCode::KdcErrSPrincipalUnknown))
        ));

        // Vendor codes reach the caller unchanged.
        let bytes = krb_error_bytes(KrbErrorCode::Unknown(-1765328370));
        assert!(matches!(
            request.read_reply(&FakeCrypto, &bytes),
            Err(KrbError::Kdc(KrbErrorCode::Unknown(-1765328370)))
        ));

        let end = SystemTime::now() + Duration::from_secs(600);
        let referral = Name::krbtgt("B.COM", "A.COM");
        let bytes = tgs_rep_bytes(request.nonce(), &key, &client, &referral, TicketFlags::none(), end);
        let creds = request
            .read_reply(&FakeCrypto, &bytes)
            .expect("Failed to read referral");
        assert_eq!(referral_realm(&service, &creds), Some("B.COM".to_string()));
        assert!(creds.server_alias.is_none());

        // Asking for a TGT and receiving it is not a referral.
        assert_eq!(referral_realm(&Name::krbtgt("B.COM", "A.COM"), &creds), None);
        // A service already in the target realm is still referred there.
        assert_eq!(
            referral_realm(&service.with_realm("B.COM"), &creds),
            Some("B.COM".to_string())
        );
    }
}
