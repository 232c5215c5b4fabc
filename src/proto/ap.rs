use super::{Credentials, Name};
use crate::asn1::ap_options::ApOptions;
use crate::asn1::ap_rep::ApRep;
use crate::asn1::ap_req::ApReq;
use crate::asn1::authenticator::Authenticator;
use crate::asn1::authorization_data::AuthorizationData;
use crate::asn1::checksum::Checksum;
use crate::asn1::constants::{KeyUsage, KrbErrorCode};
use crate::asn1::enc_ap_rep_part::{EncApRepPart, EncApRepPartInner};
use crate::asn1::enc_ticket_part::{EncTicketPart, TaggedEncTicketPart};
use crate::asn1::encryption_key::EncryptionKey;
use crate::asn1::kerberos_time::split_system_time;
use crate::asn1::principal_name::PrincipalName;
use crate::asn1::realm::Realm;
use crate::asn1::ticket_flags::TicketFlags;
use crate::asn1::uint32::UInt32;
use crate::asn1::KrbMessage;
use crate::cache::{AuthTimeWithHash, ReplayCache};
use crate::crypto::{KrbCipher, SessionKey};
use crate::error::KrbError;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, instrument, trace, warn};

/// Client side of the AP exchange.
#[derive(Debug)]
pub struct ApReqBuilder<'a> {
    creds: &'a Credentials,
    options: ApOptions,
    checksum: Option<Checksum>,
    subkey: Option<SessionKey>,
    seq_number: Option<u32>,
    authorization_data: Option<AuthorizationData>,
}

impl<'a> ApReqBuilder<'a> {
    pub fn new(creds: &'a Credentials) -> Self {
        ApReqBuilder {
            creds,
            options: ApOptions::none(),
            checksum: None,
            subkey: None,
            seq_number: None,
            authorization_data: None,
        }
    }

    pub fn mutual_required(mut self) -> Self {
        self.options |= ApOptions::MutualRequired;
        self
    }

    /// A checksum over the application data, made with
    /// [`KeyUsage::ApReqAuthenticatorChecksum`].
    pub fn checksum(mut self, checksum: Checksum) -> Self {
        self.checksum = Some(checksum);
        self
    }

    pub fn subkey(mut self, subkey: SessionKey) -> Self {
        self.subkey = Some(subkey);
        self
    }

    pub fn seq_number(mut self, seq_number: u32) -> Self {
        self.seq_number = Some(seq_number);
        self
    }

    pub fn authorization_data(mut self, authorization_data: AuthorizationData) -> Self {
        self.authorization_data = Some(authorization_data);
        self
    }

    /// `now` becomes the authenticator time. Keep it to check the AP-REP with
    /// [`verify_ap_rep`].
    pub fn build<C: KrbCipher + ?Sized>(
        self,
        cipher: &C,
        now: SystemTime,
    ) -> Result<ApReq, KrbError> {
        let (cname, crealm): (PrincipalName, Realm) = (&self.creds.client).try_into()?;
        let subkey = self.subkey.as_ref().map(EncryptionKey::try_from).transpose()?;

        let authenticator = Authenticator::new(
            cname,
            crealm,
            now,
            self.checksum,
            subkey,
            self.seq_number,
            self.authorization_data,
        )?;

        let enc_authenticator = self.creds.session_key.seal(
            cipher,
            KeyUsage::ApReqAuthenticator,
            None,
            &authenticator.asn1_encode()?,
        )?;

        trace!(server = %self.creds.server, options = ?self.options, "built AP-REQ");

        Ok(ApReq::new(
            self.options,
            self.creds.ticket.clone(),
            enc_authenticator,
        ))
    }
}

/// Check that the AP-REP answers the authenticator sent at `sent_at`.
pub fn verify_ap_rep<C: KrbCipher + ?Sized>(
    cipher: &C,
    session_key: &SessionKey,
    ap_rep: &ApRep,
    sent_at: SystemTime,
) -> Result<EncApRepPart, KrbError> {
    let plain = session_key
        .unseal(cipher, KeyUsage::ApRepEncPart, &ap_rep.0.enc_part)
        .map_err(|err| {
            debug!(?err, "unable to open AP-REP");
            KrbError::ApErr(KrbErrorCode::KrbApErrMutFail)
        })?;
    let part = EncApRepPart::parse(&plain)?;

    let (ctime, cusec) = split_system_time(sent_at)?;
    if part.0.ctime != ctime || part.0.cusec != cusec {
        warn!("AP-REP does not echo our authenticator time");
        return Err(KrbError::ApErr(KrbErrorCode::KrbApErrMutFail));
    }
    Ok(part)
}

/// An accepted AP-REQ.
#[derive(Debug)]
pub struct VerifiedApReq {
    pub client: Name,
    pub ticket_part: EncTicketPart,
    pub authenticator: Authenticator,
    pub session_key: SessionKey,
    /// Present when the client asked for mutual authentication.
    pub ap_rep: Option<ApRep>,
}

impl VerifiedApReq {
    /// The key for messages that follow, the authenticator subkey if the
    /// client sent one.
    pub fn message_key(&self) -> Result<SessionKey, KrbError> {
        match &self.authenticator.0.subkey {
            Some(subkey) => SessionKey::try_from(subkey),
            None => Ok(self.session_key.clone()),
        }
    }
}

/// Acceptor side of the AP exchange for a single service key.
#[derive(Debug)]
pub struct ApReqVerifier {
    service: Name,
    service_key: SessionKey,
    kvno: Option<u32>,
    clockskew: Duration,
    rcache: Arc<dyn ReplayCache>,
}

fn bad_integrity(err: KrbError) -> KrbError {
    match err {
        KrbError::MessageAuthenticationFailed => {
            KrbError::ApErr(KrbErrorCode::KrbApErrBadIntegrity)
        }
        err => err,
    }
}

impl ApReqVerifier {
    pub fn new(
        service: Name,
        service_key: SessionKey,
        kvno: Option<u32>,
        clockskew: Duration,
        rcache: Arc<dyn ReplayCache>,
    ) -> Self {
        ApReqVerifier {
            service,
            service_key,
            kvno,
            clockskew,
            rcache,
        }
    }

    #[instrument(level = "debug", skip_all, fields(service = %self.service))]
    pub fn verify<C: KrbCipher + ?Sized>(
        &self,
        cipher: &C,
        ap_req: &ApReq,
        now: SystemTime,
    ) -> Result<VerifiedApReq, KrbError> {
        let ticket = &ap_req.0.ticket.0;

        let ticket_server = Name::try_from((&ticket.sname, &ticket.realm))?;
        if !ticket_server.matches(&self.service) {
            debug!(%ticket_server, "ticket is for another service");
            return Err(KrbError::ApErr(KrbErrorCode::KrbApErrNotUs));
        }

        if ticket.enc_part.etype != i32::from(self.service_key.etype) {
            debug!(etype = ticket.enc_part.etype, "no key for ticket etype");
            return Err(KrbError::ApErr(KrbErrorCode::KrbApErrNokey));
        }

        if let (Some(want), Some(UInt32(have))) = (self.kvno, ticket.enc_part.kvno) {
            if want != have {
                debug!(want, have, "ticket key version differs");
                return Err(KrbError::ApErr(KrbErrorCode::KrbApErrBadkeyver));
            }
        }

        let plain = self
            .service_key
            .unseal(cipher, KeyUsage::KdcRepTicket, &ticket.enc_part)
            .map_err(bad_integrity)?;
        let ticket_part = TaggedEncTicketPart::parse(&plain)?.0;
        let session_key = SessionKey::try_from(&ticket_part.key)?;

        let plain = session_key
            .unseal(cipher, KeyUsage::ApReqAuthenticator, &ap_req.0.authenticator)
            .map_err(bad_integrity)?;
        let authenticator = Authenticator::parse(&plain)?;

        if authenticator.0.cname != ticket_part.cname
            || authenticator.0.crealm != ticket_part.crealm
        {
            debug!("authenticator client differs from the ticket");
            return Err(KrbError::ApErr(KrbErrorCode::KrbApErrBadmatch));
        }
        let client = Name::try_from((&ticket_part.cname, &ticket_part.crealm))?;

        let client_time = authenticator.client_time();
        let skew = now
            .duration_since(client_time)
            .or_else(|_| client_time.duration_since(now))
            .unwrap_or_default();
        if skew > self.clockskew {
            debug!(?skew, "authenticator outside of the clock skew");
            return Err(KrbError::ApErr(KrbErrorCode::KrbApErrSkew));
        }

        let start = ticket_part
            .starttime
            .unwrap_or(ticket_part.authtime)
            .to_system_time();
        // A skew too large to add to a time puts everything inside the window.
        let not_yet_valid = now
            .checked_add(self.clockskew)
            .is_some_and(|latest| start > latest);
        if ticket_part.flags.contains(TicketFlags::Invalid) || not_yet_valid {
            return Err(KrbError::ApErr(KrbErrorCode::KrbApErrTktNyv));
        }
        let expired = ticket_part
            .endtime
            .to_system_time()
            .checked_add(self.clockskew)
            .is_some_and(|end| end < now);
        if expired {
            return Err(KrbError::ApErr(KrbErrorCode::KrbApErrTktExpired));
        }

        let entry = AuthTimeWithHash::new(
            &client,
            &self.service,
            client_time,
            authenticator.0.cusec,
            ap_req.0.authenticator.cipher.as_bytes(),
        )?;
        self.rcache.check_and_store(now, &entry)?;

        let ap_rep = if ap_req.0.ap_options.contains(ApOptions::MutualRequired) {
            let part = EncApRepPart(EncApRepPartInner {
                ctime: authenticator.0.ctime,
                cusec: authenticator.0.cusec,
                subkey: None,
                seq_number: None,
            });
            let enc_part =
                session_key.seal(cipher, KeyUsage::ApRepEncPart, None, &part.asn1_encode()?)?;
            Some(ApRep::new(enc_part))
        } else {
            None
        };

        debug!(%client, "accepted AP-REQ");

        Ok(VerifiedApReq {
            client,
            ticket_part,
            authenticator,
            session_key,
            ap_rep,
        })
    }
}
