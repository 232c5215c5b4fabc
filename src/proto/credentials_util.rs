use super::reply::referral_realm;
use super::s4u::{pa_for_user, pa_pac_options};
use super::{Credentials, Name, TgsRequest};
use crate::asn1::kdc_options::KdcOptions;
use crate::asn1::kerberos_flags::KerberosFlags;
use crate::asn1::pa_data::PaData;
use crate::asn1::tagged_ticket::TaggedTicket;
use crate::cache::ReferralsCache;
use crate::config::Config;
use crate::crypto::KrbCrypto;
use crate::error::KrbError;
use crate::net::KdcTransport;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, instrument, trace, warn};

#[derive(Debug, Clone)]
enum S4uKind {
    None,
    /// S4U2Self on behalf of this user. PA-FOR-USER is keyed per TGT.
    ForUser(Name),
    /// S4U2Proxy, the evidence ticket travels in `additional_ticket`.
    Proxy,
}

#[derive(Debug, Clone)]
struct TgsParams {
    options: KdcOptions,
    kind: S4uKind,
    padata: Vec<PaData>,
    additional_ticket: Option<TaggedTicket>,
}

impl TgsParams {
    fn plain(options: KdcOptions) -> Self {
        TgsParams {
            options,
            kind: S4uKind::None,
            padata: Vec::new(),
            additional_ticket: None,
        }
    }
}

/// The realm whose KDC can open the TGT, and so the realm a TGS-REQ made
/// with it has to go to.
fn tgt_realm(tgt: &Credentials) -> &str {
    tgt.server
        .krbtgt_target()
        .unwrap_or_else(|| tgt.server.realm())
}

/// Errors that mean the KDC could not follow the referral exchange, as
/// opposed to not being reachable at all.
fn retry_without_referrals(err: &KrbError) -> bool {
    matches!(
        err,
        KrbError::Kdc(_)
            | KrbError::ApErr(_)
            | KrbError::ReplyServerMismatch
            | KrbError::ReplyClientMismatch
            | KrbError::ReferralsExhausted
            | KrbError::UnexpectedReplyType
    )
}

/// Obtains service tickets with a TGT, following referrals across realms
/// and falling back to configured paths when the KDCs don't refer.
pub struct CredentialsUtil<T: KdcTransport> {
    config: Arc<Config>,
    transport: T,
    crypto: Arc<dyn KrbCrypto>,
    referrals: Arc<ReferralsCache>,
}

impl<T: KdcTransport> CredentialsUtil<T> {
    pub fn new(
        config: Arc<Config>,
        transport: T,
        crypto: Arc<dyn KrbCrypto>,
        referrals: Arc<ReferralsCache>,
    ) -> Self {
        CredentialsUtil {
            config,
            transport,
            crypto,
            referrals,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn referrals(&self) -> &ReferralsCache {
        &self.referrals
    }

    fn default_options(&self) -> KdcOptions {
        KdcOptions::from_defaults(&self.config.libdefaults)
    }

    /// A ticket for `service` using the TGT in `tgt`.
    #[instrument(level = "debug", skip_all, fields(client = %tgt.client, %service))]
    pub async fn acquire_service_creds(
        &self,
        service: &Name,
        tgt: &Credentials,
    ) -> Result<Credentials, KrbError> {
        let params = TgsParams::plain(self.default_options());
        self.service_creds(tgt, service, &params).await
    }

    /// A ticket to the middle service itself on behalf of `user`. `middle_tgt`
    /// is the middle service's own TGT and must be forwardable.
    #[instrument(level = "debug", skip_all, fields(%user, middle = %middle_tgt.client))]
    pub async fn acquire_s4u2self_creds(
        &self,
        user: &Name,
        middle_tgt: &Credentials,
    ) -> Result<Credentials, KrbError> {
        if !middle_tgt.is_forwardable() {
            debug!("S4U2Self needs a forwardable TGT");
            return Err(KrbError::S4u2SelfNotForwardable);
        }

        let local_realm = middle_tgt.client.realm();
        let mut sname = middle_tgt.client.clone();
        if user.realm() != local_realm {
            // The user's realm has to issue the ticket, only referrals get us there.
            if !self.config.libdefaults.referrals_enabled() {
                return Err(KrbError::CrossRealmS4uReferralsDisabled);
            }
            if let Some(alias) = &middle_tgt.client_alias {
                sname = alias.clone();
            }
            sname = sname.with_realm(user.realm());
        }

        let params = TgsParams {
            options: self.default_options() | KerberosFlags::Forwardable,
            kind: S4uKind::ForUser(user.clone()),
            padata: vec![pa_pac_options()?],
            additional_ticket: None,
        };
        let creds = self.service_creds(middle_tgt, &sname, &params).await?;

        if !creds.client.matches(user) {
            warn!(got = %creds.client, "S4U2Self ticket is not for the requested user");
            return Err(KrbError::S4u2SelfNotHonored);
        }
        if !creds.is_forwardable() {
            warn!("S4U2Self ticket is not forwardable");
            return Err(KrbError::S4u2SelfTicketNotForwardable);
        }
        Ok(creds)
    }

    /// A ticket to `backend` for `client`, with `evidence` the client's
    /// ticket to the middle service.
    #[instrument(level = "debug", skip_all, fields(%backend, %client, middle = %middle_tgt.client))]
    pub async fn acquire_s4u2proxy_creds(
        &self,
        backend: &Name,
        evidence: &TaggedTicket,
        client: &Name,
        middle_tgt: &Credentials,
    ) -> Result<Credentials, KrbError> {
        let local_realm = middle_tgt.client.realm();
        let mut backend_name = backend.clone();
        if backend.realm() != local_realm {
            if !self.config.libdefaults.referrals_enabled() {
                return Err(KrbError::CrossRealmS4uReferralsDisabled);
            }
            // Start at home, the referrals lead to the backend's realm.
            backend_name = backend.with_realm(local_realm);
        }

        let params = TgsParams {
            options: self.default_options()
                | KerberosFlags::CnameInAddlTkt
                | KerberosFlags::Forwardable,
            kind: S4uKind::Proxy,
            padata: vec![pa_pac_options()?],
            additional_ticket: Some(evidence.clone()),
        };
        let creds = self
            .service_creds(middle_tgt, &backend_name, &params)
            .await?;

        if !creds.client.matches(client) {
            warn!(got = %creds.client, "S4U2Proxy ticket is not for the requested client");
            return Err(KrbError::S4u2ProxyNotHonored);
        }
        Ok(creds)
    }

    async fn service_creds(
        &self,
        tgt: &Credentials,
        service: &Name,
        params: &TgsParams,
    ) -> Result<Credentials, KrbError> {
        if self.config.libdefaults.referrals_enabled() {
            match self.service_creds_referrals(tgt, service, params).await {
                Ok(Some(creds)) => return Ok(creds),
                Ok(None) => debug!("referral loop, retrying without referrals"),
                Err(err) if retry_without_referrals(&err) => {
                    debug!(?err, "referrals failed, retrying without referrals")
                }
                Err(err) => return Err(err),
            }
        }
        self.service_creds_single(tgt, service, params).await
    }

    /// Chase referrals for `service`. `Ok(None)` means the KDCs sent us
    /// around in a circle.
    async fn service_creds_referrals(
        &self,
        tgt: &Credentials,
        service: &Name,
        params: &TgsParams,
    ) -> Result<Option<Credentials>, KrbError> {
        let mut params = params.clone();
        params.options |= KerberosFlags::Canonicalize;

        let max_referrals = self.config.libdefaults.max_referrals();
        let cacheable = matches!(params.kind, S4uKind::None);
        let mut tgt = tgt.clone();
        let mut ref_service = service.clone();
        let mut visited: Vec<String> = Vec::new();
        let mut delegate_ok = true;

        while visited.len() <= max_referrals {
            let from_realm = ref_service.realm().to_string();
            let now = SystemTime::now();

            let cached = if cacheable {
                self.referrals.get(&tgt.client, service, &from_realm, now)
            } else {
                None
            };

            let (creds, to_realm) = match cached {
                Some(entry) => {
                    trace!(%from_realm, to_realm = %entry.to_realm, "cached referral");
                    (entry.creds, Some(entry.to_realm))
                }
                None => {
                    let creds = self.tgs_exchange(&tgt, &ref_service, &params).await?;
                    let to_realm = referral_realm(&ref_service, &creds);
                    if let (Some(to_realm), true) = (&to_realm, cacheable) {
                        self.referrals.put(
                            &tgt.client,
                            service,
                            &from_realm,
                            to_realm,
                            creds.clone(),
                            now,
                        );
                    }
                    (creds, to_realm)
                }
            };

            let Some(to_realm) = to_realm else {
                let mut creds = creds;
                if !delegate_ok {
                    creds.reset_delegate();
                }
                return Ok(Some(creds));
            };

            debug!(%from_realm, %to_realm, "referral");
            delegate_ok &= creds.check_delegate();

            let next_tgt = if matches!(params.kind, S4uKind::Proxy) {
                // The referral is the client's evidence for the next realm.
                // The middle service continues with its own TGT there.
                params.additional_ticket = Some(creds.ticket.clone());
                let cross = Name::krbtgt(&to_realm, tgt_realm(&tgt));
                let own = TgsParams::plain(self.default_options());
                Box::pin(self.service_creds(&tgt, &cross, &own)).await?
            } else {
                creds
            };

            if visited.contains(&to_realm) {
                warn!(%to_realm, ?visited, "referral loop detected");
                return Ok(None);
            }

            tgt = next_tgt;
            ref_service = ref_service.with_realm(&to_realm);
            visited.push(to_realm);
        }

        debug!(?visited, "too many referrals");
        Err(KrbError::ReferralsExhausted)
    }

    /// One TGS exchange for `service`, first walking the configured path to
    /// its realm when the TGT is for another one.
    async fn service_creds_single(
        &self,
        tgt: &Credentials,
        service: &Name,
        params: &TgsParams,
    ) -> Result<Credentials, KrbError> {
        let local_realm = tgt_realm(tgt);
        let service_realm = service.realm();

        let (tgt, delegate_ok) = if local_realm != service_realm {
            self.tgt_for_realm(local_realm, service_realm, tgt)
                .await
                .ok_or_else(|| {
                    debug!(local_realm, service_realm, "no path to service realm");
                    KrbError::NoTgtForRealm
                })?
        } else {
            (tgt.clone(), true)
        };

        let mut creds = self.tgs_exchange(&tgt, service, params).await?;
        if !delegate_ok {
            creds.reset_delegate();
        }
        Ok(creds)
    }

    /// Walk the realms between `local_realm` and `service_realm` one cross
    /// realm TGT at a time. A failed hop moves on to the next candidate. The
    /// flag returned is false if any TGT on the way was not OK-AS-DELEGATE.
    async fn tgt_for_realm(
        &self,
        local_realm: &str,
        service_realm: &str,
        tgt: &Credentials,
    ) -> Option<(Credentials, bool)> {
        let realms = self.config.realms_list(local_realm, service_realm);
        let mut current = tgt.clone();
        let mut delegate_ok = true;
        let mut i = 0;

        while i < realms.len() {
            let mut next = self.try_tgt(&current, service_realm, &realms[i]).await;
            if next.is_none() {
                // No direct trust, try the realms on the path from the far end.
                for k in (i + 1..realms.len()).rev() {
                    next = self.try_tgt(&current, &realms[k], &realms[i]).await;
                    if next.is_some() {
                        break;
                    }
                }
            }

            let next = next?;
            let next_realm = next.server.krbtgt_target()?.to_string();
            delegate_ok &= next.check_delegate();

            if next_realm == service_realm {
                return Some((next, delegate_ok));
            }

            let pos = realms.iter().skip(i + 1).position(|r| *r == next_realm)?;
            trace!(from = %realms[i], to = %next_realm, "intermediate tgt");
            i += 1 + pos;
            current = next;
        }

        None
    }

    async fn try_tgt(&self, tgt: &Credentials, to: &str, from: &str) -> Option<Credentials> {
        let service = Name::krbtgt(to, from);
        let params = TgsParams::plain(self.default_options());
        match self.tgs_exchange(tgt, &service, &params).await {
            Ok(creds) => Some(creds),
            Err(err) => {
                debug!(?err, %service, "no cross realm tgt");
                None
            }
        }
    }

    async fn tgs_exchange(
        &self,
        tgt: &Credentials,
        service: &Name,
        params: &TgsParams,
    ) -> Result<Credentials, KrbError> {
        let now = SystemTime::now();
        let mut builder = TgsRequest::builder(service.clone(), tgt.end_time).options(params.options);

        match &params.kind {
            S4uKind::None => {}
            S4uKind::ForUser(user) => {
                builder = builder
                    .padata(pa_for_user(&*self.crypto, &tgt.session_key, user)?)
                    .without_client_check();
            }
            S4uKind::Proxy => {
                let evidence = params
                    .additional_ticket
                    .clone()
                    .ok_or(KrbError::S4u2ProxyMissingEvidence)?;
                builder = builder.additional_ticket(evidence).without_client_check();
            }
        }
        for pa in params.padata.iter() {
            builder = builder.padata(pa.clone());
        }

        let request = builder.build(&*self.crypto, tgt, now)?;
        let realm = tgt_realm(tgt);
        trace!(realm, %service, "sending TGS-REQ");
        let reply = self
            .transport
            .send_to_realm(realm, &request.to_der()?)
            .await?;
        request.read_reply(&*self.crypto, &reply)
    }
}
