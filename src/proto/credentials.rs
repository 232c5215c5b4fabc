use super::Name;
use crate::asn1::enc_kdc_rep_part::EncKdcRepPart;
use crate::asn1::encryption_key::EncryptionKey;
use crate::asn1::host_address::HostAddresses;
use crate::asn1::kdc_rep::KdcRep;
use crate::asn1::kerberos_time::{to_kerberos_time, KerberosTime};
use crate::asn1::krb_cred::KrbCredInfo;
use crate::asn1::principal_name::PrincipalName;
use crate::asn1::realm::Realm;
use crate::asn1::tagged_ticket::TaggedTicket;
use crate::asn1::ticket_flags::TicketFlags;
use crate::crypto::SessionKey;
use crate::error::KrbError;
use std::time::SystemTime;
use tracing::debug;

/// A service ticket together with everything the client learned about it from
/// the encrypted part of the reply.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client: Name,
    pub server: Name,
    pub ticket: TaggedTicket,
    pub session_key: SessionKey,
    pub flags: TicketFlags,
    pub auth_time: Option<SystemTime>,
    pub start_time: Option<SystemTime>,
    pub end_time: SystemTime,
    pub renew_till: Option<SystemTime>,
    pub client_addresses: Option<HostAddresses>,
    /// The name the client asked for when the KDC canonicalized it.
    pub client_alias: Option<Name>,
    /// The service name that was requested when the KDC returned another.
    pub server_alias: Option<Name>,
}

impl Credentials {
    pub(crate) fn from_kdc_reply(rep: &KdcRep, part: EncKdcRepPart) -> Result<Self, KrbError> {
        let client = Name::try_from((&rep.cname, &rep.crealm))?;
        let server = Name::try_from((&part.server_name, &part.server_realm))?;

        Ok(Credentials {
            client,
            server,
            ticket: rep.ticket.clone(),
            session_key: SessionKey::try_from(&part.key)?,
            flags: part.flags,
            auth_time: Some(part.auth_time.to_system_time()),
            start_time: part.start_time.map(|t| t.to_system_time()),
            end_time: part.end_time.to_system_time(),
            renew_till: part.renew_till.map(|t| t.to_system_time()),
            client_addresses: part.client_addresses,
            client_alias: None,
            server_alias: None,
        })
    }

    /// Clear OK-AS-DELEGATE. Called when any realm on the path to this
    /// ticket did not vouch for the service.
    pub fn reset_delegate(&mut self) {
        self.flags &= !TicketFlags::OkAsDelegate;
    }

    pub fn check_delegate(&self) -> bool {
        self.flags.contains(TicketFlags::OkAsDelegate)
    }

    pub fn is_forwardable(&self) -> bool {
        self.flags.contains(TicketFlags::Forwardable)
    }

    pub fn is_expired(&self, now: SystemTime) -> bool {
        self.end_time <= now
    }

    /// The realm whose KDC issued the ticket.
    pub fn ticket_realm(&self) -> &str {
        self.ticket.0.realm.as_str()
    }

    pub fn to_cred_info(&self) -> Result<KrbCredInfo, KrbError> {
        let (pname, prealm): (PrincipalName, Realm) = (&self.client).try_into()?;
        let (sname, srealm): (PrincipalName, Realm) = (&self.server).try_into()?;
        let time = |t: Option<SystemTime>| -> Result<Option<KerberosTime>, KrbError> {
            t.map(to_kerberos_time).transpose()
        };

        Ok(KrbCredInfo {
            key: EncryptionKey::try_from(&self.session_key)?,
            prealm: Some(prealm),
            pname: Some(pname),
            flags: Some(self.flags),
            authtime: time(self.auth_time)?,
            starttime: time(self.start_time)?,
            endtime: Some(to_kerberos_time(self.end_time)?),
            renew_till: time(self.renew_till)?,
            srealm: Some(srealm),
            sname: Some(sname),
            caddr: self.client_addresses.clone(),
        })
    }

    pub fn from_cred_info(ticket: TaggedTicket, info: &KrbCredInfo) -> Result<Self, KrbError> {
        let (Some(pname), Some(prealm)) = (info.pname.as_ref(), info.prealm.as_ref()) else {
            debug!("KrbCredInfo carries no client name");
            return Err(KrbError::CredentialsMissingTicketInfo);
        };
        let client = Name::try_from((pname, prealm))?;

        // The ticket always names the service, KrbCredInfo only might.
        let server = match (info.sname.as_ref(), info.srealm.as_ref()) {
            (Some(sname), Some(srealm)) => Name::try_from((sname, srealm))?,
            _ => Name::try_from((&ticket.0.sname, &ticket.0.realm))?,
        };

        let end_time = info
            .endtime
            .map(|t| t.to_system_time())
            .ok_or(KrbError::CredentialsMissingTicketInfo)?;

        Ok(Credentials {
            client,
            server,
            ticket,
            session_key: SessionKey::try_from(&info.key)?,
            flags: info.flags.unwrap_or_else(TicketFlags::none),
            auth_time: info.authtime.map(|t| t.to_system_time()),
            start_time: info.starttime.map(|t| t.to_system_time()),
            end_time,
            renew_till: info.renew_till.map(|t| t.to_system_time()),
            client_addresses: info.caddr.clone(),
            client_alias: None,
            server_alias: None,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::Credentials;
    use crate::asn1::constants::{EncryptionType, KrbMessageType};
    use crate::asn1::enc_kdc_rep_part::tests::sample_part;
    use crate::asn1::encrypted_data::EncryptedData;
    use crate::asn1::kdc_rep::KdcRep;
    use crate::asn1::principal_name::PrincipalName;
    use crate::asn1::realm::Realm;
    use crate::asn1::tagged_ticket::TaggedTicket;
    use crate::asn1::ticket_flags::TicketFlags;
    use crate::crypto::SessionKey;
    use crate::proto::Name;
    use der::asn1::OctetString;
    use std::time::{Duration, SystemTime};

    /// Credentials for `client` to `server` with a ticket that only the test
    /// KDC can open.
    pub(crate) fn sample_credentials(client: &Name, server: &Name, flags: TicketFlags) -> Credentials {
        let (sname, srealm): (PrincipalName, Realm) =
            server.try_into().expect("Failed to convert name");
        let now = SystemTime::now();
        Credentials {
            client: client.clone(),
            server: server.clone(),
            ticket: TaggedTicket::new(
                srealm,
                sname,
                EncryptedData {
                    etype: EncryptionType::AES256_CTS_HMAC_SHA1_96 as i32,
                    kvno: None,
                    cipher: OctetString::new(vec![0xee; 24]).expect("Failed to build cipher"),
                },
            ),
            session_key: SessionKey::new(EncryptionType::AES256_CTS_HMAC_SHA1_96, vec![0x11; 32])
                .expect("Failed to build key"),
            flags,
            auth_time: Some(now),
            start_time: Some(now),
            end_time: now + Duration::from_secs(3600),
            renew_till: None,
            client_addresses: None,
            client_alias: None,
            server_alias: None,
        }
    }

    #[test]
    fn credentials_from_kdc_reply() {
        let part = sample_part();
        let client = Name::principal("testuser", "EXAMPLE.COM");
        let tgs = Name::service_krbtgt("EXAMPLE.COM");
        let template = sample_credentials(&client, &tgs, TicketFlags::none());
        let (cname, crealm): (PrincipalName, Realm) =
            (&client).try_into().expect("Failed to convert name");

        let rep = KdcRep::new(
            KrbMessageType::KrbTgsRep,
            None,
            crealm,
            cname,
            template.ticket.clone(),
            template.ticket.0.enc_part.clone(),
        );

        let mut creds = Credentials::from_kdc_reply(&rep, part).expect("Failed to build creds");
        assert_eq!(creds.client, client);
        assert_eq!(creds.server, tgs);
        assert_eq!(creds.ticket_realm(), "EXAMPLE.COM");
        assert!(creds.is_forwardable());
        assert!(creds.check_delegate());
        assert!(!creds.is_expired(creds.auth_time.expect("Missing auth time")));

        creds.reset_delegate();
        assert!(!creds.check_delegate());
        assert!(creds.is_forwardable());
    }

    #[test]
    fn credentials_cred_info_conversion() {
        let client = Name::principal("alice", "A.COM");
        let server = Name::service("HTTP", "web.a.com", "A.COM");
        let creds = sample_credentials(&client, &server, TicketFlags::Forwardable);

        let info = creds.to_cred_info().expect("Failed to build cred info");
        assert_eq!(info.flags, Some(TicketFlags::Forwardable));

        let back =
            Credentials::from_cred_info(creds.ticket.clone(), &info).expect("Failed to convert");
        assert_eq!(back.client, client);
        assert_eq!(back.server, server);
        assert_eq!(back.session_key, creds.session_key);
        // Kerberos time has no sub second precision.
        assert_eq!(
            back.end_time
                .duration_since(SystemTime::UNIX_EPOCH)
                .expect("Failed to get time")
                .as_secs(),
            creds
                .end_time
                .duration_since(SystemTime::UNIX_EPOCH)
                .expect("Failed to get time")
                .as_secs()
        );

        let mut anonymous = info.clone();
        anonymous.pname = None;
        assert!(Credentials::from_cred_info(creds.ticket.clone(), &anonymous).is_err());
    }
}
