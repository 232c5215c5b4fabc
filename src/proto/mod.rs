mod ap;
mod cred;
pub(crate) mod credentials;
mod credentials_util;
mod priv_safe;
pub(crate) mod reply;
mod request;
mod s4u;

pub use self::ap::{verify_ap_rep, ApReqBuilder, ApReqVerifier, VerifiedApReq};
pub use self::cred::{build_krb_cred, open_krb_cred};
pub use self::credentials::Credentials;
pub use self::credentials_util::CredentialsUtil;
pub use self::priv_safe::MessageContext;
pub use self::request::{TgsRequest, TgsRequestBuilder};
pub use self::s4u::{pa_for_user, pa_pac_options};

use crate::asn1::constants::PrincipalNameType;
use crate::asn1::principal_name::PrincipalName;
use crate::asn1::realm::Realm;
use crate::constants::TGS_SERVICE_NAME;
use crate::error::KrbError;
use std::fmt;
use std::str::FromStr;
use tracing::{error, trace};

#[derive(Debug, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub enum Name {
    Principal {
        name: String,
        realm: String,
    },
    // MIT sends host services as name type 1 as often as type 3. Both are kept
    // apart so they re-encode as received, `service_hst_normalise` folds them.
    SrvPrincipal {
        service: String,
        host: String,
        realm: String,
    },
    SrvHst {
        service: String,
        host: String,
        realm: String,
    },
    SrvInst {
        service: String,
        instance: Vec<String>,
        realm: String,
    },
    /// NT-ENTERPRISE, a single `user@upn-suffix` component.
    Enterprise {
        name: String,
        realm: String,
    },
}

impl Name {
    pub fn principal(name: &str, realm: &str) -> Self {
        Self::Principal {
            name: name.to_string(),
            realm: realm.to_string(),
        }
    }

    pub fn service(srvname: &str, hostname: &str, realm: &str) -> Self {
        Self::SrvHst {
            service: srvname.to_string(),
            host: hostname.to_string(),
            realm: realm.to_string(),
        }
    }

    pub fn enterprise(upn: &str, realm: &str) -> Self {
        Self::Enterprise {
            name: upn.to_string(),
            realm: realm.to_string(),
        }
    }

    pub fn service_hst_normalise(self) -> Self {
        match self {
            Self::SrvHst {
                service,
                host,
                realm,
            } => Self::SrvPrincipal {
                service,
                host,
                realm,
            },
            ignore => ignore,
        }
    }

    /// `krbtgt/TO@FROM`, the TGS of `to` as known by the KDC of `from`
    /// (RFC 4120 7.3).
    pub fn krbtgt(to: &str, from: &str) -> Self {
        Self::SrvInst {
            service: TGS_SERVICE_NAME.to_string(),
            instance: vec![to.to_string()],
            realm: from.to_string(),
        }
    }

    pub fn service_krbtgt(realm: &str) -> Self {
        Self::krbtgt(realm, realm)
    }

    /// If this names a TGS, the realm that TGS serves.
    pub fn krbtgt_target(&self) -> Option<&str> {
        match self {
            Self::SrvInst {
                service, instance, ..
            } if service == TGS_SERVICE_NAME => match instance.as_slice() {
                [to] => Some(to.as_str()),
                _ => None,
            },
            // Heimdal and MIT both send krbtgt as a plain two component principal.
            Self::SrvPrincipal { service, host, .. } | Self::SrvHst { service, host, .. }
                if service == TGS_SERVICE_NAME =>
            {
                Some(host.as_str())
            }
            _ => None,
        }
    }

    pub fn is_service_krbtgt(&self, check_realm: &str) -> bool {
        self.krbtgt_target().is_some() && self.realm() == check_realm
    }

    pub fn realm(&self) -> &str {
        match self {
            Self::Principal { realm, .. }
            | Self::SrvPrincipal { realm, .. }
            | Self::SrvHst { realm, .. }
            | Self::SrvInst { realm, .. }
            | Self::Enterprise { realm, .. } => realm.as_str(),
        }
    }

    /// The same name in another realm. Referrals re-target the service while
    /// keeping its components.
    pub fn with_realm(&self, new_realm: &str) -> Self {
        let mut name = self.clone();
        match &mut name {
            Self::Principal { realm, .. }
            | Self::SrvPrincipal { realm, .. }
            | Self::SrvHst { realm, .. }
            | Self::SrvInst { realm, .. }
            | Self::Enterprise { realm, .. } => *realm = new_realm.to_string(),
        }
        name
    }

    /// Compare principals ignoring the MIT host service name type confusion.
    pub fn matches(&self, other: &Name) -> bool {
        self.clone().service_hst_normalise() == other.clone().service_hst_normalise()
    }

    pub fn principal_name(&self) -> Result<(&str, &str), KrbError> {
        trace!(principal_name = ?self);
        match self {
            Name::Principal { name, realm } => Ok((name.as_str(), realm.as_str())),
            _ => Err(KrbError::NameNotPrincipal),
        }
    }

    fn name_type(&self) -> PrincipalNameType {
        match self {
            Name::Principal { .. } | Name::SrvPrincipal { .. } => PrincipalNameType::NtPrincipal,
            Name::SrvHst { .. } => PrincipalNameType::NtSrvHst,
            Name::SrvInst { .. } => PrincipalNameType::NtSrvInst,
            Name::Enterprise { .. } => PrincipalNameType::NtEnterprise,
        }
    }

    fn components(&self) -> Vec<&str> {
        match self {
            Name::Principal { name, .. } | Name::Enterprise { name, .. } => vec![name.as_str()],
            Name::SrvPrincipal { service, host, .. } | Name::SrvHst { service, host, .. } => {
                vec![service.as_str(), host.as_str()]
            }
            Name::SrvInst {
                service, instance, ..
            } => std::iter::once(service.as_str())
                .chain(instance.iter().map(String::as_str))
                .collect(),
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.components().join("/"), self.realm())
    }
}

impl From<&Name> for String {
    fn from(val: &Name) -> Self {
        val.to_string()
    }
}

impl FromStr for Name {
    type Err = KrbError;

    /// `user@REALM`, `service/host@REALM` or `krbtgt/TO@FROM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (components, realm) = s.rsplit_once('@').ok_or_else(|| {
            error!(name = %s, "name has no realm");
            KrbError::NameNumberOfComponents
        })?;

        if realm.is_empty() || components.is_empty() {
            return Err(KrbError::NameNumberOfComponents);
        }

        let parts: Vec<&str> = components.split('/').collect();
        match parts.as_slice() {
            [name] if name.contains('@') => Ok(Name::enterprise(name, realm)),
            [name] => Ok(Name::principal(name, realm)),
            [service, to] if *service == TGS_SERVICE_NAME => Ok(Name::krbtgt(to, realm)),
            [service, host] => Ok(Name::service(service, host, realm)),
            [service, instance @ ..] => Ok(Name::SrvInst {
                service: service.to_string(),
                instance: instance.iter().map(|i| i.to_string()).collect(),
                realm: realm.to_string(),
            }),
            [] => Err(KrbError::NameNumberOfComponents),
        }
    }
}

impl TryFrom<&Name> for PrincipalName {
    type Error = KrbError;

    fn try_from(value: &Name) -> Result<Self, Self::Error> {
        PrincipalName::new(value.name_type(), &value.components())
    }
}

impl TryFrom<&Name> for Realm {
    type Error = KrbError;

    fn try_from(value: &Name) -> Result<Self, Self::Error> {
        Realm::new(value.realm())
    }
}

impl TryFrom<&Name> for (PrincipalName, Realm) {
    type Error = KrbError;

    fn try_from(value: &Name) -> Result<Self, Self::Error> {
        Ok((PrincipalName::try_from(value)?, Realm::try_from(value)?))
    }
}

impl TryFrom<(&PrincipalName, &Realm)> for Name {
    type Error = KrbError;

    fn try_from((princ, realm): (&PrincipalName, &Realm)) -> Result<Self, Self::Error> {
        let realm = String::from(realm);
        let name_type = PrincipalNameType::try_from(princ.name_type).map_err(|err| {
            error!(?err, name_type = princ.name_type, "invalid principal name type");
            KrbError::PrincipalNameInvalidType
        })?;

        let components: Vec<String> = princ.components().map(str::to_string).collect();

        match (name_type, components.as_slice()) {
            (PrincipalNameType::NtPrincipal | PrincipalNameType::NtUnknown, [name]) => {
                Ok(Name::Principal {
                    name: name.clone(),
                    realm,
                })
            }
            // MIT kvno sends host services as NT-PRINCIPAL.
            (PrincipalNameType::NtPrincipal | PrincipalNameType::NtUnknown, [service, host]) => {
                Ok(Name::SrvPrincipal {
                    service: service.clone(),
                    host: host.clone(),
                    realm,
                })
            }
            (PrincipalNameType::NtSrvHst, [service, host]) => Ok(Name::SrvHst {
                service: service.clone(),
                host: host.clone(),
                realm,
            }),
            (PrincipalNameType::NtSrvInst, [service, instance @ ..]) => Ok(Name::SrvInst {
                service: service.clone(),
                instance: instance.to_vec(),
                realm,
            }),
            (PrincipalNameType::NtEnterprise, [name]) => Ok(Name::Enterprise {
                name: name.clone(),
                realm,
            }),
            (
                PrincipalNameType::NtPrincipal
                | PrincipalNameType::NtUnknown
                | PrincipalNameType::NtSrvHst
                | PrincipalNameType::NtSrvInst
                | PrincipalNameType::NtEnterprise,
                _,
            ) => {
                error!(?name_type, len = components.len(), "unexpected number of components");
                Err(KrbError::NameNumberOfComponents)
            }
            _ => Err(KrbError::PrincipalNameInvalidType),
        }
    }
}

impl TryFrom<(PrincipalName, Realm)> for Name {
    type Error = KrbError;

    fn try_from((princ, realm): (PrincipalName, Realm)) -> Result<Self, Self::Error> {
        Name::try_from((&princ, &realm))
    }
}
