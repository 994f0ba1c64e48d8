use std::fmt;

use serde::{Deserialize, Serialize};

/// DTLSRole indicates the role of the DTLS transport.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DTLSRole {
    #[default]
    Unspecified = 0,

    /// DTLSRoleAuto defines the DTLS role is determined based on
    /// the resolved ICE role: the ICE controlled role acts as the DTLS
    /// client and the ICE controlling role acts as the DTLS server.
    Auto = 1,

    /// DTLSRoleClient defines the DTLS client role.
    Client = 2,

    /// DTLSRoleServer defines the DTLS server role.
    Server = 3,
}

const DTLS_ROLE_AUTO_STR: &str = "auto";
const DTLS_ROLE_CLIENT_STR: &str = "client";
const DTLS_ROLE_SERVER_STR: &str = "server";

impl From<&str> for DTLSRole {
    fn from(raw: &str) -> Self {
        match raw {
            DTLS_ROLE_AUTO_STR => DTLSRole::Auto,
            DTLS_ROLE_CLIENT_STR => DTLSRole::Client,
            DTLS_ROLE_SERVER_STR => DTLSRole::Server,
            _ => DTLSRole::Unspecified,
        }
    }
}

impl fmt::Display for DTLSRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DTLSRole::Auto => write!(f, "{DTLS_ROLE_AUTO_STR}"),
            DTLSRole::Client => write!(f, "{DTLS_ROLE_CLIENT_STR}"),
            DTLSRole::Server => write!(f, "{DTLS_ROLE_SERVER_STR}"),
            _ => write!(f, "{}", crate::UNSPECIFIED_STR),
        }
    }
}

impl DTLSRole {
    /// layer_role collapses the negotiated role onto the two roles a DTLS
    /// layer can actually take.
    pub(crate) fn layer_role(&self) -> DTLSRole {
        if *self == DTLSRole::Client {
            DTLSRole::Client
        } else {
            DTLSRole::Server
        }
    }
}
