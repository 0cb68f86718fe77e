use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity-provider session as returned by `/sessions/whoami`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub active: bool,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub authenticated_at: Option<DateTime<Utc>>,
    pub identity: Identity,
}

impl Session {
    /// True once any of the identity's addresses has been verified
    pub fn is_activated(&self) -> bool {
        self.identity
            .verifiable_addresses
            .iter()
            .any(|address| address.verified)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub traits: serde_json::Value,
    #[serde(default)]
    pub verifiable_addresses: Vec<VerifiableAddress>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiableAddress {
    pub value: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub via: Option<String>,
}
