// File: raidbot-common/src/models/credential.rs

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// On-disk shape of `tokens.json`.
///
/// `expires_in` is in seconds, `obtainment_timestamp` in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Vec<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub obtainment_timestamp: i64,
}

impl TokenData {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let expires_in = self.expires_in?;
        let obtained = Utc.timestamp_millis_opt(self.obtainment_timestamp).single()?;
        Some(obtained + Duration::seconds(expires_in))
    }

    /// True when the token is gone or will be within `margin` of `now`.
    /// Tokens without an expiry are treated as long-lived.
    pub fn expires_within(&self, margin: Duration, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(exp) => exp - now <= margin,
            None => false,
        }
    }
}
