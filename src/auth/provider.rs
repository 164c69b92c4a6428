use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Unknown identity provider: {0}")]
pub struct UnknownProvider(pub String);

/// The social vendors allowed to vouch for a member. Closed set; anything
/// else in the Access-Token header is an authentication failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Kakao,
    Naver,
}

impl Provider {
    /// Parse a provider tag from the Access-Token header. Case-insensitive.
    pub fn parse(tag: &str) -> Result<Provider, UnknownProvider> {
        match tag.to_ascii_lowercase().as_str() {
            "google" => Ok(Provider::Google),
            "kakao" => Ok(Provider::Kakao),
            "naver" => Ok(Provider::Naver),
            _ => Err(UnknownProvider(tag.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Kakao => "kakao",
            Provider::Naver => "naver",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
