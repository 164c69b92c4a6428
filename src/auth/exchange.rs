use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use super::provider::Provider;

#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The provider answered but refused the token
    #[error("Provider rejected the token: HTTP {0}")]
    Denied(u16),
    #[error("Provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The provider's payload did not carry the expected identity fields
    #[error("Malformed provider response: {0}")]
    Malformed(&'static str),
}

/// Identity a provider vouched for in exchange for an access token
#[derive(Debug, Clone, PartialEq)]
pub struct UserIdentity {
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub nickname: Option<String>,
    pub provider: Provider,
    /// The member's identifier at the provider, unique per provider
    pub provider_key: String,
}

/// Exchange an opaque bearer token for the identity it belongs to.
///
/// The handler depends on this trait, not the concrete HTTP client.
#[async_trait]
pub trait IdentityExchange: Send + Sync {
    async fn exchange(
        &self,
        provider: Provider,
        access_token: &str,
    ) -> Result<UserIdentity, ExchangeError>;
}

/// Production exchange hitting the vendors' user-info endpoints.
pub struct HttpIdentityExchange {
    client: reqwest::Client,
    google_url: String,
    kakao_url: String,
    naver_url: String,
}

impl HttpIdentityExchange {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            google_url: "https://www.googleapis.com/oauth2/v3/userinfo".to_string(),
            kakao_url: "https://kapi.kakao.com/v2/user/me".to_string(),
            naver_url: "https://openapi.naver.com/v1/nid/me".to_string(),
        }
    }

    /// Point every provider at one base URL. For tests against a mock server.
    pub fn with_base_url(client: reqwest::Client, base: &str) -> Self {
        Self {
            client,
            google_url: format!("{base}/oauth2/v3/userinfo"),
            kakao_url: format!("{base}/v2/user/me"),
            naver_url: format!("{base}/v1/nid/me"),
        }
    }

    fn url_for(&self, provider: Provider) -> &str {
        match provider {
            Provider::Google => &self.google_url,
            Provider::Kakao => &self.kakao_url,
            Provider::Naver => &self.naver_url,
        }
    }
}

#[async_trait]
impl IdentityExchange for HttpIdentityExchange {
    async fn exchange(
        &self,
        provider: Provider,
        access_token: &str,
    ) -> Result<UserIdentity, ExchangeError> {
        let response = self
            .client
            .get(self.url_for(provider))
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExchangeError::Denied(status.as_u16()));
        }

        let payload: Value = response.json().await?;
        parse_identity(provider, &payload)
    }
}

/// Pull the identity fields out of a provider payload. Each vendor shapes
/// its user-info response differently.
pub fn parse_identity(provider: Provider, payload: &Value) -> Result<UserIdentity, ExchangeError> {
    match provider {
        Provider::Google => {
            let key = payload["sub"]
                .as_str()
                .ok_or(ExchangeError::Malformed("missing sub"))?;
            Ok(UserIdentity {
                email: payload["email"].as_str().map(String::from),
                image_url: payload["picture"].as_str().map(String::from),
                nickname: payload["name"].as_str().map(String::from),
                provider,
                provider_key: key.to_string(),
            })
        }
        Provider::Kakao => {
            let key = match &payload["id"] {
                Value::Number(n) => n.to_string(),
                Value::String(s) => s.clone(),
                _ => return Err(ExchangeError::Malformed("missing id")),
            };
            let account = &payload["kakao_account"];
            let profile = &account["profile"];
            Ok(UserIdentity {
                email: account["email"].as_str().map(String::from),
                image_url: profile["profile_image_url"].as_str().map(String::from),
                nickname: profile["nickname"].as_str().map(String::from),
                provider,
                provider_key: key,
            })
        }
        Provider::Naver => {
            let body = &payload["response"];
            let key = body["id"]
                .as_str()
                .ok_or(ExchangeError::Malformed("missing response.id"))?;
            Ok(UserIdentity {
                email: body["email"].as_str().map(String::from),
                image_url: body["profile_image"].as_str().map(String::from),
                nickname: body["nickname"].as_str().map(String::from),
                provider,
                provider_key: key.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn parses_kakao_payload() {
        let payload = json!({
            "id": 12345,
            "kakao_account": {
                "email": "bird@example.com",
                "profile": { "nickname": "bird", "profile_image_url": "http://img" }
            }
        });

        let identity = parse_identity(Provider::Kakao, &payload).unwrap();
        assert_eq!(identity.provider_key, "12345");
        assert_eq!(identity.email.as_deref(), Some("bird@example.com"));
        assert_eq!(identity.nickname.as_deref(), Some("bird"));
    }

    #[test]
    fn parses_naver_and_google_payloads() {
        let naver = json!({
            "response": { "id": "n-1", "nickname": "nv", "email": "nv@example.com" }
        });
        let identity = parse_identity(Provider::Naver, &naver).unwrap();
        assert_eq!(identity.provider_key, "n-1");

        let google = json!({ "sub": "g-1", "name": "goo", "picture": "http://pic" });
        let identity = parse_identity(Provider::Google, &google).unwrap();
        assert_eq!(identity.provider_key, "g-1");
        assert_eq!(identity.image_url.as_deref(), Some("http://pic"));
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let payload = json!({ "unexpected": true });
        assert!(parse_identity(Provider::Google, &payload).is_err());
        assert!(parse_identity(Provider::Kakao, &payload).is_err());
        assert!(parse_identity(Provider::Naver, &payload).is_err());
    }

    #[tokio::test]
    async fn http_exchange_happy_path() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/v2/user/me")
                .header("authorization", "Bearer tok-1");
            then.status(200)
                .json_body(json!({ "id": 7, "kakao_account": {} }));
        });

        let exchange =
            HttpIdentityExchange::with_base_url(reqwest::Client::new(), &server.base_url());
        let identity = exchange.exchange(Provider::Kakao, "tok-1").await.unwrap();
        assert_eq!(identity.provider_key, "7");
    }

    #[tokio::test]
    async fn provider_rejection_maps_to_denied() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/nid/me");
            then.status(401);
        });

        let exchange =
            HttpIdentityExchange::with_base_url(reqwest::Client::new(), &server.base_url());
        let err = exchange.exchange(Provider::Naver, "bad").await.unwrap_err();
        assert!(matches!(err, ExchangeError::Denied(401)));
    }
}
