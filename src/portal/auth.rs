use std::fmt;

use tracing::{debug, info};

use crate::config::PortalSettings;
use crate::error::PortalError;
use crate::ext::serde_json::JsonFetch;
use crate::portal::{build_agent, join_url, transport_error};

/// Bearer token for the items endpoint. Debug output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
  pub fn new(token: impl Into<String>) -> Self {
    Self(token.into())
  }

  pub fn bearer(&self) -> String {
    format!("Bearer {}", self.0)
  }
}

impl fmt::Debug for AccessToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("AccessToken(<redacted>)")
  }
}

pub trait TokenSource {
  fn fetch_token(&self) -> Result<AccessToken, PortalError>;
}

/// OAuth2 password grant against the portal's token endpoint.
pub struct OAuthTokenSource {
  agent: ureq::Agent,
  token_url: String,
  username: String,
  password: String,
  basic_auth: String,
}

impl OAuthTokenSource {
  pub fn new(settings: &PortalSettings) -> Self {
    Self {
      agent: build_agent(settings.timeout),
      token_url: join_url(&settings.base_url, &settings.oauth_path),
      username: settings.username.clone(),
      password: settings.password.clone(),
      basic_auth: settings.basic_auth.clone(),
    }
  }
}

impl TokenSource for OAuthTokenSource {
  fn fetch_token(&self) -> Result<AccessToken, PortalError> {
    debug!(url = %self.token_url, "requesting access token");

    let result = self
      .agent
      .post(&self.token_url)
      .header("Authorization", &self.basic_auth)
      .send_form([
        ("grant_type", "password"),
        ("username", self.username.as_str()),
        ("password", self.password.as_str()),
      ]);

    // Any non-200 answer from the token endpoint is an authentication failure.
    let mut resp = match result {
      Ok(r) => r,
      Err(ureq::Error::StatusCode(status)) => {
        return Err(PortalError::Authentication { status, body: String::new() });
      }
      Err(other) => return Err(transport_error(&self.token_url, other)),
    };

    let status = resp.status().as_u16();
    let body = resp
      .body_mut()
      .read_to_string()
      .map_err(|e| PortalError::Decode { url: self.token_url.clone(), message: e.to_string() })?;

    if status != 200 {
      return Err(PortalError::Authentication { status, body });
    }

    let json: serde_json::Value = serde_json::from_str(&body)
      .map_err(|e| PortalError::Decode { url: self.token_url.clone(), message: e.to_string() })?;

    let token = json
      .fetch("access_token")
      .to::<String>()
      .filter(|t| !t.is_empty())
      .ok_or_else(|| PortalError::Decode {
        url: self.token_url.clone(),
        message: "response has no access_token".into(),
      })?;

    info!("authenticated against {}", self.token_url);
    Ok(AccessToken::new(token))
  }
}
