use anyhow::{Context, Result, bail};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::config::Config;
use crate::constants::{GENERATE_TOKEN_API, HTTP_TIMEOUT, SAML_ASSERTION_API, VERIFY_FACTOR_API};

/// A registered MFA device, in the order OneLogin reports them
#[derive(Debug, Clone, Deserialize)]
pub struct MfaDevice {
    pub device_id: i64,
    pub device_type: String,
}

/// Outcome of the first SAML challenge phase
#[derive(Debug, Clone)]
pub enum ChallengeState {
    /// No MFA required; carries the base64-encoded assertion
    Completed { assertion: String },
    /// A second factor is required to obtain the assertion
    MfaRequired {
        state_token: String,
        devices: Vec<MfaDevice>,
    },
}

/// OneLogin API client
///
/// Owns its HTTP client and connection settings; nothing here is global.
/// Every call has a bounded timeout and fails the run on the first error.
#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
    base_url: String,
    client_id: String,
    client_secret: String,
    app_id: String,
    subdomain: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    code: i64,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

/// Status-only view of a response; decoded first so the payload decoder can
/// be chosen from the status fields
#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    status: ApiStatus,
}

#[derive(Debug, Deserialize)]
struct TokenEnvelope {
    data: Vec<TokenData>,
}

#[derive(Debug, Deserialize)]
struct TokenData {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct AssertionEnvelope {
    data: String,
}

#[derive(Debug, Deserialize)]
struct MfaEnvelope {
    data: Vec<MfaChallenge>,
}

#[derive(Debug, Deserialize)]
struct MfaChallenge {
    state_token: String,
    #[serde(default)]
    devices: Vec<MfaDevice>,
}

#[derive(Debug, Deserialize)]
struct VerifyEnvelope {
    data: Option<String>,
}

#[derive(Debug, Serialize)]
struct AssertionRequest<'a> {
    username_or_email: &'a str,
    password: &'a str,
    app_id: &'a str,
    subdomain: &'a str,
}

#[derive(Debug, Serialize)]
struct VerifyFactorRequest<'a> {
    app_id: &'a str,
    otp_token: &'a str,
    device_id: String,
    state_token: &'a str,
}

impl Client {
    pub fn new(config: &Config) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            app_id: config.app_id.clone(),
            subdomain: config.subdomain.clone(),
            username: config.username.clone(),
        })
    }

    fn endpoint(&self, api: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), api)
    }

    /// Generate a service-level API token (client-credentials grant)
    pub async fn generate_token(&self) -> Result<String> {
        let url = self.endpoint(GENERATE_TOKEN_API);
        debug!("Requesting OneLogin API token from {}", url);

        let auth = format!(
            "client_id:{},client_secret:{}",
            self.client_id, self.client_secret
        );

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, auth)
            .json(&json!({ "grant_type": "client_credentials" }))
            .send()
            .await
            .context("OneLogin token request failed")?;

        let http_status = response.status();
        let body = response
            .bytes()
            .await
            .context("Failed to read OneLogin token response")?;

        interpret_token_response(http_status.as_u16(), &body)
    }

    /// Submit username/password to the SAML assertion endpoint and interpret
    /// whether MFA is required
    pub async fn saml_assertion(&self, api_token: &str, password: &str) -> Result<ChallengeState> {
        let url = self.endpoint(SAML_ASSERTION_API);
        debug!("Requesting SAML assertion from {}", url);

        let request = AssertionRequest {
            username_or_email: &self.username,
            password,
            app_id: &self.app_id,
            subdomain: &self.subdomain,
        };

        let body = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, format!("bearer:{api_token}"))
            .json(&request)
            .send()
            .await
            .context("OneLogin SAML assertion request failed")?
            .bytes()
            .await
            .context("Failed to read OneLogin SAML assertion response")?;

        let state = interpret_assertion_response(&body)?;
        match &state {
            ChallengeState::Completed { .. } => info!("MFA not required"),
            ChallengeState::MfaRequired { devices, .. } => {
                info!("MFA required ({} device(s) registered)", devices.len());
            }
        }
        Ok(state)
    }

    /// Complete the second challenge phase with a one-time password
    pub async fn verify_factor(
        &self,
        api_token: &str,
        state_token: &str,
        device_id: i64,
        otp: &str,
    ) -> Result<String> {
        let url = self.endpoint(VERIFY_FACTOR_API);
        debug!("Verifying MFA factor against {}", url);

        let request = VerifyFactorRequest {
            app_id: &self.app_id,
            otp_token: otp,
            device_id: device_id.to_string(),
            state_token,
        };

        let body = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, format!("bearer:{api_token}"))
            .json(&request)
            .send()
            .await
            .context("OneLogin MFA verification request failed")?
            .bytes()
            .await
            .context("Failed to read OneLogin MFA verification response")?;

        interpret_verify_response(&body)
    }
}

fn interpret_token_response(http_status: u16, body: &[u8]) -> Result<String> {
    match http_status {
        200 => {
            let envelope: TokenEnvelope = serde_json::from_slice(body)
                .context("Failed to decode OneLogin token response")?;
            let data = envelope
                .data
                .into_iter()
                .next()
                .context("OneLogin token response contained no data")?;
            Ok(data.access_token)
        }
        400 | 401 | 404 => {
            let envelope: StatusEnvelope = serde_json::from_slice(body)
                .context("Failed to decode OneLogin error response")?;
            let status = envelope.status;
            bail!(
                "{} ({}) API error: {}",
                status.code,
                status.kind,
                status.message
            );
        }
        other => bail!("unexpected status code {other}"),
    }
}

fn interpret_assertion_response(body: &[u8]) -> Result<ChallengeState> {
    // Decode only the status first, then commit to a payload shape
    let envelope: StatusEnvelope =
        serde_json::from_slice(body).context("Failed to decode OneLogin response status")?;
    let status = envelope.status;

    if status.code != 200 {
        bail!("{}", status.message);
    }

    if status.message.eq_ignore_ascii_case("success") {
        let assertion: AssertionEnvelope = serde_json::from_slice(body)
            .context("Failed to decode OneLogin SAML assertion payload")?;
        return Ok(ChallengeState::Completed {
            assertion: assertion.data,
        });
    }

    let mfa: MfaEnvelope =
        serde_json::from_slice(body).context("Failed to decode OneLogin MFA challenge payload")?;
    let challenge = mfa
        .data
        .into_iter()
        .next()
        .context("OneLogin MFA challenge contained no data")?;
    if challenge.devices.is_empty() {
        bail!("OneLogin MFA challenge listed no registered devices");
    }

    Ok(ChallengeState::MfaRequired {
        state_token: challenge.state_token,
        devices: challenge.devices,
    })
}

fn interpret_verify_response(body: &[u8]) -> Result<String> {
    let envelope: StatusEnvelope =
        serde_json::from_slice(body).context("Failed to decode OneLogin response status")?;
    let status = envelope.status;

    if status.code != 200 {
        bail!("{}", status.message);
    }

    let verify: VerifyEnvelope = serde_json::from_slice(body)
        .context("Failed to decode OneLogin MFA verification payload")?;
    verify
        .data
        .context("OneLogin MFA verification returned no assertion")
}
