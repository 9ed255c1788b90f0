use std::env;

use anyhow::{Context, Result};
use aws_smithy_types::date_time::Format;
use clap::Args;
use tracing::{debug, info};

use crate::{
    aws, config,
    config::Config,
    onelogin::{self, ChallengeState},
    prompt,
    saml::SamlResponse,
};

#[derive(Debug, Clone, Default, Args)]
pub struct LoginCommand {
    #[arg(short = 'e', long, help = "Work environment to filter accounts by")]
    pub env: Option<String>,

    #[arg(short = 'a', long, help = "AWS account ID or name to filter by")]
    pub account: Option<String>,

    #[arg(short = 'r', long, help = "AWS role name to assume")]
    pub role: Option<String>,

    #[arg(
        long,
        help = "Also write the legacy aws_security_token key (for older SDKs)"
    )]
    pub legacy_token: bool,
}

impl LoginCommand {
    pub async fn execute(self, profile_flag: Option<&str>) -> Result<()> {
        let config = config::load().await?;

        let profile = profile_flag.unwrap_or(&config.profile).to_string();
        info!("Starting OneLogin authentication for profile: {}", profile);

        let account_filter =
            build_account_filter(&config, self.account.as_deref(), self.env.as_deref());
        debug!("Account filter: {:?}", account_filter);

        let client = onelogin::Client::new(&config)?;
        let api_token = client
            .generate_token()
            .await
            .context("Failed to generate OneLogin API token")?;

        let password = prompt::password()?;

        let challenge = client
            .saml_assertion(&api_token, &password)
            .await
            .context("OneLogin authentication failed")?;

        let assertion = match challenge {
            ChallengeState::Completed { assertion } => assertion,
            ChallengeState::MfaRequired {
                state_token,
                devices,
            } => {
                let device = prompt::select_mfa_device(&devices, &config.default_mfa_device)?;
                let otp = prompt::otp(device)?;
                client
                    .verify_factor(&api_token, &state_token, device.device_id, otp.trim())
                    .await
                    .context("MFA verification failed")?
            }
        };

        let response =
            SamlResponse::from_base64(&assertion).context("Failed to decode SAML assertion")?;
        let roles = aws::roles::decode_roles(
            &response,
            &config.accounts,
            &account_filter,
            self.role.as_deref().unwrap_or(""),
        )
        .context("Failed to extract roles from SAML assertion")?;

        // A valid outcome, not a fault
        if roles.is_empty() {
            println!("No masl for you! You don't have permissions to any account!");
            return Ok(());
        }

        let role = prompt::select_role(&roles)?;
        info!("Requesting AWS credentials for role: {}", role.role_arn);

        let assumed =
            aws::sts::assume_role_with_saml(&profile, &assertion, role, config.duration)
                .await
                .context("Failed to assume AWS role with SAML")?;

        let include_legacy = self.legacy_token || config.legacy_token;
        aws::credentials::save_credentials(&profile, &assumed.credentials, include_legacy)
            .await
            .context("Failed to save AWS credentials")?;
        // Store a second copy under the account name so it can be addressed
        // either way
        if role.account_name != profile {
            aws::credentials::save_credentials(
                &role.account_name,
                &assumed.credentials,
                include_legacy,
            )
            .await
            .context("Failed to save AWS credentials under the account name")?;
        }

        println!("\nw00t w00t masl for you!");
        println!("Assumed User: {}", assumed.assumed_role_user_arn);
        println!("In account: {} [{}]", role.account_id, role.account_name);
        println!(
            "Token will expire on: {}",
            assumed
                .credentials
                .expiration
                .fmt(Format::DateTime)
                .unwrap_or_else(|_| "unknown".to_string())
        );
        warn_on_profile_mismatch(&profile);

        Ok(())
    }
}

/// Resolve the --account / --env flags into a set of account IDs
///
/// An account flag takes precedence over an environment flag; a name that
/// resolves through the directory becomes its ID, anything else is passed
/// through as a literal ID.
fn build_account_filter(
    config: &Config,
    account: Option<&str>,
    environment: Option<&str>,
) -> Vec<String> {
    if let Some(account) = account {
        let id = config.account_id_for_name(account).unwrap_or(account);
        return vec![id.to_string()];
    }
    if let Some(environment) = environment {
        return config.accounts_for_environment(environment);
    }
    Vec::new()
}

fn warn_on_profile_mismatch(profile: &str) {
    let active = env::var("AWS_PROFILE").unwrap_or_else(|_| "default".to_string());
    if profile != active {
        eprintln!(
            "[WARNING] Your AWS credentials were stored under profile '{profile}' \
             but your AWS_PROFILE is set to '{active}'!"
        );
    } else {
        println!("Using AWS profile: '{profile}'");
    }
}
