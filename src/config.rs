use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::fs;

use crate::constants::{self, DEFAULT_DURATION_SECONDS, DEFAULT_PROFILE};

/// An AWS account known to the organization, as listed in masl.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "EnvironmentIndependent", default)]
    pub environment_independent: bool,
}

/// A named work environment grouping a set of account IDs
#[derive(Debug, Clone, Deserialize)]
pub struct Environment {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Accounts", default)]
    pub accounts: Vec<String>,
}

/// The masl.toml configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "BaseURL")]
    pub base_url: String,
    #[serde(rename = "ClientID")]
    pub client_id: String,
    #[serde(rename = "ClientSecret")]
    pub client_secret: String,
    #[serde(rename = "AppID")]
    pub app_id: String,
    #[serde(rename = "Subdomain")]
    pub subdomain: String,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Duration", default = "default_duration")]
    pub duration: i32,
    #[serde(rename = "Profile", default = "default_profile")]
    pub profile: String,
    #[serde(rename = "LegacyToken", default)]
    pub legacy_token: bool,
    #[serde(rename = "DefaultMFADevice", default)]
    pub default_mfa_device: String,
    #[serde(rename = "Environments", default)]
    pub environments: Vec<Environment>,
    #[serde(rename = "Accounts", default)]
    pub accounts: Vec<Account>,
}

fn default_duration() -> i32 {
    DEFAULT_DURATION_SECONDS
}

fn default_profile() -> String {
    DEFAULT_PROFILE.to_string()
}

/// Look up an account's name and environment independence by account ID
pub fn search_accounts<'a>(accounts: &'a [Account], account_id: &str) -> Option<(&'a str, bool)> {
    accounts
        .iter()
        .find(|account| account.id == account_id)
        .map(|account| (account.name.as_str(), account.environment_independent))
}

impl Config {
    /// Resolve an account name (alias) to its account ID, case-insensitively
    pub fn account_id_for_name(&self, name: &str) -> Option<&str> {
        self.accounts
            .iter()
            .find(|account| account.name.eq_ignore_ascii_case(name))
            .map(|account| account.id.as_str())
    }

    /// Collect the account IDs belonging to an environment, plus every
    /// environment-independent account
    pub fn accounts_for_environment(&self, environment: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .environments
            .iter()
            .find(|env| env.name.eq_ignore_ascii_case(environment))
            .map(|env| env.accounts.clone())
            .unwrap_or_default();

        ids.extend(
            self.accounts
                .iter()
                .filter(|account| account.environment_independent)
                .map(|account| account.id.clone()),
        );

        ids
    }
}

/// Load and parse ~/masl.toml
pub async fn load() -> Result<Config> {
    let path = constants::config_file_path().context("Failed to determine home directory")?;

    let content = fs::read_to_string(&path).await.with_context(|| {
        format!(
            "Failed to read config file {}. Create it before running masl",
            path.display()
        )
    })?;

    parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
BaseURL = "https://api.eu.onelogin.com/"
ClientID = "client-id"
ClientSecret = "client-secret"
AppID = "123456"
Subdomain = "example"
Username = "jane.doe@example.com"

[[Environments]]
Name = "dev"
Accounts = ["111111111111", "333333333333"]

[[Environments]]
Name = "prod"
Accounts = ["222222222222"]

[[Accounts]]
ID = "111111111111"
Name = "sandbox"

[[Accounts]]
ID = "222222222222"
Name = "production"

[[Accounts]]
ID = "444444444444"
Name = "tooling"
EnvironmentIndependent = true
"#;

    #[test]
    fn test_parse_full_config() {
        let config = parse(SAMPLE).unwrap();

        assert_eq!(config.base_url, "https://api.eu.onelogin.com/");
        assert_eq!(config.client_id, "client-id");
        assert_eq!(config.app_id, "123456");
        assert_eq!(config.subdomain, "example");
        assert_eq!(config.username, "jane.doe@example.com");
        assert_eq!(config.environments.len(), 2);
        assert_eq!(config.accounts.len(), 3);
    }

    #[test]
    fn test_parse_applies_defaults() {
        let config = parse(SAMPLE).unwrap();

        assert_eq!(config.duration, DEFAULT_DURATION_SECONDS);
        assert_eq!(config.profile, DEFAULT_PROFILE);
        assert!(!config.legacy_token);
        assert_eq!(config.default_mfa_device, "");
    }

    #[test]
    fn test_parse_explicit_overrides() {
        let content = format!("Duration = 7200\nProfile = \"work\"\nLegacyToken = true\n{SAMPLE}");
        let config = parse(&content).unwrap();

        assert_eq!(config.duration, 7200);
        assert_eq!(config.profile, "work");
        assert!(config.legacy_token);
    }

    #[test]
    fn test_parse_rejects_missing_required_field() {
        let result = parse("BaseURL = \"https://api.eu.onelogin.com/\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_search_accounts() {
        let config = parse(SAMPLE).unwrap();

        assert_eq!(
            search_accounts(&config.accounts, "111111111111"),
            Some(("sandbox", false))
        );
        assert_eq!(
            search_accounts(&config.accounts, "444444444444"),
            Some(("tooling", true))
        );
        assert_eq!(search_accounts(&config.accounts, "999999999999"), None);
    }

    #[test]
    fn test_account_id_for_name_case_insensitive() {
        let config = parse(SAMPLE).unwrap();

        assert_eq!(config.account_id_for_name("Production"), Some("222222222222"));
        assert_eq!(config.account_id_for_name("SANDBOX"), Some("111111111111"));
        assert_eq!(config.account_id_for_name("nope"), None);
    }

    #[test]
    fn test_accounts_for_environment_includes_independent() {
        let config = parse(SAMPLE).unwrap();

        let ids = config.accounts_for_environment("dev");
        assert_eq!(ids, vec!["111111111111", "333333333333", "444444444444"]);
    }

    #[test]
    fn test_accounts_for_unknown_environment_still_independent() {
        let config = parse(SAMPLE).unwrap();

        let ids = config.accounts_for_environment("staging");
        assert_eq!(ids, vec!["444444444444"]);
    }
}
