use anyhow::{Context, Result, bail};

use crate::config::{self, Account};
use crate::constants::UNKNOWN_ACCOUNT_NAME;
use crate::saml::SamlResponse;

/// An assumable AWS role advertised in the SAML assertion
#[derive(Debug, Clone)]
pub struct Role {
    pub role_arn: String,
    pub principal_arn: String,
    pub account_id: String,
    pub account_name: String,
    pub environment_independent: bool,
    /// 1-based display number, assigned after filtering and sorting
    pub ordinal: usize,
}

impl Role {
    /// The role name segment of the role ARN
    /// (arn:aws:iam::123456789012:role/RoleName -> RoleName)
    pub fn short_name(&self) -> &str {
        short_role_name(&self.role_arn)
    }
}

/// Extract the candidate roles from a SAML assertion, resolve account names
/// against the configured account directory, apply the account and role-name
/// filters and sort the survivors by account name.
pub fn decode_roles(
    response: &SamlResponse,
    accounts: &[Account],
    account_filter: &[String],
    role_filter: &str,
) -> Result<Vec<Role>> {
    let values = response.attribute_values()?;

    let mut roles = Vec::new();
    for value in values.iter().filter(|value| value.contains("role")) {
        let mut fields = value.split(',');
        let (Some(role_arn), Some(principal_arn)) = (fields.next(), fields.next()) else {
            bail!("Malformed role attribute value (expected '<roleArn>,<principalArn>'): {value}");
        };
        let role_arn = role_arn.trim();
        let principal_arn = principal_arn.trim();
        if principal_arn.is_empty() {
            bail!("Malformed role attribute value (expected '<roleArn>,<principalArn>'): {value}");
        }

        let account_id = account_id_from_arn(principal_arn)
            .with_context(|| format!("Malformed principal ARN: {principal_arn}"))?;

        let (account_name, environment_independent) = config::search_accounts(accounts, &account_id)
            .map(|(name, independent)| (name.to_string(), independent))
            .unwrap_or((UNKNOWN_ACCOUNT_NAME.to_string(), false));

        let name_matches =
            role_filter.is_empty() || role_filter.eq_ignore_ascii_case(short_role_name(role_arn));
        let account_matches =
            account_filter.is_empty() || account_filter.iter().any(|id| id == &account_id);

        if name_matches && account_matches {
            roles.push(Role {
                role_arn: role_arn.to_string(),
                principal_arn: principal_arn.to_string(),
                account_id,
                account_name,
                environment_independent,
                ordinal: 0,
            });
        }
    }

    roles.sort_by(|a, b| a.account_name.cmp(&b.account_name));
    for (index, role) in roles.iter_mut().enumerate() {
        role.ordinal = index + 1;
    }

    Ok(roles)
}

/// Extract the account ID from an ARN by field position
/// (arn:partition:service::account:resource), so non-default partitions
/// such as aws-cn and aws-us-gov resolve correctly
fn account_id_from_arn(arn: &str) -> Result<String> {
    let account = arn
        .split(':')
        .nth(4)
        .context("ARN has fewer than five ':'-separated fields")?;
    if account.is_empty() {
        bail!("ARN account field is empty");
    }
    Ok(account.to_string())
}

fn short_role_name(role_arn: &str) -> &str {
    role_arn.rsplit('/').next().unwrap_or(role_arn)
}
