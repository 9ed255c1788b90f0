use std::{env, path::PathBuf, time::Duration};

use dirs;

/// OneLogin API token generation endpoint (client-credentials grant)
pub const GENERATE_TOKEN_API: &str = "auth/oauth2/token";

/// OneLogin SAML assertion endpoint
pub const SAML_ASSERTION_API: &str = "api/1/saml_assertion";

/// OneLogin MFA verification endpoint
pub const VERIFY_FACTOR_API: &str = "api/1/saml_assertion/verify_factor";

/// Client-side timeout for every OneLogin API call
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration file name, expected in the user's home directory
pub const CONFIG_FILE_NAME: &str = "masl.toml";

/// Default AWS profile name when neither flag nor config specifies one
pub const DEFAULT_PROFILE: &str = "masl";

/// Default STS session duration in seconds
pub const DEFAULT_DURATION_SECONDS: i32 = 3600;

/// Account name used when an account ID has no directory entry
pub const UNKNOWN_ACCOUNT_NAME: &str = "untitled";

/// AWS configuration directory name
pub const AWS_CONFIG_DIR_NAME: &str = ".aws";

/// AWS credentials file name
pub const AWS_CREDENTIALS_FILE_NAME: &str = "credentials";

/// Default AWS region for STS operations when no region is configured
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Get the masl config file path (~/masl.toml)
pub fn config_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
}

/// Get the AWS credentials file path
/// Respects AWS_SHARED_CREDENTIALS_FILE environment variable if set
pub fn aws_credentials_path() -> Option<PathBuf> {
    // Check environment variable first
    if let Ok(path) = env::var("AWS_SHARED_CREDENTIALS_FILE") {
        return Some(PathBuf::from(path));
    }

    // Use default AWS credentials location
    dirs::home_dir().map(|home| {
        home.join(AWS_CONFIG_DIR_NAME)
            .join(AWS_CREDENTIALS_FILE_NAME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_aws_credentials_path_with_env() {
        let original = env::var("AWS_SHARED_CREDENTIALS_FILE").ok();

        unsafe {
            env::set_var("AWS_SHARED_CREDENTIALS_FILE", "/custom/path/credentials");
        }
        let path = aws_credentials_path();
        assert_eq!(path, Some(PathBuf::from("/custom/path/credentials")));

        unsafe {
            match original {
                Some(val) => env::set_var("AWS_SHARED_CREDENTIALS_FILE", val),
                None => env::remove_var("AWS_SHARED_CREDENTIALS_FILE"),
            }
        }
    }

    #[test]
    #[serial]
    fn test_aws_credentials_path_default() {
        let original = env::var("AWS_SHARED_CREDENTIALS_FILE").ok();

        unsafe {
            env::remove_var("AWS_SHARED_CREDENTIALS_FILE");
        }
        let path = aws_credentials_path();

        if let Some(p) = path {
            let path_str = p.to_string_lossy();
            assert!(path_str.contains(AWS_CONFIG_DIR_NAME));
            assert!(path_str.contains(AWS_CREDENTIALS_FILE_NAME));
        }

        unsafe {
            if let Some(val) = original {
                env::set_var("AWS_SHARED_CREDENTIALS_FILE", val);
            }
        }
    }

    #[test]
    #[serial]
    fn test_config_file_path() {
        if let Some(p) = config_file_path() {
            assert!(p.to_string_lossy().ends_with(CONFIG_FILE_NAME));
        }
    }
}
