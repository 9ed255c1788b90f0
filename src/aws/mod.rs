use aws_smithy_types::DateTime;

pub mod credentials;
pub mod roles;
pub mod sts;

/// AWS temporary credentials structure
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime,
}

/// Result of a successful AssumeRoleWithSAML call
#[derive(Debug, Clone)]
pub struct AssumedRole {
    pub credentials: Credentials,
    pub assumed_role_user_arn: String,
}

// Re-export commonly used types (functions should be accessed via module path)
pub use roles::Role;
