pub mod aws;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod onelogin;
pub mod prompt;
pub mod saml;
