use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::commands::LoginCommand;

#[derive(Debug, Clone, Parser)]
#[command(name = "masl", version, about = "Obtain temporary AWS credentials through OneLogin SAML federation", long_about = None, arg_required_else_help = false)]
pub struct Cli {
    #[arg(
        short = 'p',
        long,
        global = true,
        help = "AWS profile name (defaults to the Profile setting in masl.toml)"
    )]
    pub profile: Option<String>,

    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Increase verbosity (-v info, -vv debug, -vvv trace)")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Authenticate with OneLogin and store temporary AWS credentials")]
    Login(LoginCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let profile = self.profile;
        let command = self
            .command
            .unwrap_or_else(|| Commands::Login(LoginCommand::default()));

        match command {
            Commands::Login(cmd) => cmd.execute(profile.as_deref()).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, error::ErrorKind};

    #[test]
    fn test_no_command_defaults_to_login() {
        let cli = Cli::try_parse_from(["masl"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.profile, None);
    }

    #[test]
    fn test_profile_flag() {
        let cli = Cli::try_parse_from(["masl", "--profile", "production"]).unwrap();
        assert_eq!(cli.profile, Some("production".to_string()));
    }

    #[test]
    fn test_profile_short_flag() {
        let cli = Cli::try_parse_from(["masl", "-p", "dev", "login"]).unwrap();
        assert_eq!(cli.profile, Some("dev".to_string()));
    }

    #[test]
    fn test_login_with_role() {
        let cli = Cli::try_parse_from(["masl", "login", "--role", "Admin"]).unwrap();
        match cli.command {
            Some(Commands::Login(cmd)) => assert_eq!(cmd.role, Some("Admin".to_string())),
            _ => panic!("Expected Login command"),
        }
    }

    #[test]
    fn test_login_with_account_short_flag() {
        let cli = Cli::try_parse_from(["masl", "login", "-a", "sandbox"]).unwrap();
        match cli.command {
            Some(Commands::Login(cmd)) => assert_eq!(cmd.account, Some("sandbox".to_string())),
            _ => panic!("Expected Login command"),
        }
    }

    #[test]
    fn test_login_with_env() {
        let cli = Cli::try_parse_from(["masl", "login", "--env", "dev"]).unwrap();
        match cli.command {
            Some(Commands::Login(cmd)) => assert_eq!(cmd.env, Some("dev".to_string())),
            _ => panic!("Expected Login command"),
        }
    }

    #[test]
    fn test_login_legacy_token_flag() {
        let cli = Cli::try_parse_from(["masl", "login", "--legacy-token"]).unwrap();
        match cli.command {
            Some(Commands::Login(cmd)) => assert!(cmd.legacy_token),
            _ => panic!("Expected Login command"),
        }
    }

    #[test]
    fn test_login_defaults() {
        let cli = Cli::try_parse_from(["masl", "login"]).unwrap();
        match cli.command {
            Some(Commands::Login(cmd)) => {
                assert_eq!(cmd.env, None);
                assert_eq!(cmd.account, None);
                assert_eq!(cmd.role, None);
                assert!(!cmd.legacy_token);
            }
            _ => panic!("Expected Login command"),
        }
    }

    #[test]
    fn test_verbose_flag_counts() {
        let cli = Cli::try_parse_from(["masl", "-vv", "login"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_verbose_default_zero() {
        let cli = Cli::try_parse_from(["masl", "login"]).unwrap();
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_invalid_command_fails() {
        let result = Cli::try_parse_from(["masl", "invalid"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_help_flag_works() {
        let result = Cli::try_parse_from(["masl", "--help"]);
        assert!(result.is_err());
        if let Err(e) = result {
            assert_eq!(e.kind(), ErrorKind::DisplayHelp);
        }
    }

    #[test]
    fn test_version_flag_works() {
        let result = Cli::try_parse_from(["masl", "--version"]);
        assert!(result.is_err());
        if let Err(e) = result {
            assert_eq!(e.kind(), ErrorKind::DisplayVersion);
        }
    }

    #[test]
    fn test_command_structure_validation() {
        let cmd = Cli::command();
        cmd.debug_assert();
    }
}
