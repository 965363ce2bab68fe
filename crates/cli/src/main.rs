//! Open Bar CLI - database migrations and admin account tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! ob-cli migrate storefront
//!
//! # Run admin database migrations
//! ob-cli migrate admin
//!
//! # Run all database migrations
//! ob-cli migrate all
//!
//! # Create the first manager account
//! OPEN_BAR_ADMIN_PASSWORD=... ob-cli admin create \
//!     -e gerente@openbar.com.br -n "Maria Souza" --cpf 52998224725 -r manager
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use open_bar_core::AdminRole;
use secrecy::SecretString;

mod commands;

#[derive(Parser)]
#[command(name = "ob-cli")]
#[command(author, version, about = "Open Bar CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Run storefront database migrations
    Storefront,
    /// Run admin database migrations
    Admin,
    /// Run all database migrations
    All,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create an admin account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Full name
        #[arg(short, long)]
        name: String,

        /// CPF, with or without punctuation
        #[arg(long)]
        cpf: String,

        /// Role (`manager`, `planner`, `viewer`)
        #[arg(short, long, default_value = "viewer")]
        role: AdminRole,

        /// Initial password
        #[arg(long, env = "OPEN_BAR_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ob_cli=info,open_bar_admin=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    open_bar_core::config::load_dotenv();

    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Storefront => commands::migrate::storefront().await?,
            MigrateTarget::Admin => commands::migrate::admin().await?,
            MigrateTarget::All => {
                commands::migrate::storefront().await?;
                commands::migrate::admin().await?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                cpf,
                role,
                password,
            } => {
                let request = commands::admin::CreateAdmin {
                    email,
                    full_name: name,
                    cpf,
                    role,
                    password: SecretString::from(password),
                };
                commands::admin::create_user(request).await?;
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_admin_create() {
        let cli = Cli::try_parse_from([
            "ob-cli",
            "admin",
            "create",
            "-e",
            "gerente@openbar.com.br",
            "-n",
            "Maria Souza",
            "--cpf",
            "529.982.247-25",
            "-r",
            "manager",
            "--password",
            "senha-forte",
        ])
        .unwrap_or_else(|e| panic!("{e}"));

        let Commands::Admin {
            action: AdminAction::Create { role, cpf, .. },
        } = cli.command
        else {
            panic!("expected admin create");
        };
        assert_eq!(role, AdminRole::Manager);
        assert_eq!(cpf, "529.982.247-25");
    }

    #[test]
    fn test_rejects_unknown_role() {
        let parsed = Cli::try_parse_from([
            "ob-cli", "admin", "create", "-e", "a@b.com", "-n", "A", "--cpf", "1", "-r",
            "super_admin", "--password", "x",
        ]);
        assert!(parsed.is_err());
    }
}
