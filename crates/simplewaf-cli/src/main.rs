use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};

use simplewaf_cli::accounts::{self, NewAccount};
use simplewaf_config::{BootstrapConfig, ServerConfig};
use simplewaf_db::{Repositories, init_db_pool, run_migrations};

#[derive(Parser)]
#[command(name = "simplewaf-cli")]
#[command(about = "SimpleWAF CLI - Operator tools for the management API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account directly in the database
    CreateUser {
        /// Login name
        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,

        /// One of admin, user, auditor, configurator
        #[arg(short = 'r', long, default_value = "admin")]
        role: String,

        /// Force a password change on first login
        #[arg(long)]
        require_reset: bool,
    },
    /// Set a new password for an existing account
    ResetPassword {
        /// Login name
        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,

        /// Force a password change on next login
        #[arg(long)]
        require_reset: bool,
    },
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() {
    simplewaf_config::load_dotenv();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("\n❌ {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let server = ServerConfig::from_env();
    let database_url = server
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set")?;
    let pool = init_db_pool(database_url, 5)
        .await
        .context("failed to connect to database")?;

    if let Commands::Migrate = cli.command {
        run_migrations(&pool).await?;
        println!("✅ Migrations applied");
        return Ok(());
    }

    let repos = Repositories::postgres(pool);
    let cost = BootstrapConfig::from_env().password_cost;

    match cli.command {
        Commands::CreateUser {
            username,
            password,
            role,
            require_reset,
        } => {
            let username = prompt_username(username)?;
            let password = prompt_password(password)?;
            let user = accounts::create_account(
                repos.users.as_ref(),
                NewAccount {
                    username,
                    password,
                    role,
                    require_reset,
                    password_cost: cost,
                },
            )
            .await?;
            println!("\n✅ Account created");
            println!("   Username: {}", user.username);
            println!("   Role: {}", user.role);
        }
        Commands::ResetPassword {
            username,
            password,
            require_reset,
        } => {
            let username = prompt_username(username)?;
            let password = prompt_password(password)?;
            let user =
                accounts::set_password(repos.users.as_ref(), &username, &password, require_reset, cost)
                    .await?;
            println!("\n✅ Password updated for {}", user.username);
        }
        Commands::Migrate => {}
    }

    Ok(())
}

fn prompt_username(username: Option<String>) -> anyhow::Result<String> {
    match username {
        Some(username) => Ok(username),
        None => Ok(Input::new().with_prompt("Username").interact_text()?),
    }
}

fn prompt_password(password: Option<String>) -> anyhow::Result<String> {
    match password {
        Some(password) => Ok(password),
        None => Ok(Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?),
    }
}
