//! Command-line surface

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{
    AssetsCommand, Context, GenerateCommand, PagesCommand, PermissionsCommand, ServeCommand,
    SessionCommand, TemplatesCommand,
};

#[derive(Debug, Parser)]
#[command(name = "pagecraft")]
#[command(version)]
#[command(about = "Manage document templates and generate documents", long_about = None)]
pub struct Cli {
    /// Template service base URL, overriding configuration
    #[arg(long, global = true, env = "PAGECRAFT_API_URL")]
    pub api_url: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in and store the session
    Login {
        /// Username; prompted for when omitted
        #[arg(short, long)]
        username: Option<String>,
        /// Password; prompted for when omitted
        #[arg(long, env = "PAGECRAFT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Check that the template service answers
    Health,
    /// Run the web console
    Serve(ServeCommand),
    /// Manage templates
    Templates {
        #[command(subcommand)]
        command: TemplatesCommand,
    },
    /// Manage template pages
    Pages {
        #[command(subcommand)]
        command: PagesCommand,
    },
    /// Manage page assets
    Assets {
        #[command(subcommand)]
        command: AssetsCommand,
    },
    /// Manage template permissions
    Permissions {
        #[command(subcommand)]
        command: PermissionsCommand,
    },
    /// Fill a template and generate a document
    Generate(GenerateCommand),
}

/// Run a command against the stored session
///
/// # Errors
///
/// Returns the command's error; `serve` is rejected here.
pub async fn run(command: Commands, ctx: &Context) -> Result<()> {
    match command {
        Commands::Login { username, password } => {
            SessionCommand::Login { username, password }.execute(ctx).await
        }
        Commands::Logout => SessionCommand::Logout.execute(ctx).await,
        Commands::Whoami => SessionCommand::Whoami.execute(ctx).await,
        Commands::Health => SessionCommand::Health.execute(ctx).await,
        Commands::Templates { command } => command.execute(ctx).await,
        Commands::Pages { command } => command.execute(ctx).await,
        Commands::Assets { command } => command.execute(ctx).await,
        Commands::Permissions { command } => command.execute(ctx).await,
        Commands::Generate(command) => command.execute(ctx).await,
        Commands::Serve(_) => anyhow::bail!("serve needs no session context"),
    }
}
