//! CLI command implementations

pub mod assets;
pub mod generate;
pub mod pages;
pub mod permissions;
pub mod serve;
pub mod session;
pub mod templates;

pub use assets::AssetsCommand;
pub use generate::GenerateCommand;
pub use pages::PagesCommand;
pub use permissions::PermissionsCommand;
pub use serve::ServeCommand;
pub use session::SessionCommand;
pub use templates::TemplatesCommand;

use anyhow::{anyhow, bail, Result};
use console::{style, Emoji};
use indicatif::{ProgressBar, ProgressStyle};
use pagecraft::prelude::*;
use std::time::Duration;

pub static SUCCESS: Emoji = Emoji("✓ ", "√ ");
pub static INFO: Emoji = Emoji("ℹ ", "i ");
pub static WARN: Emoji = Emoji("⚠ ", "! ");

/// Shared state for one invocation
pub struct Context {
    state: ConsoleState,
}

impl Context {
    /// Build the library state and resume any stored session
    pub async fn new(config: PagecraftConfig) -> Result<Self> {
        let state = ConsoleState::new(config).map_err(|err| anyhow!(err.user_message()))?;
        if let Err(err) = state.session().restore().await {
            eprintln!("{}{}", WARN, style(err.user_message()).yellow());
        }
        Ok(Self { state })
    }

    pub const fn state(&self) -> &ConsoleState {
        &self.state
    }

    pub fn api(&self) -> &ApiClient {
        self.state.api()
    }

    pub fn session(&self) -> &SessionStore {
        self.state.session()
    }

    /// A bearer token, or an error telling the user to sign in
    pub async fn bearer(&self) -> Result<String> {
        if !self.session().is_authenticated() {
            bail!("Not signed in. Run `pagecraft login` first.");
        }
        self.session()
            .access_token()
            .await
            .map_err(|err| anyhow!("{} Run `pagecraft login` again.", err.user_message()))
    }

    /// Turn a library error into a printable one, dropping the session on a 401
    pub async fn check<T, E>(&self, result: Result<T, E>) -> Result<T>
    where
        E: Into<PagecraftError>,
    {
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                let err = err.into();
                tracing::debug!(error = %err, "command failed");
                if err.is_unauthorized() {
                    self.session().expire().await;
                    bail!("{} Run `pagecraft login` again.", err.user_message());
                }
                Err(anyhow!(err.user_message()))
            }
        }
    }
}

/// Spinner shown while a request is in flight
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.into());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Print validation errors one per line and fail
pub fn invalid(errors: &ValidationErrors) -> anyhow::Error {
    for (field, messages) in errors.iter() {
        for message in messages {
            eprintln!("  {} {}", style(field).red(), message.message);
        }
    }
    anyhow!("Input is not valid")
}

/// Ask before a destructive action unless `force` is set
pub fn confirm(prompt: &str, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }
    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

pub fn success(message: impl std::fmt::Display) {
    println!("{}{}", SUCCESS, style(message).green());
}

pub fn rule() -> String {
    "─".repeat(72)
}
