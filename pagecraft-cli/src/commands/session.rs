//! Sign-in and status commands

use anyhow::{anyhow, Result};
use console::style;
use dialoguer::{Input, Password};
use std::time::Instant;

use super::{spinner, success, Context, INFO, WARN};

/// Session commands
#[derive(Debug)]
pub enum SessionCommand {
    /// Sign in, prompting for missing credentials
    Login {
        username: Option<String>,
        password: Option<String>,
    },
    /// Sign out
    Logout,
    /// Print the signed-in user
    Whoami,
    /// Probe the template service
    Health,
}

impl SessionCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the credentials, cannot be
    /// reached, or the session cannot be stored.
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            Self::Login { username, password } => login(ctx, username, password).await,
            Self::Logout => logout(ctx).await,
            Self::Whoami => {
                whoami(ctx);
                Ok(())
            }
            Self::Health => health(ctx).await,
        }
    }
}

async fn login(ctx: &Context, username: Option<String>, password: Option<String>) -> Result<()> {
    let username = match username {
        Some(username) => username,
        None => Input::<String>::new().with_prompt("Username").interact_text()?,
    };
    let password = match password {
        Some(password) => password,
        None => Password::new().with_prompt("Password").interact()?,
    };

    let form = pagecraft::forms::LoginForm {
        username,
        password,
        next: None,
    }
    .checked()
    .map_err(|errors| super::invalid(&errors))?;

    let bar = spinner(format!("Signing in to {}", ctx.api().base_url()));
    let result = ctx.session().login(&form.username, &form.password).await;
    bar.finish_and_clear();

    let user = result.map_err(|err| anyhow!(err.user_message()))?;
    success(format!(
        "Signed in as {} ({})",
        style(&user.username).bold(),
        user.role_label()
    ));
    Ok(())
}

async fn logout(ctx: &Context) -> Result<()> {
    if !ctx.session().is_authenticated() {
        println!("{INFO}Not signed in");
        return Ok(());
    }
    ctx.session().logout().await;
    success("Signed out");
    Ok(())
}

fn whoami(ctx: &Context) {
    match ctx.session().user() {
        Some(user) => {
            println!("{}", style(&user.username).bold());
            println!("  role:  {}", user.role_label());
            println!("  admin: {}", if user.has_admin_access() { "yes" } else { "no" });
            if let Some(email) = &user.email {
                println!("  email: {email}");
            }
            println!("  state: {}", ctx.session().state().as_str());
        }
        None => println!("{INFO}Not signed in"),
    }
}

async fn health(ctx: &Context) -> Result<()> {
    let started = Instant::now();
    let result = ctx.api().health().await;
    let elapsed = started.elapsed().as_millis();

    match result {
        Ok(()) => {
            success(format!("{} answered in {elapsed} ms", ctx.api().base_url()));
            Ok(())
        }
        Err(err) => {
            eprintln!("{WARN}{}", style(ctx.api().base_url()).yellow());
            Err(anyhow!(err.user_message()))
        }
    }
}
