//! Permission commands

use anyhow::Result;
use clap::Subcommand;
use pagecraft::forms::PermissionForm;

use super::{confirm, invalid, rule, success, Context, INFO};

/// Permission commands
#[derive(Debug, Subcommand)]
pub enum PermissionsCommand {
    /// List grants on a template
    List {
        /// Template id
        template: String,
    },

    /// Grant a permission to a user or a group
    Add {
        /// Template id
        template: String,

        /// view, edit or generate
        #[arg(short = 't', long = "type", default_value = "view")]
        permission_type: String,

        /// User id
        #[arg(short, long, conflicts_with = "group")]
        user: Option<String>,

        /// Group id
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Revoke a grant
    Remove {
        /// Template id
        template: String,

        /// Permission id
        permission: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl PermissionsCommand {
    /// Execute the permission command
    ///
    /// # Errors
    ///
    /// Returns an error if the grant is malformed, you are not signed in, or
    /// the service rejects the request.
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        match self {
            Self::List { template } => list(ctx, template).await,
            Self::Add {
                template,
                permission_type,
                user,
                group,
            } => {
                let form = PermissionForm {
                    permission_type: permission_type.clone(),
                    user: user.clone().unwrap_or_default(),
                    group: group.clone().unwrap_or_default(),
                };
                add(ctx, template, &form).await
            }
            Self::Remove {
                template,
                permission,
                force,
            } => remove(ctx, template, permission, *force).await,
        }
    }
}

async fn list(ctx: &Context, template_id: &str) -> Result<()> {
    let bearer = ctx.bearer().await?;
    let permissions = ctx
        .check(ctx.api().list_permissions(template_id, Some(&bearer)).await)
        .await?;

    if permissions.is_empty() {
        println!("{INFO}No permissions granted");
        return Ok(());
    }
    println!("{:<8} {:<10} {}", "ID", "Type", "Grantee");
    println!("{}", rule());
    for permission in &permissions {
        println!(
            "{:<8} {:<10} {}",
            permission.id,
            permission.permission_type,
            permission.grantee_label()
        );
    }
    Ok(())
}

async fn add(ctx: &Context, template_id: &str, form: &PermissionForm) -> Result<()> {
    let grant = form.to_new_permission().map_err(|errors| invalid(&errors))?;
    let bearer = ctx.bearer().await?;

    let permission = ctx
        .check(ctx.api().add_permission(template_id, &grant, Some(&bearer)).await)
        .await?;
    tracing::info!(template = %template_id, permission = %permission.id, "permission granted");
    success(format!(
        "Granted {} to {} (permission {})",
        permission.permission_type,
        permission.grantee_label(),
        permission.id
    ));
    Ok(())
}

async fn remove(ctx: &Context, template_id: &str, permission_id: &str, force: bool) -> Result<()> {
    let bearer = ctx.bearer().await?;
    if !confirm(&format!("Revoke permission {permission_id}?"), force)? {
        println!("{INFO}Cancelled");
        return Ok(());
    }
    ctx.check(
        ctx.api()
            .remove_permission(template_id, permission_id, Some(&bearer))
            .await,
    )
    .await?;
    success(format!("Revoked permission {permission_id}"));
    Ok(())
}
