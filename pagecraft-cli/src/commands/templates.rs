//! Template commands

use anyhow::Result;
use clap::Subcommand;
use console::style;
use pagecraft::forms::TemplateForm;

use super::{confirm, invalid, rule, spinner, success, Context, INFO};

/// Template commands
#[derive(Debug, Subcommand)]
pub enum TemplatesCommand {
    /// List templates visible to you
    List,

    /// Show one template with its pages and fields
    Show {
        /// Template id
        id: String,
    },

    /// Create a template
    Create {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Version label
        #[arg(long, default_value = "1.0")]
        version: String,

        /// Category: official, business, personal or your own
        #[arg(short = 't', long = "type", default_value = "official")]
        template_type: String,

        /// Long description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a template
    Delete {
        /// Template id
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl TemplatesCommand {
    /// Execute the template command
    ///
    /// # Errors
    ///
    /// Returns an error if input is invalid, you are not signed in, or the
    /// service rejects the request.
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        match self {
            Self::List => list(ctx).await,
            Self::Show { id } => show(ctx, id).await,
            Self::Create {
                name,
                version,
                template_type,
                description,
            } => {
                let form = TemplateForm {
                    name: name.clone(),
                    version: version.clone(),
                    template_type: template_type.clone(),
                    description: description.clone().unwrap_or_default(),
                };
                create(ctx, &form).await
            }
            Self::Delete { id, force } => delete(ctx, id, *force).await,
        }
    }
}

async fn list(ctx: &Context) -> Result<()> {
    let bearer = ctx.session().optional_access_token().await;
    let templates = ctx
        .check(ctx.state().catalog().templates(bearer.as_deref()).await)
        .await?;

    if templates.is_empty() {
        println!("{INFO}No templates");
        return Ok(());
    }
    println!("{:<8} {:<32} {:<10} {:<12} {:>5}", "ID", "Name", "Version", "Type", "Pages");
    println!("{}", rule());
    for template in &templates {
        println!(
            "{:<8} {:<32} {:<10} {:<12} {:>5}",
            template.id,
            template.name,
            template.version.as_deref().unwrap_or("-"),
            template.template_type,
            template.pages.len()
        );
    }
    Ok(())
}

async fn show(ctx: &Context, id: &str) -> Result<()> {
    let bearer = ctx.session().optional_access_token().await;
    let template = ctx
        .check(ctx.state().catalog().get(id, bearer.as_deref()).await)
        .await?;

    println!(
        "{} {}",
        style(&template.name).bold(),
        style(format!("#{}", template.id)).dim()
    );
    println!(
        "  version {} · {}",
        template.version.as_deref().unwrap_or("-"),
        template.template_type
    );
    if let Some(description) = template.description.as_deref().filter(|d| !d.is_empty()) {
        println!("  {description}");
    }
    for (index, page) in template.pages.iter().enumerate() {
        println!();
        println!(
            "{} {} {}",
            style(format!("Page {}", index + 1)).cyan(),
            style(&page.name).bold(),
            style(format!("[{}] {} × {} {}", page.key(), page.width, page.height, page.units.as_str())).dim()
        );
        for field in &page.fields {
            let marker = if field.required { "*" } else { " " };
            println!("  {marker} {:<24} {}", field.name, field.label);
        }
        for asset in &page.assets {
            println!("    asset {:<6} {} ({})", asset.id, asset.name, asset.display_size());
        }
    }
    Ok(())
}

async fn create(ctx: &Context, form: &TemplateForm) -> Result<()> {
    let input = form.to_input().map_err(|errors| invalid(&errors))?;
    let bearer = ctx.bearer().await?;

    let bar = spinner(format!("Creating {}", input.name));
    let result = ctx.state().catalog().create(&input, Some(&bearer)).await;
    bar.finish_and_clear();

    let created = ctx.check(result).await?;
    success(format!("Created template {} ({})", created.name, created.id));
    Ok(())
}

async fn delete(ctx: &Context, id: &str, force: bool) -> Result<()> {
    let bearer = ctx.bearer().await?;
    if !confirm(&format!("Delete template {id}?"), force)? {
        println!("{INFO}Cancelled");
        return Ok(());
    }
    ctx.check(ctx.state().catalog().delete(id, Some(&bearer)).await)
        .await?;
    success(format!("Deleted template {id}"));
    Ok(())
}
