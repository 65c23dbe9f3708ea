//! Page commands

use anyhow::{Context as _, Result};
use clap::Subcommand;
use pagecraft::forms::{FieldRow, PageForm};
use std::path::PathBuf;

use super::{confirm, invalid, spinner, success, Context, INFO};

/// Page commands
#[derive(Debug, Subcommand)]
pub enum PagesCommand {
    /// Add a page to a template
    Create {
        /// Template id
        template: String,

        /// Page name, unique within the template
        #[arg(short, long)]
        name: String,

        /// Page width
        #[arg(long, default_value = "210")]
        width: String,

        /// Page height
        #[arg(long, default_value = "297")]
        height: String,

        /// Dimension unit: mm or px
        #[arg(long, default_value = "mm")]
        units: String,

        /// Bleed margin
        #[arg(long, default_value = "3")]
        bleeds: String,

        /// File holding the page markup
        #[arg(long)]
        html: Option<PathBuf>,

        /// Field as `name:Label`, `name:Label:required`; repeatable
        #[arg(short, long = "field", value_parser = parse_field)]
        fields: Vec<FieldRow>,
    },

    /// Remove a page from a template
    Delete {
        /// Template id
        template: String,

        /// Page id
        page: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl PagesCommand {
    /// Execute the page command
    ///
    /// # Errors
    ///
    /// Returns an error if input is invalid, the markup file cannot be read,
    /// you are not signed in, or the service rejects the request.
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        match self {
            Self::Create {
                template,
                name,
                width,
                height,
                units,
                bleeds,
                html,
                fields,
            } => {
                let html = match html {
                    Some(path) => tokio::fs::read_to_string(path)
                        .await
                        .with_context(|| format!("could not read {}", path.display()))?,
                    None => String::new(),
                };
                let form = PageForm {
                    name: name.clone(),
                    width: width.clone(),
                    height: height.clone(),
                    units: units.clone(),
                    bleeds: bleeds.clone(),
                    html,
                    fields: fields.clone(),
                };
                create(ctx, template, &form).await
            }
            Self::Delete {
                template,
                page,
                force,
            } => delete(ctx, template, page, *force).await,
        }
    }
}

async fn create(ctx: &Context, template_id: &str, form: &PageForm) -> Result<()> {
    let page = form.validate(None).map_err(|errors| invalid(&errors))?;
    let bearer = ctx.bearer().await?;

    let bar = spinner(format!("Adding page {}", page.name));
    let result = ctx
        .state()
        .catalog()
        .create_page(template_id, &page, Some(&bearer))
        .await;
    bar.finish_and_clear();

    let created = ctx.check(result).await?;
    success(format!(
        "Added page {} ({}) with {} fields",
        created.name,
        created.key(),
        created.fields.len()
    ));
    Ok(())
}

async fn delete(ctx: &Context, template_id: &str, page_id: &str, force: bool) -> Result<()> {
    let bearer = ctx.bearer().await?;
    if !confirm(&format!("Delete page {page_id} of template {template_id}?"), force)? {
        println!("{INFO}Cancelled");
        return Ok(());
    }
    ctx.check(
        ctx.state()
            .catalog()
            .delete_page(template_id, page_id, Some(&bearer))
            .await,
    )
    .await?;
    success(format!("Deleted page {page_id}"));
    Ok(())
}

fn parse_field(value: &str) -> Result<FieldRow, String> {
    let mut parts = value.splitn(3, ':');
    let name = parts.next().unwrap_or_default().trim();
    let label = parts.next().map(str::trim).unwrap_or_default();
    if name.is_empty() || label.is_empty() {
        return Err(format!("expected `name:Label[:required]`, got `{value}`"));
    }
    let required = match parts.next().map(str::trim) {
        None | Some("" | "optional") => false,
        Some("required") => true,
        Some(other) => return Err(format!("unknown field flag `{other}`")),
    };
    Ok(FieldRow {
        name: name.to_string(),
        label: label.to_string(),
        required,
    })
}
