//! Asset commands

use anyhow::{anyhow, Context as _, Result};
use clap::Subcommand;
use console::style;
use pagecraft::assets::{AssetManager, UploadedFile};
use pagecraft::models::Template;
use std::path::{Path, PathBuf};

use super::{confirm, spinner, success, Context, INFO};

/// Asset commands
#[derive(Debug, Subcommand)]
pub enum AssetsCommand {
    /// List a page's assets
    List {
        /// Template id
        template: String,
        /// Page id or name
        page: String,
    },

    /// Upload a file to a page
    Upload {
        /// Template id
        template: String,
        /// Page id or name
        page: String,
        /// File to upload
        file: PathBuf,
    },

    /// Delete an asset from a page
    Delete {
        /// Template id
        template: String,
        /// Page id or name
        page: String,
        /// Asset id
        asset: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl AssetsCommand {
    /// Execute the asset command
    ///
    /// # Errors
    ///
    /// Returns an error if the page does not exist, the file is rejected, or
    /// the service refuses the request.
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        match self {
            Self::List { template, page } => list(ctx, template, page).await,
            Self::Upload {
                template,
                page,
                file,
            } => upload(ctx, template, page, file).await,
            Self::Delete {
                template,
                page,
                asset,
                force,
            } => delete(ctx, template, page, asset, *force).await,
        }
    }
}

async fn manager(ctx: &Context, bearer: &str, template_id: &str, page: &str) -> Result<AssetManager> {
    let template: Template = ctx
        .check(ctx.state().catalog().get(template_id, Some(bearer)).await)
        .await?;
    let page = template
        .page(page)
        .ok_or_else(|| anyhow!("Template {template_id} has no page `{page}`"))?;
    Ok(AssetManager::for_page(template_id, page))
}

async fn list(ctx: &Context, template_id: &str, page: &str) -> Result<()> {
    let bearer = ctx.bearer().await?;
    let manager = manager(ctx, &bearer, template_id, page).await?;

    if manager.assets().is_empty() {
        println!("{INFO}No assets");
        return Ok(());
    }
    for asset in manager.assets() {
        println!(
            "{:<8} {:<32} {:<16} {:>10}  {}",
            asset.id,
            asset.name,
            asset.file_type,
            asset.display_size(),
            style(&asset.url).dim()
        );
    }
    Ok(())
}

async fn upload(ctx: &Context, template_id: &str, page: &str, path: &Path) -> Result<()> {
    let policy = ctx.state().uploads();
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("could not read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file = UploadedFile::new(filename, "", data);
    ctx.check(policy.check(&file)).await?;

    let bearer = ctx.bearer().await?;
    let mut manager = manager(ctx, &bearer, template_id, page).await?;

    let bar = spinner(format!("Uploading {} ({} bytes)", file.filename, file.size()));
    let result = manager
        .upload(ctx.api(), Some(&bearer), policy, &file)
        .await
        .cloned();
    bar.finish_and_clear();

    let asset = ctx.check(result).await?;
    success(format!("Uploaded {} as asset {}", asset.name, asset.id));
    println!("  {}", style(&asset.url).dim());
    Ok(())
}

async fn delete(ctx: &Context, template_id: &str, page: &str, asset_id: &str, force: bool) -> Result<()> {
    let bearer = ctx.bearer().await?;
    let mut manager = manager(ctx, &bearer, template_id, page).await?;
    let Some(asset) = manager.get(asset_id) else {
        return Err(anyhow!("Page `{page}` has no asset {asset_id}"));
    };
    if !confirm(&format!("Delete {}?", asset.name), force)? {
        println!("{INFO}Cancelled");
        return Ok(());
    }

    let removed = ctx
        .check(manager.delete(ctx.api(), Some(&bearer), asset_id).await)
        .await?;
    success(format!("Deleted {}", removed.name));
    Ok(())
}
