//! Fill a template and render a document

use anyhow::{anyhow, Result};
use clap::Args;
use console::style;
use dialoguer::Input;
use pagecraft::forms::{FormWizard, WizardError};

use super::{spinner, success, Context, INFO};

/// Generate a document from a template
#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// Template id
    pub template: String,

    /// Field value as `name=value`; repeatable
    #[arg(short = 's', long = "set", value_parser = parse_assignment)]
    pub values: Vec<(String, String)>,

    /// Prompt for every field, page by page
    #[arg(short, long)]
    pub interactive: bool,
}

impl GenerateCommand {
    /// Walk the template's pages and submit the collected values
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be loaded, has no pages, a
    /// required field is left empty, or rendering fails.
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let bearer = ctx.session().optional_access_token().await;
        let template = ctx
            .check(ctx.state().catalog().get(&self.template, bearer.as_deref()).await)
            .await?;

        let mut wizard = FormWizard::new();
        ctx.check(wizard.select(template)).await?;
        for (name, value) in &self.values {
            wizard.set_value(name.clone(), value.clone());
        }

        loop {
            if self.interactive {
                prompt_page(&mut wizard)?;
            }
            if wizard.is_last_page() {
                break;
            }
            if let Err(err) = wizard.next_page() {
                return Err(incomplete(&wizard, &err));
            }
        }

        let bar = spinner("Generating document");
        let result = wizard
            .submit(ctx.api(), bearer.as_deref())
            .await
            .cloned();
        bar.finish_and_clear();

        let result = match result {
            Ok(result) => result,
            Err(err @ WizardError::Incomplete(_)) => return Err(incomplete(&wizard, &err)),
            Err(err) => return ctx.check(Err(err)).await,
        };
        success("Document ready");
        println!("  {}", style(&result.url).cyan());
        if let Some(preview) = &result.preview_url {
            println!("  {INFO}preview {}", style(preview).dim());
        }
        Ok(())
    }
}

fn prompt_page(wizard: &mut FormWizard) -> Result<()> {
    let Some(page) = wizard.current_page().cloned() else {
        return Ok(());
    };
    println!(
        "{}",
        style(format!(
            "Page {} of {}: {}",
            wizard.page_index() + 1,
            wizard.page_count(),
            page.name
        ))
        .bold()
    );
    for field in &page.fields {
        let label = if field.label.is_empty() { &field.name } else { &field.label };
        let prompt = if field.required {
            format!("{label} *")
        } else {
            label.clone()
        };
        let value: String = Input::new()
            .with_prompt(prompt)
            .with_initial_text(wizard.value(&field.name))
            .allow_empty(!field.required)
            .interact_text()?;
        wizard.set_value(field.name.clone(), value);
    }
    Ok(())
}

fn incomplete(wizard: &FormWizard, err: &WizardError) -> anyhow::Error {
    let page = wizard
        .current_page()
        .map(|page| page.name.clone())
        .unwrap_or_default();
    for (_, messages) in wizard.errors().iter() {
        for message in messages {
            eprintln!("  {} {}", style("✗").red(), message.message);
        }
    }
    anyhow!("{} (page `{page}`)", err.user_message())
}

fn parse_assignment(value: &str) -> Result<(String, String), String> {
    let (name, value) = value
        .split_once('=')
        .ok_or_else(|| format!("expected `name=value`, got `{value}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("field name is empty".to_string());
    }
    Ok((name.to_string(), value.to_string()))
}
