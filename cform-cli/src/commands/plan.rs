//! `cform plan` — preview stack changes through a change set.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use colored::Colorize;

use cform_core::{ChangeAction, ChangeSetName, PlanSettings, ResourceChange, TemplateSettings};
use cform_stack::{plan, render, ChangeSetPolling, SystemClock};

use crate::gateway::GatewayClient;

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Name of the stack to preview changes for.
    #[arg(long)]
    pub stack_name: String,

    /// YAML file with parameters, capabilities and tags.
    #[arg(long)]
    pub stack_config: Option<PathBuf>,

    /// Change set name [default: cs-<YYYYMMDDHHMMSS>].
    #[arg(long)]
    pub change_set_name: Option<String>,

    /// Leave the change set on the service after printing it.
    #[arg(long)]
    pub keep_change_set: bool,
}

impl PlanArgs {
    fn settings(&self) -> PlanSettings {
        let change_set_name = match &self.change_set_name {
            Some(name) => ChangeSetName::from(name.as_str()),
            None => ChangeSetName::timestamped(Local::now().naive_local()),
        };
        PlanSettings {
            change_set_name,
            keep_change_set: self.keep_change_set,
        }
    }

    pub fn run(&self, template: &TemplateSettings, endpoint: &str) -> Result<()> {
        let stack = super::stack_settings(&self.stack_name, self.stack_config.as_deref())?;
        let settings = self.settings();
        let body = super::build_template(template)?;

        let client = GatewayClient::new(endpoint);
        let request = settings.request(&stack, &body);
        let result = plan(
            &client,
            &SystemClock,
            &request,
            settings.keep_change_set,
            ChangeSetPolling::default(),
        )
        .with_context(|| format!("failed to plan changes for stack {}", stack.stack_name))?;

        if result.changes.is_empty() {
            println!("No changes.");
        }
        print!("{}", render::render_changes(&result.changes, colored_header));
        Ok(())
    }
}

fn colored_header(change: &ResourceChange, header: String) -> String {
    match change.action {
        ChangeAction::Add => header.green().to_string(),
        ChangeAction::Modify => header.yellow().to_string(),
        ChangeAction::Remove => header.red().to_string(),
    }
}
