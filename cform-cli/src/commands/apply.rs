//! `cform apply` — create or update a stack and tail its events.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use cform_core::TemplateSettings;
use cform_stack::{deploy, SystemClock};

use crate::gateway::GatewayClient;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Name of the stack to create or update.
    #[arg(long)]
    pub stack_name: String,

    /// YAML file with parameters, capabilities and tags.
    #[arg(long)]
    pub stack_config: Option<PathBuf>,
}

impl ApplyArgs {
    pub fn run(&self, template: &TemplateSettings, endpoint: &str) -> Result<()> {
        let stack = super::stack_settings(&self.stack_name, self.stack_config.as_deref())?;
        let body = super::build_template(template)?;

        let client = GatewayClient::new(endpoint);
        let request = stack.request(&body);
        let stdout = io::stdout();
        let outcome = deploy(&client, &SystemClock, &request, &mut stdout.lock())
            .with_context(|| format!("failed to apply stack {}", stack.stack_name))?;

        println!(
            "{} {} ({})",
            outcome.final_status.green().bold(),
            stack.stack_name,
            outcome.mode
        );
        Ok(())
    }
}
