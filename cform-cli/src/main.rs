//! cform — merge template fragments and deploy them as stacks.
//!
//! # Usage
//!
//! ```text
//! cform [--template-src <dir>] [--template-out <file>] [--template-overwrite] merge
//! cform --endpoint <url> apply --stack-name <name> [--stack-config <file>]
//! cform --endpoint <url> plan  --stack-name <name> [--stack-config <file>]
//!                              [--change-set-name <name>] [--keep-change-set]
//! ```

mod commands;
mod gateway;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use cform_core::TemplateSettings;
use commands::{apply::ApplyArgs, merge::MergeArgs, plan::PlanArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "cform",
    version,
    about = "Merge template fragments and deploy them as stacks",
    long_about = None,
)]
struct Cli {
    /// Enable debug logging.
    #[arg(long, global = true)]
    debug: bool,

    /// Directory containing template fragments.
    #[arg(long, global = true, default_value = "templates")]
    template_src: PathBuf,

    /// Location the merged template is written to [default: a new temp file].
    #[arg(long, global = true)]
    template_out: Option<PathBuf>,

    /// Replace an existing merged template.
    #[arg(long, global = true)]
    template_overwrite: bool,

    /// Base URL of the provisioning gateway.
    #[arg(long, global = true, env = "CFORM_ENDPOINT")]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge the fragment directory into a single template.
    Merge(MergeArgs),

    /// Create or update a stack from the merged template.
    #[command(alias = "deploy")]
    Apply(ApplyArgs),

    /// Preview the changes the merged template would make to a stack.
    Plan(PlanArgs),
}

impl Cli {
    fn template_settings(&self) -> TemplateSettings {
        let output = match &self.template_out {
            Some(path) => path.clone(),
            None => {
                let path = commands::generated_output_path();
                tracing::info!(path = %path.display(), "no --template-out given; using temp file");
                path
            }
        };
        TemplateSettings {
            source_dir: self.template_src.clone(),
            output,
            overwrite: self.template_overwrite,
        }
    }

    fn endpoint(&self) -> Result<&str> {
        self.endpoint
            .as_deref()
            .context("--endpoint (or CFORM_ENDPOINT) is required for this command")
    }

    fn run(self) -> Result<()> {
        let template = self.template_settings();
        match &self.command {
            Commands::Merge(args) => args.run(&template),
            Commands::Apply(args) => args.run(&template, self.endpoint()?),
            Commands::Plan(args) => args.run(&template, self.endpoint()?),
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.debug);

    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
