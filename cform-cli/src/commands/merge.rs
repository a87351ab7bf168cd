//! `cform merge` — write the merged template and stop.

use anyhow::Result;
use clap::Args;

use cform_core::TemplateSettings;

#[derive(Args, Debug)]
pub struct MergeArgs {}

impl MergeArgs {
    pub fn run(&self, template: &TemplateSettings) -> Result<()> {
        super::build_template(template)?;
        println!("{}", template.output.display());
        Ok(())
    }
}
