pub mod apply;
pub mod merge;
pub mod plan;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, Utc};

use cform_core::{StackConfig, StackName, StackSettings, TemplateSettings};
use cform_template::{ensure_writable, generated_banner, merge_fragments, write_generated, DirectoryReader};

/// A fresh path in the system temp directory for the merged template.
pub fn generated_output_path() -> PathBuf {
    let stamp = Local::now().format("%Y%m%d%H%M%S%f");
    std::env::temp_dir().join(format!("cform-{}-{stamp}.yaml", std::process::id()))
}

/// Merge the fragment directory and write the generated file.
///
/// Returns the full file contents (banner included), which is also the
/// template body sent to the service.
pub fn build_template(settings: &TemplateSettings) -> Result<String> {
    ensure_writable(&settings.output, settings.overwrite)
        .context("refusing to replace merged template; pass --template-overwrite")?;

    let reader = DirectoryReader::new(&settings.source_dir).with_context(|| {
        format!(
            "failed to read template fragments from {}",
            settings.source_dir.display()
        )
    })?;
    let body = merge_fragments(reader).context("failed to merge template fragments")?;

    let banner = generated_banner(Utc::now());
    write_generated(&settings.output, &banner, &body, settings.overwrite).with_context(|| {
        format!("failed to write merged template to {}", settings.output.display())
    })?;

    Ok(format!("{banner}{body}"))
}

pub fn stack_settings(stack_name: &str, config: Option<&Path>) -> Result<StackSettings> {
    let config = StackConfig::load_optional(config).context("failed to load stack config")?;
    Ok(StackSettings {
        stack_name: StackName::from(stack_name),
        config,
    })
}
