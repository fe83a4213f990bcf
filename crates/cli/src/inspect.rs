//! Inspect command

use crate::Manifest;
use anyhow::Result;
use clap::Args;
use codegen::{Processor, TypeIndex};
use std::{fmt::Write, path::Path, path::PathBuf};

/// Inspect command arguments
#[derive(Debug, Args)]
pub struct InspectCmd {
    /// Source root to scan
    #[arg(short, long, default_value = "src")]
    pub src: PathBuf,

    /// Print the metadata table as JSON
    #[arg(long)]
    pub json: bool,
}

impl InspectCmd {
    /// Run the inspect command
    pub fn run(&self, manifest: &Path) -> Result<()> {
        println!("{}", self.render(manifest)?);
        Ok(())
    }

    /// Render the services of the source tree
    pub fn render(&self, manifest: &Path) -> Result<String> {
        let manifest = Manifest::load_or_default(manifest)?;
        let index = TypeIndex::builder().dir(&self.src)?.build();
        let generated = Processor::new(manifest.codegen).process(&index)?;
        if self.json {
            return Ok(generated.metadata.to_json()?);
        }

        let mut out = String::new();
        for interface in generated.metadata.interfaces() {
            let Some(class) = generated.metadata.class(interface) else {
                continue;
            };
            writeln!(out, "{interface} -> {}", class.implementation)?;
            for (id, method) in &class.methods {
                let mut flags = Vec::new();
                if method.system_message.is_some() {
                    flags.push("system");
                }
                if method.user_message.template().is_some() {
                    flags.push("template");
                }
                if method.memory_id_position.is_some() {
                    flags.push("memory");
                }
                if method.requires_moderation {
                    flags.push("moderated");
                }
                writeln!(out, "  {id} -> {} [{}]", method.return_type, flags.join(", "))?;
            }
        }
        for warning in &generated.warnings {
            writeln!(out, "warning: {warning}")?;
        }
        Ok(out.trim_end().to_owned())
    }
}
