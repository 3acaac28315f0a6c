//! Policy command implementation
//!
//! Shows the effective policy and which inspector handles each extension.

use anyhow::Result;
use assetgate_lint::{AssetPolicy, InspectorRegistry};
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::process::ExitCode;

/// JSON output for the policy command.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyOutput {
    pub allowed_extensions: Vec<String>,
    pub name_rule: String,
    /// Allowed extension -> inspector id (absent when unclaimed).
    pub inspectors: Vec<ExtensionBinding>,
    pub unclaimed: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtensionBinding {
    pub extension: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspector: Option<String>,
}

impl PolicyOutput {
    pub fn new(policy: &AssetPolicy, registry: &InspectorRegistry) -> Self {
        Self {
            allowed_extensions: policy.allowed_extensions().map(str::to_string).collect(),
            name_rule: policy.name_rule().to_string(),
            inspectors: policy
                .allowed_extensions()
                .map(|ext| ExtensionBinding {
                    extension: ext.to_string(),
                    inspector: registry.for_extension(ext).map(|i| i.id().to_string()),
                })
                .collect(),
            unclaimed: registry.unclaimed(policy),
        }
    }
}

/// Run the policy command, printing to stdout.
pub fn run(policy_path: Option<&str>, json: bool) -> Result<ExitCode> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_to(&mut out, policy_path, json)
}

/// Run the policy command, writing to `out`.
pub fn run_to<W: Write>(out: &mut W, policy_path: Option<&str>, json: bool) -> Result<ExitCode> {
    let policy = super::load_policy(policy_path)?;
    let output = PolicyOutput::new(&policy, &InspectorRegistry::default_inspectors());

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(ExitCode::SUCCESS);
    }

    writeln!(out, "{} {}", "Name rule:".cyan().bold(), output.name_rule)?;
    writeln!(out, "{}", "Extensions:".cyan().bold())?;
    for binding in &output.inspectors {
        match &binding.inspector {
            Some(id) => writeln!(out, "  {:<8} -> {}", binding.extension, id)?,
            None => writeln!(
                out,
                "  {:<8} -> {}",
                binding.extension,
                "(no inspector, name check only)".yellow()
            )?,
        }
    }
    Ok(ExitCode::SUCCESS)
}
