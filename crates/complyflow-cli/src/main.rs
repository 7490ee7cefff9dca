mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use complyflow_core::Record;
use complyflow_policy::{Policy, PolicyEngine};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Validate { template } => {
            let policy = Policy::from_file(&template)
                .with_context(|| format!("template {} is invalid", template.display()))?;

            println!(
                "ok: {} ({} rules, frameworks: {})",
                policy.policy_id,
                policy.rules.len(),
                policy.compliance_frameworks.join(", ")
            );
        }

        Commands::Enforce {
            policy,
            data,
            context,
        } => {
            let engine = load_engine(&cli.templates, &cli.audit_log)?;
            let record = read_record(&data)?;
            let caller_context = context.as_deref().map(read_record).transpose()?;

            let results = engine.enforce(&policy, &record, caller_context.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }

        Commands::Status { policy } => {
            let engine = load_engine(&cli.templates, &cli.audit_log)?;
            let status = engine.get_policy_status(&policy)?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }

        Commands::Dashboard => {
            let engine = load_engine(&cli.templates, &cli.audit_log)?;
            let report = engine.compliance_dashboard()?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn load_engine(templates: &Path, audit_log: &Path) -> anyhow::Result<PolicyEngine> {
    let engine = PolicyEngine::new(audit_log)?;

    if templates.is_dir() {
        let loaded = engine.load_template_dir(templates)?;
        tracing::info!(loaded, templates = %templates.display(), "loaded policy templates");
    } else {
        tracing::warn!(templates = %templates.display(), "template directory not found");
    }

    Ok(engine)
}

fn read_record(path: &Path) -> anyhow::Result<Record> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    value
        .as_object()
        .cloned()
        .with_context(|| format!("{} must hold a JSON object", path.display()))
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "complyflow=debug,complyflow_policy=debug,complyflow_telemetry=debug"
    } else {
        "complyflow=info,complyflow_policy=info,complyflow_telemetry=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
