//! Change-set apply CLI
//!
//! Loads a models document and an update request, applies the request and
//! prints the response as JSON.
//!
//! Usage:
//!   cargo run --features cli --bin changeset_apply -- \
//!     --models models.yaml \
//!     --request request.json \
//!     --output updated.yaml

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use model_changeset::{
    EngineConfig, ModelChangeEngine, ModelUpdateRequest, ModelUpdater, Models, ModelsDocument,
};

#[derive(Parser, Debug)]
#[command(name = "changeset_apply")]
#[command(about = "Apply a model update request to a models document")]
struct Args {
    /// Models document (YAML or JSON)
    #[arg(long, short = 'm')]
    models: PathBuf,

    /// Update request (YAML or JSON)
    #[arg(long, short = 'r')]
    request: PathBuf,

    /// Engine config file; defaults to $MODEL_CHANGESET_CONFIG
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Write the updated models document here
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

fn load_request(path: &Path) -> Result<ModelUpdateRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file: {}", path.display()))?;
    let request = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        other => bail!("Unsupported request format: {:?}", other),
    };
    Ok(request)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,model_changeset=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::from_env()?,
    };
    let meta_info = config.load_meta_info()?;
    let models = Models::from_document(ModelsDocument::load(&args.models)?, meta_info)
        .with_context(|| format!("Invalid models file: {}", args.models.display()))?;
    let request = load_request(&args.request)?;

    let mut updater = ModelUpdater::new(ModelChangeEngine::new(config), models);
    let response = updater
        .update(&request)
        .with_context(|| format!("Failed to apply {}", args.request.display()))?;

    println!("{}", serde_json::to_string_pretty(&response)?);

    if let Some(output) = &args.output {
        let yaml = updater.models().to_document().to_yaml_string()?;
        std::fs::write(output, yaml)
            .with_context(|| format!("Failed to write models file: {}", output.display()))?;
        tracing::info!(path = %output.display(), "wrote updated models");
    }
    Ok(())
}
