//! Shared fixture loading for the integration tests.

#![allow(dead_code)]

use model_changeset::{ModelChangeSetInfo, Models, ModelsMetaInfo, Path};

pub fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

pub fn load_models() -> Models {
    let meta = ModelsMetaInfo::load(fixture("meta.yaml")).expect("meta fixture");
    Models::load(fixture("models.yaml"), meta).expect("models fixture")
}

pub fn path(s: &str) -> Path {
    Path::parse(s).expect("valid path")
}

/// `(operation, path)` pairs of the cascaded entries of a trace.
pub fn intermediate(trace: &[ModelChangeSetInfo]) -> Vec<(String, String)> {
    trace
        .iter()
        .filter(|info| info.intermediate)
        .map(|info| (info.operation.clone(), info.path().to_string()))
        .collect()
}

pub fn entry(operation: &str, path: &str) -> (String, String) {
    (operation.to_string(), path.to_string())
}
