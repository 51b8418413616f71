//! Versioned batch updates through `ModelUpdater`.

mod helpers;

use helpers::{fixture, load_models, path};
use model_changeset::{
    EngineConfig, ModelChangeEngine, ModelChangeSet, ModelUpdateRequest, ModelUpdateResponse,
    ModelUpdater, Models, ModelsDocument, ModelsMetaInfo,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn updater() -> ModelUpdater {
    ModelUpdater::new(ModelChangeEngine::default(), load_models())
}

#[test]
fn test_request_from_wire_form() {
    let request: ModelUpdateRequest = serde_json::from_value(json!({
        "modelVersion": 0,
        "changes": [
            {
                "path": "definition=D/region=R1",
                "operation": "restore"
            },
            {
                "path": "definition=PR0001/field=hasWatcher/attribute=order",
                "operation": "modifyAttribute",
                "oldValue": 30,
                "newValue": 35
            }
        ]
    }))
    .unwrap();

    let mut updater = updater();
    let response = updater.update(&request).unwrap();
    assert_eq!(response.model_version, 1);
    assert_eq!(response.change_sets.len(), 5);

    let wire = serde_json::to_value(&response).unwrap();
    assert_eq!(wire["modelVersion"], json!(1));
    assert_eq!(wire["changeSets"][1]["operation"], json!("assignToRegion"));
    assert_eq!(wire["changeSets"][1]["nodeKind"], json!("field"));
    assert_eq!(wire["changeSets"][1]["intermediate"], json!(true));

    let back: ModelUpdateResponse = serde_json::from_value(wire).unwrap();
    assert_eq!(back, response);
}

#[test]
fn test_batch_is_atomic() {
    let mut updater = updater();
    let before = updater.models().clone();

    let request = ModelUpdateRequest::new(
        0,
        vec![
            ModelChangeSet::restore(path("definition=D/region=R1")),
            ModelChangeSet::modify_attribute(
                path("definition=PR0001/field=hasWatcher/attribute=order"),
                json!(1),
                json!(2),
            ),
        ],
    );
    let err = updater.update(&request).unwrap_err();
    assert!(err.is_collision());
    assert_eq!(updater.models(), &before);
    assert_eq!(updater.version(), 0);
    assert!(updater.history().is_empty());
}

#[test]
fn test_callers_catch_up_from_their_version() {
    let mut updater = updater();
    let first = ModelUpdateRequest::new(
        0,
        vec![ModelChangeSet::restore(path("definition=PR0001/action=lock"))],
    );
    let response = updater.update(&first).unwrap();
    assert_eq!(response.model_version, 1);
    assert_eq!(response.change_sets.len(), 3);

    let second = ModelUpdateRequest::new(
        1,
        vec![ModelChangeSet::modify_attribute(
            path("definition=D/field=C/attribute=order"),
            json!(0),
            json!(4),
        )],
    );
    let response = updater.update(&second).unwrap();
    assert_eq!(response.model_version, 2);
    assert_eq!(response.change_sets.len(), 1);
    assert_eq!(updater.changes_since(0).len(), 4);
    assert!(updater.history().iter().take(3).all(|entry| entry.version == 1));

    // Resubmitting an applied request changes nothing.
    let response = updater
        .update(&ModelUpdateRequest::new(2, first.changes.clone()))
        .unwrap();
    assert_eq!(response.model_version, 2);
    assert!(response.change_sets.is_empty());
}

#[test]
fn test_updated_document_reloads_identically() {
    let mut updater = updater();
    updater
        .update(&ModelUpdateRequest::new(
            0,
            vec![ModelChangeSet::restore(path("definition=PR0001/region=systemRelations"))],
        ))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("models.yaml");
    let yaml = updater.models().to_document().to_yaml_string().unwrap();
    std::fs::write(&file, yaml).unwrap();

    let meta = ModelsMetaInfo::load(fixture("meta.yaml")).unwrap();
    let reloaded = Models::load(&file, meta).unwrap();
    assert_eq!(&reloaded, updater.models());
    assert_eq!(reloaded.version(), 1);
    assert!(ModelsDocument::load(&file).unwrap().definitions.len() == 3);
}

#[test]
fn test_config_limits_cascade_depth() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("engine.yaml");
    std::fs::write(&file, "max_cascade_depth: 1\n").unwrap();
    let config = EngineConfig::load(&file).unwrap();

    let mut updater = ModelUpdater::new(ModelChangeEngine::new(config), load_models());
    let err = updater
        .update(&ModelUpdateRequest::new(
            0,
            vec![ModelChangeSet::restore(path("definition=PR0001/header=compact"))],
        ))
        .unwrap_err();
    assert_eq!(err.code(), "cascade_limit_exceeded");
    assert_eq!(updater.version(), 0);
}

#[test]
fn test_response_paths_read_back_after_cascade() {
    let mut updater = updater();
    let response = updater
        .update(&ModelUpdateRequest::new(
            0,
            vec![
                ModelChangeSet::restore(path("definition=PR0001/action=lock")),
                ModelChangeSet::restore(path("definition=D/region=R1")),
            ],
        ))
        .unwrap();
    assert_eq!(response.change_sets.len(), 7);

    let text = serde_json::to_string(&response).unwrap();
    let back: ModelUpdateResponse = serde_json::from_str(&text).unwrap();
    assert_eq!(back, response);
}

#[test]
fn test_document_with_unaddressable_id_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("models.yaml");
    std::fs::write(
        &file,
        "definitions:\n  - id: D\n    actions:\n      - id: a/b\n        attributes:\n          label: Lock\n",
    )
    .unwrap();

    let err = Models::load(&file, ModelsMetaInfo::new()).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("Invalid models file"), "{message}");
    assert!(message.contains("a/b"), "{message}");
}
