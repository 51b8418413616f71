//! Serde document form of a `Models` aggregate.
//!
//! The document is what external persistence hands the engine and what the
//! CLI writes back. It carries no paths or meta info; both are derived when
//! the document is turned into a live tree.

use std::path::Path as FsPath;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use model_types::{NodeKind, PathStep};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::definition::ModelDefinition;
use super::meta::ModelsMetaInfo;
use super::models::Models;
use super::node::{AttributeMap, ModelAttribute, ModelElement, ModelNode};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelsDocument {
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub definitions: Vec<DefinitionDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionDocument {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<NodeDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<NodeDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<NodeDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub action_groups: Vec<NodeDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDocument {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Value>,
}

/// Region, header, action or action group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDocument {
    pub id: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Value>,
}

impl ModelsDocument {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse models document")
    }

    /// Load a document from a YAML or JSON file, chosen by extension.
    pub fn load(path: impl AsRef<FsPath>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read models file: {}", path.display()))?;
        let is_json = path.extension().and_then(|ext| ext.to_str()) == Some("json");
        let document = if is_json {
            serde_json::from_str(&content).context("Failed to parse models document")
        } else {
            Self::from_yaml_str(&content)
        };
        document.with_context(|| format!("Invalid models file: {}", path.display()))
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize models document")
    }
}

// ── Document <-> tree ─────────────────────────────────────────

impl Models {
    /// Build a live tree from `document`, attaching `meta_info` to every
    /// attribute. Null attribute values are not stored.
    ///
    /// Fails when an id or attribute name could not be addressed by a path:
    /// empty, containing `/`, or with surrounding whitespace.
    pub fn from_document(document: ModelsDocument, meta_info: ModelsMetaInfo) -> Result<Self> {
        let mut models = Models::new(meta_info);
        models.set_version(document.version);

        for doc in document.definitions {
            check_id(NodeKind::Definition, &doc.id)?;
            let label = format!("Invalid definition '{}'", doc.id);
            let context = || label.clone();
            let mut definition = ModelDefinition::new(doc.id);
            if let Some(parent) = doc.parent {
                definition = definition.with_parent(parent);
            }
            let meta = models.meta_info();

            let owner = definition.path().clone();
            let attributes = build_attributes(&owner, NodeKind::Definition, doc.attributes, meta)
                .with_context(context)?;
            for attribute in attributes {
                definition.set_attribute(attribute);
            }

            for field_doc in doc.fields {
                check_id(NodeKind::Field, &field_doc.id).with_context(context)?;
                if let Some(region_id) = &field_doc.region_id {
                    check_id(NodeKind::Region, region_id).with_context(context)?;
                }
                let field = definition.get_or_create_field(&field_doc.id);
                field.set_region_id(field_doc.region_id);
                let owner = field.path().clone();
                let attributes = build_attributes(&owner, NodeKind::Field, field_doc.attributes, meta)
                    .with_context(context)?;
                field.attributes_mut().extend(keyed(attributes));
            }

            let elements = [
                (NodeKind::Region, doc.regions),
                (NodeKind::Header, doc.headers),
                (NodeKind::Action, doc.actions),
                (NodeKind::ActionGroup, doc.action_groups),
            ];
            for (kind, nodes) in elements {
                for node_doc in nodes {
                    check_id(kind, &node_doc.id).with_context(context)?;
                    if let Some(element) = definition.get_or_create_element(kind, &node_doc.id) {
                        let owner = element.path().clone();
                        let attributes = build_attributes(&owner, kind, node_doc.attributes, meta)
                            .with_context(context)?;
                        element.attributes_mut().extend(keyed(attributes));
                    }
                }
            }

            models.add_definition(definition);
        }
        Ok(models)
    }

    pub fn to_document(&self) -> ModelsDocument {
        ModelsDocument {
            version: self.version(),
            definitions: self.definitions().map(definition_document).collect(),
        }
    }

    /// Parse a YAML models document and build the tree.
    pub fn from_yaml_str(yaml: &str, meta_info: ModelsMetaInfo) -> Result<Self> {
        Self::from_document(ModelsDocument::from_yaml_str(yaml)?, meta_info)
    }

    pub fn load(path: impl AsRef<FsPath>, meta_info: ModelsMetaInfo) -> Result<Self> {
        let path = path.as_ref();
        Self::from_document(ModelsDocument::load(path)?, meta_info)
            .with_context(|| format!("Invalid models file: {}", path.display()))
    }
}

fn check_id(kind: NodeKind, id: &str) -> Result<()> {
    PathStep::check_value(id).with_context(|| format!("Invalid {kind} id '{id}'"))
}

fn build_attributes(
    owner: &model_types::Path,
    owner_kind: NodeKind,
    values: IndexMap<String, Value>,
    meta: &ModelsMetaInfo,
) -> Result<Vec<ModelAttribute>> {
    values
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(name, value)| {
            check_id(NodeKind::Attribute, &name)
                .with_context(|| format!("Invalid attribute on {}", owner.pretty_print()))?;
            let mut attribute = ModelAttribute::new(owner, &name, meta.attribute(owner_kind, &name));
            attribute.set_value(Some(value));
            Ok(attribute)
        })
        .collect()
}

fn keyed(attributes: Vec<ModelAttribute>) -> impl Iterator<Item = (String, ModelAttribute)> {
    attributes
        .into_iter()
        .map(|attribute| (attribute.name().to_string(), attribute))
}

fn attribute_values(attributes: &AttributeMap) -> IndexMap<String, Value> {
    attributes
        .iter()
        .map(|(name, attribute)| {
            (name.clone(), attribute.value().cloned().unwrap_or(Value::Null))
        })
        .collect()
}

fn definition_document(definition: &ModelDefinition) -> DefinitionDocument {
    let nodes = |store: &IndexMap<String, ModelElement>| -> Vec<NodeDocument> {
        store
            .values()
            .map(|element| NodeDocument {
                id: element.id().to_string(),
                attributes: attribute_values(element.attributes()),
            })
            .collect()
    };

    DefinitionDocument {
        id: definition.id().to_string(),
        parent: definition.parent().map(str::to_string),
        attributes: attribute_values(definition.attributes()),
        fields: definition
            .fields()
            .values()
            .map(|field| FieldDocument {
                id: field.id().to_string(),
                region_id: field.region_id().map(str::to_string),
                attributes: attribute_values(field.attributes()),
            })
            .collect(),
        regions: nodes(definition.regions()),
        headers: nodes(definition.headers()),
        actions: nodes(definition.actions()),
        action_groups: nodes(definition.action_groups()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::meta::ModelMetaInfo;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const DOC: &str = r#"
version: 4
definitions:
  - id: BASE
    attributes:
      abstract: true
  - id: PR0001
    parent: BASE
    fields:
      - id: hasWatcher
        regionId: systemRelations
        attributes:
          order: 10
          label: null
      - id: title
    regions:
      - id: systemRelations
        attributes:
          order: 5
    actionGroups:
      - id: more
"#;

    #[test]
    fn test_from_yaml_builds_tree() {
        let meta = ModelsMetaInfo::new()
            .with(NodeKind::Field, ModelMetaInfo::new("order").with_default(json!(0)));
        let models = Models::from_yaml_str(DOC, meta).unwrap();
        assert_eq!(models.version(), 4);

        let def = models.definition("PR0001").unwrap();
        assert_eq!(def.parent(), Some("BASE"));
        let field = def.field("hasWatcher").unwrap();
        assert_eq!(field.region_id(), Some("systemRelations"));
        assert_eq!(field.attribute_names(), vec!["order".to_string()]);
        let order = field.attribute("order").unwrap();
        assert_eq!(order.meta_info().default_value, Some(json!(0)));
        assert_eq!(
            order.path().to_string(),
            "definition=PR0001/field=hasWatcher/attribute=order"
        );
        assert!(def.element(NodeKind::ActionGroup, "more").is_some());
        assert!(!def.field("title").unwrap().has_attributes());
    }

    #[test]
    fn test_document_survives_tree_conversion() {
        let models = Models::from_yaml_str(DOC, ModelsMetaInfo::new()).unwrap();
        let document = models.to_document();
        let rebuilt = Models::from_document(document.clone(), ModelsMetaInfo::new()).unwrap();
        assert_eq!(rebuilt, models);
        assert_eq!(document.definitions[1].fields[0].attributes.len(), 1);
    }

    #[test]
    fn test_load_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("models.json");
        std::fs::write(
            &file,
            r#"{"version":1,"definitions":[{"id":"D","actions":[{"id":"lock","attributes":{"label":"Lock"}}]}]}"#,
        )
        .unwrap();
        let models = Models::load(&file, ModelsMetaInfo::new()).unwrap();
        let lock = models.definition("D").unwrap().action("lock").unwrap();
        assert_eq!(lock.attribute("label").unwrap().value(), Some(&json!("Lock")));
    }

    #[test]
    fn test_rejects_ids_that_paths_cannot_address() {
        for (yaml, reason) in [
            ("definitions:\n  - id: D\n    actions:\n      - id: a/b\n", "a/b"),
            ("definitions:\n  - id: ''\n", "definition id ''"),
            ("definitions:\n  - id: D\n    fields:\n      - id: A\n        regionId: R/1\n", "R/1"),
            ("definitions:\n  - id: D\n    headers:\n      - id: h\n        attributes:\n          'x/y': 1\n", "x/y"),
        ] {
            let err = Models::from_yaml_str(yaml, ModelsMetaInfo::new()).unwrap_err();
            assert!(format!("{err:#}").contains(reason), "{err:#}");
        }
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = ModelsDocument::load("/nonexistent/models.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read models file"));
    }
}
