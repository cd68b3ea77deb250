//! Typed read-merge-write of JSON workspace descriptors
//!
//! `nx.json` and `workspace.json` are deserialized into typed documents whose
//! unknown keys ride along in a flattened map. Rendering keeps the original
//! top-level key order and appends new keys at the end.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::PluginDescriptor;

/// One entry of the `plugins` array in `nx.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginEntry {
    /// `"@nx/eslint/plugin"`
    Name(String),
    /// `{ "plugin": "@nx/jest/plugin", "options": {...}, ... }`
    Descriptor {
        plugin: String,
        #[serde(flatten)]
        rest: Map<String, Value>,
    },
    /// Anything else is carried through untouched
    Other(Value),
}

impl PluginEntry {
    /// Identity key used for de-duplication
    pub fn name(&self) -> Option<&str> {
        match self {
            PluginEntry::Name(name) => Some(name),
            PluginEntry::Descriptor { plugin, .. } => Some(plugin),
            PluginEntry::Other(_) => None,
        }
    }
}

impl From<&PluginDescriptor> for PluginEntry {
    fn from(descriptor: &PluginDescriptor) -> Self {
        match &descriptor.options {
            None => PluginEntry::Name(descriptor.plugin.clone()),
            Some(options) => {
                let mut rest = Map::new();
                rest.insert("options".to_string(), options.clone());
                PluginEntry::Descriptor {
                    plugin: descriptor.plugin.clone(),
                    rest,
                }
            }
        }
    }
}

/// Root Nx configuration (`nx.json`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NxConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<PluginEntry>>,

    #[serde(rename = "targetDefaults", default, skip_serializing_if = "Option::is_none")]
    pub target_defaults: Option<Map<String, Value>>,

    #[serde(rename = "namedInputs", default, skip_serializing_if = "Option::is_none")]
    pub named_inputs: Option<Map<String, Value>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NxConfig {
    /// Create missing sections and append required plugins not yet listed
    ///
    /// Returns the names of the plugins that were added. Existing entries are
    /// never modified, even when their options differ from the required ones.
    pub fn merge_required(&mut self, required: &[PluginDescriptor]) -> Vec<String> {
        self.target_defaults.get_or_insert_with(Map::new);
        self.named_inputs.get_or_insert_with(Map::new);
        let plugins = self.plugins.get_or_insert_with(Vec::new);

        let mut added = Vec::new();
        for descriptor in required {
            let present = plugins
                .iter()
                .any(|entry| entry.name() == Some(descriptor.plugin.as_str()));
            if !present {
                plugins.push(PluginEntry::from(descriptor));
                added.push(descriptor.plugin.clone());
            }
        }

        added
    }
}

/// Workspace descriptor (`workspace.json`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Map<String, Value>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkspaceDescriptor {
    pub fn ensure_defaults(&mut self) {
        self.version.get_or_insert(Value::from(2));
        self.projects.get_or_insert_with(Map::new);
    }
}

/// A parsed JSON document plus its original top-level key order
///
/// Known sections whose value has an unexpected shape are kept aside
/// verbatim and written back unchanged, so a surprising `nx.json` never
/// loses content.
#[derive(Debug, Clone)]
pub struct JsonDocument<T> {
    pub value: T,
    key_order: Vec<String>,
    kept: Map<String, Value>,
}

impl<T> JsonDocument<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Default,
{
    /// Parse `text`; `None` only when it is not a JSON object at all
    pub fn parse(text: &str) -> Option<Self> {
        let mut map: Map<String, Value> = serde_json::from_str(text).ok()?;
        let key_order: Vec<String> = map.keys().cloned().collect();

        let mut kept = Map::new();
        for key in &key_order {
            let fits = map.get(key).is_some_and(|value| section_fits::<T>(key, value));
            if !fits && let Some(value) = map.shift_remove(key) {
                tracing::warn!("'{key}' has an unexpected shape; leaving it untouched");
                kept.insert(key.clone(), value);
            }
        }

        let value = serde_json::from_value(Value::Object(map)).ok()?;
        Some(Self { value, key_order, kept })
    }

    /// Parse, or start from defaults when the text is absent or not a JSON object
    pub fn parse_or_default(text: Option<&str>, label: &str) -> Self {
        match text {
            Some(text) => Self::parse(text).unwrap_or_else(|| {
                tracing::warn!("{label} is not a JSON object; starting fresh");
                Self::fresh()
            }),
            None => Self::fresh(),
        }
    }

    pub fn fresh() -> Self {
        Self {
            value: T::default(),
            key_order: Vec::new(),
            kept: Map::new(),
        }
    }

    /// Whether `key` was left as found because its shape was unexpected
    pub fn kept_as_is(&self, key: &str) -> bool {
        self.kept.contains_key(key)
    }

    /// Pretty-print with two-space indentation and a trailing newline
    pub fn render(&self) -> Result<String> {
        let rendered = match serde_json::to_value(&self.value)? {
            Value::Object(mut map) => {
                for (key, value) in &self.kept {
                    map.insert(key.clone(), value.clone());
                }
                Value::Object(reorder(map, &self.key_order))
            }
            other => other,
        };

        let mut text = serde_json::to_string_pretty(&rendered)?;
        text.push('\n');
        Ok(text)
    }
}

/// Whether `key: value` alone deserializes into `T`
fn section_fits<T>(key: &str, value: &Value) -> bool
where
    T: for<'de> Deserialize<'de>,
{
    let mut single = Map::new();
    single.insert(key.to_string(), value.clone());
    serde_json::from_value::<T>(Value::Object(single)).is_ok()
}

fn reorder(mut map: Map<String, Value>, key_order: &[String]) -> Map<String, Value> {
    let mut ordered = Map::new();
    for key in key_order {
        if let Some(value) = map.shift_remove(key) {
            ordered.insert(key.clone(), value);
        }
    }
    // New keys keep their serialization order
    ordered.extend(map);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn required() -> Vec<PluginDescriptor> {
        vec![
            PluginDescriptor {
                plugin: "@nx/js/typescript".to_string(),
                options: Some(json!({ "typecheck": { "targetName": "typecheck" } })),
            },
            PluginDescriptor {
                plugin: "@nxlv/python".to_string(),
                options: None,
            },
        ]
    }

    #[test]
    fn test_fresh_config_gets_sections_and_plugins() {
        let mut doc = JsonDocument::<NxConfig>::fresh();
        let added = doc.value.merge_required(&required());
        assert_eq!(added, vec!["@nx/js/typescript", "@nxlv/python"]);

        let rendered: Value = serde_json::from_str(&doc.render().unwrap()).unwrap();
        assert_eq!(
            rendered,
            json!({
                "plugins": [
                    { "plugin": "@nx/js/typescript", "options": { "typecheck": { "targetName": "typecheck" } } },
                    "@nxlv/python"
                ],
                "targetDefaults": {},
                "namedInputs": {}
            })
        );
    }

    #[test]
    fn test_existing_plugin_with_other_options_is_kept() {
        let text = r#"{
  "plugins": [
    { "plugin": "@nx/js/typescript", "options": { "build": false } },
    { "plugin": "@acme/custom", "include": ["libs/**"] },
    "@nx/eslint/plugin"
  ]
}"#;
        let mut doc = JsonDocument::<NxConfig>::parse(text).unwrap();
        let added = doc.value.merge_required(&required());
        assert_eq!(added, vec!["@nxlv/python"]);

        let plugins = doc.value.plugins.as_ref().unwrap();
        assert_eq!(plugins.len(), 4);
        assert_eq!(
            serde_json::to_value(&plugins[0]).unwrap(),
            json!({ "plugin": "@nx/js/typescript", "options": { "build": false } })
        );
        assert_eq!(
            serde_json::to_value(&plugins[1]).unwrap(),
            json!({ "plugin": "@acme/custom", "include": ["libs/**"] })
        );
    }

    #[test]
    fn test_unknown_plugin_shapes_survive() {
        let mut doc = JsonDocument::<NxConfig>::parse(r#"{ "plugins": [42] }"#).unwrap();
        doc.value.merge_required(&required());
        let plugins = doc.value.plugins.as_ref().unwrap();
        assert_eq!(plugins[0], PluginEntry::Other(json!(42)));
    }

    #[test]
    fn test_render_keeps_original_key_order() {
        let text = r#"{ "$schema": "./node_modules/nx/schemas/nx-schema.json", "namedInputs": {}, "defaultBase": "main" }"#;
        let mut doc = JsonDocument::<NxConfig>::parse(text).unwrap();
        doc.value.merge_required(&[]);

        let rendered = doc.render().unwrap();
        let keys: Vec<String> = serde_json::from_str::<Map<String, Value>>(&rendered)
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(
            keys,
            vec!["$schema", "namedInputs", "defaultBase", "plugins", "targetDefaults"]
        );
    }

    #[test]
    fn test_malformed_json_starts_fresh() {
        let doc = JsonDocument::<NxConfig>::parse_or_default(Some("{ \"plugins\": [ "), "nx.json");
        assert!(doc.value.plugins.is_none());
        assert!(doc.value.extra.is_empty());

        // A JSON array is valid JSON but not a config object
        assert!(JsonDocument::<NxConfig>::parse("[]").is_none());
    }

    #[test]
    fn test_wrong_typed_section_keeps_the_rest() {
        let text = r#"{"defaultBase":"main","targetDefaults":[],"namedInputs":{"prod":["default"]},"plugins":["@acme/x"]}"#;
        let mut doc = JsonDocument::<NxConfig>::parse(text).unwrap();
        assert!(doc.kept_as_is("targetDefaults"));
        doc.value.merge_required(&required());

        let rendered: Value = serde_json::from_str(&doc.render().unwrap()).unwrap();
        assert_eq!(rendered["defaultBase"], json!("main"));
        assert_eq!(rendered["targetDefaults"], json!([]));
        assert_eq!(rendered["namedInputs"], json!({ "prod": ["default"] }));
        assert_eq!(rendered["plugins"][0], json!("@acme/x"));
        assert_eq!(rendered["plugins"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_wrong_typed_projects_are_not_replaced() {
        let text = r#"{"version":1,"projects":["apps/api"],"cli":{"defaultCollection":"@nx/react"}}"#;
        let mut doc = JsonDocument::<WorkspaceDescriptor>::parse(text).unwrap();
        doc.value.ensure_defaults();

        let rendered: Value = serde_json::from_str(&doc.render().unwrap()).unwrap();
        assert_eq!(
            rendered,
            json!({ "version": 1, "projects": ["apps/api"], "cli": { "defaultCollection": "@nx/react" } })
        );
    }

    #[test]
    fn test_workspace_descriptor_defaults_preserve_projects() {
        let text = r#"{ "projects": { "api": "apps/api" }, "cli": { "packageManager": "pnpm" } }"#;
        let mut doc = JsonDocument::<WorkspaceDescriptor>::parse(text).unwrap();
        doc.value.ensure_defaults();

        let rendered: Value = serde_json::from_str(&doc.render().unwrap()).unwrap();
        assert_eq!(
            rendered,
            json!({ "projects": { "api": "apps/api" }, "cli": { "packageManager": "pnpm" }, "version": 2 })
        );
    }
}
