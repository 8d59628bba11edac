//! Shapes a stored file's content may take.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Stored file content. The `kind` tag names the variant so readers never
/// have to guess the shape from the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FileContent {
    /// Free-form text such as a note or description.
    Text(String),
    /// Ordered lines: code, comments, bullet points.
    Lines(Vec<String>),
    /// Flat key-value metadata.
    Mapping(BTreeMap<String, String>),
    /// Grouped entries such as functions or classes with their members.
    Entries(Vec<BTreeMap<String, EntryValue>>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryValue {
    Text(String),
    List(Vec<String>),
}

impl Default for FileContent {
    fn default() -> Self {
        FileContent::Lines(Vec::new())
    }
}

impl FileContent {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            FileContent::Text(text) => text.is_empty(),
            FileContent::Lines(lines) => lines.is_empty(),
            FileContent::Mapping(map) => map.is_empty(),
            FileContent::Entries(entries) => entries.is_empty(),
        }
    }
}

/// Request-side content: either the tagged form or a bare list of lines.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ContentPayload {
    Tagged(FileContent),
    Lines(Vec<String>),
}

impl From<ContentPayload> for FileContent {
    fn from(payload: ContentPayload) -> Self {
        match payload {
            ContentPayload::Tagged(content) => content,
            ContentPayload::Lines(lines) => FileContent::Lines(lines),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array_is_lines() {
        let payload: ContentPayload = serde_json::from_value(json!(["fn main() {}", "// end"])).unwrap();
        assert_eq!(
            FileContent::from(payload),
            FileContent::Lines(vec!["fn main() {}".into(), "// end".into()])
        );
    }

    #[test]
    fn test_tagged_mapping() {
        let payload: ContentPayload =
            serde_json::from_value(json!({"kind": "mapping", "value": {"lang": "rust"}})).unwrap();
        let FileContent::Mapping(map) = FileContent::from(payload) else {
            panic!("expected mapping");
        };
        assert_eq!(map.get("lang").map(String::as_str), Some("rust"));
    }

    #[test]
    fn test_entries_mix_text_and_lists() {
        let value = json!({
            "kind": "entries",
            "value": [{"name": "parse", "args": ["input", "branch"]}]
        });
        let content: FileContent = serde_json::from_value(value.clone()).unwrap();
        let FileContent::Entries(entries) = &content else {
            panic!("expected entries");
        };
        assert_eq!(entries[0]["name"], EntryValue::Text("parse".into()));
        assert_eq!(
            entries[0]["args"],
            EntryValue::List(vec!["input".into(), "branch".into()])
        );
        assert_eq!(serde_json::to_value(&content).unwrap(), value);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result = serde_json::from_value::<FileContent>(json!({"kind": "blob", "value": 1}));
        assert!(result.is_err());
    }
}
