use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineNode {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub anchor_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        alias = "parts",
        alias = "items",
        alias = "subItems"
    )]
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    #[cfg(test)]
    pub fn new(name: &str, anchor_id: Option<&str>, children: Vec<OutlineNode>) -> Self {
        Self {
            name: name.to_string(),
            anchor_id: anchor_id.map(ToOwned::to_owned),
            children,
        }
    }

    pub fn anchor(&self) -> Option<&str> {
        self.anchor_id
            .as_deref()
            .map(|value| value.trim().trim_start_matches('#').trim())
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TableOfContents {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        alias = "sections",
        alias = "children"
    )]
    pub parts: Vec<OutlineNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    pub inline_markdown: String,
}

impl ContentBlock {
    pub fn new(inline_markdown: String) -> Self {
        Self { inline_markdown }
    }

    pub fn is_empty(&self) -> bool {
        self.to_markdown().is_empty()
    }

    pub fn to_markdown(&self) -> &str {
        self.inline_markdown.trim()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_id: Option<String>,
    pub content: ContentBlock,
    pub children: Vec<AnnotatedNode>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SplitCounts {
    pub outline_nodes: usize,
    pub anchored_nodes: usize,
    pub resolved_anchors: usize,
    pub missing_anchors: usize,
    pub nodes_with_content: usize,
    pub max_depth: usize,
    pub document_nodes: usize,
    pub document_anchors: usize,
    pub html_parse_errors: usize,
    pub markdown_bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitInputs {
    pub html_path: String,
    pub html_sha256: String,
    pub outline_path: String,
    pub outline_sha256: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitOutputs {
    pub markdown_path: String,
    pub tree_json_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub completed_at: String,
    pub inputs: SplitInputs,
    pub outputs: SplitOutputs,
    pub counts: SplitCounts,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorStatus {
    Absent,
    Unresolved,
    Resolved,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnchorAuditEntry {
    pub path: String,
    pub depth: usize,
    pub anchor_id: Option<String>,
    pub status: AnchorStatus,
    pub document_position: Option<usize>,
    pub precedes_parent: bool,
    pub precedes_previous_sibling: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnchorAuditSummary {
    pub outline_nodes: usize,
    pub absent_count: usize,
    pub unresolved_count: usize,
    pub resolved_count: usize,
    pub out_of_order_count: usize,
    pub duplicate_anchor_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnchorAuditReport {
    pub report_version: u32,
    pub generated_at: String,
    pub html_path: String,
    pub outline_path: String,
    pub summary: AnchorAuditSummary,
    pub entries: Vec<AnchorAuditEntry>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
