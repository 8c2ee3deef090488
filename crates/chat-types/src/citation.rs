use serde::{Deserialize, Serialize};

/// What kind of document a citation points into
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Transcript,
    Summary,
    Note,
    Attachment,
    ToolResult,
    #[default]
    #[serde(other)]
    Other,
}

/// Free-form provenance details attached by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CitationMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_name: Option<String>,
}

/// A backend-returned reference supporting an assistant reply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CitationRecord {
    #[serde(default)]
    pub content_type: ContentType,
    /// Relevance in `[0, 1]`; absent for tool results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
    #[serde(default)]
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_name: Option<String>,
    #[serde(default)]
    pub metadata: CitationMetadata,
}

const FALLBACK_TITLE: &str = "Source";

impl CitationRecord {
    pub fn is_tool_result(&self) -> bool {
        self.content_type == ContentType::ToolResult
    }

    /// Display title, resolved in priority order:
    /// meeting name, note title, attachment name, tool label (tool results
    /// only), meeting id, then the literal "Source".
    pub fn title(&self) -> String {
        if let Some(name) = non_blank(&self.meeting_name) {
            return name.to_string();
        }
        if let Some(note) = non_blank(&self.note_title) {
            return format!("Note: {}", note);
        }
        let attachment = non_blank(&self.attachment_name)
            .or_else(|| non_blank(&self.metadata.attachment_name));
        if let Some(attachment) = attachment {
            return format!("Attachment: {}", attachment);
        }
        if self.is_tool_result() {
            if let Some(label) = non_blank(&self.metadata.tool_label) {
                return label.to_string();
            }
        }
        if let Some(id) = non_blank(&self.meeting_id) {
            return format!("Meeting {}", id);
        }
        FALLBACK_TITLE.to_string()
    }

    /// Similarity as a whole percentage, clamped to `[0, 100]`
    pub fn relevance_percent(&self) -> Option<u8> {
        if self.is_tool_result() {
            return None;
        }
        self.similarity
            .filter(|s| s.is_finite())
            .map(|s| (s.clamp(0.0, 1.0) * 100.0).round() as u8)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
