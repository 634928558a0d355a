//! Turning a completion response into something printable.

use crate::types::{CompletionResponse, ContentPart, OutputItem, ResponsePayload};

/// Shown when a response carries no text at all.
pub const NO_TEXT_PLACEHOLDER: &str = "(no text output)";

/// Text to display for `response`.
///
/// Flat text wins when non-empty, then the concatenated `output_text` items
/// (including the ones nested in `message` items), then the placeholder.
pub fn display_text(response: &CompletionResponse) -> String {
    let text = match &response.payload {
        ResponsePayload::FlatText(text) => text.clone(),
        ResponsePayload::Items(items) => collect_output_text(items),
    };
    if text.is_empty() {
        NO_TEXT_PLACEHOLDER.to_string()
    } else {
        text
    }
}

fn collect_output_text(items: &[OutputItem]) -> String {
    let mut out = String::new();
    for item in items {
        match item {
            OutputItem::OutputText { text } => out.push_str(text),
            OutputItem::Message { content } => {
                for part in content {
                    if let ContentPart::OutputText { text } = part {
                        out.push_str(text);
                    }
                }
            }
            OutputItem::McpCall { .. } | OutputItem::McpListTools { .. } | OutputItem::Other => {}
        }
    }
    out
}

/// One remote tool interaction reported in a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolActivity {
    Listed { server_label: String, tools: usize },
    Called { server_label: String, name: String, failed: bool },
}

pub fn tool_activity(response: &CompletionResponse) -> Vec<ToolActivity> {
    let ResponsePayload::Items(items) = &response.payload else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            OutputItem::McpListTools {
                server_label,
                tools,
            } => Some(ToolActivity::Listed {
                server_label: server_label.clone(),
                tools: tools.len(),
            }),
            OutputItem::McpCall {
                server_label,
                name,
                error,
                ..
            } => Some(ToolActivity::Called {
                server_label: server_label.clone(),
                name: name.clone(),
                failed: error.as_ref().is_some_and(|e| !e.is_null()),
            }),
            _ => None,
        })
        .collect()
}
