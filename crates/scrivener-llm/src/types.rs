use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ContentItem
// ---------------------------------------------------------------------------

/// One item of the ordered content payload sent to the generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    Text {
        text: String,
    },
    InlineImage {
        media_type: String,
        data: Vec<u8>,
    },
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        ContentItem::Text { text: text.into() }
    }

    pub fn inline_image(media_type: impl Into<String>, data: Vec<u8>) -> Self {
        ContentItem::InlineImage {
            media_type: media_type.into(),
            data,
        }
    }
}

// ---------------------------------------------------------------------------
// GenerationRequest
// ---------------------------------------------------------------------------

/// A single blocking round-trip to the text-generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub instructions: String,
    pub content: Vec<ContentItem>,
    pub model: String,
}

impl GenerationRequest {
    /// A request carrying one text content item.
    pub fn text(
        instructions: impl Into<String>,
        text: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            instructions: instructions.into(),
            content: vec![ContentItem::text(text)],
            model: model.into(),
        }
    }

    /// Append a content item, preserving order.
    pub fn push(&mut self, item: ContentItem) {
        self.content.push(item);
    }
}

// ---------------------------------------------------------------------------
// GenerationResponse
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub id: String,
    pub text: String,
    pub model: String,
    pub usage: Usage,
}

// ---------------------------------------------------------------------------
// Usage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
