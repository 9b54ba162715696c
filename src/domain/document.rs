use serde::{Deserialize, Serialize};

/// In-memory result of fetching one feed. Lives for a single poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub channel: ParsedChannel,
    pub items: Vec<ParsedItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedChannel {
    pub title: String,
    pub link: String,
    pub description: String,
}

/// One item as published; `pub_date` is the raw string from the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: String,
}

impl ParsedItem {
    pub fn new(title: &str, link: &str) -> Self {
        Self {
            title: title.to_string(),
            link: link.to_string(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_pub_date(mut self, pub_date: &str) -> Self {
        self.pub_date = pub_date.to_string();
        self
    }
}
