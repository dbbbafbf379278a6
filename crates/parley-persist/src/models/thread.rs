use serde::{Deserialize, Serialize};

/// One entry in a user's thread index.
///
/// `id` is opaque and immutable once generated; `title` may be rewritten
/// later by a summarization pass. Field names match the stored JSON
/// (`{"Id": ..., "Title": ...}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatThread {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
}

impl ChatThread {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_field_casing() {
        let thread = ChatThread::new("abc123", "My Thread");
        let json = serde_json::to_string(&thread).unwrap();
        assert_eq!(json, r#"{"Id":"abc123","Title":"My Thread"}"#);
    }
}
