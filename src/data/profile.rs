//! Profile-metadata parsing

use serde::Deserialize;

use crate::fetch::ContactRecord;

/// Display fields carried in a metadata record's JSON content.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplayProfile {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub picture: Option<String>,
    pub about: Option<String>,
}

impl DisplayProfile {
    /// Preferred user-facing name: display name, falling back to the
    /// short name.
    pub fn best_name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.name.as_deref().filter(|s| !s.is_empty()))
    }
}

/// Parse the JSON content of a metadata record. Invalid payloads are
/// recovered locally by returning `None`; they never fail the run.
pub fn parse_profile(record: &ContactRecord) -> Option<DisplayProfile> {
    match serde_json::from_str(&record.content) {
        Ok(profile) => Some(profile),
        Err(err) => {
            log::warn!("Skipping malformed profile for {}: {}", record.author, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_display_fields() {
        let record =
            ContactRecord::metadata("a", 0, r#"{"name":"alice","display_name":"Alice"}"#);
        let profile = parse_profile(&record).unwrap();
        assert_eq!(profile.best_name(), Some("Alice"));
    }

    #[test]
    fn falls_back_to_short_name() {
        let record = ContactRecord::metadata("a", 0, r#"{"name":"alice","display_name":""}"#);
        assert_eq!(parse_profile(&record).unwrap().best_name(), Some("alice"));
    }

    #[test]
    fn malformed_content_is_skipped_not_fatal() {
        let record = ContactRecord::metadata("a", 0, "not json");
        assert!(parse_profile(&record).is_none());
    }
}
