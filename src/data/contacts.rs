//! Contact-list parsing

use crate::fetch::ContactRecord;
use crate::graph::Identity;

/// Tag name marking a person reference in a contact-list record.
const PERSON_TAG: &str = "p";

/// Extract the ordered sequence of followed identities from one record.
///
/// Malformed entries (empty values) are skipped silently; a record with no
/// extractable references yields an empty vec, never an error.
pub fn followed_identities(record: &ContactRecord) -> Vec<Identity> {
    record
        .tags
        .iter()
        .filter(|(name, value)| name == PERSON_TAG && !value.is_empty())
        .map(|(_, value)| value.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::RecordKind;

    fn record(tags: Vec<(&str, &str)>) -> ContactRecord {
        ContactRecord {
            author: "author".into(),
            kind: RecordKind::ContactList,
            created_at: 0,
            tags: tags
                .into_iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            content: String::new(),
        }
    }

    #[test]
    fn extracts_person_tags_in_order() {
        let record = record(vec![("p", "b"), ("e", "ignored"), ("p", "c")]);
        assert_eq!(followed_identities(&record), vec!["b", "c"]);
    }

    #[test]
    fn skips_malformed_entries() {
        let record = record(vec![("p", ""), ("relay", "wss://x"), ("p", "b")]);
        assert_eq!(followed_identities(&record), vec!["b"]);
    }

    #[test]
    fn empty_record_yields_empty_sequence() {
        assert!(followed_identities(&record(vec![])).is_empty());
    }
}
