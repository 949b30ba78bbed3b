//! Extracted tweet record as stored one-per-line in the harvest files.
//!
//! The line format is `[identifier, [tweetFields, userFields]]`. Only the `urls`
//! and `domains` members of a field set are interpreted; everything else is
//! carried through untouched, in its original key order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RecordError;

/// Which half of the record a URL list lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSet {
    Tweet,
    User,
}

/// One decoded record line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord(pub Value, pub RecordFields);

/// The `[tweetFields, userFields]` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFields(pub Map<String, Value>, pub Value);

/// A single `urls` entry, before or after repair.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum UrlEntry {
    /// Already-repaired records hold plain URL strings.
    Plain(String),
    /// Twitter API URL entity.
    Entity(UrlEntity),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UrlEntity {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub expanded_url: Option<String>,
    #[serde(default)]
    pub display_url: Option<String>,
}

impl UrlEntry {
    /// The URL to resolve: `expanded_url`, then `display_url`, then `url`.
    pub fn raw_url(&self) -> String {
        match self {
            Self::Plain(url) => url.clone(),
            Self::Entity(entity) => entity
                .expanded_url
                .as_ref()
                .or(entity.display_url.as_ref())
                .or(entity.url.as_ref())
                .cloned()
                .unwrap_or_default(),
        }
    }
}

impl ExtractedRecord {
    /// Decodes one line.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Malformed`] for invalid JSON or a line that is not
    /// `[id, [object, value]]`.
    pub fn parse(line: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(line)?)
    }

    pub fn id(&self) -> &Value {
        &self.0
    }

    fn fields(&self, set: FieldSet) -> Option<&Map<String, Value>> {
        match set {
            FieldSet::Tweet => Some(&self.1.0),
            FieldSet::User => self.1.1.as_object(),
        }
    }

    fn fields_mut(&mut self, set: FieldSet) -> Option<&mut Map<String, Value>> {
        match set {
            FieldSet::Tweet => Some(&mut self.1.0),
            FieldSet::User => self.1.1.as_object_mut(),
        }
    }

    /// RawUrls listed in `set`.
    ///
    /// Returns `Ok(None)` when the list is absent, `null` or empty; such records
    /// need no repair.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Shape`] if `urls` is not an array of strings or URL
    /// objects.
    pub fn raw_urls(&self, set: FieldSet) -> Result<Option<Vec<String>>, RecordError> {
        let Some(urls) = self.fields(set).and_then(|f| f.get("urls")) else {
            return Ok(None);
        };

        let entries = match urls {
            Value::Null => return Ok(None),
            Value::Array(entries) if entries.is_empty() => return Ok(None),
            Value::Array(entries) => entries,
            other => {
                return Err(RecordError::Shape(format!(
                    "urls must be a list, got {}",
                    other
                )));
            }
        };

        entries
            .iter()
            .map(|entry| {
                UrlEntry::deserialize(entry)
                    .map(|e| e.raw_url())
                    .map_err(|_| RecordError::Shape(format!("unrecognised urls entry {}", entry)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Replaces `urls` and `domains` in `set`, keeping them positionally aligned.
    pub fn replace_urls(&mut self, set: FieldSet, urls: Vec<String>, domains: Vec<Option<String>>) {
        debug_assert_eq!(urls.len(), domains.len());

        if let Some(fields) = self.fields_mut(set) {
            fields.insert(
                "urls".to_string(),
                Value::Array(urls.into_iter().map(Value::String).collect()),
            );
            fields.insert(
                "domains".to_string(),
                Value::Array(
                    domains
                        .into_iter()
                        .map(|d| d.map_or(Value::Null, Value::String))
                        .collect(),
                ),
            );
        }
    }

    /// Encodes the record back to a single line (no trailing newline).
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TWEET_LINE: &str = r#"["5501", [{"words": ["hi"], "urls": [{"url": "http://t.co/abc", "expanded_url": "http://bit.ly/x", "display_url": "bit.ly/x"}], "domains": ["bit.ly"]}, {"followers": 3, "urls": []}]]"#;

    #[test]
    fn test_parse_record() {
        let record = ExtractedRecord::parse(TWEET_LINE).unwrap();
        assert_eq!(record.id(), &json!("5501"));
    }

    #[test]
    fn test_raw_urls_prefers_expanded_url() {
        let record = ExtractedRecord::parse(TWEET_LINE).unwrap();
        assert_eq!(
            record.raw_urls(FieldSet::Tweet).unwrap(),
            Some(vec!["http://bit.ly/x".to_string()])
        );
    }

    #[test]
    fn test_raw_url_fallback_order() {
        let display: UrlEntry =
            serde_json::from_value(json!({"url": "http://t.co/a", "display_url": "a.com/x"})).unwrap();
        assert_eq!(display.raw_url(), "a.com/x");

        let bare: UrlEntry = serde_json::from_value(json!({"url": "http://t.co/a"})).unwrap();
        assert_eq!(bare.raw_url(), "http://t.co/a");

        let empty: UrlEntry = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.raw_url(), "");
    }

    #[test]
    fn test_raw_urls_plain_strings() {
        let record = ExtractedRecord::parse(
            r#"[1, [{"urls": ["http://example.com/page"], "domains": ["example.com"]}, {}]]"#,
        )
        .unwrap();

        assert_eq!(
            record.raw_urls(FieldSet::Tweet).unwrap(),
            Some(vec!["http://example.com/page".to_string()])
        );
    }

    #[test]
    fn test_raw_urls_absent_null_or_empty() {
        for line in [
            r#"[1, [{"words": []}, {}]]"#,
            r#"[1, [{"urls": null}, {}]]"#,
            r#"[1, [{"urls": []}, {}]]"#,
        ] {
            let record = ExtractedRecord::parse(line).unwrap();
            assert_eq!(record.raw_urls(FieldSet::Tweet).unwrap(), None, "{}", line);
        }
    }

    #[test]
    fn test_raw_urls_user_fields() {
        let record = ExtractedRecord::parse(
            r#"[1, [{}, {"urls": [{"expanded_url": "http://me.example.com"}]}]]"#,
        )
        .unwrap();

        assert_eq!(
            record.raw_urls(FieldSet::User).unwrap(),
            Some(vec!["http://me.example.com".to_string()])
        );
    }

    #[test]
    fn test_raw_urls_user_fields_not_an_object() {
        let record = ExtractedRecord::parse(r#"[1, [{}, null]]"#).unwrap();
        assert_eq!(record.raw_urls(FieldSet::User).unwrap(), None);
    }

    #[test]
    fn test_raw_urls_rejects_non_list() {
        let record = ExtractedRecord::parse(r#"[1, [{"urls": "http://x.com"}, {}]]"#).unwrap();
        assert!(matches!(
            record.raw_urls(FieldSet::Tweet),
            Err(RecordError::Shape(_))
        ));
    }

    #[test]
    fn test_raw_urls_rejects_numeric_entry() {
        let record = ExtractedRecord::parse(r#"[1, [{"urls": [42]}, {}]]"#).unwrap();
        assert!(record.raw_urls(FieldSet::Tweet).is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        assert!(ExtractedRecord::parse(r#"{"urls": []}"#).is_err());
        assert!(ExtractedRecord::parse(r#"[1, ["not an object", {}]]"#).is_err());
        assert!(ExtractedRecord::parse("[1, [{}, {}]").is_err());
    }

    #[test]
    fn test_replace_urls_keeps_other_fields_in_order() {
        let mut record = ExtractedRecord::parse(
            r#"["7", [{"words": ["a"], "urls": [{"url": "http://t.co/abc"}], "domains": [null], "hour": 3}, {"followers": 1}]]"#,
        )
        .unwrap();

        record.replace_urls(
            FieldSet::Tweet,
            vec!["http://example.com/page".to_string()],
            vec![Some("example.com".to_string())],
        );

        assert_eq!(
            record.to_line().unwrap(),
            r#"["7",[{"words":["a"],"urls":["http://example.com/page"],"domains":["example.com"],"hour":3},{"followers":1}]]"#
        );
    }

    #[test]
    fn test_replace_urls_writes_null_domains() {
        let mut record = ExtractedRecord::parse(r#"[1, [{"urls": ["x"]}, {}]]"#).unwrap();

        record.replace_urls(FieldSet::Tweet, vec!["x".to_string()], vec![None]);

        assert_eq!(record.1.0["domains"], json!([null]));
    }
}
