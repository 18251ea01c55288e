use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchPayload {
    pub pdf_file_name: String,
    pub keywords: Vec<String>,
}

/// Body sent to the lookup service, both as the `payload` query parameter and as the
/// POST body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchRequest {
    pub payload: SearchPayload,
}

impl SearchRequest {
    pub fn new(pdf_file_name: &str, raw_query: &str) -> Self {
        Self {
            payload: SearchPayload {
                pdf_file_name: pdf_file_name.to_string(),
                keywords: split_keywords(raw_query),
            },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Splits on commas and trims each token. Empty tokens are kept.
pub fn split_keywords(raw_query: &str) -> Vec<String> {
    raw_query
        .split(',')
        .map(|keyword| keyword.trim().to_string())
        .collect()
}

/// Third element of a result tuple: either a list of nullable values or a single one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Detail {
    List(Vec<Value>),
    Scalar(Value),
}

/// `(identifier, type tag, detail)` as returned by the lookup service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultEntry(pub Value, pub String, pub Detail);

impl ResultEntry {
    pub fn identifier(&self) -> &Value {
        &self.0
    }

    pub fn type_tag(&self) -> &str {
        &self.1
    }

    pub fn detail(&self) -> &Detail {
        &self.2
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultGroup {
    pub key: String,
    pub entries: Option<Vec<ResultEntry>>,
}

impl ResultGroup {
    pub fn has_data(&self) -> bool {
        self.entries
            .as_ref()
            .map(|entries| !entries.is_empty())
            .unwrap_or(false)
    }
}

/// Response of the lookup service. Groups keep the key order of the response object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct SearchResult {
    groups: Vec<ResultGroup>,
}

impl SearchResult {
    pub fn groups(&self) -> &[ResultGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl TryFrom<Map<String, Value>> for SearchResult {
    type Error = serde_json::Error;

    fn try_from(value: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut groups = Vec::with_capacity(value.len());
        for (key, raw) in value {
            let entries = serde_json::from_value::<Option<Vec<ResultEntry>>>(raw)?;
            groups.push(ResultGroup { key, entries });
        }
        Ok(Self { groups })
    }
}

#[cfg(test)]
mod tests {
    use super::{split_keywords, Detail, SearchResult};
    use serde_json::json;

    #[test]
    fn keyword_split_trims_and_keeps_empty_tokens() {
        assert_eq!(
            split_keywords(" pressure , , valve "),
            vec!["pressure".to_string(), String::new(), "valve".to_string()]
        );
    }

    #[test]
    fn detail_prefers_list_for_arrays() {
        let detail: Detail = serde_json::from_value(json!(["a", null])).unwrap();
        assert_eq!(detail, Detail::List(vec![json!("a"), json!(null)]));

        let detail: Detail = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(detail, Detail::Scalar(json!(null)));
    }

    #[test]
    fn result_groups_follow_response_key_order() {
        let result: SearchResult =
            serde_json::from_str(r#"{"Zeta": null, "Alpha": [["1", "value", "x"]]}"#).unwrap();
        let keys: Vec<&str> = result.groups().iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Zeta", "Alpha"]);
        assert!(!result.groups()[0].has_data());
        assert!(result.groups()[1].has_data());
    }

    #[test]
    fn malformed_tuple_is_rejected() {
        let parsed = serde_json::from_str::<SearchResult>(r#"{"Spec": [["1", 5, "x"]]}"#);
        assert!(parsed.is_err());
    }
}
