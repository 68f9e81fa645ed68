/*
[INPUT]:  Strategy names and raw JSON dispatch responses
[OUTPUT]: Extracted values to carry into later steps
[POS]:    Extraction layer - named response-probing strategies
[UPDATE]: When the bridge grows responses worth remembering across steps
*/

use serde_json::Value;
use std::collections::HashMap;

/// Pulls a value out of a dispatch response. `None` means the target was
/// missing or empty, which fails the step.
pub type Extractor = fn(&Value) -> Option<Value>;

/// Registry mapping strategy names to extraction functions.
///
/// Adding a strategy is a registration, not an edit to the runner's step
/// classification.
#[derive(Debug, Clone)]
pub struct ExtractorRegistry {
    strategies: HashMap<String, Extractor>,
}

impl ExtractorRegistry {
    /// Empty registry with no strategies
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, extractor: Extractor) {
        self.strategies.insert(name.into(), extractor);
    }

    pub fn get(&self, name: &str) -> Option<Extractor> {
        self.strategies.get(name).copied()
    }
}

impl Default for ExtractorRegistry {
    /// Registry pre-loaded with the bridge's well-known strategies
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("course_id", extract_course_id);
        registry.register("user_id", extract_user_id);
        registry
    }
}

/// `courses[1].id` — the verification course list must hold at least two
/// entries; the second one is the probe course created for the check.
fn extract_course_id(response: &Value) -> Option<Value> {
    non_null(response.get("courses")?.as_array()?.get(1)?.get("id")?)
}

/// `data.users[0].id`
fn extract_user_id(response: &Value) -> Option<Value> {
    non_null(response.get("data")?.get("users")?.as_array()?.first()?.get("id")?)
}

fn non_null(value: &Value) -> Option<Value> {
    if value.is_null() {
        None
    } else {
        Some(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_course_id_pulls_second_course() {
        let registry = ExtractorRegistry::default();
        let extractor = registry.get("course_id").unwrap();

        let response = json!({"courses": [{"id": 1}, {"id": 42}]});
        assert_eq!(extractor(&response), Some(json!(42)));
    }

    #[test]
    fn test_course_id_fails_on_single_course() {
        let registry = ExtractorRegistry::default();
        let extractor = registry.get("course_id").unwrap();

        let response = json!({"courses": [{"id": 1}]});
        assert_eq!(extractor(&response), None);
    }

    #[test]
    fn test_user_id_pulls_first_user() {
        let registry = ExtractorRegistry::default();
        let extractor = registry.get("user_id").unwrap();

        let response = json!({"data": {"users": [{"id": 7}, {"id": 9}]}});
        assert_eq!(extractor(&response), Some(json!(7)));
    }

    #[test]
    fn test_user_id_fails_on_empty_list() {
        let registry = ExtractorRegistry::default();
        let extractor = registry.get("user_id").unwrap();

        let response = json!({"data": {"users": []}});
        assert_eq!(extractor(&response), None);
    }

    #[test]
    fn test_null_target_is_missing() {
        let registry = ExtractorRegistry::default();
        let extractor = registry.get("user_id").unwrap();

        let response = json!({"data": {"users": [{"id": null}]}});
        assert_eq!(extractor(&response), None);
    }

    #[test]
    fn test_custom_registration() {
        fn extract_store_id(response: &Value) -> Option<Value> {
            response.get("store_id").cloned().filter(|v| !v.is_null())
        }

        let mut registry = ExtractorRegistry::empty();
        registry.register("store_id", extract_store_id);

        let response = json!({"store_id": "st-9"});
        let extractor = registry.get("store_id").unwrap();
        assert_eq!(extractor(&response), Some(json!("st-9")));
        assert!(registry.get("course_id").is_none());
    }
}
