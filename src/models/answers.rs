use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single questionnaire answer: a token, an ordered list of tokens, or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    List(Vec<String>),
    Number(f64),
}

/// Raw questionnaire answers for one seeker, keyed by question id.
///
/// Keys are not pre-declared: the compiler only reads the keys it recognizes
/// and silently ignores everything else, so new questionnaire versions never
/// break a matching run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(HashMap<String, AnswerValue>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: AnswerValue) {
        self.0.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Answer as a string token, or None if absent or of another shape.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(AnswerValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Answer as a list of tokens; absent or non-list answers yield an empty slice.
    pub fn get_list(&self, key: &str) -> &[String] {
        match self.0.get(key) {
            Some(AnswerValue::List(v)) => v.as_slice(),
            _ => &[],
        }
    }

    /// Answer as a number, or None if absent or of another shape.
    pub fn get_num(&self, key: &str) -> Option<f64> {
        match self.0.get(key) {
            Some(AnswerValue::Number(n)) => Some(*n),
            _ => None,
        }
    }
}

impl FromIterator<(String, AnswerValue)> for AnswerSet {
    fn from_iter<T: IntoIterator<Item = (String, AnswerValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_match_value_shape() {
        let mut answers = AnswerSet::new();
        answers.insert("tenure_type", AnswerValue::Text("rental".into()));
        answers.insert(
            "motivation",
            AnswerValue::List(vec!["valeurs".into(), "entraide".into()]),
        );
        answers.insert("budget_max", AnswerValue::Number(500.0));

        assert_eq!(answers.get_str("tenure_type"), Some("rental"));
        assert_eq!(answers.get_list("motivation").len(), 2);
        assert_eq!(answers.get_num("budget_max"), Some(500.0));

        // Wrong-shape lookups are None/empty, never an error
        assert_eq!(answers.get_num("tenure_type"), None);
        assert!(answers.get_list("budget_max").is_empty());
        assert_eq!(answers.get_str("missing"), None);
    }

    #[test]
    fn test_deserializes_mixed_shapes() {
        let json = r#"{
            "budget_max": 500,
            "tenure_type": "rental",
            "dealbreakers": ["too_isolated", "language_barrier"]
        }"#;
        let answers: AnswerSet = serde_json::from_str(json).unwrap();
        assert_eq!(answers.get_num("budget_max"), Some(500.0));
        assert_eq!(answers.get_str("tenure_type"), Some("rental"));
        assert_eq!(answers.get_list("dealbreakers").len(), 2);
    }
}
