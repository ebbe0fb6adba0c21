//! Capture Store: output name -> captured values in document order.

use std::collections::BTreeMap;

/// Snapshot of captured values. `None` marks a matched element that lacked
/// the requested attribute.
pub type Captures = BTreeMap<String, Vec<Option<String>>>;

#[derive(Debug, Clone, Default)]
pub struct CaptureStore {
    declared: Vec<String>,
    values: Captures,
}

impl CaptureStore {
    /// `declared` lists every output name the compiled filters can write.
    pub fn new(declared: Vec<String>) -> Self {
        Self {
            declared,
            values: Captures::new(),
        }
    }

    /// Values are only ever appended, never overwritten.
    pub fn append(&mut self, name: &str, value: Option<String>) {
        match self.values.get_mut(name) {
            Some(values) => values.push(value),
            None => {
                self.values.insert(name.to_string(), vec![value]);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&[Option<String>]> {
        self.values.get(name).map(Vec::as_slice)
    }

    /// Independent copy of everything captured so far.
    pub fn get_all(&self) -> Captures {
        self.values.clone()
    }

    /// Declared names that never captured a value, or whose first capture
    /// was a missing attribute.
    pub fn missing(&self) -> Vec<&str> {
        self.declared
            .iter()
            .filter(|name| {
                self.values
                    .get(name.as_str())
                    .and_then(|values| values.first())
                    .is_none_or(Option::is_none)
            })
            .map(String::as_str)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CaptureStore {
        CaptureStore::new(vec!["app".into(), "post_url".into()])
    }

    #[test]
    fn append_keeps_order() {
        let mut store = store();
        store.append("app", Some("v1".into()));
        store.append("app", Some("v2".into()));
        assert_eq!(
            store.get("app"),
            Some(&[Some("v1".to_string()), Some("v2".to_string())][..])
        );
    }

    #[test]
    fn snapshot_is_independent() {
        let mut store = store();
        store.append("app", Some("v1".into()));
        let snapshot = store.get_all();
        store.append("app", Some("v2".into()));
        store.clear();
        assert_eq!(snapshot["app"], vec![Some("v1".to_string())]);
    }

    #[test]
    fn completeness() {
        let mut store = store();
        assert!(!store.is_complete());
        assert_eq!(store.missing(), vec!["app", "post_url"]);

        store.append("app", Some("v1".into()));
        store.append("post_url", None);
        store.append("post_url", Some("/late".into()));
        assert_eq!(store.missing(), vec!["post_url"]);

        store.clear();
        store.append("app", Some("v1".into()));
        store.append("post_url", Some("/action".into()));
        assert!(store.is_complete());
    }

    #[test]
    fn nothing_declared_is_complete() {
        assert!(CaptureStore::new(Vec::new()).is_complete());
    }
}
