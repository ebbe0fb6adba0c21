use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stderr progress line shared by parallel workers.
pub struct ProgressCounter {
    label: &'static str,
    total: u64,
    interval: u64,
    count: AtomicU64,
}

impl ProgressCounter {
    pub fn new(label: &'static str, total: u64, interval: u64) -> Self {
        let counter = Self {
            label,
            total,
            interval: interval.max(1),
            count: AtomicU64::new(0),
        };
        counter.print(0);
        counter
    }

    pub fn inc(&self, delta: u64) {
        let prev = self.count.fetch_add(delta, Ordering::SeqCst);
        let current = prev + delta;
        // Print if we crossed an interval boundary
        if prev / self.interval < current / self.interval {
            self.print(current);
        }
    }

    pub fn finish(&self) {
        self.print(self.count.load(Ordering::SeqCst));
        eprintln!();
    }

    fn print(&self, current: u64) {
        eprint!("\r{}: {}/{}", self.label, current, self.total);
        let _ = std::io::stderr().flush();
    }
}

/// Glob match with any number of `*` wildcards.
pub fn glob_match(pattern: &str, value: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    let (Some(prefix), Some(suffix)) = (parts.first(), parts.last()) else {
        return pattern == value;
    };
    if parts.len() == 1 {
        return pattern == value;
    }

    if !value.starts_with(prefix) || value.len() < prefix.len() + suffix.len() {
        return false;
    }
    if !value.ends_with(suffix) {
        return false;
    }

    let mut remaining = &value[prefix.len()..value.len() - suffix.len()];
    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        match remaining.find(part) {
            Some(idx) => remaining = &remaining[idx + part.len()..],
            None => return false,
        }
    }

    true
}

/// Value of the first attribute called `name`.
pub fn attr_value<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_match_supports_star_suffix() {
        assert!(glob_match("*_link", "nav_link"));
        assert!(!glob_match("*_link", "nav"));
    }

    #[test]
    fn glob_match_supports_inner_stars() {
        assert!(glob_match("btn*primary*", "btn btn-primary large"));
        assert!(glob_match("*btn*", "btn"));
        assert!(!glob_match("a*b*c", "acb"));
        assert!(!glob_match("ab*ba", "aba"));
    }

    #[test]
    fn attr_value_returns_first_occurrence() {
        let attrs = vec![
            ("name".to_string(), "a".to_string()),
            ("name".to_string(), "b".to_string()),
        ];
        assert_eq!(attr_value(&attrs, "name"), Some("a"));
        assert_eq!(attr_value(&attrs, "value"), None);
    }
}
