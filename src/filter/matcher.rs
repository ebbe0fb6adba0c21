//! Predicates deciding whether a start tag or a text chunk satisfies a filter.

use std::fmt;
use std::sync::Arc;

use crate::dsl::{AttrExpr, evaluate_attrs, parse_attr_expr};
use crate::error::Result;
use crate::expr::{CelContext, CelProgram, compile_cel, evaluate_cel};

pub type AttrPredicate = Arc<dyn Fn(&[(String, String)]) -> bool + Send + Sync>;
pub type TextPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Condition on a start tag's attribute list.
#[derive(Clone, Default)]
pub enum AttrMatcher {
    #[default]
    Any,
    /// Every `(name, value)` pair must be present. Order and extra
    /// attributes do not matter.
    Subset(Vec<(String, String)>),
    /// Attribute DSL expression, see [`crate::dsl`].
    Expr(AttrExpr),
    Predicate(AttrPredicate),
}

impl AttrMatcher {
    pub fn subset<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        AttrMatcher::Subset(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn parse(expr: &str) -> std::result::Result<Self, String> {
        Ok(AttrMatcher::Expr(parse_attr_expr(expr)?))
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&[(String, String)]) -> bool + Send + Sync + 'static,
    {
        AttrMatcher::Predicate(Arc::new(f))
    }

    pub fn matches(&self, attrs: &[(String, String)]) -> bool {
        match self {
            AttrMatcher::Any => true,
            AttrMatcher::Subset(required) => required
                .iter()
                .all(|(name, value)| attrs.iter().any(|(k, v)| k == name && v == value)),
            AttrMatcher::Expr(ast) => evaluate_attrs(ast, attrs),
            AttrMatcher::Predicate(f) => f(attrs),
        }
    }
}

impl fmt::Debug for AttrMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrMatcher::Any => write!(f, "Any"),
            AttrMatcher::Subset(pairs) => f.debug_tuple("Subset").field(pairs).finish(),
            AttrMatcher::Expr(ast) => f.debug_tuple("Expr").field(ast).finish(),
            AttrMatcher::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

/// Condition on a text chunk.
#[derive(Clone, Default)]
pub enum TextMatcher {
    #[default]
    Any,
    Equals(String),
    Contains(String),
    /// CEL expression over the variable `text`.
    Cel(CelProgram),
    Predicate(TextPredicate),
}

impl TextMatcher {
    pub fn cel(source: &str) -> std::result::Result<Self, String> {
        Ok(TextMatcher::Cel(compile_cel(source)?))
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        TextMatcher::Predicate(Arc::new(f))
    }

    /// Only CEL evaluation can fail.
    pub fn matches(&self, text: &str) -> Result<bool> {
        Ok(match self {
            TextMatcher::Any => true,
            TextMatcher::Equals(expected) => text == expected,
            TextMatcher::Contains(needle) => text.contains(needle.as_str()),
            TextMatcher::Cel(program) => evaluate_cel(program, &CelContext { text })?,
            TextMatcher::Predicate(f) => f(text),
        })
    }
}

impl fmt::Debug for TextMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextMatcher::Any => write!(f, "Any"),
            TextMatcher::Equals(s) => f.debug_tuple("Equals").field(s).finish(),
            TextMatcher::Contains(s) => f.debug_tuple("Contains").field(s).finish(),
            TextMatcher::Cel(program) => f.debug_tuple("Cel").field(&program.source()).finish(),
            TextMatcher::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn subset_ignores_order_and_extras() {
        let matcher = AttrMatcher::subset([("name", "task"), ("type", "hidden")]);
        assert!(matcher.matches(&attrs(&[
            ("type", "hidden"),
            ("value", "uid"),
            ("name", "task"),
        ])));
        assert!(!matcher.matches(&attrs(&[("name", "task")])));
        assert!(!matcher.matches(&attrs(&[("name", "Task"), ("type", "hidden")])));
    }

    #[test]
    fn empty_subset_and_any_always_match() {
        assert!(AttrMatcher::subset(Vec::<(String, String)>::new()).matches(&[]));
        assert!(AttrMatcher::Any.matches(&attrs(&[("x", "y")])));
    }

    #[test]
    fn parsed_expression() {
        let matcher = AttrMatcher::parse("name=app & !disabled").unwrap();
        assert!(matcher.matches(&attrs(&[("name", "app")])));
        assert!(!matcher.matches(&attrs(&[("name", "app"), ("disabled", "")])));
        assert!(AttrMatcher::parse("name=(").is_err());
    }

    #[test]
    fn attr_predicate() {
        let matcher = AttrMatcher::predicate(|attrs| attrs.len() == 2);
        assert!(matcher.matches(&attrs(&[("a", "1"), ("b", "2")])));
        assert!(!matcher.matches(&attrs(&[("a", "1")])));
    }

    #[test]
    fn text_matchers() {
        assert!(TextMatcher::Any.matches("").unwrap());
        assert!(TextMatcher::Equals("abc".into()).matches("abc").unwrap());
        assert!(!TextMatcher::Equals("abc".into()).matches("abcd").unwrap());
        assert!(TextMatcher::Contains("Opt".into()).matches("Options").unwrap());
        assert!(
            TextMatcher::cel("text.endsWith('s')")
                .unwrap()
                .matches("Options")
                .unwrap()
        );
        assert!(
            TextMatcher::predicate(|t| t.trim().is_empty())
                .matches("  \n")
                .unwrap()
        );
    }
}
