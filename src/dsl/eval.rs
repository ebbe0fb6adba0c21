//! Evaluator for the attribute DSL AST.

use super::ast::{AttrExpr, AttrValue, CompareOp};
use crate::utils::{attr_value, glob_match};

/// Evaluate an attribute expression against a start tag's attribute list.
pub fn evaluate_attrs(ast: &AttrExpr, attrs: &[(String, String)]) -> bool {
    match ast {
        AttrExpr::True => true,

        AttrExpr::Exists { name, negated } => {
            let exists = attr_value(attrs, name).is_some();
            if *negated { !exists } else { exists }
        }

        AttrExpr::Match { name, values } => match attr_value(attrs, name) {
            None => false,
            Some(actual) => values.iter().any(|v| match_value(v, actual)),
        },

        AttrExpr::NumericCompare { name, op, value } => attr_value(attrs, name)
            .and_then(parse_numeric)
            .is_some_and(|actual| compare(*op, actual, *value)),

        AttrExpr::And(exprs) => exprs.iter().all(|e| evaluate_attrs(e, attrs)),

        AttrExpr::Or(exprs) => exprs.iter().any(|e| evaluate_attrs(e, attrs)),

        AttrExpr::Not(inner) => !evaluate_attrs(inner, attrs),
    }
}

fn match_value(pattern: &AttrValue, actual: &str) -> bool {
    match pattern {
        AttrValue::Any => true,
        AttrValue::Exact(expected) => actual == expected,
        AttrValue::Glob(pattern) => glob_match(pattern, actual),
    }
}

/// Parse a numeric attribute value.
/// Accepts a leading number followed by a unit, e.g. "50px" -> 50.
fn parse_numeric(s: &str) -> Option<f64> {
    let s = s.trim();
    if let Ok(n) = s.parse::<f64>() {
        return Some(n);
    }

    let numeric_part: String = s
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    numeric_part.parse::<f64>().ok()
}

fn compare(op: CompareOp, left: f64, right: f64) -> bool {
    match op {
        CompareOp::Eq => (left - right).abs() < f64::EPSILON,
        CompareOp::Ne => (left - right).abs() >= f64::EPSILON,
        CompareOp::Lt => left < right,
        CompareOp::Le => left <= right,
        CompareOp::Gt => left > right,
        CompareOp::Ge => left >= right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::parse_attr_expr;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_existence() {
        let ast = parse_attr_expr("action").unwrap();
        assert!(evaluate_attrs(&ast, &attrs(&[("action", "/post")])));
        assert!(!evaluate_attrs(&ast, &attrs(&[("name", "form1")])));
    }

    #[test]
    fn test_negated_existence() {
        let ast = parse_attr_expr("!disabled").unwrap();
        assert!(!evaluate_attrs(&ast, &attrs(&[("disabled", "")])));
        assert!(evaluate_attrs(&ast, &attrs(&[("name", "app")])));
    }

    #[test]
    fn test_exact_match_ignores_other_attributes() {
        let ast = parse_attr_expr("name=task").unwrap();
        assert!(evaluate_attrs(
            &ast,
            &attrs(&[("type", "hidden"), ("name", "task"), ("value", "uid")])
        ));
        assert!(!evaluate_attrs(&ast, &attrs(&[("name", "submit")])));
    }

    #[test]
    fn test_first_duplicate_wins() {
        let ast = parse_attr_expr("name=a").unwrap();
        assert!(evaluate_attrs(&ast, &attrs(&[("name", "a"), ("name", "b")])));
        assert!(!evaluate_attrs(&ast, &attrs(&[("name", "b"), ("name", "a")])));
    }

    #[test]
    fn test_numeric_with_units() {
        let ast = parse_attr_expr("width>=50").unwrap();
        assert!(evaluate_attrs(&ast, &attrs(&[("width", "50px")])));
        assert!(evaluate_attrs(&ast, &attrs(&[("width", "60")])));
        assert!(!evaluate_attrs(&ast, &attrs(&[("width", "30")])));
        assert!(!evaluate_attrs(&ast, &attrs(&[("width", "auto")])));
    }

    #[test]
    fn test_and_or_not() {
        let ast = parse_attr_expr("type=hidden & !(name=submit | name=cancel)").unwrap();
        assert!(evaluate_attrs(
            &ast,
            &attrs(&[("type", "hidden"), ("name", "task")])
        ));
        assert!(!evaluate_attrs(
            &ast,
            &attrs(&[("type", "hidden"), ("name", "cancel")])
        ));
        assert!(!evaluate_attrs(&ast, &attrs(&[("name", "task")])));
    }

    #[test]
    fn test_glob() {
        let ast = parse_attr_expr("class=*btn*").unwrap();
        assert!(evaluate_attrs(&ast, &attrs(&[("class", "big btn-primary")])));
        assert!(!evaluate_attrs(&ast, &attrs(&[("class", "link")])));
    }
}
