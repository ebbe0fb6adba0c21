//! The extraction engine: compiled handlers plus per-document state.

use std::sync::Arc;

use super::compile::Program;
use super::driver::{TokenSink, drive};
use super::scope::ScopeTracker;
use super::store::{CaptureStore, Captures};
use super::tree::FilterTree;
use crate::error::Result;
use crate::utils::attr_value;

/// A compiled filter set and the state of the current pass.
///
/// Cloning is cheap: the handler lists are shared, the Scope Tracker and
/// Capture Store are copied. Give each thread its own clone.
#[derive(Debug, Clone)]
pub struct Engine {
    program: Arc<Program>,
    scopes: ScopeTracker,
    store: CaptureStore,
}

impl Engine {
    /// Compile `tree`. Fails with [`crate::Error::RecursiveFilter`] when a
    /// node is reachable from inside its own subtree.
    pub fn compile(tree: &FilterTree) -> Result<Self> {
        Ok(Self::from_program(Arc::new(Program::compile(tree)?)))
    }

    pub fn from_program(program: Arc<Program>) -> Self {
        Self {
            scopes: ScopeTracker::new(program.scope_count()),
            store: CaptureStore::new(program.outputs().to_vec()),
            program,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn on_tag_open(&mut self, name: &str, attrs: &[(String, String)]) {
        for handler in &self.program.open {
            if handler.tag != name {
                continue;
            }

            if self.scopes.gate_open(handler.parent) && handler.matcher.matches(attrs) {
                self.scopes.enter(handler.scope);
                tracing::trace!("<{}> entered {}", name, self.program.label(handler.scope));
                for (attr, output) in &handler.outputs {
                    self.store
                        .append(output, attr_value(attrs, attr).map(str::to_string));
                }
            }
        }
    }

    pub fn on_tag_close(&mut self, name: &str) {
        for handler in &self.program.close {
            if handler.tag == name && self.scopes.leave(handler.scope) {
                tracing::trace!("</{}> left {}", name, self.program.label(handler.scope));
                for text_scope in &handler.latched {
                    self.scopes.leave(*text_scope);
                }
            }
        }
    }

    /// Fails only when a text matcher fails; the pass should then be
    /// abandoned and the engine reset.
    pub fn on_text(&mut self, text: &str) -> Result<()> {
        for handler in &self.program.text {
            if !self.scopes.gate_open(handler.parent) {
                continue;
            }
            if handler.matcher.matches(text)? {
                self.scopes.enter(handler.scope);
                if let Some(output) = &handler.output {
                    self.store.append(output, Some(text.to_string()));
                }
            }
        }
        Ok(())
    }

    /// Clear scopes and captures, keeping the compiled handlers.
    pub fn reset(&mut self) {
        self.scopes.reset();
        self.store.clear();
    }

    pub fn is_complete(&self) -> bool {
        self.store.is_complete()
    }

    /// Declared outputs that make [`Engine::is_complete`] false.
    pub fn missing_outputs(&self) -> Vec<&str> {
        self.store.missing()
    }

    pub fn snapshot(&self) -> Captures {
        self.store.get_all()
    }

    pub fn active_scopes(&self) -> usize {
        self.scopes.active_count()
    }

    /// Stream a whole document through the engine without resetting first.
    pub fn feed(&mut self, html: &str) -> Result<()> {
        drive(html, self)
    }

    /// Reset, stream `html`, and return what was captured.
    pub fn extract(&mut self, html: &str) -> Result<Captures> {
        self.reset();
        self.feed(html)?;
        Ok(self.snapshot())
    }
}

impl TokenSink for Engine {
    fn on_tag_open(&mut self, name: &str, attrs: &[(String, String)]) -> Result<()> {
        Engine::on_tag_open(self, name, attrs);
        Ok(())
    }

    fn on_tag_close(&mut self, name: &str) -> Result<()> {
        Engine::on_tag_close(self, name);
        Ok(())
    }

    fn on_text(&mut self, text: &str) -> Result<()> {
        Engine::on_text(self, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::filter::{AttrMatcher, ElementFilter, TextFilter, TextMatcher};
    use pretty_assertions::assert_eq;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn select_engine() -> Engine {
        let mut tree = FilterTree::new();
        let select = tree.add_root(
            ElementFilter::new("select").matcher(AttrMatcher::subset([("name", "app")])),
        );
        tree.add_child(select, ElementFilter::new("option").output("value", "app"));
        Engine::compile(&tree).unwrap()
    }

    #[test]
    fn child_without_active_parent_never_captures() {
        let mut engine = select_engine();
        engine.on_tag_open("option", &attrs(&[("value", "x")]));
        assert!(engine.snapshot().get("app").is_none());

        engine.on_tag_open("select", &attrs(&[("name", "other")]));
        engine.on_tag_open("option", &attrs(&[("value", "y")]));
        assert!(engine.snapshot().is_empty());
    }

    #[test]
    fn repeated_children_keep_document_order() {
        let mut engine = select_engine();
        engine.on_tag_open("select", &attrs(&[("name", "app")]));
        engine.on_tag_open("option", &attrs(&[("value", "v1")]));
        engine.on_tag_open("option", &attrs(&[("value", "v2")]));
        engine.on_tag_close("select");
        engine.on_tag_open("option", &attrs(&[("value", "v3")]));

        assert_eq!(
            engine.snapshot()["app"],
            vec![Some("v1".to_string()), Some("v2".to_string())]
        );
    }

    #[test]
    fn double_close_is_a_no_op() {
        let mut engine = select_engine();
        engine.on_tag_open("select", &attrs(&[("name", "app")]));
        assert_eq!(engine.active_scopes(), 1);
        engine.on_tag_close("select");
        engine.on_tag_close("select");
        assert_eq!(engine.active_scopes(), 0);

        engine.on_tag_open("option", &attrs(&[("value", "late")]));
        assert!(engine.snapshot().is_empty());
    }

    #[test]
    fn first_matching_close_ends_the_window() {
        let mut tree = FilterTree::new();
        let p = tree.add_root(
            ElementFilter::new("p").matcher(AttrMatcher::subset([("name", "message")])),
        );
        tree.add_child(p, TextFilter::new().output("message"));
        let mut engine = Engine::compile(&tree).unwrap();

        let captures = engine
            .extract(r#"<p name="message">Hi<p>Other</p>after<div>footer</div>"#)
            .unwrap();

        assert_eq!(
            captures["message"],
            vec![Some("Hi".to_string()), Some("Other".to_string())]
        );
        assert_eq!(engine.active_scopes(), 0);
    }

    #[test]
    fn nested_same_tag_close_also_closes_the_outer_window() {
        let mut tree = FilterTree::new();
        let outer = tree.add_root(
            ElementFilter::new("div").matcher(AttrMatcher::subset([("id", "main")])),
        );
        tree.add_child(outer, TextFilter::new().output("text"));
        let mut engine = Engine::compile(&tree).unwrap();

        engine.on_tag_open("div", &attrs(&[("id", "main")]));
        engine.on_tag_open("div", &attrs(&[("class", "inner")]));
        engine.on_text("inner").unwrap();
        engine.on_tag_close("div");
        engine.on_text("tail").unwrap();
        engine.on_tag_close("div");

        assert_eq!(engine.snapshot()["text"], vec![Some("inner".to_string())]);
    }

    #[test]
    fn rematch_while_active_captures_again() {
        let mut engine = select_engine();
        engine.on_tag_open("select", &attrs(&[("name", "app")]));
        engine.on_tag_open("option", &attrs(&[("value", "v1")]));
        engine.on_tag_open("option", &attrs(&[("value", "v2")]));
        engine.on_tag_close("option");
        assert_eq!(engine.active_scopes(), 1);

        engine.on_tag_open("option", &attrs(&[("value", "v3")]));
        assert_eq!(engine.snapshot()["app"].len(), 3);
    }

    #[test]
    fn scope_opening_element_is_not_its_own_descendant() {
        let mut tree = FilterTree::new();
        let outer = tree.add_root(ElementFilter::new("div"));
        tree.add_child(outer, ElementFilter::new("div").output("id", "inner_id"));
        let mut engine = Engine::compile(&tree).unwrap();

        engine.on_tag_open("div", &attrs(&[("id", "outer")]));
        engine.on_tag_open("div", &attrs(&[("id", "inner")]));

        assert_eq!(engine.snapshot()["inner_id"], vec![Some("inner".to_string())]);
    }

    #[test]
    fn missing_attribute_is_captured_as_none() {
        let mut tree = FilterTree::new();
        tree.add_root(
            ElementFilter::new("form")
                .matcher(AttrMatcher::subset([("name", "form1")]))
                .output("action", "post_url"),
        );
        let mut engine = Engine::compile(&tree).unwrap();

        engine.on_tag_open("form", &attrs(&[("name", "form1")]));

        assert_eq!(engine.snapshot()["post_url"], vec![None]);
        assert!(!engine.is_complete());
        assert_eq!(engine.missing_outputs(), vec!["post_url"]);
    }

    #[test]
    fn text_scope_gates_its_children_until_the_element_closes() {
        let mut tree = FilterTree::new();
        let dl = tree.add_root(ElementFilter::new("dl"));
        let label = tree.add_child(
            dl,
            TextFilter::new().matcher(TextMatcher::Equals("Price".into())),
        );
        tree.add_child(label, ElementFilter::new("dd").output("data-value", "price"));
        let mut engine = Engine::compile(&tree).unwrap();

        engine.on_tag_open("dl", &[]);
        engine.on_tag_open("dd", &attrs(&[("data-value", "too early")]));
        engine.on_text("Price").unwrap();
        engine.on_tag_open("dd", &attrs(&[("data-value", "9.99")]));
        engine.on_tag_close("dd");
        engine.on_tag_close("dl");
        engine.on_tag_open("dl", &[]);
        engine.on_tag_open("dd", &attrs(&[("data-value", "other list")]));

        assert_eq!(engine.snapshot()["price"], vec![Some("9.99".to_string())]);
    }

    #[test]
    fn failing_text_matcher_aborts() {
        let mut tree = FilterTree::new();
        tree.add_root(
            TextFilter::new()
                .matcher(TextMatcher::cel("size(text)").unwrap())
                .output("t"),
        );
        let mut engine = Engine::compile(&tree).unwrap();

        assert!(matches!(engine.on_text("abc"), Err(Error::Matcher(_))));
        assert!(matches!(
            engine.extract("<p>abc</p>"),
            Err(Error::Matcher(_))
        ));
    }

    #[test]
    fn reset_drops_captures_and_scopes() {
        let mut engine = select_engine();
        engine.on_tag_open("select", &attrs(&[("name", "app")]));
        engine.on_tag_open("option", &attrs(&[("value", "v1")]));

        engine.reset();
        assert_eq!(engine.active_scopes(), 0);
        assert!(engine.snapshot().is_empty());

        engine.on_tag_open("option", &attrs(&[("value", "v2")]));
        assert!(engine.snapshot().is_empty());
    }

    #[test]
    fn clones_share_handlers_but_not_state() {
        let mut first = select_engine();
        let mut second = first.clone();
        first.on_tag_open("select", &attrs(&[("name", "app")]));
        first.on_tag_open("option", &attrs(&[("value", "v1")]));
        second.on_tag_open("option", &attrs(&[("value", "v2")]));

        assert!(Arc::ptr_eq(&first.program, &second.program));
        assert_eq!(first.snapshot()["app"].len(), 1);
        assert!(second.snapshot().is_empty());
    }
}
