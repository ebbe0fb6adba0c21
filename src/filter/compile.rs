//! Filter Compiler: turns a [`FilterTree`] into flat handler lists.
//!
//! Every node gets its own [`ScopeId`]. Children are compiled before their
//! parent's handlers are registered, so on a single event a child handler
//! always runs before the handler that could open its parent scope; the
//! element opening a scope is never counted as its own descendant.

use std::collections::{HashMap, HashSet};

use super::matcher::{AttrMatcher, TextMatcher};
use super::scope::ScopeId;
use super::tree::{FilterNode, FilterTree, NodeId};
use crate::error::{Error, Result};

const ROOT_LABEL: &str = "filter";

#[derive(Debug, Clone)]
pub(crate) struct OpenHandler {
    pub tag: String,
    pub matcher: AttrMatcher,
    pub outputs: Vec<(String, String)>,
    pub parent: Option<ScopeId>,
    pub scope: ScopeId,
}

#[derive(Debug, Clone)]
pub(crate) struct CloseHandler {
    pub tag: String,
    pub scope: ScopeId,
    /// Text scopes that stay latched until this element scope closes.
    pub latched: Vec<ScopeId>,
}

#[derive(Debug, Clone)]
pub(crate) struct TextHandler {
    pub matcher: TextMatcher,
    pub output: Option<String>,
    pub parent: Option<ScopeId>,
    pub scope: ScopeId,
}

/// Compiled, immutable handler lists. Shared between engine clones.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub(crate) open: Vec<OpenHandler>,
    pub(crate) close: Vec<CloseHandler>,
    pub(crate) text: Vec<TextHandler>,
    labels: Vec<String>,
    outputs: Vec<String>,
}

impl Program {
    pub fn compile(tree: &FilterTree) -> Result<Self> {
        if tree.is_empty() {
            tracing::warn!("Compiling an empty filter tree, nothing will be captured");
        } else {
            tracing::debug!("Compiling {} filter nodes", tree.len());
        }

        let mut compiler = Compiler {
            tree,
            visiting: HashSet::new(),
            latches: HashMap::new(),
            program: Program::default(),
        };
        compiler.compile_level(tree.roots(), None, None, ROOT_LABEL)?;

        let program = compiler.program;
        tracing::debug!(
            "Compiled {} element filters, {} text filters, {} outputs",
            program.element_count(),
            program.text_count(),
            program.outputs.len()
        );
        Ok(program)
    }

    /// Number of tag-open/tag-close handler pairs.
    pub fn element_count(&self) -> usize {
        self.open.len()
    }

    pub fn text_count(&self) -> usize {
        self.text.len()
    }

    pub fn scope_count(&self) -> usize {
        self.labels.len()
    }

    /// Path label such as `filter::0::1`, for logs.
    pub fn label(&self, scope: ScopeId) -> &str {
        &self.labels[scope.index()]
    }

    /// Output names in first-declared order, without duplicates.
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    fn new_scope(&mut self, label: String) -> ScopeId {
        let id = ScopeId::new(self.labels.len());
        self.labels.push(label);
        id
    }

    fn declare_output(&mut self, name: &str) {
        if !self.outputs.iter().any(|o| o == name) {
            self.outputs.push(name.to_string());
        }
    }
}

struct Compiler<'t> {
    tree: &'t FilterTree,
    /// Nodes on the current descent path.
    visiting: HashSet<NodeId>,
    /// Element scope -> text scopes latched inside it.
    latches: HashMap<ScopeId, Vec<ScopeId>>,
    program: Program,
}

impl Compiler<'_> {
    /// `owner` is the nearest enclosing element scope.
    fn compile_level(
        &mut self,
        ids: &[NodeId],
        parent: Option<ScopeId>,
        owner: Option<ScopeId>,
        prefix: &str,
    ) -> Result<()> {
        let tree = self.tree;
        for (i, &id) in ids.iter().enumerate() {
            if !self.visiting.insert(id) {
                return Err(Error::RecursiveFilter { node: id });
            }

            let label = format!("{prefix}::{i}");
            let scope = self.program.new_scope(label.clone());
            let children = tree.children(id);

            match tree.node(id) {
                FilterNode::Element(element) => {
                    self.compile_level(children, Some(scope), Some(scope), &label)?;

                    for (_, name) in &element.outputs {
                        self.program.declare_output(name);
                    }
                    self.program.open.push(OpenHandler {
                        tag: element.tag.clone(),
                        matcher: element.matcher.clone(),
                        outputs: element.outputs.clone(),
                        parent,
                        scope,
                    });
                    self.program.close.push(CloseHandler {
                        tag: element.tag.clone(),
                        scope,
                        latched: self.latches.remove(&scope).unwrap_or_default(),
                    });
                }
                FilterNode::Text(text) => {
                    if let Some(owner) = owner {
                        self.latches.entry(owner).or_default().push(scope);
                    }
                    self.compile_level(children, Some(scope), owner, &format!("{label}::text"))?;

                    if let Some(name) = &text.output {
                        self.program.declare_output(name);
                    }
                    self.program.text.push(TextHandler {
                        matcher: text.matcher.clone(),
                        output: text.output.clone(),
                        parent,
                        scope,
                    });
                }
            }

            tracing::trace!("Installed {} for node {}", label, id);
            self.visiting.remove(&id);
        }

        Ok(())
    }
}
