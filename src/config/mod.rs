//! Filter files: YAML or JSON documents describing a filter tree.
//!
//! ```yaml
//! filters:
//!   - tag: form
//!     match: "name=form1"
//!     out: { action: post_url }     # or a list: [{ action: post_url }]
//!     children:
//!       - tag: p
//!         attrs: { name: message }
//!         children:
//!           - out: message
//!             contains: "Option"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::filter::{
    AttrMatcher, ElementFilter, Engine, FilterNode, FilterTree, NodeId, TextFilter, TextMatcher,
};

#[derive(Debug, Deserialize, Serialize)]
pub struct FiltersConfig {
    pub filters: Vec<FilterConfig>,
}

impl FiltersConfig {
    /// Load a filter file; the format follows the file extension.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn from_yaml(source: &str) -> anyhow::Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from_str(source, ::config::FileFormat::Yaml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn to_tree(&self) -> Result<FilterTree> {
        let mut tree = FilterTree::new();
        for (i, filter) in self.filters.iter().enumerate() {
            let id = filter.build(&mut tree, &format!("filters[{i}]"))?;
            tree.push_root(id);
        }
        Ok(tree)
    }

    pub fn compile(&self) -> Result<Engine> {
        Engine::compile(&self.to_tree()?)
    }
}

/// One filter node. Nodes with a `tag` match elements, nodes without one
/// match text.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct FilterConfig {
    #[serde(default)]
    pub tag: Option<String>,
    /// Attribute DSL expression (elements only).
    #[serde(default, rename = "match")]
    pub match_expr: Option<String>,
    /// Required attribute values (elements only).
    #[serde(default)]
    pub attrs: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub equals: Option<String>,
    #[serde(default)]
    pub contains: Option<String>,
    /// CEL predicate over `text`.
    #[serde(default)]
    pub cel: Option<String>,
    #[serde(default)]
    pub out: Option<OutputConfig>,
    #[serde(default)]
    pub children: Vec<FilterConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(untagged)]
pub enum OutputConfig {
    /// Text nodes: output name for the text chunk.
    Name(String),
    /// Elements: `[{attr: name}, ...]`, captured in list order. An attribute
    /// may appear more than once.
    Pairs(Vec<BTreeMap<String, String>>),
    /// Elements: attribute name -> output name, captured in attribute name
    /// order.
    Attributes(BTreeMap<String, String>),
}

impl OutputConfig {
    /// `(attribute, output)` pairs for an element filter.
    fn attribute_pairs(&self) -> Option<Vec<(&str, &str)>> {
        match self {
            OutputConfig::Name(_) => None,
            OutputConfig::Pairs(entries) => Some(
                entries
                    .iter()
                    .flat_map(|entry| entry.iter())
                    .map(|(attr, name)| (attr.as_str(), name.as_str()))
                    .collect(),
            ),
            OutputConfig::Attributes(outputs) => Some(
                outputs
                    .iter()
                    .map(|(attr, name)| (attr.as_str(), name.as_str()))
                    .collect(),
            ),
        }
    }
}

fn invalid(path: &str, reason: impl Into<String>) -> Error {
    Error::InvalidFilter {
        path: path.to_string(),
        reason: reason.into(),
    }
}

impl FilterConfig {
    fn build(&self, tree: &mut FilterTree, path: &str) -> Result<NodeId> {
        let node = match &self.tag {
            Some(tag) => FilterNode::Element(self.element(tag, path)?),
            None => FilterNode::Text(self.text(path)?),
        };

        let id = tree.insert(node);
        for (i, child) in self.children.iter().enumerate() {
            let child_id = child.build(tree, &format!("{path}.children[{i}]"))?;
            tree.link(id, child_id);
        }
        Ok(id)
    }

    fn element(&self, tag: &str, path: &str) -> Result<ElementFilter> {
        if tag.trim().is_empty() {
            return Err(invalid(path, "empty tag name"));
        }
        if self.equals.is_some() || self.contains.is_some() || self.cel.is_some() {
            return Err(invalid(
                path,
                "equals/contains/cel only apply to text filters",
            ));
        }

        let matcher = match (&self.match_expr, &self.attrs) {
            (Some(_), Some(_)) => return Err(invalid(path, "use either match or attrs, not both")),
            (Some(expr), None) => {
                AttrMatcher::parse(expr).map_err(|e| invalid(path, format!("match: {e}")))?
            }
            (None, Some(attrs)) => AttrMatcher::subset(attrs.clone()),
            (None, None) => AttrMatcher::Any,
        };

        let mut element = ElementFilter::new(tag).matcher(matcher);
        if let Some(out) = &self.out {
            let Some(pairs) = out.attribute_pairs() else {
                return Err(invalid(
                    path,
                    "element output must map attributes to names",
                ));
            };
            for (attr, name) in pairs {
                element = element.output(attr, name);
            }
        }
        Ok(element)
    }

    fn text(&self, path: &str) -> Result<TextFilter> {
        if self.match_expr.is_some() || self.attrs.is_some() {
            return Err(invalid(path, "match/attrs only apply to element filters"));
        }

        let matcher = match (&self.equals, &self.contains, &self.cel) {
            (None, None, None) => TextMatcher::Any,
            (Some(s), None, None) => TextMatcher::Equals(s.clone()),
            (None, Some(s), None) => TextMatcher::Contains(s.clone()),
            (None, None, Some(source)) => {
                TextMatcher::cel(source).map_err(|e| invalid(path, e))?
            }
            _ => return Err(invalid(path, "use only one of equals, contains, cel")),
        };

        let mut text = TextFilter::new().matcher(matcher);
        match &self.out {
            None => {}
            Some(OutputConfig::Name(name)) => text = text.output(name),
            Some(OutputConfig::Pairs(_) | OutputConfig::Attributes(_)) => {
                return Err(invalid(path, "text output must be a single name"));
            }
        }
        Ok(text)
    }
}
