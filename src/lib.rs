//! Declarative, single-pass data extraction from HTML.
//!
//! A nested tree of filters says which tags (or text chunks) to match, under
//! which enclosing matches, and which attributes or text to capture into named
//! outputs. The tree is compiled into flat event handlers and the document is
//! streamed through them once:
//!
//! ```
//! use htmlsieve::filter::{AttrMatcher, ElementFilter, Engine, FilterTree};
//!
//! let mut tree = FilterTree::new();
//! let select = tree.add_root(
//!     ElementFilter::new("select").matcher(AttrMatcher::subset([("name", "app")])),
//! );
//! tree.add_child(select, ElementFilter::new("option").output("value", "app"));
//!
//! let mut engine = Engine::compile(&tree)?;
//! let captures = engine.extract(
//!     r#"<select name="app"><option value="a">A<option value="b">B</select>"#,
//! )?;
//! assert_eq!(captures["app"], vec![Some("a".to_string()), Some("b".to_string())]);
//! # Ok::<(), htmlsieve::Error>(())
//! ```

pub mod app;
pub mod config;
pub mod dsl;
pub mod error;
pub mod expr;
pub mod filter;
pub mod sinks;
pub mod utils;

pub use error::{Error, Result};
pub use filter::{Captures, Engine, FilterTree};
