//! Declarative extraction filters and the streaming engine that runs them.
//!
//! A [`FilterTree`] is compiled once into a [`Program`] of flat tag-open,
//! tag-close and text handlers. An [`Engine`] replays tokenizer events
//! through those handlers, tracking which filter scopes are open and
//! appending captured attribute values and text to its capture store.

mod compile;
mod driver;
mod engine;
mod matcher;
mod scope;
mod store;
mod tree;

pub use compile::Program;
pub use driver::{TokenSink, drive};
pub use engine::Engine;
pub use matcher::{AttrMatcher, AttrPredicate, TextMatcher, TextPredicate};
pub use scope::{ScopeId, ScopeTracker};
pub use store::{CaptureStore, Captures};
pub use tree::{ElementFilter, FilterNode, FilterTree, NodeId, TextFilter};
