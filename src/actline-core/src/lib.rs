//! Command tree completion for line-oriented shells.
//!
//! An input line such as `math add 1 2` is split on unescaped spaces and
//! resolved against a tree of named groups and actions. The same tree then
//! drives three operations:
//!
//! - completion: fuzzy ranked candidates for the fragment under the cursor
//! - validation: a single fault describing why a line cannot be executed
//! - call assembly: the resolved action's handler bound to its cast arguments
//!
//! # Building a tree
//!
//! ```rust
//! use actline_core::{ActionBuilder, ActionCompleter, Param};
//! use serde_json::{Map, json};
//!
//! let mut completer = ActionCompleter::default();
//! let mut hello = ActionBuilder::from_fn(|args| Ok(json!(format!("Hello {}", args.str(0).unwrap_or("")))))
//!     .param(Param::choices(["Mark", "John", "William"]))
//!     .display_meta("Greets someone");
//! completer.action("hello", &mut hello).unwrap();
//!
//! assert_eq!(completer.complete("hello Jon")[0].text, "John");
//! assert!(completer.validate("hello John", 10).is_ok());
//! assert_eq!(
//!     completer.run_action("hello John", Vec::new(), Map::new()).unwrap(),
//!     json!("Hello John")
//! );
//! ```
//!
//! # Declarative trees
//!
//! Trees can also be described in TOML and loaded through [`TreeLoader`],
//! which binds handler names to closures:
//!
//! ```rust,ignore
//! let completer = TreeLoader::new()
//!     .handler("greet", |args| Ok(json!(args.positional)))
//!     .load_path(Path::new("tree.toml"))?;
//! ```
//!
//! # Escaping
//!
//! A literal space inside a fragment is written `\ `. Completions are returned
//! escaped; parameter values are unescaped before validation and casting.

mod call;
mod completer;
mod completion;
pub mod config;
mod context;
mod error;
pub mod fragment;
pub mod fuzzy;
mod nested;
pub mod tree;
mod validation;

pub use call::{PartialCall, partial_call};
pub use completer::{ActionCompleter, CompleterConfig};
pub use completion::{Completion, CompletionEngine};
pub use config::TreeLoader;
pub use context::{Context, Resolved, resolve};
pub use error::{
    CallError, CallResult, ConfigError, ConfigResult, TreeError, TreeResult, ValidationFault,
};
pub use fuzzy::DEFAULT_FUZZY_TOLERANCE;
pub use nested::{NestedCompleter, NestedCompletion, PathCompleter};
pub use tree::{
    Action, ActionBuilder, CallArgs, Cast, Group, Handler, Lazy, Node, Param, ParamSource,
    ParamValidator, Predicate, Presentation, ProviderRequest, StyledFragment, Text,
    ValueValidator,
};
pub use validation::ActionValidator;

/// Re-export common types for convenience.
pub mod prelude {
    pub use crate::{
        Action, ActionBuilder, ActionCompleter, CallArgs, Cast, Completion, Group, Param,
        ParamValidator, PartialCall, Predicate, TreeLoader, ValidationFault, ValueValidator,
    };
}
