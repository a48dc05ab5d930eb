//! Declarative command trees loaded from TOML.
//!
//! ```toml
//! fuzzy_tolerance = 75
//!
//! [root.hello]
//! display_meta = "Say hello"
//! action = "greet"
//! params = [{ choices = ["Mark", "John", "William"], display_meta = "Says hello to {completion}" }]
//!
//! [root.math.add]
//! capture_all = true
//! params = [{ none = true, cast = "int", display = "<number>" }]
//! ```
//!
//! A table with `params`, `capture_all` or `action` keys (or `kind = "action"`)
//! is an action; any other table is a group whose non-attribute keys are its
//! children. Handlers cannot be written in TOML; they are bound by name
//! through [`TreeLoader::handler`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::completer::{ActionCompleter, CompleterConfig};
use crate::error::{ConfigError, ConfigResult};
use crate::nested::PathCompleter;
use crate::tree::{
    Action, ActionBuilder, CallArgs, Cast, Group, Handler, Param, ParamSource, ParamValidator,
    Presentation, Text, ValueValidator,
};

const ACTION_KEYS: [&str; 3] = ["params", "capture_all", "action"];
const ATTRIBUTE_KEYS: [&str; 5] = ["kind", "style", "selected_style", "display", "display_meta"];

// ============================================================
// DOCUMENT SHAPE
// ============================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TreeDocument {
    fuzzy_tolerance: Option<i64>,
    #[serde(default)]
    root: toml::Table,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ActionSpec {
    action: Option<String>,
    #[serde(default)]
    params: Vec<ParamSpec>,
    #[serde(default)]
    capture_all: bool,
    style: Option<String>,
    selected_style: Option<String>,
    display: Option<String>,
    display_meta: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParamSpec {
    literal: Option<String>,
    choices: Option<Vec<String>>,
    path: Option<PathSpec>,
    none: Option<bool>,
    cast: Option<String>,
    #[serde(default)]
    validators: Vec<ValidatorSpec>,
    style: Option<String>,
    selected_style: Option<String>,
    display: Option<String>,
    display_meta: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PathSpec {
    #[serde(default)]
    only_directories: bool,
    #[serde(default)]
    expand_user: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ValidatorSpec {
    kind: String,
    pattern: Option<String>,
    message: Option<String>,
}

fn presentation(
    style: Option<String>,
    selected_style: Option<String>,
    display: Option<String>,
    display_meta: Option<String>,
) -> Presentation {
    Presentation {
        style: style.map(Into::into),
        selected_style: selected_style.map(Into::into),
        display: display.map(|d| Text::from(d).into()),
        display_meta: display_meta.map(|d| Text::from(d).into()),
    }
}

// ============================================================
// LOADER
// ============================================================

/// Builds completers from TOML documents.
#[derive(Default, Clone)]
pub struct TreeLoader {
    handlers: HashMap<String, Handler>,
    fallback: Option<Handler>,
}

impl TreeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler that actions can name with `action = "<name>"`.
    pub fn handler<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(CallArgs) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Arc::new(handler));
        self
    }

    /// Extends the loader with already shared handlers.
    pub fn handlers(mut self, handlers: impl IntoIterator<Item = (String, Handler)>) -> Self {
        self.handlers.extend(handlers);
        self
    }

    /// Handler bound to action names that were not registered.
    pub fn fallback_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(CallArgs) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(handler));
        self
    }

    /// Reads and loads a tree file.
    pub fn load_path(&self, path: &Path) -> ConfigResult<ActionCompleter> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading command tree");
        self.load_str(&content)
    }

    /// Loads a tree from TOML text.
    pub fn load_str(&self, content: &str) -> ConfigResult<ActionCompleter> {
        let document: TreeDocument = toml::from_str(content)?;

        let fuzzy_tolerance = match document.fuzzy_tolerance {
            None => CompleterConfig::default().fuzzy_tolerance,
            Some(value) => {
                u8::try_from(value)
                    .ok()
                    .filter(|v| *v <= 100)
                    .ok_or(ConfigError::InvalidTolerance(value))?
            }
        };

        let root = self.build_group("root", document.root)?;
        Ok(ActionCompleter::with_config(
            root,
            CompleterConfig { fuzzy_tolerance },
        ))
    }

    fn build_group(&self, path: &str, table: toml::Table) -> ConfigResult<Group> {
        let mut attributes: [Option<String>; 4] = Default::default();
        let mut children = Vec::new();

        for (key, value) in table {
            let Some(slot) = ATTRIBUTE_KEYS.iter().position(|k| *k == key) else {
                children.push((key, value));
                continue;
            };
            let toml::Value::String(text) = value else {
                return Err(ConfigError::InvalidNode {
                    path: format!("{}.{}", path, key),
                    message: format!("expected a string, found {}", value.type_str()),
                });
            };
            match slot {
                0 if text != "group" => {
                    return Err(ConfigError::InvalidNode {
                        path: path.to_string(),
                        message: format!("unknown kind '{}'", text),
                    });
                }
                0 => {}
                n => attributes[n - 1] = Some(text),
            }
        }

        let [style, selected_style, display, display_meta] = attributes;
        let mut group = Group::new().with_presentation(presentation(
            style,
            selected_style,
            display,
            display_meta,
        ));

        for (name, value) in children {
            let child_path = format!("{}.{}", path, name);
            let toml::Value::Table(child) = value else {
                return Err(ConfigError::InvalidNode {
                    path: child_path,
                    message: format!("expected a table, found {}", value.type_str()),
                });
            };

            if is_action_table(&child) {
                let action = self.build_action(&child_path, child)?;
                group.add_action(name, action)?;
            } else {
                let subgroup = self.build_group(&child_path, child)?;
                group.group(name, subgroup)?;
            }
        }
        Ok(group)
    }

    fn build_action(&self, path: &str, mut table: toml::Table) -> ConfigResult<Action> {
        table.remove("kind");
        let spec: ActionSpec = toml::Value::Table(table).try_into()?;

        let mut builder = match spec.action.as_deref() {
            None => ActionBuilder::new(),
            Some(name) => {
                let handler = self
                    .handlers
                    .get(name)
                    .or(self.fallback.as_ref())
                    .cloned()
                    .ok_or_else(|| ConfigError::UnknownHandler {
                        path: path.to_string(),
                        handler: name.to_string(),
                    })?;
                ActionBuilder::from_fn(move |args| handler(args))
            }
        };

        for (index, param) in spec.params.into_iter().enumerate() {
            builder.add_param(build_param(&format!("{}.params[{}]", path, index), param)?);
        }

        let action = builder.capture_all(spec.capture_all).finish();
        Ok(action.with_presentation(presentation(
            spec.style,
            spec.selected_style,
            spec.display,
            spec.display_meta,
        )))
    }
}

fn is_action_table(table: &toml::Table) -> bool {
    ACTION_KEYS.iter().any(|key| table.contains_key(*key))
        || table.get("kind").and_then(toml::Value::as_str) == Some("action")
}

fn build_param(path: &str, spec: ParamSpec) -> ConfigResult<Param> {
    let mut sources = Vec::new();
    if spec.literal.is_some() {
        sources.push("literal");
    }
    if spec.choices.is_some() {
        sources.push("choices");
    }
    if spec.path.is_some() {
        sources.push("path");
    }
    if spec.none == Some(true) {
        sources.push("none");
    }
    if sources.len() > 1 {
        return Err(ConfigError::AmbiguousSource {
            path: path.to_string(),
            sources: sources.join(", "),
        });
    }

    let source = if let Some(literal) = spec.literal {
        ParamSource::Literal(literal)
    } else if let Some(choices) = spec.choices {
        ParamSource::Choices(choices)
    } else if let Some(path_spec) = spec.path {
        ParamSource::Nested(Arc::new(
            PathCompleter::new()
                .only_directories(path_spec.only_directories)
                .expand_user(path_spec.expand_user),
        ))
    } else {
        ParamSource::None
    };

    let mut param = Param::new(source).with_presentation(presentation(
        spec.style,
        spec.selected_style,
        spec.display,
        spec.display_meta,
    ));

    if let Some(cast) = spec.cast {
        param.cast = Some(Cast::from_name(&cast).ok_or_else(|| ConfigError::UnknownCast {
            path: path.to_string(),
            cast,
        })?);
    }

    for validator in spec.validators {
        param.validators.push(build_validator(path, validator)?);
    }

    Ok(param)
}

fn build_validator(path: &str, spec: ValidatorSpec) -> ConfigResult<ParamValidator> {
    let validator = match spec.kind.as_str() {
        "not_empty" => ValueValidator::NotEmpty,
        "is_file" => ValueValidator::IsFile,
        "is_dir" => ValueValidator::IsDir,
        "exists" => ValueValidator::Exists,
        "matches" => {
            let pattern = spec.pattern.as_deref().unwrap_or_default();
            ValueValidator::Matches(Regex::new(pattern).map_err(|source| {
                ConfigError::InvalidPattern {
                    path: path.to_string(),
                    source,
                }
            })?)
        }
        other => {
            tracing::warn!(path, kind = other, "unsupported validator kind, it will be skipped");
            return Ok(ParamValidator::Unsupported(other.to_string()));
        }
    };

    Ok(match spec.message {
        Some(message) => ParamValidator::value_with_message(validator, message),
        None => ParamValidator::value(validator),
    })
}

impl ActionCompleter {
    /// Loads a completer from TOML text; actions naming a handler fail to load.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        TreeLoader::new().load_str(content)
    }

    /// Loads a completer from TOML text, binding `action = "<name>"` entries
    /// to the given handlers.
    pub fn from_toml_str_with_handlers(
        content: &str,
        handlers: HashMap<String, Handler>,
    ) -> ConfigResult<Self> {
        TreeLoader::new().handlers(handlers).load_str(content)
    }

    /// Reads and loads a tree file.
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        TreeLoader::new().load_path(path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TreeError;
    use crate::tree::Node;
    use pretty_assertions::assert_eq;
    use serde_json::{Map, json};

    const TREE: &str = r#"
fuzzy_tolerance = 80

[root.hello]
display_meta = "Say hello"
action = "greet"
params = [{ choices = ["Mark", "John", "William"], display_meta = "Says hello to {completion}" }]

[root.math]
display_meta = "Math"

[root.math.add]
capture_all = true
params = [{ none = true, cast = "int", display = "<number>" }]

[root.quit]
kind = "action"
"#;

    fn loader() -> TreeLoader {
        TreeLoader::new().handler("greet", |args| Ok(json!(format!("Hello, {}!", args.str(0).unwrap_or("?")))))
    }

    #[test]
    fn test_loads_groups_and_actions() {
        let completer = loader().load_str(TREE).unwrap();
        assert_eq!(completer.config().fuzzy_tolerance, 80);

        let names: Vec<_> = completer.root().children().map(|(n, node)| (n, node.kind())).collect();
        assert_eq!(
            names,
            vec![("hello", "action"), ("math", "group"), ("quit", "action")]
        );

        let math = completer.root().child("math").and_then(Node::as_group).unwrap();
        let add = math.child("add").and_then(Node::as_action).unwrap();
        assert!(add.capture_all);
        assert_eq!(add.params[0].cast.as_ref().map(Cast::name), Some("int"));
    }

    #[test]
    fn test_loaded_tree_completes_and_runs() {
        let completer = loader().load_str(TREE).unwrap();

        let completions = completer.complete("hello Jon");
        assert_eq!(completions[0].text, "John");
        assert_eq!(completions[0].display_meta_text(), "Says hello to John");

        assert_eq!(
            completer.run_action("hello John", Vec::new(), Map::new()).unwrap(),
            json!("Hello, John!")
        );
        assert_eq!(
            completer.partial_call("math add 1 2").unwrap().args(),
            &[json!(1), json!("2")]
        );
    }

    #[test]
    fn test_unknown_handler() {
        let err = ActionCompleter::from_toml_str(TREE).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownHandler { ref handler, .. } if handler == "greet"));
    }

    #[test]
    fn test_fallback_handler() {
        let completer = TreeLoader::new()
            .fallback_handler(|args| Ok(Value::Array(args.positional)))
            .load_str(TREE)
            .unwrap();
        assert_eq!(
            completer.run_action("hello Mark", Vec::new(), Map::new()).unwrap(),
            json!(["Mark"])
        );
    }

    #[test]
    fn test_with_handlers_map() {
        let mut handlers: HashMap<String, Handler> = HashMap::new();
        handlers.insert("greet".to_string(), Arc::new(|_| Ok(json!("hi"))));
        let completer = ActionCompleter::from_toml_str_with_handlers(TREE, handlers).unwrap();
        assert_eq!(
            completer.run_action("hello Mark", Vec::new(), Map::new()).unwrap(),
            json!("hi")
        );
    }

    #[test]
    fn test_invalid_tolerance() {
        let err = ActionCompleter::from_toml_str("fuzzy_tolerance = 101").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTolerance(101)));
        let err = ActionCompleter::from_toml_str("fuzzy_tolerance = -1").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTolerance(-1)));
    }

    #[test]
    fn test_unknown_cast() {
        let err = ActionCompleter::from_toml_str(
            "[root.add]\nparams = [{ none = true, cast = \"complex\" }]",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Unknown cast 'complex' at root.add.params[0]");
    }

    #[test]
    fn test_ambiguous_source() {
        let err = ActionCompleter::from_toml_str(
            "[root.pick]\nparams = [{ literal = \"a\", choices = [\"b\"] }]",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::AmbiguousSource { ref sources, .. } if sources == "literal, choices"));
    }

    #[test]
    fn test_validators() {
        let completer = ActionCompleter::from_toml_str(
            r#"
[[root.num.params]]
validators = [
    { kind = "matches", pattern = "^[0-9]+$", message = "'{value}' is not a number" },
    { kind = "checksum" },
]
"#,
        )
        .unwrap();

        assert!(completer.validate("num 12", 6).is_ok());
        assert_eq!(
            completer.validate("num x", 5).unwrap_err().message,
            "parameter 1: 'x' is not a number"
        );
    }

    #[test]
    fn test_invalid_pattern() {
        let err = ActionCompleter::from_toml_str(
            "[root.num]\nparams = [{ validators = [{ kind = \"matches\", pattern = \"(\" }] }]",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn test_invalid_nodes() {
        let err = ActionCompleter::from_toml_str("[root]\nhello = 1").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid node at root.hello: expected a table, found integer"
        );

        let err = ActionCompleter::from_toml_str("[root.x]\nkind = \"widget\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNode { .. }));

        let err = ActionCompleter::from_toml_str("[root.\"a b\"]\nkind = \"action\"").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Tree(TreeError::WhitespaceInName { .. })
        ));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = ActionCompleter::from_toml_str("[root.hello]\nparams = []\ncolour = \"red\"")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_path_param() {
        let completer = ActionCompleter::from_toml_str(
            "[root.cd]\nparams = [{ path = { only_directories = true } }]",
        )
        .unwrap();
        let cd = completer.root().child("cd").and_then(Node::as_action).unwrap();
        assert_eq!(cd.params[0].source.kind(), "nested");
    }

    #[test]
    fn test_read_missing_file() {
        let err = ActionCompleter::from_path("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.toml");
        std::fs::write(&path, "[root.quit]\nkind = \"action\"\n").unwrap();
        let completer = ActionCompleter::from_path(&path).unwrap();
        assert!(completer.validate("quit", 4).is_ok());
    }
}
