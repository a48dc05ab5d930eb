//! Integration tests for the actline-core crate.
//!
//! Covers resolution, completion, validation and call assembly working
//! together over trees built in code and loaded from TOML.

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use actline_core::fragment;
use actline_core::fuzzy;
use actline_core::{
    Action, ActionBuilder, ActionCompleter, CallError, Cast, Group, Param, ParamValidator,
    Predicate, Resolved, TreeError, TreeLoader, ValidationFault, ValueValidator, resolve,
};
use serde_json::{Map, Value, json};

fn fragments(line: &str) -> Vec<String> {
    fragment::split(line)
}

fn hello_completer() -> ActionCompleter {
    let mut completer = ActionCompleter::default();
    let mut hello = ActionBuilder::from_fn(|args| Ok(Value::Array(args.positional)))
        .param(Param::choices(["Mark", "John", "William"]));
    completer.action("hello", &mut hello).unwrap();
    completer
}

// ============================================================================
// FRAGMENT AND RANKING PROPERTIES
// ============================================================================

mod properties {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_decode_identity() {
        for text in ["", "plain", "two words", "  padded  ", "tab\tand space", "ünïcode ok"] {
            assert_eq!(fragment::decode(&fragment::encode(text)), text);
        }
    }

    #[test]
    fn test_best_choices_empty_and_single() {
        let none: [&str; 0] = [];
        for (query, tolerance) in [("", 0), ("x", 50), ("anything", 100)] {
            assert_eq!(fuzzy::best_choices(&none, query, tolerance).count(), 0);
            assert_eq!(
                fuzzy::best_choices(&["only"], query, tolerance).collect::<Vec<_>>(),
                vec!["only"]
            );
        }
    }

    #[test]
    fn test_best_choices_empty_query_keeps_order() {
        let choices = ["zeta", "alpha", "mid"];
        for tolerance in [0, 75, 100] {
            assert_eq!(
                fuzzy::best_choices(&choices, "", tolerance).collect::<Vec<_>>(),
                vec!["zeta", "alpha", "mid"]
            );
        }
    }
}

// ============================================================================
// RESOLUTION
// ============================================================================

mod resolution {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tree() -> Group {
        let mut root = Group::new();
        root.group("hello", Group::new())
            .unwrap()
            .add_action("world", Action::new())
            .unwrap();
        root
    }

    #[test]
    fn test_resolves_group() {
        let root = tree();
        let input = fragments("hello");
        let context = resolve(&root, &input);

        assert!(std::ptr::eq(context.parent.unwrap(), &root));
        assert_eq!(context.name, Some("hello"));
        assert_eq!(context.node.kind(), "group");
        assert!(context.fragments.is_empty());
    }

    #[test]
    fn test_resolves_action() {
        let root = tree();
        let hello = root.child("hello").and_then(|n| n.as_group()).unwrap();

        let input = fragments("hello world");
        let context = resolve(&root, &input);
        assert!(std::ptr::eq(context.parent.unwrap(), hello));
        assert_eq!(context.name, Some("world"));
        assert!(matches!(context.node, Resolved::Action(_)));
        assert!(context.fragments.is_empty());

        let input = fragments("hello world extra");
        assert_eq!(resolve(&root, &input).fragments, ["extra"]);
    }

    #[test]
    fn test_inactive_action_resolves_to_parent() {
        let root = Group::new()
            .with_action(
                "deactivate",
                Action::new().with_active(Predicate::new(|| false)),
            )
            .unwrap();

        let input = fragments("deactivate");
        let context = resolve(&root, &input);
        assert!(std::ptr::eq(context.node.as_group().unwrap(), &root));
        assert_eq!(context.name, None);
        assert_eq!(context.fragments, ["deactivate"]);
    }
}

// ============================================================================
// END TO END
// ============================================================================

mod end_to_end {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hello_john_calls_handler() {
        let completer = hello_completer();
        let call = completer.partial_call("hello John").unwrap();
        assert_eq!(call.name(), "hello");
        assert_eq!(call.args(), &[json!("John")]);
        assert_eq!(call.call(Vec::new(), Map::new()).unwrap(), json!(["John"]));
    }

    #[test]
    fn test_hello_jon_completes_to_john() {
        let completions = hello_completer().complete("hello Jon");
        assert_eq!(completions[0].text, "John");
        assert_eq!(completions[0].start_position, -3);
    }

    #[test]
    fn test_hello_zzz_fails_validation() {
        let fault = hello_completer().validate("hello Zzz", 9).unwrap_err();
        assert!(fault.message.starts_with("parameter 1: Invalid value 'Zzz'"));
        assert_eq!(fault.cursor_position, 9);
    }

    #[test]
    fn test_completing_action_names() {
        let mut completer = hello_completer();
        completer.add_action("help", Action::new()).unwrap();

        let texts: Vec<_> = completer
            .complete("hel")
            .into_iter()
            .map(|c| c.text)
            .collect();
        assert!(texts.contains(&"hello".to_string()));
        assert!(texts.contains(&"help".to_string()));
    }

    #[test]
    fn test_escaped_spaces_flow_through() {
        let mut completer = ActionCompleter::default();
        completer
            .add_action(
                "open",
                Action::from_fn(|args| Ok(Value::Array(args.positional)))
                    .with_param(Param::choices(["My Documents", "Downloads"])),
            )
            .unwrap();

        assert_eq!(completer.complete("open My\\ Doc")[0].text, "My\\ Documents");
        assert!(completer.validate("open My\\ Documents", 0).is_ok());
        assert_eq!(
            completer.partial_call("open My\\ Documents").unwrap().args(),
            &[json!("My Documents")]
        );
    }
}

// ============================================================================
// ACTIVITY
// ============================================================================

mod activity {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_predicate_is_evaluated_per_call() {
        let enabled = Arc::new(AtomicBool::new(false));
        let flag = enabled.clone();

        let mut completer = ActionCompleter::default();
        completer.add_action("stable", Action::new()).unwrap();
        completer
            .add_action(
                "beta",
                Action::new().with_active(Predicate::new(move || flag.load(Ordering::SeqCst))),
            )
            .unwrap();

        let texts = |line: &str| -> Vec<String> {
            completer.complete(line).into_iter().map(|c| c.text).collect()
        };
        assert!(texts("bet").is_empty());
        assert_eq!(
            completer.validate("beta", 4).unwrap_err().message,
            "Invalid value 'beta', expected 'stable'"
        );
        assert!(matches!(
            completer.partial_call("beta").unwrap_err(),
            CallError::NoAction { .. }
        ));

        enabled.store(true, Ordering::SeqCst);
        assert_eq!(texts("bet")[0], "beta");
        assert!(completer.validate("beta", 4).is_ok());
        assert!(completer.partial_call("beta").is_ok());
    }

    #[test]
    fn test_inactive_group_is_hidden() {
        let mut completer = ActionCompleter::default();
        completer
            .group(
                "admin",
                Group::new()
                    .with_action("reset", Action::new())
                    .unwrap()
                    .with_active(Predicate::new(|| false)),
            )
            .unwrap();
        completer.add_action("about", Action::new()).unwrap();

        let texts: Vec<_> = completer.complete("a").into_iter().map(|c| c.text).collect();
        assert_eq!(texts, vec!["about"]);
        assert_eq!(
            completer.validate("adm", 3).unwrap_err().message,
            "Invalid value 'adm', expected 'about'"
        );
    }
}

// ============================================================================
// ARITY
// ============================================================================

mod arity {
    use super::*;
    use pretty_assertions::assert_eq;

    fn completer(capture_all: bool) -> ActionCompleter {
        let mut completer = ActionCompleter::default();
        let mut add = ActionBuilder::new()
            .param(Param::none())
            .param(Param::none())
            .capture_all(capture_all);
        completer.action("add", &mut add).unwrap();
        completer
    }

    #[test]
    fn test_exact_arity() {
        let completer = completer(false);
        let cases = [("add 1", false), ("add 1 2", true), ("add 1 2 3", false)];
        for (line, ok) in cases {
            assert_eq!(completer.validate(line, 0).is_ok(), ok, "{}", line);
        }
    }

    #[test]
    fn test_capture_all_arity() {
        let completer = completer(true);
        let cases = [("add 1", false), ("add 1 2", true), ("add 1 2 3", true)];
        for (line, ok) in cases {
            assert_eq!(completer.validate(line, 0).is_ok(), ok, "{}", line);
        }
    }

    #[test]
    fn test_arity_message() {
        let fault = completer(false).validate("add 1", 5).unwrap_err();
        assert_eq!(
            fault,
            ValidationFault::new("Missing parameters for 'add', expected 2 received 1", 5)
        );
    }
}

// ============================================================================
// SOURCELESS PARAMETERS
// ============================================================================

mod sourceless {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_without_display_yields_nothing() {
        let root = Group::new()
            .with_action("set", Action::new().with_param(Param::none()))
            .unwrap();
        let completer = ActionCompleter::new(root);
        for line in ["set ", "set x", "set some\\ value"] {
            assert!(completer.complete(line).is_empty(), "{}", line);
        }
    }

    #[test]
    fn test_with_display_reproduces_input() {
        let root = Group::new()
            .with_action(
                "set",
                Action::new().with_param(Param::none().with_display("<value>")),
            )
            .unwrap();
        let completer = ActionCompleter::new(root);

        let completions = completer.complete("set some\\ value");
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].text, "some\\ value");
        assert_eq!(completions[0].display_text(), "<value>");
    }
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

mod construction {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_construction_faults() {
        let mut root = Group::new();
        assert_eq!(
            root.add_action("", Action::new()).unwrap_err(),
            TreeError::EmptyName { kind: "action" }
        );
        assert!(matches!(
            root.group("two words", Group::new()).unwrap_err(),
            TreeError::WhitespaceInName { .. }
        ));
        root.add_action("dup", Action::new()).unwrap();
        assert_eq!(
            root.group("dup", Group::new()).unwrap_err().to_string(),
            "name 'dup' already registered"
        );
    }

    #[test]
    fn test_finished_builder_ignores_params() {
        let mut builder = ActionBuilder::new().param(Param::literal("one"));
        let mut root = Group::new();
        root.action("first", &mut builder).unwrap();

        builder.add_param(Param::literal("two"));
        let action = root.child("first").and_then(|n| n.as_action()).unwrap();
        assert_eq!(action.params.len(), 1);
    }
}

// ============================================================================
// TYPED CALLS
// ============================================================================

mod typed_calls {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_casts_and_capture_all() {
        let mut completer = ActionCompleter::default();
        let mut sum = ActionBuilder::from_fn(|args| {
            let total: i64 = args.positional.iter().filter_map(Value::as_i64).sum();
            Ok(json!({ "total": total, "extra": args.positional.len() }))
        })
        .param(Param::none().with_cast(Cast::Int))
        .param(Param::none().with_cast(Cast::Int))
        .capture_all(true);
        completer.action("sum", &mut sum).unwrap();

        let result = completer
            .run_action("sum 2 3 4", vec![json!(10)], Map::new())
            .unwrap();
        assert_eq!(result, json!({ "total": 15, "extra": 4 }));

        let err = completer.partial_call("sum two 3").unwrap_err();
        assert!(err.to_string().starts_with("parameter 1 could not cast 'two'"));
    }

    #[test]
    fn test_custom_cast() {
        let mut completer = ActionCompleter::default();
        completer
            .add_action(
                "shout",
                Action::from_fn(|args| Ok(Value::Array(args.positional)))
                    .with_param(Param::none().with_cast(Cast::custom(|s| Ok(json!(s.to_uppercase()))))),
            )
            .unwrap();
        assert_eq!(
            completer.run_action("shout hey", Vec::new(), Map::new()).unwrap(),
            json!(["HEY"])
        );
    }
}

// ============================================================================
// FILESYSTEM
// ============================================================================

mod filesystem {
    use super::*;
    use pretty_assertions::assert_eq;
    use actline_core::PathCompleter;

    #[test]
    fn test_path_parameter_completion_and_validation() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("notes")).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join("other.md"), "x").unwrap();

        let mut completer = ActionCompleter::default();
        completer
            .add_action(
                "cat",
                Action::new().with_param(
                    Param::nested(PathCompleter::new())
                        .with_validator(ParamValidator::value(ValueValidator::IsFile)),
                ),
            )
            .unwrap();

        let prefix = format!("{}/no", dir.path().display());
        let line = format!("cat {}", fragment::encode(&prefix));
        let mut displays: Vec<_> = completer
            .complete(&line)
            .into_iter()
            .map(|c| {
                assert_eq!(c.start_position, 0);
                c.display_text()
            })
            .collect();
        displays.sort();
        assert_eq!(displays, vec!["notes.txt", "notes/"]);

        let file = dir.path().join("notes.txt");
        let line = format!("cat {}", fragment::encode(&file.display().to_string()));
        assert!(completer.validate(&line, 0).is_ok());

        let missing = dir.path().join("missing.txt");
        let line = format!("cat {}", fragment::encode(&missing.display().to_string()));
        assert!(completer.validate(&line, 0).is_err());
    }

    #[test]
    fn test_tree_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.toml");
        fs::write(
            &path,
            r#"
fuzzy_tolerance = 70

[root.hello]
action = "greet"
params = [{ choices = ["Mark", "John", "William"] }]

[root.math.add]
capture_all = true
params = [{ none = true, cast = "int" }, { none = true, cast = "int" }]
"#,
        )
        .unwrap();

        let completer = TreeLoader::new()
            .handler("greet", |args| Ok(json!(format!("hi {}", args.str(0).unwrap_or("")))))
            .load_path(&path)
            .unwrap();

        assert_eq!(completer.config().fuzzy_tolerance, 70);
        assert_eq!(completer.complete("hello Jon")[0].text, "John");
        assert_eq!(completer.complete("math ad")[0].text, "add");
        assert!(completer.validate("math add 1", 0).is_err());
        assert_eq!(
            completer.run_action("hello John", Vec::new(), Map::new()).unwrap(),
            json!("hi John")
        );
        assert_eq!(
            completer.partial_call("math add 1 2 3").unwrap().args(),
            &[json!(1), json!(2), json!("3")]
        );
    }
}
