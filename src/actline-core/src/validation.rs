//! Validation of complete input lines.

use crate::context::{Resolved, resolve};
use crate::error::ValidationFault;
use crate::fragment;
use crate::fuzzy;
use crate::tree::{Action, Group, Param, ParamSource, ProviderRequest};

/// Validates input lines against a command tree.
///
/// Every fault carries the cursor position handed to [`validate`](Self::validate).
#[derive(Debug, Clone, Copy)]
pub struct ActionValidator<'a> {
    root: &'a Group,
}

impl<'a> ActionValidator<'a> {
    pub fn new(root: &'a Group) -> Self {
        Self { root }
    }

    /// Validates `line`, anchoring any fault at `cursor_position`.
    pub fn validate(&self, line: &str, cursor_position: usize) -> Result<(), ValidationFault> {
        let fragments = fragment::split(line);
        let context = resolve(self.root, &fragments);

        let result = match context.node {
            Resolved::Group(group) => validate_group(group, context.fragments),
            Resolved::Action(action) => {
                validate_action(action, context.name.unwrap_or_default(), context.fragments)
            }
        };

        result.map_err(|fault| {
            let fault = fault.at(cursor_position);
            tracing::debug!(line, message = %fault.message, "validation failed");
            fault
        })
    }
}

// ============================================================
// GROUPS
// ============================================================

fn validate_group(group: &Group, fragments: &[String]) -> Result<(), ValidationFault> {
    let Some(value) = fragments.last() else {
        return Ok(());
    };
    validate_choices(&group.active_child_names(), value)
}

/// Checks `value` against a set of accepted values.
///
/// Empty values and empty choice sets are not checked.
fn validate_choices<S: AsRef<str>>(choices: &[S], value: &str) -> Result<(), ValidationFault> {
    if choices.is_empty() || value.is_empty() {
        return Ok(());
    }

    if let [only] = choices {
        let only = only.as_ref();
        if value != only {
            return Err(ValidationFault::message(format!(
                "Invalid value '{}', expected '{}'",
                value, only
            )));
        }
        return Ok(());
    }

    if choices.iter().any(|choice| choice.as_ref() == value) {
        return Ok(());
    }

    let mut message = format!("Invalid value '{}'", value);
    if let Some(best) = fuzzy::best_single_choice(choices, value) {
        message.push_str(&format!(", did you mean '{}'", best));
    }
    Err(ValidationFault::message(message))
}

// ============================================================
// ACTIONS
// ============================================================

fn validate_action(action: &Action, name: &str, fragments: &[String]) -> Result<(), ValidationFault> {
    let decoded: Vec<String> = fragments.iter().map(|f| fragment::decode(f)).collect();

    for (index, (param, value)) in action.params.iter().zip(&decoded).enumerate() {
        validate_param(action, param, value, &decoded[..index])
            .map_err(|fault| fault.for_parameter(index))?;
    }

    let received = fragments.iter().filter(|f| !f.is_empty()).count();
    let expected = action.params.len();
    let arity_ok = if action.capture_all {
        received >= expected
    } else {
        received == expected
    };
    if !arity_ok {
        return Err(ValidationFault::message(format!(
            "Missing parameters for '{}', expected {} received {}",
            name, expected, received
        )));
    }

    Ok(())
}

fn validate_param(
    action: &Action,
    param: &Param,
    value: &str,
    prior_fragments: &[String],
) -> Result<(), ValidationFault> {
    if !param.validators.is_empty() {
        for validator in &param.validators {
            validator.run(param, value, prior_fragments)?;
        }
        return Ok(());
    }

    match &param.source {
        ParamSource::Literal(literal) => validate_choices(std::slice::from_ref(literal), value),
        ParamSource::Choices(choices) => validate_choices(choices, value),
        ParamSource::Dynamic(provider) => {
            let choices = provider(ProviderRequest {
                action,
                param: None,
                text: None,
            });
            validate_choices(&choices, value)
        }
        // Nested completers need an explicit validator
        ParamSource::Nested(_) | ParamSource::None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ParamValidator, Predicate, ValueValidator};
    use pretty_assertions::assert_eq;

    fn validate(root: &Group, line: &str) -> Result<(), ValidationFault> {
        ActionValidator::new(root).validate(line, line.len())
    }

    fn message(root: &Group, line: &str) -> String {
        validate(root, line).unwrap_err().message
    }

    #[test]
    fn test_group_choice_mismatch() {
        let root = Group::new()
            .with_action("hello", Action::new())
            .unwrap()
            .with_action("world", Action::new())
            .unwrap();

        assert!(validate(&root, "hello").is_ok());
        assert_eq!(
            message(&root, "helo"),
            "Invalid value 'helo', did you mean 'hello'"
        );
        assert_eq!(
            message(&root, "zzz"),
            "Invalid value 'zzz', did you mean 'hello'"
        );
    }

    #[test]
    fn test_single_choice_expected_message() {
        let root = Group::new().with_action("hello", Action::new()).unwrap();
        assert_eq!(
            message(&root, "help"),
            "Invalid value 'help', expected 'hello'"
        );
    }

    #[test]
    fn test_empty_input_is_not_checked() {
        let root = Group::new().with_action("hello", Action::new()).unwrap();
        assert!(validate(&root, "").is_ok());
        assert!(validate(&Group::new(), "anything").is_ok());
    }

    #[test]
    fn test_fault_uses_caller_cursor() {
        let root = Group::new().with_action("hello", Action::new()).unwrap();
        let fault = ActionValidator::new(&root).validate("nope", 2).unwrap_err();
        assert_eq!(fault.cursor_position, 2);
    }

    #[test]
    fn test_inactive_action_validates_against_parent() {
        let root = Group::new()
            .with_action("activate", Action::new())
            .unwrap()
            .with_action(
                "deactivate",
                Action::new().with_active(Predicate::new(|| false)),
            )
            .unwrap();

        assert!(validate(&root, "activate").is_ok());
        assert_eq!(
            message(&root, "deactivate"),
            "Invalid value 'deactivate', expected 'activate'"
        );
    }

    #[test]
    fn test_param_faults_are_numbered() {
        let root = Group::new()
            .with_action(
                "pair",
                Action::new()
                    .with_param(Param::literal("first"))
                    .with_param(Param::choices(["a", "b"])),
            )
            .unwrap();

        assert!(validate(&root, "pair first a").is_ok());
        assert_eq!(
            message(&root, "pair second a"),
            "parameter 1: Invalid value 'second', expected 'first'"
        );
        assert!(message(&root, "pair first c").starts_with("parameter 2: Invalid value 'c'"));
    }

    #[test]
    fn test_arity_without_capture_all() {
        let root = Group::new()
            .with_action(
                "add",
                Action::new()
                    .with_param(Param::none())
                    .with_param(Param::none()),
            )
            .unwrap();

        assert_eq!(
            message(&root, "add 1"),
            "Missing parameters for 'add', expected 2 received 1"
        );
        assert_eq!(
            message(&root, "add 1 2 3"),
            "Missing parameters for 'add', expected 2 received 3"
        );
        assert!(validate(&root, "add 1 2").is_ok());
        assert!(validate(&root, "add 1 2 ").is_ok());
    }

    #[test]
    fn test_arity_with_capture_all() {
        let root = Group::new()
            .with_action(
                "add",
                Action::new()
                    .with_param(Param::none())
                    .with_param(Param::none())
                    .with_capture_all(true),
            )
            .unwrap();

        assert!(validate(&root, "add 1 2 3").is_ok());
        assert!(validate(&root, "add 1 2").is_ok());
        assert!(validate(&root, "add 1").is_err());
    }

    #[test]
    fn test_paramless_action_rejects_extra_fragments() {
        let root = Group::new().with_action("quit", Action::new()).unwrap();
        assert!(validate(&root, "quit").is_ok());
        assert_eq!(
            message(&root, "quit now"),
            "Missing parameters for 'quit', expected 0 received 1"
        );
    }

    #[test]
    fn test_dynamic_source_validation() {
        let root = Group::new()
            .with_action(
                "color",
                Action::new().with_param(Param::dynamic(|request| {
                    assert!(request.param.is_none() || request.text.is_some());
                    vec!["red".to_string(), "green".to_string()]
                })),
            )
            .unwrap();

        assert!(validate(&root, "color red").is_ok());
        assert!(
            message(&root, "color reed").contains("did you mean 'red'"),
            "suggestion expected"
        );
    }

    #[test]
    fn test_nested_source_is_not_validated_by_default() {
        let root = Group::new()
            .with_action(
                "cat",
                Action::new().with_param(Param::nested(crate::nested::PathCompleter::new())),
            )
            .unwrap();
        assert!(validate(&root, "cat /definitely/not/here").is_ok());
    }

    #[test]
    fn test_custom_validators_replace_default_checks() {
        let root = Group::new()
            .with_action(
                "touch",
                Action::new().with_param(
                    Param::choices(["a"])
                        .with_validator(ParamValidator::value(ValueValidator::NotEmpty))
                        .with_validator(ParamValidator::custom(|_, value, _| {
                            if value.ends_with(".txt") {
                                Ok(())
                            } else {
                                Err(ValidationFault::new("text files only", 99))
                            }
                        })),
                ),
            )
            .unwrap();

        assert!(validate(&root, "touch notes.txt").is_ok());
        let fault = ActionValidator::new(&root)
            .validate("touch notes.md", 14)
            .unwrap_err();
        assert_eq!(fault.message, "parameter 1: text files only");
        assert_eq!(fault.cursor_position, 14);
    }

    #[test]
    fn test_custom_validator_receives_decoded_prior_fragments() {
        let root = Group::new()
            .with_action(
                "mv",
                Action::new().with_param(Param::none()).with_param(
                    Param::none().with_validator(ParamValidator::custom(|_, value, prior| {
                        if prior == ["my file"] && value == "other file" {
                            Ok(())
                        } else {
                            Err(ValidationFault::message(format!("{:?} {}", prior, value)))
                        }
                    })),
                ),
            )
            .unwrap();

        assert!(validate(&root, "mv my\\ file other\\ file").is_ok());
    }

    #[test]
    fn test_end_to_end_choice_mismatch() {
        let root = Group::new()
            .with_action(
                "hello",
                Action::new().with_param(Param::choices(["Mark", "John", "William"])),
            )
            .unwrap();

        assert!(validate(&root, "hello John").is_ok());
        assert!(message(&root, "hello Zzz").starts_with("parameter 1: Invalid value 'Zzz'"));
    }
}
