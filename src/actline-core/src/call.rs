//! Assembly of deferred action calls from accepted input lines.

use std::fmt;

use serde_json::{Map, Value};

use crate::context::{Resolved, resolve};
use crate::error::{CallError, CallResult};
use crate::fragment;
use crate::tree::{CallArgs, Group, Handler};

/// An action handler bound to the arguments parsed from an input line.
#[derive(Clone)]
pub struct PartialCall {
    name: String,
    handler: Option<Handler>,
    args: Vec<Value>,
}

impl PartialCall {
    /// Name of the resolved action.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Arguments assembled from the input line.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Invokes the handler with the assembled arguments followed by `extra`.
    ///
    /// Actions without a handler return `Value::Null`.
    pub fn call(&self, extra: Vec<Value>, keyword: Map<String, Value>) -> CallResult<Value> {
        let Some(handler) = &self.handler else {
            return Ok(Value::Null);
        };

        let mut positional = self.args.clone();
        positional.extend(extra);
        handler(CallArgs {
            positional,
            keyword,
        })
        .map_err(CallError::Handler)
    }
}

impl fmt::Debug for PartialCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialCall")
            .field("name", &self.name)
            .field("handler", &self.handler.as_ref().map(|_| ".."))
            .field("args", &self.args)
            .finish()
    }
}

/// Resolves `line` to an action and binds its parameter values.
///
/// Each fragment is decoded and passed through its parameter's cast. With
/// `capture_all`, fragments beyond the declared parameters are appended as
/// decoded strings.
pub fn partial_call(root: &Group, line: &str) -> CallResult<PartialCall> {
    let line = line.trim();
    let fragments = fragment::split(line);
    let context = resolve(root, &fragments);

    let action = match context.node {
        Resolved::Action(action) => action,
        Resolved::Group(_) => {
            return Err(CallError::NoAction {
                input: line.to_string(),
                resolved: match context.name {
                    Some(name) => format!("group '{}'", name),
                    None => "the root group".to_string(),
                },
            });
        }
    };

    let mut args = Vec::with_capacity(context.fragments.len());
    for (index, (param, raw)) in action.params.iter().zip(context.fragments).enumerate() {
        let value = fragment::decode(raw);
        let cast = param.cast_value(&value).map_err(|message| CallError::Cast {
            index,
            value: value.clone(),
            message,
        })?;
        args.push(cast);
    }

    if action.capture_all {
        args.extend(
            context
                .fragments
                .iter()
                .skip(action.params.len())
                .map(|raw| Value::String(fragment::decode(raw))),
        );
    }

    let name = context.name.unwrap_or_default().to_string();
    tracing::debug!(action = %name, args = args.len(), "partial call assembled");
    Ok(PartialCall {
        name,
        handler: action.handler().cloned(),
        args,
    })
}
