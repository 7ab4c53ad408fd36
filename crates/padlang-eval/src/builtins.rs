//! Built-in functions and actions callable from rule text.
//!
//! Plugins hand their entries over as a [`PluginSource`]; the interpreter
//! only ever sees the merged, validated [`BuiltIns`] registry.

use crate::bail_kind;
use crate::env::Env;
use crate::error::ErrorKind;
use crate::value::{Type, Value};
use anyhow::Result;
use rustc_hash::FxHashMap;
use std::fmt;

/// A pure built-in: reads the environment, returns a value.
pub type FunctionCode = fn(&Env, Vec<Value>) -> Result<Value>;

/// A side-effecting built-in.
pub type ActionCode = fn(&Env, Vec<Value>) -> Result<()>;

#[derive(Clone)]
pub struct BuiltInFunction {
    pub name: String,
    pub params: Vec<Type>,
    pub ret: Type,
    pub code: FunctionCode,
}

impl BuiltInFunction {
    pub fn new(name: impl Into<String>, params: Vec<Type>, ret: Type, code: FunctionCode) -> Self {
        Self {
            name: name.into(),
            params,
            ret,
            code,
        }
    }
}

impl fmt::Debug for BuiltInFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltInFunction")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("ret", &self.ret)
            .finish()
    }
}

#[derive(Clone)]
pub struct BuiltInAction {
    pub name: String,
    pub params: Vec<Type>,
    pub code: ActionCode,
}

impl BuiltInAction {
    pub fn new(name: impl Into<String>, params: Vec<Type>, code: ActionCode) -> Self {
        Self {
            name: name.into(),
            params,
            code,
        }
    }
}

impl fmt::Debug for BuiltInAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltInAction")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

/// One plugin's contribution, not yet validated against the others.
#[derive(Debug, Clone, Default)]
pub struct PluginSource {
    pub functions: Vec<BuiltInFunction>,
    pub actions: Vec<BuiltInAction>,
}

impl PluginSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn function(mut self, name: &str, params: Vec<Type>, ret: Type, code: FunctionCode) -> Self {
        self.functions.push(BuiltInFunction::new(name, params, ret, code));
        self
    }

    pub fn action(mut self, name: &str, params: Vec<Type>, code: ActionCode) -> Self {
        self.actions.push(BuiltInAction::new(name, params, code));
        self
    }
}

/// The immutable registry a run resolves names against.
#[derive(Debug, Clone, Default)]
pub struct BuiltIns {
    functions: FxHashMap<String, BuiltInFunction>,
    actions: FxHashMap<String, BuiltInAction>,
}

impl BuiltIns {
    /// Merges plugin sources into one registry.
    ///
    /// A name may appear only once across all sources and both namespaces.
    pub fn assemble(sources: impl IntoIterator<Item = PluginSource>) -> Result<Self> {
        let mut builtins = Self::default();

        for source in sources {
            for function in source.functions {
                if builtins.contains(&function.name) {
                    bail_kind!(ErrorKind::Construction, "duplicate built-in {}", function.name);
                }
                builtins.functions.insert(function.name.clone(), function);
            }
            for action in source.actions {
                if builtins.contains(&action.name) {
                    bail_kind!(ErrorKind::Construction, "duplicate built-in {}", action.name);
                }
                builtins.actions.insert(action.name.clone(), action);
            }
        }

        Ok(builtins)
    }

    pub fn function(&self, name: &str) -> Option<&BuiltInFunction> {
        self.functions.get(name)
    }

    pub fn action(&self, name: &str) -> Option<&BuiltInAction> {
        self.actions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name) || self.actions.contains_key(name)
    }
}
