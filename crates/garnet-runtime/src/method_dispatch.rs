//! Method dispatch
//!
//! Methods live in a capability table keyed by `(TypeTag, Sym)`. Lookup tries
//! the receiver's own tag first, then `Object`, which every value inherits.

use crate::ast::Body;
use crate::state::State;
use crate::value::{RuntimeError, Sym, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Runtime-stable type tag for method dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    /// Shared by every value; also the tag of the top-level `main`
    Object,
    NilClass,
    TrueClass,
    FalseClass,
    Integer,
    Float,
    Symbol,
    String,
}

impl TypeTag {
    /// Class name as scripts see it
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Object => "Object",
            TypeTag::NilClass => "NilClass",
            TypeTag::TrueClass => "TrueClass",
            TypeTag::FalseClass => "FalseClass",
            TypeTag::Integer => "Integer",
            TypeTag::Float => "Float",
            TypeTag::Symbol => "Symbol",
            TypeTag::String => "String",
        }
    }

    /// Name used in conversion errors (`nil`, `true`, `Integer`)
    pub fn implicit_name(self) -> &'static str {
        match self {
            TypeTag::NilClass => "nil",
            TypeTag::TrueClass => "true",
            TypeTag::FalseClass => "false",
            other => other.name(),
        }
    }

    /// Parse a class name back into a tag
    pub fn from_name(name: &str) -> Option<TypeTag> {
        [
            TypeTag::Object,
            TypeTag::NilClass,
            TypeTag::TrueClass,
            TypeTag::FalseClass,
            TypeTag::Integer,
            TypeTag::Float,
            TypeTag::Symbol,
            TypeTag::String,
        ]
        .into_iter()
        .find(|tag| tag.name() == name)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepted argument counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    /// Inclusive range
    Range(usize, usize),
    /// At least this many
    Variadic(usize),
}

impl Arity {
    pub fn accepts(&self, given: usize) -> bool {
        match *self {
            Arity::Exact(n) => given == n,
            Arity::Range(min, max) => given >= min && given <= max,
            Arity::Variadic(min) => given >= min,
        }
    }

    /// Fail with `ArgumentError` unless `given` is accepted
    pub fn check(&self, given: usize) -> Result<(), RuntimeError> {
        if self.accepts(given) {
            Ok(())
        } else {
            Err(RuntimeError::arity(given, self))
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::Range(min, max) => write!(f, "{}..{}", min, max),
            Arity::Variadic(min) => write!(f, "{}+", min),
        }
    }
}

/// Method visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    /// Callable only without an explicit receiver
    Private,
}

/// Native method implementation: `(state, receiver, args) -> result`
pub type NativeFn = Rc<dyn Fn(&mut State, Value, &[Value]) -> Result<Value, RuntimeError>>;

/// Method defined by script code with `def`
#[derive(Debug)]
pub struct UserMethod {
    pub name: String,
    pub params: Vec<String>,
    pub body: Body,
}

/// What runs when a method is called
#[derive(Clone)]
pub enum MethodBody {
    Native(NativeFn),
    User(Rc<UserMethod>),
}

impl fmt::Debug for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodBody::Native(_) => f.write_str("Native(..)"),
            MethodBody::User(method) => write!(f, "User({})", method.name),
        }
    }
}

/// Table entry
#[derive(Debug, Clone)]
pub struct Method {
    pub body: MethodBody,
    pub arity: Arity,
    pub visibility: Visibility,
}

impl Method {
    pub fn native(arity: Arity, f: NativeFn) -> Self {
        Self {
            body: MethodBody::Native(f),
            arity,
            visibility: Visibility::Public,
        }
    }

    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }
}

/// Capability table backing all dispatch
#[derive(Debug, Default)]
pub struct MethodTable {
    methods: HashMap<(TypeTag, Sym), Method>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define or replace a method
    pub fn define(&mut self, tag: TypeTag, name: Sym, method: Method) {
        self.methods.insert((tag, name), method);
    }

    /// Resolve a method for a receiver tag, falling back to `Object`
    pub fn resolve(&self, tag: TypeTag, name: Sym) -> Option<&Method> {
        self.methods
            .get(&(tag, name))
            .or_else(|| self.methods.get(&(TypeTag::Object, name)))
    }

    /// Whether `tag` defines `name` itself (no fallback)
    pub fn defines(&self, tag: TypeTag, name: Sym) -> bool {
        self.methods.contains_key(&(tag, name))
    }

    /// Number of methods defined directly on `tag`
    pub fn count_for(&self, tag: TypeTag) -> usize {
        self.methods.keys().filter(|(t, _)| *t == tag).count()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Drop every method, returning how many were released
    pub fn release_all(&mut self) -> usize {
        let released = self.methods.len();
        self.methods = HashMap::new();
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolTable;

    fn constant(value: Value) -> Method {
        Method::native(
            Arity::Exact(0),
            Rc::new(move |_: &mut State, _: Value, _: &[Value]| {
                Ok::<_, RuntimeError>(value)
            }),
        )
    }

    #[test]
    fn test_resolve_falls_back_to_object() {
        let mut symbols = SymbolTable::new(1);
        let name = symbols.intern("answer");
        let mut table = MethodTable::new();
        table.define(TypeTag::Object, name, constant(Value::Integer(1)));

        assert!(table.resolve(TypeTag::String, name).is_some());
        assert!(!table.defines(TypeTag::String, name));
    }

    #[test]
    fn test_own_tag_wins() {
        let mut symbols = SymbolTable::new(1);
        let name = symbols.intern("to_s");
        let mut table = MethodTable::new();
        table.define(TypeTag::Object, name, constant(Value::Integer(1)));
        table.define(TypeTag::Integer, name, constant(Value::Integer(2)).private());

        let method = table.resolve(TypeTag::Integer, name).unwrap();
        assert_eq!(method.visibility, Visibility::Private);
        assert_eq!(table.count_for(TypeTag::Integer), 1);
    }

    #[test]
    fn test_arity() {
        assert!(Arity::Exact(1).accepts(1));
        assert!(!Arity::Range(0, 1).accepts(2));
        assert!(Arity::Variadic(0).accepts(9));
        assert_eq!(
            Arity::Range(1, 2).check(0).unwrap_err().to_string(),
            "wrong number of arguments (given 0, expected 1..2)"
        );
    }

    #[test]
    fn test_tag_names() {
        assert_eq!(TypeTag::from_name("String"), Some(TypeTag::String));
        assert_eq!(TypeTag::from_name("Hash"), None);
        assert_eq!(TypeTag::NilClass.implicit_name(), "nil");
    }
}
