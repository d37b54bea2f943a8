//! Declared method signatures
//!
//! Stands in for runtime introspection: a signature source answers, for a
//! method name, with its formal parameter list (receiver first) and the
//! positional defaults that align to the trailing parameters.

use crate::conversion::ParamValue;

/// Name of the implicit receiver parameter
pub const RECEIVER: &str = "self";

/// A default value as written in a method declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    /// Declared as `None`, or no default at all
    Null,
    Bool(bool),
    Int(i64),
    Str(&'static str),
}

impl From<Literal> for ParamValue {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Null => Self::Null,
            Literal::Bool(b) => Self::Bool(b),
            Literal::Int(n) => Self::Int(n),
            Literal::Str(s) => Self::Text(s.to_string()),
        }
    }
}

/// Formal parameters and trailing defaults of one declared method
#[derive(Debug, Clone, Copy)]
pub struct DeclaredSignature<'a> {
    /// Formal parameter names, receiver first
    pub params: &'a [&'a str],
    /// Defaults for the last `defaults.len()` parameters
    pub defaults: &'a [Literal],
}

/// Something that can describe the methods a client declares
pub trait SignatureSource {
    /// Signature of `name`, or `None` if the client does not declare it
    fn signature(&self, name: &str) -> Option<DeclaredSignature<'_>>;
}
