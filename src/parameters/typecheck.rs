//! Type compatibility checks
//!
//! When type checking is enabled, the registry asks a [`TypeCheck`] whether a new
//! value may replace the current one. The default [`TagCheck`] compares type tags;
//! a units-aware handler can be plugged in instead, and the registry does not
//! interpret why a pair was rejected.

use crate::parameters::value::{TypeTag, Value};

/// Decides whether `new` is type-compatible with the `old` value of `name`
pub trait TypeCheck {
    fn compatible(&self, name: &str, old: &Value, new: &Value) -> bool;
}

/// Compares type tags; a `Null` placeholder accepts any value
#[derive(Debug, Clone, Copy, Default)]
pub struct TagCheck;

impl TypeCheck for TagCheck {
    fn compatible(&self, _name: &str, old: &Value, new: &Value) -> bool {
        old.type_tag() == TypeTag::Null || old.type_tag() == new.type_tag()
    }
}

impl<F> TypeCheck for F
where
    F: Fn(&str, &Value, &Value) -> bool,
{
    fn compatible(&self, name: &str, old: &Value, new: &Value) -> bool {
        self(name, old, new)
    }
}
