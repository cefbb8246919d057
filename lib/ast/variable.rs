use crate::ast::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A reference to a local, parameter or global of the decompiled function.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Variable {
    name: String,
    ty: Type,
}

impl Variable {
    pub fn new<S>(name: S, ty: Type) -> Variable
    where
        S: Into<String>,
    {
        Variable {
            name: name.into(),
            ty,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> Type {
        self.ty
    }

    /// An identifier uniquely identifies the variable in the form `<name>:<type>`
    pub fn identifier(&self) -> String {
        format!("{}:{}", self.name, self.ty)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
