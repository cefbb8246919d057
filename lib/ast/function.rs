use crate::ast::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A decompiled function: a name and a body.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Function {
    name: String,
    body: Statement,
    address: Option<u64>,
}

impl Function {
    /// Create a new function.
    pub fn new<S>(name: S, body: Statement) -> Function
    where
        S: Into<String>,
    {
        Function {
            name: name.into(),
            body,
            address: None,
        }
    }

    /// The name of this function.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The body of this function.
    pub fn body(&self) -> &Statement {
        &self.body
    }

    /// A mutable reference to the body of this function.
    pub fn body_mut(&mut self) -> &mut Statement {
        &mut self.body
    }

    /// The address this function was decompiled from, if known.
    pub fn address(&self) -> Option<u64> {
        self.address
    }

    pub fn set_address(&mut self, address: Option<u64>) {
        self.address = address;
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(address) = self.address {
            writeln!(f, "// 0x{:X}", address)?;
        }
        writeln!(f, "{}()", self.name)?;
        write!(f, "{}", self.body)
    }
}
