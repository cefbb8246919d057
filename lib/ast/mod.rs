//! The decompiled abstract syntax tree.
//!
//! # An Introduction
//!
//! This is a small C-like AST, as produced by a decompiler after control-flow
//! structuring. It carries just enough of the language to express the
//! conditions of control statements and the bodies those statements guard.
//!
//! ## `Expression`
//!
//! Every `Expression` node carries a `NodeId`, assigned when the node is
//! created. Ids are unique within the process, whichever `AstBuilder` created
//! the node. Node ids identify a node's *content*: the simplifier
//! never changes the children of an existing node. When a rewrite changes a
//! child, a new node with a fresh id is built instead. Analyses may therefor
//! memoize facts about a node by its id.
//!
//! * Terminals: `Variable`, `Constant`.
//! * Operators: `Unary`, `Binary`, `Ternary`.
//! * Wrappers: `Paren`, `Cast`.
//! * Opaque: `Call`.
//!
//! A `Constant` of type `Type::Bool` is the literal `true` or `false`.
//!
//! ## `Statement`
//!
//! The control statements `If`, `While` and `Do` each hold exactly one
//! condition slot, accessible through `Statement::condition_mut`. The
//! remaining statements exist so that bodies can be represented.
//!
//! ## `Function` and `Unit`
//!
//! A `Function` holds a name and a body. A `Unit` holds the functions of one
//! decompiled module.
//!
//! ## `Provenance`
//!
//! `Provenance` maps node ids to the IR locations they were derived from.

mod builder;
mod constant;
mod expression;
mod function;
mod provenance;
mod statement;
mod ty;
mod unit;
mod variable;

pub use self::builder::*;
pub use self::constant::*;
pub use self::expression::*;
pub use self::function::*;
pub use self::provenance::*;
pub use self::statement::*;
pub use self::ty::*;
pub use self::unit::*;
pub use self::variable::*;

/// A convenience function to create a new constant.
///
/// This is the preferred way to create a `Constant`.
pub fn const_(value: u64, ty: Type) -> Constant {
    Constant::new(value, ty)
}

/// A convenience function to create a new variable.
///
/// This is the preferred way to create a `Variable`.
pub fn var<S>(name: S, ty: Type) -> Variable
where
    S: Into<String>,
{
    Variable::new(name, ty)
}
