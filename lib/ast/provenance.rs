//! Provenance of AST nodes.
//!
//! The decompiler records, for each expression node, the IR locations it was
//! derived from. When a node is replaced, its replacement inherits those
//! locations, so a later explanation of the output can still point at the IR.

use crate::ast::*;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// An IR location, such as the address of the instruction a node came from.
pub type Origin = u64;

#[derive(Clone, Debug, Default)]
pub struct Provenance {
    origins: FxHashMap<NodeId, BTreeSet<Origin>>,
}

impl Provenance {
    pub fn new() -> Provenance {
        Provenance {
            origins: FxHashMap::default(),
        }
    }

    /// Record that the node `id` was derived from `origin`.
    pub fn insert(&mut self, id: NodeId, origin: Origin) {
        self.origins.entry(id).or_default().insert(origin);
    }

    /// Record that every node in `expression` was derived from `origin`.
    pub fn insert_expression(&mut self, expression: &Expression, origin: Origin) {
        self.insert(expression.id(), origin);
        for child in expression.children() {
            self.insert_expression(child, origin);
        }
    }

    /// The origins recorded for a node.
    pub fn origins(&self, id: NodeId) -> Option<&BTreeSet<Origin>> {
        self.origins.get(&id)
    }

    /// Give `to` every origin of `from`. Does nothing if `from` has no
    /// recorded origins.
    pub fn inherit(&mut self, to: NodeId, from: NodeId) {
        if to == from {
            return;
        }
        let origins = match self.origins.get(&from) {
            Some(origins) => origins.clone(),
            None => return,
        };
        self.origins.entry(to).or_default().extend(origins);
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inherit_unions_origins() {
        let mut builder = AstBuilder::new();
        let a = builder.true_();
        let b = builder.false_();
        let c = builder.true_();

        let mut provenance = Provenance::new();
        provenance.insert(a.id(), 0x1000);
        provenance.insert(b.id(), 0x2000);
        provenance.inherit(b.id(), a.id());
        assert_eq!(
            provenance.origins(b.id()).unwrap().iter().copied().collect::<Vec<_>>(),
            vec![0x1000, 0x2000]
        );

        provenance.inherit(a.id(), c.id());
        assert_eq!(provenance.origins(a.id()).unwrap().len(), 1);
        assert!(provenance.origins(c.id()).is_none());
    }

    #[test]
    fn insert_expression_marks_subtree() {
        let mut builder = AstBuilder::new();
        let x = builder.variable("x", Type::int(32, true));
        let not = builder.lnot(x);
        let mut provenance = Provenance::new();
        provenance.insert_expression(&not, 0x40);
        assert_eq!(provenance.len(), 2);
    }
}
