use crate::errors::{PlonkError, Result};
use crate::plonk::constraint_system::{
    Cell, ConstraintSystem, CopyConstraint, Expression, Gate, LookupConstraint, LookupGate,
    LookupTable, TableDescription,
};
use ark_std::collections::BTreeMap;
use placeholder_algebra::prelude::*;

/// Collects gates, lookups and copy constraints, and owns the selector arena.
///
/// Selectors are plain column indices. Gates and lookup gates with the same content share
/// a selector, a lookup table always gets a fresh tag selector.
#[derive(Debug, Clone)]
pub struct ConstraintSystemBuilder<F> {
    gates: Vec<Gate<F>>,
    copy_constraints: Vec<CopyConstraint>,
    lookup_gates: Vec<LookupGate<F>>,
    lookup_tables: Vec<LookupTable>,
    selectors: BTreeMap<Vec<u8>, usize>,
    num_selectors: usize,
}

impl<F: Scalar> Default for ConstraintSystemBuilder<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Scalar> ConstraintSystemBuilder<F> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            gates: vec![],
            copy_constraints: vec![],
            lookup_gates: vec![],
            lookup_tables: vec![],
            selectors: BTreeMap::new(),
            num_selectors: 0,
        }
    }

    /// The number of selectors allocated so far.
    pub fn num_selectors(&self) -> usize {
        self.num_selectors
    }

    fn allocate_selector(&mut self) -> usize {
        self.num_selectors += 1;
        self.num_selectors - 1
    }

    /// Return the selector of the content, and whether it was just allocated.
    fn find_or_allocate(&mut self, content: Vec<u8>) -> (usize, bool) {
        if let Some(selector) = self.selectors.get(&content) {
            return (*selector, false);
        }
        let selector = self.allocate_selector();
        self.selectors.insert(content, selector);
        (selector, true)
    }

    /// Add a gate and return its selector.
    pub fn add_gate(&mut self, constraints: Vec<Expression<F>>) -> usize {
        let mut content = b"gate".to_vec();
        for c in constraints.iter() {
            let bytes = c.content_bytes();
            content.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
            content.extend_from_slice(&bytes);
        }
        let (selector_index, fresh) = self.find_or_allocate(content);
        if fresh {
            self.gates.push(Gate {
                selector_index,
                constraints,
            });
        }
        selector_index
    }

    /// Add a lookup gate and return its selector.
    pub fn add_lookup_gate(&mut self, constraints: Vec<LookupConstraint<F>>) -> usize {
        let mut content = b"lookup".to_vec();
        for c in constraints.iter() {
            content.extend_from_slice(&(c.table_id as u64).to_le_bytes());
            content.extend_from_slice(&(c.lookup_input.len() as u64).to_le_bytes());
            for e in c.lookup_input.iter() {
                let bytes = e.content_bytes();
                content.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
                content.extend_from_slice(&bytes);
            }
        }
        let (selector_index, fresh) = self.find_or_allocate(content);
        if fresh {
            self.lookup_gates.push(LookupGate {
                selector_index,
                constraints,
            });
        }
        selector_index
    }

    /// Add a lookup table over constant columns, allocate its tag selector and return
    /// the table id.
    pub fn add_lookup_table(&mut self, name: &str, columns: Vec<usize>) -> usize {
        let tag_index = self.allocate_selector();
        self.lookup_tables.push(LookupTable {
            name: name.to_string(),
            tag_index,
            columns,
        });
        self.lookup_tables.len()
    }

    /// Require two cells to be equal.
    pub fn add_copy_constraint(&mut self, a: Cell, b: Cell) {
        self.copy_constraints.push(CopyConstraint(a, b));
    }

    /// Freeze the description. The table must have one selector column per allocated
    /// selector.
    pub fn build(self, table_description: TableDescription) -> Result<ConstraintSystem<F>> {
        if table_description.selector_columns != self.num_selectors {
            return Err(PlonkError::MalformedInput(format!(
                "{} selectors are used, the table has {}",
                self.num_selectors, table_description.selector_columns
            )));
        }
        let cs = ConstraintSystem {
            table_description,
            gates: self.gates,
            copy_constraints: self.copy_constraints,
            lookup_gates: self.lookup_gates,
            lookup_tables: self.lookup_tables,
        };
        cs.check()?;
        Ok(cs)
    }
}
