//! The circuit description: table shape, gates, copy constraints, lookup gates and lookup
//! tables. A [`ConstraintSystem`] is built once by [`ConstraintSystemBuilder`] and is
//! read-only afterwards; the values live in [`FixedAssignment`] and [`AssignmentTable`].
use crate::errors::{PlonkError, Result};
use ark_std::collections::{BTreeMap, BTreeSet};
use placeholder_algebra::prelude::*;
use sha2::{Digest, Sha256};

mod assignment;
mod builder;
mod expression;

pub use assignment::{AssignmentTable, FixedAssignment};
pub(crate) use assignment::pad_columns;
pub use builder::ConstraintSystemBuilder;
pub use expression::{ColumnType, Expression, Variable};

/// The shape of the assignment table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescription {
    /// Number of witness columns.
    pub witness_columns: usize,
    /// Number of public input columns.
    pub public_input_columns: usize,
    /// Number of constant columns.
    pub constant_columns: usize,
    /// Number of selector columns.
    pub selector_columns: usize,
    /// Rows that carry circuit values.
    pub usable_rows_amount: usize,
    /// The table size, a power of two above `usable_rows_amount`.
    pub rows_amount: usize,
}

impl TableDescription {
    /// Describe a table; the size is the next power of two of `usable_rows_amount + 1`.
    pub fn new(
        witness_columns: usize,
        public_input_columns: usize,
        constant_columns: usize,
        selector_columns: usize,
        usable_rows_amount: usize,
    ) -> Self {
        Self {
            witness_columns,
            public_input_columns,
            constant_columns,
            selector_columns,
            usable_rows_amount,
            rows_amount: (usable_rows_amount + 1).next_power_of_two(),
        }
    }

    /// The number of columns of a kind.
    pub fn column_count(&self, column_type: ColumnType) -> usize {
        match column_type {
            ColumnType::Witness => self.witness_columns,
            ColumnType::PublicInput => self.public_input_columns,
            ColumnType::Constant => self.constant_columns,
            ColumnType::Selector => self.selector_columns,
        }
    }

    fn check(&self) -> Result<()> {
        if self.usable_rows_amount == 0
            || !self.rows_amount.is_power_of_two()
            || self.rows_amount <= self.usable_rows_amount
        {
            return Err(PlonkError::MalformedInput(format!(
                "{} rows cannot hold {} usable rows",
                self.rows_amount, self.usable_rows_amount
            )));
        }
        if self.witness_columns == 0 {
            return Err(PlonkError::MalformedInput(
                "at least one witness column is needed".to_string(),
            ));
        }
        Ok(())
    }
}

/// A cell of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// The kind of the column.
    pub column_type: ColumnType,
    /// The column index among the columns of the same kind.
    pub index: usize,
    /// The row.
    pub row: usize,
}

impl Cell {
    /// Create a cell.
    pub fn new(column_type: ColumnType, index: usize, row: usize) -> Self {
        Self {
            column_type,
            index,
            row,
        }
    }
}

/// Two cells that must hold the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyConstraint(pub Cell, pub Cell);

/// Polynomial constraints enforced on the rows where the selector is on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate<F> {
    /// The selector column.
    pub selector_index: usize,
    /// Expressions that vanish on the selected rows.
    pub constraints: Vec<Expression<F>>,
}

/// A tuple of expressions that must be a row of a lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupConstraint<F> {
    /// The table id, starting at 1.
    pub table_id: usize,
    /// The looked-up tuple.
    pub lookup_input: Vec<Expression<F>>,
}

/// Lookup constraints enforced on the rows where the selector is on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupGate<F> {
    /// The selector column.
    pub selector_index: usize,
    /// The lookups of the gate.
    pub constraints: Vec<LookupConstraint<F>>,
}

/// A lookup table stored in constant columns, on the rows where its tag selector is on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTable {
    /// Human readable name.
    pub name: String,
    /// The tag selector.
    pub tag_index: usize,
    /// The constant columns holding the table.
    pub columns: Vec<usize>,
}

/// An immutable circuit description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSystem<F> {
    /// The table shape.
    pub table_description: TableDescription,
    /// The gates.
    pub gates: Vec<Gate<F>>,
    /// The copy constraints.
    pub copy_constraints: Vec<CopyConstraint>,
    /// The lookup gates.
    pub lookup_gates: Vec<LookupGate<F>>,
    /// The lookup tables, table `t` has id `t + 1`.
    pub lookup_tables: Vec<LookupTable>,
}

/// Column values padded to the table size, with the row semantics of the prover.
struct TableView<'a, F> {
    desc: &'a TableDescription,
    witness: &'a [Vec<F>],
    public_inputs: &'a [Vec<F>],
    constants: &'a [Vec<F>],
    selectors: &'a [Vec<F>],
}

impl<'a, F: Scalar> TableView<'a, F> {
    fn read(&self, v: &Variable, row: usize) -> Result<F> {
        let n = self.desc.rows_amount as i64;
        let r = row as i64 + v.rotation as i64;
        // witness rows past the usable ones are random in a proof
        if v.column_type == ColumnType::Witness
            && (r < 0 || r >= self.desc.usable_rows_amount as i64)
        {
            return Err(PlonkError::MalformedInput(format!(
                "witness {} read outside the usable rows from row {}",
                v.index, row
            )));
        }
        let r = r.rem_euclid(n) as usize;
        let column = match v.column_type {
            ColumnType::Witness => &self.witness[v.index],
            ColumnType::PublicInput => &self.public_inputs[v.index],
            ColumnType::Constant => &self.constants[v.index],
            ColumnType::Selector => &self.selectors[v.index],
        };
        Ok(column[r])
    }

    fn eval(&self, e: &Expression<F>, row: usize) -> Result<F> {
        let mut vars = vec![];
        e.collect_variables(&mut vars);
        let mut values = BTreeMap::new();
        for v in vars {
            values.insert(v, self.read(&v, row)?);
        }
        Ok(e.evaluate(&|v: &Variable| values.get(v).copied().unwrap_or_default()))
    }

    fn cell(&self, cell: &Cell) -> F {
        let column = match cell.column_type {
            ColumnType::Witness => &self.witness[cell.index],
            ColumnType::PublicInput => &self.public_inputs[cell.index],
            ColumnType::Constant => &self.constants[cell.index],
            ColumnType::Selector => &self.selectors[cell.index],
        };
        column[cell.row]
    }
}

impl<F: Scalar> ConstraintSystem<F> {
    /// The number of lookup constraints over all lookup gates.
    pub fn num_lookup_inputs(&self) -> usize {
        self.lookup_gates.iter().map(|g| g.constraints.len()).sum()
    }

    /// Every lookup constraint with the selector of its gate, in gate order.
    pub fn lookup_constraints(&self) -> impl Iterator<Item = (usize, &LookupConstraint<F>)> {
        self.lookup_gates
            .iter()
            .flat_map(|g| g.constraints.iter().map(move |c| (g.selector_index, c)))
    }

    /// The largest degree of a selector-gated gate constraint.
    pub fn max_gate_degree(&self) -> usize {
        self.gates
            .iter()
            .flat_map(|g| g.constraints.iter().map(|c| c.degree() + 1))
            .max()
            .unwrap_or(0)
    }

    /// The columns taking part in the permutation: witness, then public input, then constant.
    pub fn permutation_columns(&self) -> Vec<(ColumnType, usize)> {
        let desc = &self.table_description;
        (0..desc.witness_columns)
            .map(|i| (ColumnType::Witness, i))
            .chain((0..desc.public_input_columns).map(|i| (ColumnType::PublicInput, i)))
            .chain((0..desc.constant_columns).map(|i| (ColumnType::Constant, i)))
            .collect()
    }

    /// A SHA-256 digest of everything the verifier reads from the description.
    pub fn content_digest(&self) -> [u8; 32] {
        let desc = &self.table_description;
        let mut hasher = Sha256::new();
        for v in [
            desc.witness_columns,
            desc.public_input_columns,
            desc.constant_columns,
            desc.selector_columns,
            desc.usable_rows_amount,
            desc.rows_amount,
        ] {
            hasher.update((v as u64).to_le_bytes());
        }
        let update_expression = |hasher: &mut Sha256, e: &Expression<F>| {
            let bytes = e.content_bytes();
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(&bytes);
        };
        hasher.update((self.gates.len() as u64).to_le_bytes());
        for gate in self.gates.iter() {
            hasher.update((gate.selector_index as u64).to_le_bytes());
            hasher.update((gate.constraints.len() as u64).to_le_bytes());
            for c in gate.constraints.iter() {
                update_expression(&mut hasher, c);
            }
        }
        hasher.update((self.lookup_gates.len() as u64).to_le_bytes());
        for gate in self.lookup_gates.iter() {
            hasher.update((gate.selector_index as u64).to_le_bytes());
            hasher.update((gate.constraints.len() as u64).to_le_bytes());
            for c in gate.constraints.iter() {
                hasher.update((c.table_id as u64).to_le_bytes());
                hasher.update((c.lookup_input.len() as u64).to_le_bytes());
                for e in c.lookup_input.iter() {
                    update_expression(&mut hasher, e);
                }
            }
        }
        hasher.update((self.lookup_tables.len() as u64).to_le_bytes());
        for table in self.lookup_tables.iter() {
            hasher.update((table.tag_index as u64).to_le_bytes());
            hasher.update((table.columns.len() as u64).to_le_bytes());
            for c in table.columns.iter() {
                hasher.update((*c as u64).to_le_bytes());
            }
        }
        hasher.finalize().into()
    }

    fn check_variable(&self, v: &Variable) -> Result<()> {
        let count = self.table_description.column_count(v.column_type);
        if v.index >= count {
            return Err(PlonkError::MalformedInput(format!(
                "{:?} column {} does not exist",
                v.column_type, v.index
            )));
        }
        if v.rotation.unsigned_abs() as usize >= self.table_description.rows_amount {
            return Err(PlonkError::MalformedInput(format!(
                "rotation {} is larger than the table",
                v.rotation
            )));
        }
        Ok(())
    }

    fn check_expression(&self, e: &Expression<F>) -> Result<()> {
        for v in e.variables() {
            self.check_variable(&v)?;
        }
        Ok(())
    }

    fn check_selector(&self, selector: usize) -> Result<()> {
        if selector >= self.table_description.selector_columns {
            return Err(PlonkError::MalformedInput(format!(
                "selector {} does not exist",
                selector
            )));
        }
        Ok(())
    }

    /// Check every index, arity and row range of the description.
    pub fn check(&self) -> Result<()> {
        let desc = &self.table_description;
        desc.check()?;

        for gate in self.gates.iter() {
            self.check_selector(gate.selector_index)?;
            for c in gate.constraints.iter() {
                self.check_expression(c)?;
            }
        }

        for table in self.lookup_tables.iter() {
            self.check_selector(table.tag_index)?;
            if table.columns.is_empty() {
                return Err(PlonkError::MalformedInput(format!(
                    "lookup table {} has no column",
                    table.name
                )));
            }
            if let Some(c) = table.columns.iter().find(|c| **c >= desc.constant_columns) {
                return Err(PlonkError::MalformedInput(format!(
                    "lookup table {} uses the missing constant column {}",
                    table.name, c
                )));
            }
        }

        for gate in self.lookup_gates.iter() {
            self.check_selector(gate.selector_index)?;
            for c in gate.constraints.iter() {
                let table = c
                    .table_id
                    .checked_sub(1)
                    .and_then(|t| self.lookup_tables.get(t))
                    .ok_or_else(|| {
                        PlonkError::MalformedInput(format!("unknown lookup table {}", c.table_id))
                    })?;
                if c.lookup_input.len() != table.columns.len() {
                    return Err(PlonkError::MalformedInput(format!(
                        "lookup into {} has {} inputs for {} columns",
                        table.name,
                        c.lookup_input.len(),
                        table.columns.len()
                    )));
                }
                for e in c.lookup_input.iter() {
                    self.check_expression(e)?;
                }
            }
        }

        for (i, CopyConstraint(a, b)) in self.copy_constraints.iter().enumerate() {
            for cell in [a, b] {
                if cell.column_type == ColumnType::Selector
                    || cell.index >= desc.column_count(cell.column_type)
                    || cell.row >= desc.usable_rows_amount
                {
                    return Err(PlonkError::MalformedInput(format!(
                        "copy constraint {} refers to the invalid cell {:?}",
                        i, cell
                    )));
                }
            }
        }
        Ok(())
    }

    /// Check that the tag selectors of the lookup tables are disjoint and leave a usable
    /// row free, so that the zero tuple belongs to the combined table.
    pub fn check_lookup_tags(&self, selectors: &[Vec<F>]) -> Result<()> {
        if self.lookup_gates.is_empty() {
            return Ok(());
        }
        let mut free_row = false;
        for row in 0..self.table_description.usable_rows_amount {
            let active = self
                .lookup_tables
                .iter()
                .filter(|t| {
                    selectors
                        .get(t.tag_index)
                        .and_then(|s| s.get(row))
                        .map_or(false, |v| !v.is_zero())
                })
                .count();
            if active > 1 {
                return Err(PlonkError::MalformedInput(format!(
                    "several lookup tables are tagged on row {}",
                    row
                )));
            }
            free_row |= active == 0;
        }
        if !free_row {
            return Err(PlonkError::MalformedInput(
                "lookup tables need a usable row outside every table".to_string(),
            ));
        }
        Ok(())
    }

    /// Evaluate every gate, copy constraint and lookup on the assignment.
    pub fn verify_assignment(
        &self,
        fixed: &FixedAssignment<F>,
        table: &AssignmentTable<F>,
    ) -> Result<()> {
        let desc = &self.table_description;
        let (constants, selectors) = fixed.padded(desc)?;
        let (witness, public_inputs) = table.padded(desc)?;
        let view = TableView {
            desc,
            witness: &witness,
            public_inputs: &public_inputs,
            constants: &constants,
            selectors: &selectors,
        };

        for (g, gate) in self.gates.iter().enumerate() {
            for row in 0..desc.usable_rows_amount {
                if selectors[gate.selector_index][row].is_zero() {
                    continue;
                }
                for c in gate.constraints.iter() {
                    if !view.eval(c, row)?.is_zero() {
                        return Err(PlonkError::UnsatisfiedGate { gate: g, row });
                    }
                }
            }
        }

        for (i, CopyConstraint(a, b)) in self.copy_constraints.iter().enumerate() {
            if view.cell(a) != view.cell(b) {
                return Err(PlonkError::UnsatisfiedCopyConstraint(i));
            }
        }

        let mut tables: Vec<BTreeSet<Vec<F>>> = vec![BTreeSet::new(); self.lookup_tables.len()];
        for (t, lookup_table) in self.lookup_tables.iter().enumerate() {
            for row in 0..desc.usable_rows_amount {
                if !selectors[lookup_table.tag_index][row].is_zero() {
                    tables[t].insert(lookup_table.columns.iter().map(|c| constants[*c][row]).collect());
                }
            }
        }
        for (g, gate) in self.lookup_gates.iter().enumerate() {
            for row in 0..desc.usable_rows_amount {
                if selectors[gate.selector_index][row].is_zero() {
                    continue;
                }
                for c in gate.constraints.iter() {
                    let tuple = c
                        .lookup_input
                        .iter()
                        .map(|e| view.eval(e, row))
                        .collect::<Result<Vec<F>>>()?;
                    if !tables[c.table_id - 1].contains(&tuple) {
                        return Err(PlonkError::UnsatisfiedLookup { gate: g, row });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::errors::PlonkError;
    use crate::plonk::constraint_system::{
        AssignmentTable, Cell, ColumnType, ConstraintSystemBuilder, Expression,
        FixedAssignment, LookupConstraint, TableDescription, Variable,
    };
    use placeholder_algebra::{bls12_381::BLSScalar, prelude::*};

    type F = BLSScalar;

    fn var(i: usize) -> Expression<F> {
        Variable::witness(i).into()
    }

    #[test]
    fn test_verify_assignment() {
        let mut builder = ConstraintSystemBuilder::<F>::new();
        // w2 = w0 * w1
        let mul = builder.add_gate(vec![var(0) * var(1) - var(2)]);
        // w0 on the next row is w2 of this row
        let chain = builder.add_gate(vec![
            Expression::from(Variable::witness(0).rotated(1)) - var(2),
        ]);
        builder.add_copy_constraint(
            Cell::new(ColumnType::Witness, 1, 0),
            Cell::new(ColumnType::PublicInput, 0, 0),
        );
        let desc = TableDescription::new(3, 1, 0, 2, 3);
        let cs = builder.build(desc).unwrap();
        assert_eq!(cs.max_gate_degree(), 3);
        assert_eq!(cs.permutation_columns().len(), 4);

        let fixed = FixedAssignment {
            constants: vec![],
            selectors: {
                let mut s = vec![vec![]; 2];
                s[mul] = vec![F::one(); 3];
                s[chain] = vec![F::one(), F::one()];
                s
            },
        };
        let f = |v: u32| F::from(v);
        let table = AssignmentTable {
            witness: vec![
                vec![f(2), f(6), f(6)],
                vec![f(3), f(1), f(2)],
                vec![f(6), f(6), f(12)],
            ],
            public_inputs: vec![vec![f(3)]],
        };
        assert!(cs.verify_assignment(&fixed, &table).is_ok());

        let mut bad = table.clone();
        bad.witness[2][2] = f(13);
        assert_eq!(
            cs.verify_assignment(&fixed, &bad),
            Err(PlonkError::UnsatisfiedGate { gate: 0, row: 2 })
        );

        let mut bad = table.clone();
        bad.public_inputs[0][0] = f(4);
        assert_eq!(
            cs.verify_assignment(&fixed, &bad),
            Err(PlonkError::UnsatisfiedCopyConstraint(0))
        );

        // the chain gate on the last usable row reads past the usable rows
        let mut fixed_last = fixed.clone();
        fixed_last.selectors[chain] = vec![F::one(); 3];
        assert!(matches!(
            cs.verify_assignment(&fixed_last, &table),
            Err(PlonkError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_verify_lookup_assignment() {
        let mut builder = ConstraintSystemBuilder::<F>::new();
        let squares = builder.add_lookup_table("squares", vec![0, 1]);
        let lookup = builder.add_lookup_gate(vec![LookupConstraint {
            table_id: squares,
            lookup_input: vec![var(0), var(1)],
        }]);
        let desc = TableDescription::new(2, 0, 2, builder.num_selectors(), 5);
        let cs = builder.build(desc).unwrap();
        let tag = cs.lookup_tables[0].tag_index;

        let f = |v: u32| F::from(v);
        let mut selectors = vec![vec![]; 2];
        selectors[tag] = vec![F::one(); 4];
        selectors[lookup] = vec![F::one(), F::one()];
        let fixed = FixedAssignment {
            constants: vec![vec![f(0), f(1), f(2), f(3)], vec![f(0), f(1), f(4), f(9)]],
            selectors,
        };
        let (_, padded) = fixed.padded(&cs.table_description).unwrap();
        assert!(cs.check_lookup_tags(&padded).is_ok());

        let table = AssignmentTable {
            witness: vec![vec![f(2), f(3)], vec![f(4), f(9)]],
            public_inputs: vec![],
        };
        assert!(cs.verify_assignment(&fixed, &table).is_ok());

        let mut bad = table;
        bad.witness[1][0] = f(5);
        assert_eq!(
            cs.verify_assignment(&fixed, &bad),
            Err(PlonkError::UnsatisfiedLookup { gate: 0, row: 0 })
        );

        let mut full = fixed.selectors.clone();
        full[tag] = vec![F::one(); 5];
        let (_, padded) = FixedAssignment {
            constants: fixed.constants.clone(),
            selectors: full,
        }
        .padded(&cs.table_description)
        .unwrap();
        assert!(cs.check_lookup_tags(&padded).is_err());
    }
}
