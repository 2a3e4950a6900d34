use crate::errors::{PlonkError, Result};
use crate::plonk::{
    constraint_system::{ColumnType, ConstraintSystem, Expression, TableDescription, Variable},
    gates, lookup, permutation,
};
use crate::utils::batch_inverse;
use ark_std::collections::{BTreeMap, BTreeSet};
use placeholder_algebra::prelude::*;

/// Constants, selectors, permutation columns, `q_last` and `q_blind`.
pub const FIXED_BATCH: usize = 0;
/// Witness and public input columns.
pub const WITNESS_BATCH: usize = 1;
/// Sorted lookup inputs and tables.
pub const LOOKUP_BATCH: usize = 2;
/// Permutation and lookup running products.
pub const RUNNING_BATCH: usize = 3;
/// Parts of the quotient polynomial.
pub const QUOTIENT_BATCH: usize = 4;

const NUM_BATCHES: usize = 5;

/// A committed polynomial: its batch and its index inside the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PolyRef {
    /// The batch.
    pub batch: usize,
    /// The index in the batch.
    pub index: usize,
}

impl PolyRef {
    fn new(batch: usize, index: usize) -> Self {
        Self { batch, index }
    }
}

/// Where every polynomial of a proof lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolyLayout {
    /// The table shape.
    pub desc: TableDescription,
    /// Columns taking part in the permutation.
    pub permutation_columns: usize,
    /// Columns per permutation part.
    pub permutation_chunk_size: usize,
    /// Lookup constraints over all lookup gates.
    pub lookup_inputs: usize,
    /// Parts of `n` coefficients the quotient is split into.
    pub quotient_parts: usize,
}

impl PolyLayout {
    /// Compute the layout of a constraint system.
    pub fn new<F: Scalar>(cs: &ConstraintSystem<F>, permutation_chunk_size: usize) -> Result<Self> {
        if permutation_chunk_size == 0 {
            return Err(PlonkError::MalformedInput(
                "permutation parts need at least one column".to_string(),
            ));
        }
        let desc = cs.table_description;
        let mut layout = Self {
            desc,
            permutation_columns: desc.witness_columns
                + desc.public_input_columns
                + desc.constant_columns,
            permutation_chunk_size,
            lookup_inputs: cs.num_lookup_inputs(),
            quotient_parts: 1,
        };
        let max_degree = permutation::max_degree(&layout)
            .max(lookup::max_degree(cs))
            .max(gates::max_degree(cs));
        layout.quotient_parts = max_degree.saturating_sub(1).max(1);
        Ok(layout)
    }

    /// The number of permutation parts.
    pub fn permutation_parts(&self) -> usize {
        (self.permutation_columns + self.permutation_chunk_size - 1) / self.permutation_chunk_size
    }

    /// The permutation columns of part `p`.
    pub fn part_columns(&self, p: usize) -> ark_std::ops::Range<usize> {
        let start = p * self.permutation_chunk_size;
        start..(start + self.permutation_chunk_size).min(self.permutation_columns)
    }

    /// Whether the lookup batch exists.
    pub fn has_lookups(&self) -> bool {
        self.lookup_inputs > 0
    }

    /// The constant column `i`.
    pub fn constant(&self, i: usize) -> PolyRef {
        PolyRef::new(FIXED_BATCH, i)
    }

    /// The selector column `i`.
    pub fn selector(&self, i: usize) -> PolyRef {
        PolyRef::new(FIXED_BATCH, self.desc.constant_columns + i)
    }

    /// The permutation column `sigma_j`.
    pub fn sigma(&self, j: usize) -> PolyRef {
        PolyRef::new(
            FIXED_BATCH,
            self.desc.constant_columns + self.desc.selector_columns + j,
        )
    }

    /// The selector of the last usable row.
    pub fn q_last(&self) -> PolyRef {
        self.sigma(self.permutation_columns)
    }

    /// The selector of the rows after the last usable row.
    pub fn q_blind(&self) -> PolyRef {
        self.sigma(self.permutation_columns + 1)
    }

    /// The witness column `i`.
    pub fn witness(&self, i: usize) -> PolyRef {
        PolyRef::new(WITNESS_BATCH, i)
    }

    /// The public input column `i`.
    pub fn public_input(&self, i: usize) -> PolyRef {
        PolyRef::new(WITNESS_BATCH, self.desc.witness_columns + i)
    }

    /// The polynomial holding a variable.
    pub fn variable(&self, v: &Variable) -> PolyRef {
        match v.column_type {
            ColumnType::Witness => self.witness(v.index),
            ColumnType::PublicInput => self.public_input(v.index),
            ColumnType::Constant => self.constant(v.index),
            ColumnType::Selector => self.selector(v.index),
        }
    }

    /// The `j`-th permutation column, in witness, public input, constant order.
    pub fn permutation_column(&self, j: usize) -> PolyRef {
        let a = self.desc.witness_columns;
        let b = self.desc.public_input_columns;
        if j < a {
            self.witness(j)
        } else if j < a + b {
            self.public_input(j - a)
        } else {
            self.constant(j - a - b)
        }
    }

    /// The sorted input `A'_l`.
    pub fn sorted_input(&self, l: usize) -> PolyRef {
        PolyRef::new(LOOKUP_BATCH, 2 * l)
    }

    /// The sorted table `S'_l`.
    pub fn sorted_table(&self, l: usize) -> PolyRef {
        PolyRef::new(LOOKUP_BATCH, 2 * l + 1)
    }

    /// The permutation running product `V`.
    pub fn permutation_product(&self) -> PolyRef {
        PolyRef::new(RUNNING_BATCH, 0)
    }

    /// The running product `U_p` inside a row, `U_0` being `V`.
    pub fn part_product(&self, p: usize) -> PolyRef {
        PolyRef::new(RUNNING_BATCH, p)
    }

    /// The lookup running product `V_L`.
    pub fn lookup_product(&self) -> PolyRef {
        PolyRef::new(RUNNING_BATCH, self.permutation_parts())
    }

    /// The quotient part `T_i`.
    pub fn quotient(&self, i: usize) -> PolyRef {
        PolyRef::new(QUOTIENT_BATCH, i)
    }

    /// The number of polynomials of a batch.
    pub fn batch_size(&self, batch: usize) -> usize {
        let desc = &self.desc;
        match batch {
            FIXED_BATCH => {
                desc.constant_columns + desc.selector_columns + self.permutation_columns + 2
            }
            WITNESS_BATCH => desc.witness_columns + desc.public_input_columns,
            LOOKUP_BATCH => 2 * self.lookup_inputs,
            RUNNING_BATCH => self.permutation_parts() + usize::from(self.has_lookups()),
            QUOTIENT_BATCH => self.quotient_parts,
            _ => 0,
        }
    }

    /// The committed batches, in commitment order.
    pub fn batches(&self) -> Vec<usize> {
        (0..NUM_BATCHES)
            .filter(|b| self.batch_size(*b) > 0)
            .collect()
    }

    /// The position of a batch in [`PolyLayout::batches`].
    pub fn batch_position(&self, batch: usize) -> usize {
        self.batches().iter().position(|b| *b == batch).unwrap_or(batch)
    }

    /// The size of the quotient evaluation domain.
    pub fn quotient_domain_size(&self) -> usize {
        self.desc.rows_amount * self.quotient_parts.next_power_of_two()
    }
}

/// The (polynomial, rotation) pairs opened at the evaluation point, in canonical order.
pub fn opening_points<F: Scalar>(
    cs: &ConstraintSystem<F>,
    layout: &PolyLayout,
) -> Vec<(PolyRef, i32)> {
    let mut points: BTreeMap<PolyRef, BTreeSet<i32>> = BTreeMap::new();
    let mut add = |p: PolyRef, rotation: i32| {
        points.entry(p).or_default().insert(rotation);
    };
    let add_expression = |e: &Expression<F>, add: &mut dyn FnMut(PolyRef, i32)| {
        for v in e.variables() {
            add(layout.variable(&v), v.rotation);
        }
    };

    for gate in cs.gates.iter() {
        add(layout.selector(gate.selector_index), 0);
        for c in gate.constraints.iter() {
            add_expression(c, &mut add);
        }
    }
    for gate in cs.lookup_gates.iter() {
        add(layout.selector(gate.selector_index), 0);
        for c in gate.constraints.iter() {
            for e in c.lookup_input.iter() {
                add_expression(e, &mut add);
            }
        }
    }
    if layout.has_lookups() {
        for table in cs.lookup_tables.iter() {
            add(layout.selector(table.tag_index), 0);
            for c in table.columns.iter() {
                add(layout.constant(*c), 0);
            }
        }
        for l in 0..layout.lookup_inputs {
            add(layout.sorted_input(l), 0);
            add(layout.sorted_input(l), -1);
            add(layout.sorted_table(l), 0);
        }
        add(layout.lookup_product(), 0);
        add(layout.lookup_product(), 1);
    }
    for i in 0..layout.desc.public_input_columns {
        add(layout.public_input(i), 0);
    }
    for j in 0..layout.permutation_columns {
        add(layout.permutation_column(j), 0);
        add(layout.sigma(j), 0);
    }
    add(layout.q_last(), 0);
    add(layout.q_blind(), 0);
    add(layout.permutation_product(), 0);
    add(layout.permutation_product(), 1);
    for p in 1..layout.permutation_parts() {
        add(layout.part_product(p), 0);
    }
    for i in 0..layout.quotient_parts {
        add(layout.quotient(i), 0);
    }

    points
        .into_iter()
        .flat_map(|(p, rotations)| rotations.into_iter().map(move |r| (p, r)))
        .collect()
}

/// Read access to the polynomials of a proof at one point.
pub trait PointEvaluator<F: Scalar> {
    /// The value of `p(w^rotation * x)`.
    fn poly(&self, p: PolyRef, rotation: i32) -> F;

    /// The point `x`.
    fn x(&self) -> F;

    /// The first Lagrange polynomial of `H` at `x`.
    fn l0(&self) -> F;

    /// The value of a variable.
    fn variable(&self, layout: &PolyLayout, v: &Variable) -> F {
        self.poly(layout.variable(v), v.rotation)
    }

    /// The value of an expression.
    fn expression(&self, layout: &PolyLayout, e: &Expression<F>) -> F {
        e.evaluate(&|v: &Variable| self.variable(layout, v))
    }
}

/// Polynomial values over a multiplicative coset of size `xs.len()`, which is `step`
/// times the table size.
pub(crate) struct DomainTable<'a, F> {
    pub(crate) batches: Vec<Vec<&'a [F]>>,
    pub(crate) xs: &'a [F],
    pub(crate) l0: &'a [F],
    pub(crate) step: usize,
}

impl<'a, F: Scalar> DomainTable<'a, F> {
    pub(crate) fn new(xs: &'a [F], l0: &'a [F], step: usize) -> Self {
        Self {
            batches: vec![vec![]; NUM_BATCHES],
            xs,
            l0,
            step,
        }
    }

    pub(crate) fn set_batch(&mut self, batch: usize, values: &'a [Vec<F>]) {
        self.batches[batch] = values.iter().map(|v| v.as_slice()).collect();
    }

    pub(crate) fn row(&self, row: usize) -> RowEvaluator<'_, F> {
        RowEvaluator { table: self, row }
    }

    pub(crate) fn size(&self) -> usize {
        self.xs.len()
    }
}

/// A [`PointEvaluator`] at one point of a [`DomainTable`].
pub(crate) struct RowEvaluator<'a, F> {
    table: &'a DomainTable<'a, F>,
    row: usize,
}

impl<'a, F: Scalar> PointEvaluator<F> for RowEvaluator<'a, F> {
    fn poly(&self, p: PolyRef, rotation: i32) -> F {
        let size = self.table.size() as i64;
        let shift = (rotation as i64 * self.table.step as i64).rem_euclid(size) as usize;
        let row = (self.row + shift) % self.table.size();
        self.table
            .batches
            .get(p.batch)
            .and_then(|b| b.get(p.index))
            .map_or(F::zero(), |values| values[row])
    }

    fn x(&self) -> F {
        self.table.xs[self.row]
    }

    fn l0(&self) -> F {
        self.table.l0[self.row]
    }
}

/// The opened values at the evaluation point.
pub(crate) struct OpenedValues<F> {
    values: BTreeMap<(PolyRef, i32), F>,
    x: F,
    l0: F,
}

impl<F: Scalar> OpenedValues<F> {
    pub(crate) fn new(points: &[(PolyRef, i32)], evaluations: &[F], x: F, l0: F) -> Self {
        Self {
            values: points.iter().copied().zip(evaluations.iter().copied()).collect(),
            x,
            l0,
        }
    }
}

impl<F: Scalar> PointEvaluator<F> for OpenedValues<F> {
    fn poly(&self, p: PolyRef, rotation: i32) -> F {
        self.values.get(&(p, rotation)).copied().unwrap_or_default()
    }

    fn x(&self) -> F {
        self.x
    }

    fn l0(&self) -> F {
        self.l0
    }
}

/// The challenges of a proof.
#[derive(Debug, Clone, Default)]
pub(crate) struct PlaceholderChallenges<F> {
    pub(crate) theta: F,
    pub(crate) beta: F,
    pub(crate) gamma: F,
    pub(crate) beta_lookup: F,
    pub(crate) gamma_lookup: F,
    pub(crate) delta_lookup: F,
    pub(crate) theta_gate: F,
    pub(crate) alpha: F,
    pub(crate) y: F,
}

/// Every polynomial that must vanish on `H`: the permutation ones, then the lookup ones,
/// then the gates.
pub(crate) fn all_constraints<F: Scalar, E: PointEvaluator<F>>(
    cs: &ConstraintSystem<F>,
    layout: &PolyLayout,
    delta: &F,
    challenges: &PlaceholderChallenges<F>,
    eval: &E,
) -> Vec<F> {
    let mut values = permutation::constraints_at(
        layout,
        delta,
        &challenges.beta,
        &challenges.gamma,
        eval,
    );
    if layout.has_lookups() {
        values.extend_from_slice(&lookup::constraints_at(cs, layout, challenges, eval));
    }
    values.push(gates::constraint_at(cs, layout, &challenges.theta_gate, eval));
    values
}

/// Combine the constraints with the powers of `alpha`.
pub(crate) fn combine_constraints<F: Scalar>(values: &[F], alpha: &F) -> F {
    values
        .iter()
        .rev()
        .fold(F::zero(), |acc, v| acc * alpha + v)
}

/// The vanishing polynomial `x^n - 1`.
pub(crate) fn vanishing_at<F: Scalar>(x: &F, n: usize) -> F {
    x.pow(&[n as u64]) - F::one()
}

/// The point `w^rotation * y`.
pub(crate) fn rotated_point<F: Scalar>(y: &F, omega: &F, n: usize, rotation: i32) -> F {
    let exponent = (rotation as i64).rem_euclid(n as i64) as u64;
    *y * omega.pow(&[exponent])
}

/// `L_i(x) = w^i (x^n - 1) / (n (x - w^i))` for `i < count`.
pub(crate) fn lagrange_at<F: Scalar>(x: &F, omega: &F, n: usize, count: usize) -> Result<Vec<F>> {
    let z_h = vanishing_at(x, n);
    let n_field = F::from(n as u64);
    let mut w = F::one();
    let mut roots = Vec::with_capacity(count);
    let mut denominators = Vec::with_capacity(count);
    for _ in 0..count {
        roots.push(w);
        denominators.push(n_field * (*x - w));
        w.mul_assign(omega);
    }
    batch_inverse(&mut denominators)?;
    Ok(roots
        .into_iter()
        .zip(denominators)
        .map(|(w, d)| w * z_h * d)
        .collect())
}

/// `L_0` over the points `xs`, none of which is in `H`.
pub(crate) fn first_lagrange_on<F: Scalar>(xs: &[F], n: usize) -> Result<Vec<F>> {
    let n_field = F::from(n as u64);
    let mut denominators: Vec<F> = xs.iter().map(|x| n_field * (*x - F::one())).collect();
    batch_inverse(&mut denominators)?;
    Ok(xs
        .iter()
        .zip(denominators)
        .map(|(x, d)| vanishing_at(x, n) * d)
        .collect())
}
