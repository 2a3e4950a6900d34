use placeholder_algebra::prelude::*;

/// The kind of a column of the assignment table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Private values, committed per proof.
    Witness,
    /// Values known to the verifier, committed with the witness.
    PublicInput,
    /// Fixed values of the circuit.
    Constant,
    /// Fixed 0/1 columns switching gates, lookups and tables on.
    Selector,
}

impl ColumnType {
    fn tag(&self) -> u8 {
        match self {
            ColumnType::Witness => 0,
            ColumnType::PublicInput => 1,
            ColumnType::Constant => 2,
            ColumnType::Selector => 3,
        }
    }
}

/// A column read at a row offset relative to the current row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Variable {
    /// The kind of the column.
    pub column_type: ColumnType,
    /// The column index among the columns of the same kind.
    pub index: usize,
    /// The row offset.
    pub rotation: i32,
}

impl Variable {
    /// Create a variable.
    pub fn new(column_type: ColumnType, index: usize, rotation: i32) -> Self {
        Self {
            column_type,
            index,
            rotation,
        }
    }

    /// The witness column `index` on the current row.
    pub fn witness(index: usize) -> Self {
        Self::new(ColumnType::Witness, index, 0)
    }

    /// The public input column `index` on the current row.
    pub fn public_input(index: usize) -> Self {
        Self::new(ColumnType::PublicInput, index, 0)
    }

    /// The constant column `index` on the current row.
    pub fn constant(index: usize) -> Self {
        Self::new(ColumnType::Constant, index, 0)
    }

    /// The selector column `index` on the current row.
    pub fn selector(index: usize) -> Self {
        Self::new(ColumnType::Selector, index, 0)
    }

    /// The same column read at another offset.
    pub fn rotated(&self, rotation: i32) -> Self {
        Self { rotation, ..*self }
    }
}

/// A polynomial expression over the columns of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expression<F> {
    /// A field constant.
    Constant(F),
    /// A column value.
    Variable(Variable),
    /// The sum of two expressions.
    Sum(Box<Expression<F>>, Box<Expression<F>>),
    /// The product of two expressions.
    Product(Box<Expression<F>>, Box<Expression<F>>),
    /// The negation of an expression.
    Negated(Box<Expression<F>>),
}

impl<F: Scalar> Expression<F> {
    /// The total degree in the column values.
    pub fn degree(&self) -> usize {
        match self {
            Expression::Constant(_) => 0,
            Expression::Variable(_) => 1,
            Expression::Sum(a, b) => a.degree().max(b.degree()),
            Expression::Product(a, b) => a.degree() + b.degree(),
            Expression::Negated(a) => a.degree(),
        }
    }

    /// Evaluate the expression, reading the variables through `get`.
    pub fn evaluate<G: Fn(&Variable) -> F>(&self, get: &G) -> F {
        match self {
            Expression::Constant(c) => *c,
            Expression::Variable(v) => get(v),
            Expression::Sum(a, b) => a.evaluate(get) + b.evaluate(get),
            Expression::Product(a, b) => a.evaluate(get) * b.evaluate(get),
            Expression::Negated(a) => a.evaluate(get).neg(),
        }
    }

    /// Push every variable occurrence into `out`.
    pub fn collect_variables(&self, out: &mut Vec<Variable>) {
        match self {
            Expression::Constant(_) => {}
            Expression::Variable(v) => out.push(*v),
            Expression::Sum(a, b) | Expression::Product(a, b) => {
                a.collect_variables(out);
                b.collect_variables(out);
            }
            Expression::Negated(a) => a.collect_variables(out),
        }
    }

    /// The variables of the expression, sorted and deduplicated.
    pub fn variables(&self) -> Vec<Variable> {
        let mut out = vec![];
        self.collect_variables(&mut out);
        out.into_iter().sorted().dedup().collect()
    }

    /// A canonical encoding of the expression tree.
    pub fn content_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![];
        self.write_content(&mut bytes);
        bytes
    }

    fn write_content(&self, bytes: &mut Vec<u8>) {
        match self {
            Expression::Constant(c) => {
                bytes.push(0);
                bytes.extend_from_slice(&c.to_bytes());
            }
            Expression::Variable(v) => {
                bytes.push(1);
                bytes.push(v.column_type.tag());
                bytes.extend_from_slice(&(v.index as u64).to_le_bytes());
                bytes.extend_from_slice(&v.rotation.to_le_bytes());
            }
            Expression::Sum(a, b) => {
                bytes.push(2);
                a.write_content(bytes);
                b.write_content(bytes);
            }
            Expression::Product(a, b) => {
                bytes.push(3);
                a.write_content(bytes);
                b.write_content(bytes);
            }
            Expression::Negated(a) => {
                bytes.push(4);
                a.write_content(bytes);
            }
        }
    }
}

impl<F> From<Variable> for Expression<F> {
    fn from(v: Variable) -> Self {
        Expression::Variable(v)
    }
}

impl<F> Add for Expression<F> {
    type Output = Expression<F>;
    fn add(self, rhs: Self) -> Self::Output {
        Expression::Sum(Box::new(self), Box::new(rhs))
    }
}

impl<F> Sub for Expression<F> {
    type Output = Expression<F>;
    fn sub(self, rhs: Self) -> Self::Output {
        Expression::Sum(Box::new(self), Box::new(Expression::Negated(Box::new(rhs))))
    }
}

impl<F> Mul for Expression<F> {
    type Output = Expression<F>;
    fn mul(self, rhs: Self) -> Self::Output {
        Expression::Product(Box::new(self), Box::new(rhs))
    }
}

impl<F> Neg for Expression<F> {
    type Output = Expression<F>;
    fn neg(self) -> Self::Output {
        Expression::Negated(Box::new(self))
    }
}

#[cfg(test)]
mod test {
    use crate::plonk::constraint_system::expression::{ColumnType, Expression, Variable};
    use placeholder_algebra::{bls12_381::BLSScalar, prelude::*};

    type F = BLSScalar;

    #[test]
    fn test_expression() {
        let w0 = Expression::<F>::from(Variable::witness(0));
        let w1 = Expression::from(Variable::witness(1));
        let next = Expression::from(Variable::witness(0).rotated(1));
        // w0 * w1 - next + 3
        let e = w0.clone() * w1 - next + Expression::Constant(F::from(3u32));
        assert_eq!(e.degree(), 2);

        let value = e.evaluate(&|v: &Variable| match (v.index, v.rotation) {
            (0, 0) => F::from(4u32),
            (1, 0) => F::from(5u32),
            _ => F::from(23u32),
        });
        assert_eq!(value, F::zero());

        let vars = e.variables();
        assert_eq!(vars.len(), 3);
        assert!(vars.contains(&Variable::new(ColumnType::Witness, 0, 1)));

        assert_eq!((-w0.clone()).degree(), 1);
        assert_eq!((w0.clone() * w0.clone() * w0).degree(), 3);
    }

    #[test]
    fn test_content_bytes() {
        let a = Expression::<F>::from(Variable::witness(0)) * Variable::constant(1).into();
        let b = Expression::<F>::from(Variable::witness(0)) * Variable::constant(1).into();
        let c = Expression::<F>::from(Variable::constant(1)) * Variable::witness(0).into();
        let d = Expression::<F>::from(Variable::witness(0).rotated(-1)) * Variable::constant(1).into();
        assert_eq!(a.content_bytes(), b.content_bytes());
        assert_ne!(a.content_bytes(), c.content_bytes());
        assert_ne!(a.content_bytes(), d.content_bytes());
    }
}
