use crate::errors::{PlonkError, Result};
use crate::plonk::constraint_system::{ColumnType, TableDescription};
use placeholder_algebra::prelude::*;

/// The circuit columns, shared by every proof.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedAssignment<F> {
    /// The constant columns.
    pub constants: Vec<Vec<F>>,
    /// The selector columns, with 0/1 values.
    pub selectors: Vec<Vec<F>>,
}

/// The per-proof columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentTable<F> {
    /// The witness columns.
    pub witness: Vec<Vec<F>>,
    /// The public input columns.
    pub public_inputs: Vec<Vec<F>>,
}

/// Check the column count and lengths, and pad every column with zeros to the table size.
pub(crate) fn pad_columns<F: Scalar>(
    column_type: ColumnType,
    columns: &[Vec<F>],
    desc: &TableDescription,
) -> Result<Vec<Vec<F>>> {
    let expected = desc.column_count(column_type);
    if columns.len() != expected {
        return Err(PlonkError::MalformedInput(format!(
            "expected {} {:?} columns, got {}",
            expected,
            column_type,
            columns.len()
        )));
    }
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            if column.len() > desc.usable_rows_amount {
                return Err(PlonkError::MalformedInput(format!(
                    "{:?} column {} has {} rows, only {} are usable",
                    column_type,
                    i,
                    column.len(),
                    desc.usable_rows_amount
                )));
            }
            let mut padded = column.clone();
            padded.resize(desc.rows_amount, F::zero());
            Ok(padded)
        })
        .collect()
}

impl<F: Scalar> FixedAssignment<F> {
    /// Return the padded constant and selector columns.
    pub fn padded(&self, desc: &TableDescription) -> Result<(Vec<Vec<F>>, Vec<Vec<F>>)> {
        let constants = pad_columns(ColumnType::Constant, &self.constants, desc)?;
        let selectors = pad_columns(ColumnType::Selector, &self.selectors, desc)?;
        for (i, selector) in selectors.iter().enumerate() {
            if selector.iter().any(|v| !v.is_zero() && *v != F::one()) {
                return Err(PlonkError::MalformedInput(format!(
                    "selector {} is not boolean",
                    i
                )));
            }
        }
        Ok((constants, selectors))
    }
}

impl<F: Scalar> AssignmentTable<F> {
    /// Return the padded witness and public input columns.
    pub fn padded(&self, desc: &TableDescription) -> Result<(Vec<Vec<F>>, Vec<Vec<F>>)> {
        Ok((
            pad_columns(ColumnType::Witness, &self.witness, desc)?,
            pad_columns(ColumnType::PublicInput, &self.public_inputs, desc)?,
        ))
    }
}

#[cfg(test)]
mod test {
    use crate::plonk::constraint_system::{AssignmentTable, FixedAssignment, TableDescription};
    use placeholder_algebra::{bls12_381::BLSScalar, prelude::*};

    type F = BLSScalar;

    #[test]
    fn test_padding() {
        let desc = TableDescription::new(2, 1, 1, 1, 5);
        assert_eq!(desc.rows_amount, 8);

        let table = AssignmentTable {
            witness: vec![vec![F::one(); 5], vec![F::from(2u32); 3]],
            public_inputs: vec![vec![F::from(7u32)]],
        };
        let (witness, public) = table.padded(&desc).unwrap();
        assert_eq!(witness[1].len(), 8);
        assert_eq!(witness[1][3], F::zero());
        assert_eq!(public[0][0], F::from(7u32));

        let too_long = AssignmentTable {
            witness: vec![vec![F::one(); 6], vec![]],
            public_inputs: vec![vec![]],
        };
        assert!(too_long.padded(&desc).is_err());

        let missing = AssignmentTable::<F> {
            witness: vec![vec![]],
            public_inputs: vec![vec![]],
        };
        assert!(missing.padded(&desc).is_err());

        let fixed = FixedAssignment {
            constants: vec![vec![F::from(9u32)]],
            selectors: vec![vec![F::from(2u32)]],
        };
        assert!(fixed.padded(&desc).is_err());
    }
}
