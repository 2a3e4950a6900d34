use crate::errors::{PlonkError, Result};
use crate::plonk::{
    constraint_system::{ConstraintSystem, FixedAssignment},
    helpers::{first_lagrange_on, vanishing_at, PolyLayout},
    permutation,
};
use crate::poly_commit::{
    field_polynomial::{domain_elements, FpPolynomial},
    fri::{FriBatch, FriParams},
};
use crate::utils::batch_inverse;
use ark_poly::Radix2EvaluationDomain;
use ark_std::{cfg_iter, end_timer, start_timer};
use placeholder_algebra::prelude::*;
use placeholder_crypto::merkle_tree::MerkleDigest;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The tunable parameters of the proof system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderParams {
    /// Base-2 logarithm of the FRI blowup factor.
    pub expand_factor_log: usize,
    /// Folding rounds per committed FRI layer.
    pub fri_step: usize,
    /// Base-2 logarithm of the coefficients left after folding.
    pub final_degree_log: usize,
    /// Number of FRI queries.
    pub lambda: usize,
    /// Proof-of-work difficulty before the FRI queries.
    pub grinding_bits: u32,
    /// Permutation columns per running product.
    pub permutation_chunk_size: usize,
}

impl Default for PlaceholderParams {
    fn default() -> Self {
        Self {
            expand_factor_log: 2,
            fri_step: 1,
            final_degree_log: 1,
            lambda: 40,
            grinding_bits: 0,
            permutation_chunk_size: 8,
        }
    }
}

impl PlaceholderParams {
    /// The FRI parameters for polynomials with fewer than `rows_amount` coefficients.
    pub fn fri_params(&self, rows_amount: usize) -> Result<FriParams> {
        if self.fri_step == 0 {
            return Err(PlonkError::FriParamsError(
                "the FRI step must be positive".to_string(),
            ));
        }
        let log_rows = rows_amount.trailing_zeros() as usize;
        let rounds = log_rows.saturating_sub(self.final_degree_log).max(1);
        let mut step_list = vec![self.fri_step; rounds / self.fri_step];
        if rounds % self.fri_step != 0 {
            step_list.push(rounds % self.fri_step);
        }
        FriParams::new(
            rows_amount,
            self.expand_factor_log,
            step_list,
            self.lambda,
            self.grinding_bits,
        )
    }
}

/// What the verifier needs besides the constraint system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderVerifierParams<F> {
    /// Where the polynomials live.
    pub layout: PolyLayout,
    /// The FRI instance of the commitments.
    pub fri_params: FriParams,
    /// The commitment to the fixed batch.
    pub fixed_root: MerkleDigest,
    /// The generator of `H`.
    pub omega: F,
    /// The shift between the permutation identity columns.
    pub delta: F,
}

/// What the prover needs besides the constraint system.
#[derive(Debug, Clone)]
pub struct PlaceholderProverParams<F: Domain> {
    /// The verifier parameters.
    pub verifier_params: PlaceholderVerifierParams<F>,
    /// The committed fixed batch.
    pub fixed_batch: FriBatch<F>,
    /// The fixed polynomials on `H`.
    pub fixed_values: Vec<Vec<F>>,
    /// The fixed polynomials on the quotient coset.
    pub fixed_coset: Vec<Vec<F>>,
    /// The elements of `H`.
    pub group: Vec<F>,
    /// The elements of the quotient coset.
    pub coset_points: Vec<F>,
    /// `L_0` on the quotient coset.
    pub l0_coset: Vec<F>,
    /// `1 / Z_H` on the quotient coset, which only depends on the index modulo the blowup.
    pub z_h_inv: Vec<F>,
}

impl<F: Domain> PlaceholderProverParams<F> {
    /// The domain `H`.
    pub fn domain(&self) -> Result<Radix2EvaluationDomain<F::Field>> {
        domain_of::<F>(self.verifier_params.layout.desc.rows_amount)
    }

    /// The domain of the quotient coset.
    pub fn quotient_domain(&self) -> Result<Radix2EvaluationDomain<F::Field>> {
        domain_of::<F>(self.verifier_params.layout.quotient_domain_size())
    }
}

pub(crate) fn domain_of<F: Domain>(size: usize) -> Result<Radix2EvaluationDomain<F::Field>> {
    FpPolynomial::<F>::evaluation_domain(size).ok_or_else(|| {
        PlonkError::MalformedInput(format!("the field has no domain of size {}", size))
    })
}

/// The shift of the quotient coset.
pub(crate) fn quotient_shift<F: Scalar>() -> F {
    F::multiplicative_generator()
}

/// Compute the fixed polynomials of a circuit, commit to them and precompute the
/// quotient domain tables.
pub fn preprocess<F: Domain>(
    cs: &ConstraintSystem<F>,
    fixed: &FixedAssignment<F>,
    params: &PlaceholderParams,
) -> Result<PlaceholderProverParams<F>> {
    let preprocess_time = start_timer!(|| "Placeholder preprocessing");
    cs.check()?;
    let desc = &cs.table_description;
    let (constants, selectors) = fixed.padded(desc)?;
    cs.check_lookup_tags(&selectors)?;

    let layout = PolyLayout::new(cs, params.permutation_chunk_size)?;
    let fri_params = params.fri_params(desc.rows_amount)?;
    let n = desc.rows_amount;
    let u = desc.usable_rows_amount;

    let domain = domain_of::<F>(n)?;
    let omega = F::from_field(domain.group_gen);
    let delta = F::multiplicative_generator();
    let group = domain_elements(&domain, &F::one());

    let mut q_last = vec![F::zero(); n];
    q_last[u] = F::one();
    let mut q_blind = vec![F::zero(); n];
    q_blind[u + 1..].iter_mut().for_each(|v| *v = F::one());

    let mut fixed_values = constants;
    fixed_values.extend(selectors);
    fixed_values.extend(permutation::sigma_values(cs, &layout, &group, &delta));
    fixed_values.push(q_last);
    fixed_values.push(q_blind);

    let polys: Vec<FpPolynomial<F>> = cfg_iter!(fixed_values)
        .map(|values| FpPolynomial::ifft_with_domain(&domain, values))
        .collect();

    let quotient_domain = domain_of::<F>(layout.quotient_domain_size())?;
    let shift = quotient_shift::<F>();
    let fixed_coset: Vec<Vec<F>> = cfg_iter!(polys)
        .map(|p| p.coset_fft_with_domain(&quotient_domain, &shift))
        .collect();
    let coset_points = domain_elements(&quotient_domain, &shift);
    let l0_coset = first_lagrange_on(&coset_points, n)?;
    let blowup = layout.quotient_domain_size() / n;
    let mut z_h_inv: Vec<F> = coset_points[..blowup]
        .iter()
        .map(|x| vanishing_at(x, n))
        .collect();
    batch_inverse(&mut z_h_inv)?;

    let fixed_batch = FriBatch::commit(&fri_params, polys)?;
    let verifier_params = PlaceholderVerifierParams {
        layout,
        fri_params,
        fixed_root: fixed_batch.root(),
        omega,
        delta,
    };
    end_timer!(preprocess_time);

    Ok(PlaceholderProverParams {
        verifier_params,
        fixed_batch,
        fixed_values,
        fixed_coset,
        group,
        coset_points,
        l0_coset,
        z_h_inv,
    })
}

impl<F: Domain> From<PlaceholderProverParams<F>> for PlaceholderVerifierParams<F> {
    fn from(params: PlaceholderProverParams<F>) -> Self {
        params.verifier_params
    }
}

#[cfg(test)]
mod test {
    use crate::plonk::{
        constraint_system::{
            Cell, ColumnType, ConstraintSystemBuilder, Expression, FixedAssignment,
            TableDescription, Variable,
        },
        preprocessor::{preprocess, PlaceholderParams, PlaceholderVerifierParams},
    };
    use crate::poly_commit::field_polynomial::FpPolynomial;
    use placeholder_algebra::{bls12_381::BLSScalar, prelude::*};

    type F = BLSScalar;

    #[test]
    fn test_fri_params() {
        let params = PlaceholderParams::default();
        let fri = params.fri_params(16).unwrap();
        assert_eq!(fri.step_list, vec![1, 1, 1]);
        assert_eq!(fri.max_degree, 16);
        assert_eq!(fri.final_degree_bound(), 2);

        let fri = params.fri_params(2).unwrap();
        assert_eq!(fri.step_list, vec![1]);

        let params = PlaceholderParams {
            fri_step: 2,
            final_degree_log: 0,
            ..Default::default()
        };
        assert_eq!(params.fri_params(32).unwrap().step_list, vec![2, 2, 1]);

        let params = PlaceholderParams {
            fri_step: 0,
            ..Default::default()
        };
        assert!(params.fri_params(32).is_err());
    }

    #[test]
    fn test_preprocess() {
        let mut builder = ConstraintSystemBuilder::<F>::new();
        let w = |i: usize| Expression::<F>::from(Variable::witness(i));
        let mul = builder.add_gate(vec![w(0) * w(1) - w(2)]);
        builder.add_copy_constraint(
            Cell::new(ColumnType::Witness, 2, 0),
            Cell::new(ColumnType::Witness, 0, 1),
        );
        let cs = builder.build(TableDescription::new(3, 0, 0, 1, 5)).unwrap();
        let fixed = FixedAssignment {
            constants: vec![],
            selectors: vec![vec![F::one(); 2]],
        };
        assert_eq!(mul, 0);

        let params = PlaceholderParams::default();
        let prover_params = preprocess(&cs, &fixed, &params).unwrap();
        let layout = prover_params.verifier_params.layout;
        let n = layout.desc.rows_amount;
        assert_eq!(n, 8);
        assert_eq!(prover_params.fixed_values.len(), layout.batch_size(0));
        assert_eq!(prover_params.fixed_batch.num_polys(), layout.batch_size(0));
        assert_eq!(prover_params.coset_points.len(), layout.quotient_domain_size());

        // q_last and q_blind
        let q_last = &prover_params.fixed_values[layout.q_last().index];
        let q_blind = &prover_params.fixed_values[layout.q_blind().index];
        assert_eq!(q_last[5], F::one());
        assert_eq!(q_last.iter().filter(|v| !v.is_zero()).count(), 1);
        assert_eq!(q_blind[5], F::zero());
        assert_eq!(q_blind[6], F::one());
        assert_eq!(q_blind[7], F::one());

        // sigma swaps w2[0] and w0[1]
        let omega = prover_params.verifier_params.omega;
        let delta = prover_params.verifier_params.delta;
        let sigma0 = &prover_params.fixed_values[layout.sigma(0).index];
        let sigma2 = &prover_params.fixed_values[layout.sigma(2).index];
        assert_eq!(sigma0[1], delta * delta);
        assert_eq!(sigma2[0], omega);
        assert_eq!(sigma0[2], omega * omega);

        // the coset values agree with the committed polynomials
        let i = 3;
        let x = prover_params.coset_points[i];
        let poly = &prover_params.fixed_batch.polys[layout.q_last().index];
        assert_eq!(poly.eval(&x), prover_params.fixed_coset[layout.q_last().index][i]);
        let l0 = prover_params.l0_coset[i];
        let domain = FpPolynomial::<F>::evaluation_domain(n).unwrap();
        let mut first = vec![F::zero(); n];
        first[0] = F::one();
        assert_eq!(FpPolynomial::ifft_with_domain(&domain, &first).eval(&x), l0);

        let verifier_params: PlaceholderVerifierParams<F> = prover_params.into();
        let bytes = bincode::serialize(&verifier_params).unwrap();
        let decoded: PlaceholderVerifierParams<F> = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, verifier_params);

        // selectors must be boolean
        let bad = FixedAssignment {
            constants: vec![],
            selectors: vec![vec![F::from(2u32)]],
        };
        assert!(preprocess(&cs, &bad, &params).is_err());
    }
}
