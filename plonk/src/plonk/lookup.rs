//! The lookup argument.
//!
//! Every lookup constraint `l` compresses its tuple into
//! `A_l = q_g (sum_j theta^j e_j + theta^k table_id)`, and the tables are compressed into
//! `S = sum_t q_t (sum_j theta^j c_{t,j} + theta^k t)`. The prover commits `A'_l`, a sorted
//! permutation of `A_l`, and `S'_l`, a permutation of `S` that agrees with `A'_l` on the
//! first row of every run of equal values. The running product `V_L` proves that both
//! pairs are permutations, and the last constraint that every run starts on a table row.
use crate::errors::Result;
use crate::plonk::{
    constraint_system::{ConstraintSystem, Expression},
    helpers::{DomainTable, PlaceholderChallenges, PointEvaluator, PolyLayout},
};
use crate::utils::batch_inverse;
use ark_std::{cfg_into_iter, collections::BTreeMap};
use placeholder_algebra::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The lookup columns of a proof, as values on `H`.
pub(crate) struct LookupColumns<F> {
    /// `A_l` for every lookup constraint.
    pub(crate) inputs: Vec<Vec<F>>,
    /// `S`.
    pub(crate) table: Vec<F>,
    /// `A'_0, S'_0, A'_1, S'_1, ...`, the lookup batch.
    pub(crate) sorted: Vec<Vec<F>>,
}

fn compress<F: Scalar>(values: impl Iterator<Item = F>, theta: &F) -> F {
    let mut power = F::one();
    let mut acc = F::zero();
    for v in values {
        acc.add_assign(&(power * v));
        power.mul_assign(theta);
    }
    acc
}

/// `A_l` for every lookup constraint at a point.
pub(crate) fn compressed_inputs<F: Scalar, E: PointEvaluator<F>>(
    cs: &ConstraintSystem<F>,
    layout: &PolyLayout,
    theta: &F,
    eval: &E,
) -> Vec<F> {
    cs.lookup_constraints()
        .map(|(selector, c)| {
            let tuple = c
                .lookup_input
                .iter()
                .map(|e: &Expression<F>| eval.expression(layout, e))
                .chain(ark_std::iter::once(F::from(c.table_id as u64)));
            eval.poly(layout.selector(selector), 0) * compress(tuple, theta)
        })
        .collect()
}

/// `S` at a point.
pub(crate) fn compressed_table<F: Scalar, E: PointEvaluator<F>>(
    cs: &ConstraintSystem<F>,
    layout: &PolyLayout,
    theta: &F,
    eval: &E,
) -> F {
    cs.lookup_tables
        .iter()
        .enumerate()
        .map(|(t, table)| {
            let tuple = table
                .columns
                .iter()
                .map(|c| eval.poly(layout.constant(*c), 0))
                .chain(ark_std::iter::once(F::from(t as u64 + 1)));
            eval.poly(layout.selector(table.tag_index), 0) * compress(tuple, theta)
        })
        .sum()
}

/// Sort the first `u` values of an input column, and arrange the table values so that
/// every run of equal inputs starts on an equal table value. Rows from `u` on are random.
pub(crate) fn sort_columns<F: Scalar, R: CryptoRng + RngCore>(
    prng: &mut R,
    input: &[F],
    table: &[F],
    u: usize,
) -> (Vec<F>, Vec<F>) {
    let n = input.len();
    let mut sorted_input: Vec<F> = input[..u].iter().copied().sorted().collect();
    let mut counts: BTreeMap<F, usize> = BTreeMap::new();
    for v in table[..u].iter() {
        *counts.entry(*v).or_default() += 1;
    }

    let mut sorted_table: Vec<Option<F>> = vec![None; u];
    for i in 0..u {
        if i > 0 && sorted_input[i] == sorted_input[i - 1] {
            continue;
        }
        if let Some(count) = counts.get_mut(&sorted_input[i]) {
            if *count > 0 {
                *count -= 1;
                sorted_table[i] = Some(sorted_input[i]);
            }
        }
    }
    let mut leftovers = counts
        .into_iter()
        .flat_map(|(v, count)| ark_std::iter::repeat(v).take(count));
    let mut sorted_table: Vec<F> = sorted_table
        .into_iter()
        .map(|v| v.or_else(|| leftovers.next()).unwrap_or_default())
        .collect();

    for _ in u..n {
        sorted_input.push(F::random(prng));
        sorted_table.push(F::random(prng));
    }
    (sorted_input, sorted_table)
}

/// Compress the inputs and the tables on `H` and build the lookup batch.
pub(crate) fn prove_sorted<F: Scalar, R: CryptoRng + RngCore>(
    prng: &mut R,
    cs: &ConstraintSystem<F>,
    layout: &PolyLayout,
    table: &DomainTable<'_, F>,
    theta: &F,
) -> LookupColumns<F> {
    let n = table.size();
    let u = layout.desc.usable_rows_amount;
    let rows: Vec<(Vec<F>, F)> = cfg_into_iter!(0..n)
        .map(|i| {
            let row = table.row(i);
            (
                compressed_inputs(cs, layout, theta, &row),
                compressed_table(cs, layout, theta, &row),
            )
        })
        .collect();
    let inputs: Vec<Vec<F>> = (0..layout.lookup_inputs)
        .map(|l| rows.iter().map(|(a, _)| a[l]).collect())
        .collect();
    let compressed: Vec<F> = rows.iter().map(|(_, s)| *s).collect();

    let mut sorted = Vec::with_capacity(2 * inputs.len());
    for input in inputs.iter() {
        let (a, s) = sort_columns(prng, input, &compressed, u);
        sorted.push(a);
        sorted.push(s);
    }
    LookupColumns {
        inputs,
        table: compressed,
        sorted,
    }
}

/// Compute `V_L` on `H`: one on the first row, then
/// `V_L(w^{i+1}) = V_L(w^i) prod_l (A_l + beta)(S + gamma) / ((A'_l + beta)(S'_l + gamma))`
/// on the usable rows, and random after the last usable row.
pub(crate) fn prove_running_product<F: Scalar, R: CryptoRng + RngCore>(
    prng: &mut R,
    layout: &PolyLayout,
    columns: &LookupColumns<F>,
    beta: &F,
    gamma: &F,
) -> Result<Vec<F>> {
    let n = layout.desc.rows_amount;
    let u = layout.desc.usable_rows_amount;
    let (numerators, mut denominators): (Vec<F>, Vec<F>) = cfg_into_iter!(0..u)
        .map(|i| {
            let mut num = F::one();
            let mut den = F::one();
            for l in 0..columns.inputs.len() {
                num.mul_assign(&((columns.inputs[l][i] + beta) * (columns.table[i] + gamma)));
                den.mul_assign(
                    &((columns.sorted[2 * l][i] + beta) * (columns.sorted[2 * l + 1][i] + gamma)),
                );
            }
            (num, den)
        })
        .unzip();
    batch_inverse(&mut denominators)?;

    let mut product = Vec::with_capacity(n);
    let mut acc = F::one();
    product.push(acc);
    for (num, den_inv) in numerators.iter().zip(denominators.iter()) {
        acc = acc * num * den_inv;
        product.push(acc);
    }
    while product.len() < n {
        product.push(F::random(prng));
    }
    Ok(product)
}

/// The lookup constraints at a point:
/// `L_0 (1 - V_L)`, `q_last (V_L^2 - V_L)`,
/// `(1 - q_last - q_blind) (V_L(wX) prod (A' + beta)(S' + gamma) - V_L prod (A + beta)(S + gamma))`
/// and `sum_l delta^l (A'_l - S'_l) (L_0 + (1 - q_last - q_blind - L_0)(A'_l - A'_l(X/w)))`.
pub(crate) fn constraints_at<F: Scalar, E: PointEvaluator<F>>(
    cs: &ConstraintSystem<F>,
    layout: &PolyLayout,
    challenges: &PlaceholderChallenges<F>,
    eval: &E,
) -> Vec<F> {
    let one = F::one();
    let l0 = eval.l0();
    let q_last = eval.poly(layout.q_last(), 0);
    let active = one - q_last - eval.poly(layout.q_blind(), 0);
    let v = eval.poly(layout.lookup_product(), 0);
    let v_next = eval.poly(layout.lookup_product(), 1);

    let inputs = compressed_inputs(cs, layout, &challenges.theta, eval);
    let table = compressed_table(cs, layout, &challenges.theta, eval);

    let mut lhs = v_next;
    let mut rhs = v;
    let mut runs = F::zero();
    let mut delta_power = F::one();
    for (l, input) in inputs.iter().enumerate() {
        let sorted_input = eval.poly(layout.sorted_input(l), 0);
        let previous_input = eval.poly(layout.sorted_input(l), -1);
        let sorted_table = eval.poly(layout.sorted_table(l), 0);
        lhs.mul_assign(
            &((sorted_input + challenges.beta_lookup) * (sorted_table + challenges.gamma_lookup)),
        );
        rhs.mul_assign(&((*input + challenges.beta_lookup) * (table + challenges.gamma_lookup)));
        runs.add_assign(
            &(delta_power
                * (sorted_input - sorted_table)
                * (l0 + (active - l0) * (sorted_input - previous_input))),
        );
        delta_power.mul_assign(&challenges.delta_lookup);
    }

    vec![
        l0 * (one - v),
        q_last * (v * v - v),
        active * (lhs - rhs),
        runs,
    ]
}

/// The largest degree of the lookup constraints in the committed polynomials.
pub(crate) fn max_degree<F: Scalar>(cs: &ConstraintSystem<F>) -> usize {
    if cs.lookup_gates.is_empty() {
        return 0;
    }
    let inputs: usize = cs
        .lookup_constraints()
        .map(|(_, c)| {
            let degree = c.lookup_input.iter().map(|e| e.degree()).max().unwrap_or(0);
            1 + degree + 2
        })
        .sum();
    (2 + inputs).max(3)
}

#[cfg(test)]
mod test {
    use crate::plonk::{
        constraint_system::{
            ConstraintSystemBuilder, Expression, LookupConstraint, TableDescription, Variable,
        },
        lookup::{max_degree, sort_columns},
    };
    use placeholder_algebra::{bls12_381::BLSScalar, prelude::*};
    use rand_chacha::ChaChaRng;

    type F = BLSScalar;

    fn runs_start_on_table(a: &[F], s: &[F], u: usize) -> bool {
        (0..u).all(|i| a[i] == s[i] || (i > 0 && a[i] == a[i - 1]))
    }

    #[test]
    fn test_sort_columns() {
        let mut prng = ChaChaRng::from_seed([2u8; 32]);
        let f = |v: u32| F::from(v);
        let u = 6;
        let table = vec![f(0), f(1), f(4), f(9), f(0), f(0), f(77), f(78)];
        let input = vec![f(4), f(0), f(4), f(9), f(0), f(4), f(55), f(56)];

        let (a, s) = sort_columns(&mut prng, &input, &table, u);
        assert_eq!(a.len(), 8);
        assert_eq!(s.len(), 8);
        assert_eq!(
            a[..u].to_vec(),
            input[..u].iter().copied().sorted().collect::<Vec<F>>()
        );
        assert_eq!(
            s[..u].iter().copied().sorted().collect::<Vec<F>>(),
            table[..u].iter().copied().sorted().collect::<Vec<F>>()
        );
        assert!(runs_start_on_table(&a, &s, u));

        // 5 is not in the table
        let mut bad = input.clone();
        bad[1] = f(5);
        let (a, s) = sort_columns(&mut prng, &bad, &table, u);
        assert!(!runs_start_on_table(&a, &s, u));
    }

    #[test]
    fn test_max_degree() {
        let mut builder = ConstraintSystemBuilder::<F>::new();
        let t = builder.add_lookup_table("t", vec![0]);
        let w = |i: usize| Expression::<F>::from(Variable::witness(i));
        builder.add_lookup_gate(vec![
            LookupConstraint {
                table_id: t,
                lookup_input: vec![w(0)],
            },
            LookupConstraint {
                table_id: t,
                lookup_input: vec![w(0) * w(1)],
            },
        ]);
        let cs = builder.build(TableDescription::new(2, 0, 1, 2, 4)).unwrap();
        // 2 + (1 + 1 + 2) + (1 + 2 + 2)
        assert_eq!(max_degree(&cs), 11);

        let cs = ConstraintSystemBuilder::<F>::new()
            .build(TableDescription::new(1, 0, 0, 0, 4))
            .unwrap();
        assert_eq!(max_degree(&cs), 0);
    }
}
