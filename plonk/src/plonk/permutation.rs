//! The copy-constraint argument.
//!
//! The `m` permutation columns `f_j` are split into parts of at most
//! `permutation_chunk_size` columns. With `id_j(X) = delta^j X` and the committed
//! `sigma_j`, every part `p` contributes
//!
//! `g_p = prod_j (f_j + beta id_j + gamma)` and `h_p = prod_j (f_j + beta sigma_j + gamma)`,
//!
//! and the running products `U_0 = V, U_1, ..., U_{P-1}` chain the parts of a row
//! while `V` chains the rows: `U_{p+1} = U_p g_p / h_p` with `U_P = V(wX)`.
use crate::errors::Result;
use crate::plonk::{
    constraint_system::{Cell, ColumnType, ConstraintSystem, CopyConstraint},
    helpers::{PointEvaluator, PolyLayout},
};
use crate::utils::batch_inverse;
use ark_std::{cfg_into_iter, collections::BTreeMap};
use placeholder_algebra::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

fn position(layout: &PolyLayout, cell: &Cell) -> usize {
    let desc = &layout.desc;
    let column = match cell.column_type {
        ColumnType::Witness => cell.index,
        ColumnType::PublicInput => desc.witness_columns + cell.index,
        _ => desc.witness_columns + desc.public_input_columns + cell.index,
    };
    column * desc.rows_amount + cell.row
}

fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

/// Compute the permutation implied by the copy constraints over the positions
/// `j * rows_amount + i`. Every class of equal cells becomes one cycle, visited in
/// position order; other positions are fixed points.
pub(crate) fn compute_permutation<F: Scalar>(
    cs: &ConstraintSystem<F>,
    layout: &PolyLayout,
) -> Vec<usize> {
    let size = layout.permutation_columns * layout.desc.rows_amount;
    let mut parent: Vec<usize> = (0..size).collect();
    for CopyConstraint(a, b) in cs.copy_constraints.iter() {
        let ra = find(&mut parent, position(layout, a));
        let rb = find(&mut parent, position(layout, b));
        if ra != rb {
            parent[ra.max(rb)] = ra.min(rb);
        }
    }

    let mut perm: Vec<usize> = (0..size).collect();
    // first and last position of every class seen so far
    let mut ends: BTreeMap<usize, (usize, usize)> = BTreeMap::new();
    for i in 0..size {
        let class = find(&mut parent, i);
        match ends.get_mut(&class) {
            Some((_, prev)) => {
                perm[*prev] = i;
                *prev = i;
            }
            None => {
                ends.insert(class, (i, i));
            }
        }
    }
    for (first, last) in ends.into_values() {
        perm[last] = first;
    }
    perm
}

/// The values of `sigma_j` on `H`, given the elements `w^i` of `H`.
pub(crate) fn sigma_values<F: Scalar>(
    cs: &ConstraintSystem<F>,
    layout: &PolyLayout,
    group: &[F],
    delta: &F,
) -> Vec<Vec<F>> {
    let n = layout.desc.rows_amount;
    let perm = compute_permutation(cs, layout);
    let delta_powers = powers(delta, layout.permutation_columns);
    perm.chunks(n)
        .map(|column| {
            column
                .iter()
                .map(|target| delta_powers[target / n] * group[target % n])
                .collect()
        })
        .collect()
}

fn powers<F: Scalar>(base: &F, count: usize) -> Vec<F> {
    let mut acc = F::one();
    (0..count)
        .map(|_| {
            let current = acc;
            acc.mul_assign(base);
            current
        })
        .collect()
}

/// Compute the running products `V, U_1, ..., U_{P-1}` on `H`.
///
/// `columns` and `sigmas` are the values of `f_j` and `sigma_j` on `H`. `V` is defined
/// on the rows `0..=u` and `U_p` on the rows `0..u`, the other rows are random.
#[allow(clippy::too_many_arguments)]
pub(crate) fn prove_eval<F: Scalar, R: CryptoRng + RngCore>(
    prng: &mut R,
    layout: &PolyLayout,
    columns: &[&[F]],
    sigmas: &[&[F]],
    group: &[F],
    delta: &F,
    beta: &F,
    gamma: &F,
) -> Result<Vec<Vec<F>>> {
    let n = layout.desc.rows_amount;
    let u = layout.desc.usable_rows_amount;
    let parts = layout.permutation_parts();
    let delta_powers = powers(delta, layout.permutation_columns);

    // (g_p, h_p) of every part of every usable row
    let factors: Vec<Vec<(F, F)>> = cfg_into_iter!(0..u)
        .map(|i| {
            (0..parts)
                .map(|p| {
                    let mut g = F::one();
                    let mut h = F::one();
                    for j in layout.part_columns(p) {
                        let f = columns[j][i] + gamma;
                        g.mul_assign(&(f + *beta * delta_powers[j] * group[i]));
                        h.mul_assign(&(f + *beta * sigmas[j][i]));
                    }
                    (g, h)
                })
                .collect()
        })
        .collect();
    let mut h_inv: Vec<F> = factors.iter().flatten().map(|(_, h)| *h).collect();
    batch_inverse(&mut h_inv)?;

    let mut products = vec![vec![F::zero(); n]; parts];
    let mut acc = F::one();
    for (i, row) in factors.iter().enumerate() {
        for (p, (g, _)) in row.iter().enumerate() {
            products[p][i] = acc;
            acc = acc * g * h_inv[i * parts + p];
        }
    }
    products[0][u] = acc;

    for (p, product) in products.iter_mut().enumerate() {
        let start = if p == 0 { u + 1 } else { u };
        for value in product.iter_mut().skip(start) {
            *value = F::random(prng);
        }
    }
    Ok(products)
}

/// The permutation constraints at a point:
/// `L_0 (1 - V)`, then for every part
/// `(1 - q_last - q_blind) (U_p g_p - U_{p+1} h_p)`, then `q_last (V^2 - V)`.
pub(crate) fn constraints_at<F: Scalar, E: PointEvaluator<F>>(
    layout: &PolyLayout,
    delta: &F,
    beta: &F,
    gamma: &F,
    eval: &E,
) -> Vec<F> {
    let parts = layout.permutation_parts();
    let one = F::one();
    let q_last = eval.poly(layout.q_last(), 0);
    let active = one - q_last - eval.poly(layout.q_blind(), 0);
    let v = eval.poly(layout.permutation_product(), 0);
    let v_next = eval.poly(layout.permutation_product(), 1);
    let beta_x = *beta * eval.x();

    let mut values = Vec::with_capacity(parts + 2);
    values.push(eval.l0() * (one - v));

    let mut delta_power = F::one();
    let mut u_p = v;
    for p in 0..parts {
        let mut g = F::one();
        let mut h = F::one();
        for j in layout.part_columns(p) {
            let f = eval.poly(layout.permutation_column(j), 0) + gamma;
            g.mul_assign(&(f + beta_x * delta_power));
            h.mul_assign(&(f + *beta * eval.poly(layout.sigma(j), 0)));
            delta_power.mul_assign(delta);
        }
        let u_next = if p + 1 == parts {
            v_next
        } else {
            eval.poly(layout.part_product(p + 1), 0)
        };
        values.push(active * (u_p * g - u_next * h));
        u_p = u_next;
    }

    values.push(q_last * (v * v - v));
    values
}

/// The largest degree of the permutation constraints in the committed polynomials.
pub(crate) fn max_degree(layout: &PolyLayout) -> usize {
    2 + layout.permutation_chunk_size.min(layout.permutation_columns).max(1)
}

#[cfg(test)]
mod test {
    use crate::plonk::{
        constraint_system::{Cell, ColumnType, ConstraintSystemBuilder, TableDescription},
        helpers::PolyLayout,
        permutation::{compute_permutation, max_degree, prove_eval, sigma_values},
    };
    use placeholder_algebra::{bls12_381::BLSScalar, prelude::*};
    use rand_chacha::ChaChaRng;

    type F = BLSScalar;

    #[test]
    fn test_compute_permutation() {
        let mut builder = ConstraintSystemBuilder::<F>::new();
        let w = |i, row| Cell::new(ColumnType::Witness, i, row);
        builder.add_copy_constraint(w(0, 0), w(1, 2));
        builder.add_copy_constraint(w(1, 2), Cell::new(ColumnType::PublicInput, 0, 1));
        builder.add_copy_constraint(w(0, 1), w(0, 2));
        let cs = builder.build(TableDescription::new(2, 1, 0, 0, 3)).unwrap();
        let layout = PolyLayout::new(&cs, 2).unwrap();
        let n = layout.desc.rows_amount;

        let perm = compute_permutation(&cs, &layout);
        assert_eq!(perm.len(), 3 * n);
        // cycle w0[0] -> w1[2] -> pi0[1] -> w0[0]
        assert_eq!(perm[0], n + 2);
        assert_eq!(perm[n + 2], 2 * n + 1);
        assert_eq!(perm[2 * n + 1], 0);
        // cycle w0[1] <-> w0[2]
        assert_eq!(perm[1], 2);
        assert_eq!(perm[2], 1);
        assert_eq!(perm[3], 3);
        assert_eq!(perm[n], n);

        let mut sorted = perm.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..3 * n).collect::<Vec<_>>());
        assert_eq!(max_degree(&layout), 4);
    }

    #[test]
    fn test_running_product() {
        let mut prng = ChaChaRng::from_seed([1u8; 32]);
        let mut builder = ConstraintSystemBuilder::<F>::new();
        let w = |i, row| Cell::new(ColumnType::Witness, i, row);
        builder.add_copy_constraint(w(0, 0), w(2, 1));
        builder.add_copy_constraint(w(1, 2), w(0, 1));
        let cs = builder.build(TableDescription::new(3, 0, 0, 0, 5)).unwrap();
        let layout = PolyLayout::new(&cs, 2).unwrap();
        let n = layout.desc.rows_amount;
        let u = layout.desc.usable_rows_amount;

        let omega = F::from(7u32);
        let group: Vec<F> = (0..n as u64).map(|i| omega.pow(&[i])).collect();
        let delta = F::multiplicative_generator();
        let sigmas = sigma_values(&cs, &layout, &group, &delta);

        let mut columns: Vec<Vec<F>> = (0..3)
            .map(|_| (0..n).map(|_| F::random(&mut prng)).collect())
            .collect();
        columns[2][1] = columns[0][0];
        columns[0][1] = columns[1][2];

        let beta = F::random(&mut prng);
        let gamma = F::random(&mut prng);
        let run = |columns: &[Vec<F>], prng: &mut ChaChaRng| {
            let column_refs: Vec<&[F]> = columns.iter().map(|c| c.as_slice()).collect();
            let sigma_refs: Vec<&[F]> = sigmas.iter().map(|c| c.as_slice()).collect();
            prove_eval(
                prng,
                &layout,
                &column_refs,
                &sigma_refs,
                &group,
                &delta,
                &beta,
                &gamma,
            )
            .unwrap()
        };

        let products = run(&columns, &mut prng);
        assert_eq!(products.len(), 2);
        assert_eq!(products[0][0], F::one());
        assert_eq!(products[0][u], F::one());

        // rows past the usable ones are not part of the argument
        columns[1][u] = F::from(99u32);
        assert_eq!(run(&columns, &mut prng)[0][u], F::one());

        columns[0][1] = columns[0][1] + F::one();
        assert_ne!(run(&columns, &mut prng)[0][u], F::one());
    }
}
