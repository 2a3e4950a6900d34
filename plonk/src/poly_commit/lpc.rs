//! List polynomial commitment: polynomials are committed in batches of Merkle-hashed
//! evaluations over the FRI domain, and a list of evaluation claims is proven by testing
//! that `Q(X) = sum_k lambda^k (P_k(X) - v_k) / (X - z_k)` has low degree.
use crate::errors::{PlonkError, Result};
use crate::poly_commit::{
    field_polynomial::domain_elements,
    fri::{self, verify_batch_opening, FriBatch, FriParams, FriProof},
    transcript::PolyComTranscript,
};
use crate::utils::batch_inverse;
use ark_std::{cfg_iter, cfg_iter_mut};
use merlin::Transcript;
use placeholder_algebra::prelude::*;
use placeholder_crypto::merkle_tree::MerkleDigest;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The claim `P(point) = value` about the `poly`-th polynomial of the `batch`-th batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LpcClaim<F> {
    /// Index of the batch.
    pub batch: usize,
    /// Index of the polynomial inside the batch.
    pub poly: usize,
    /// The evaluation point.
    pub point: F,
    /// The claimed value.
    pub value: F,
}

/// The LPC evaluation proof is the FRI proof of the combined quotient.
pub type LpcProof<F> = FriProof<F>;

/// Distinct opening points, and for every claim the index of its point.
fn distinct_points<F: Scalar>(claims: &[LpcClaim<F>]) -> (Vec<F>, Vec<usize>) {
    let points: Vec<F> = claims.iter().map(|c| c.point).sorted().dedup().collect();
    let indices = claims
        .iter()
        .map(|c| points.binary_search(&c.point).unwrap_or_default())
        .collect();
    (points, indices)
}

/// Prove every claim against the committed batches.
pub fn prove<F: Domain>(
    transcript: &mut Transcript,
    params: &FriParams,
    batches: &[&FriBatch<F>],
    claims: &[LpcClaim<F>],
) -> Result<LpcProof<F>> {
    for claim in claims {
        if batches
            .get(claim.batch)
            .map_or(true, |b| claim.poly >= b.num_polys())
        {
            return Err(PlonkError::MalformedInput(format!(
                "no polynomial {} in batch {}",
                claim.poly, claim.batch
            )));
        }
    }
    let lambda: F = transcript.get_challenge_field_elem(b"LPC lambda");

    let domain = params.domain::<F>()?;
    let xs = domain_elements(&domain, &FriParams::shift::<F>());
    let (points, point_index) = distinct_points(claims);
    let denominators = cfg_iter!(points)
        .map(|z| {
            let mut d: Vec<F> = xs.iter().map(|x| *x - z).collect();
            batch_inverse(&mut d)?;
            Ok(d)
        })
        .collect::<Result<Vec<Vec<F>>>>()?;

    let mut combined = vec![F::zero(); xs.len()];
    let mut coef = F::one();
    for (claim, p) in claims.iter().zip(point_index.iter()) {
        let evals = &batches[claim.batch].evals[claim.poly];
        let inv = &denominators[*p];
        cfg_iter_mut!(combined)
            .enumerate()
            .for_each(|(i, q)| q.add_assign(&(coef * (evals[i] - claim.value) * inv[i])));
        coef.mul_assign(&lambda);
    }

    fri::prove_eval(transcript, params, combined, |leaf| {
        batches.iter().map(|b| b.open(leaf)).collect()
    })
}

/// Verify the claims against the batch roots. `batch_sizes[b]` is the number of
/// polynomials committed under `roots[b]`.
pub fn verify<F: Domain>(
    transcript: &mut Transcript,
    params: &FriParams,
    roots: &[MerkleDigest],
    batch_sizes: &[usize],
    claims: &[LpcClaim<F>],
    proof: &LpcProof<F>,
) -> bool {
    if roots.len() != batch_sizes.len()
        || claims.iter().any(|c| {
            batch_sizes
                .get(c.batch)
                .map_or(true, |size| c.poly >= *size)
        })
    {
        return false;
    }
    let lambda: F = transcript.get_challenge_field_elem(b"LPC lambda");

    let domain = match params.domain::<F>() {
        Ok(domain) => domain,
        Err(_) => return false,
    };
    let fiber_width = params.fiber_width(0);
    let num_leaves = params.num_initial_leaves();
    let (points, point_index) = distinct_points(claims);

    fri::verify_eval(transcript, params, proof, |leaf, openings| {
        if openings.len() != roots.len() {
            return Err(PlonkError::VerificationError);
        }
        for ((root, opening), size) in roots.iter().zip(openings).zip(batch_sizes) {
            if !verify_batch_opening(root, opening, leaf, *size, fiber_width) {
                return Err(PlonkError::VerificationError);
            }
        }

        let mut fiber = Vec::with_capacity(fiber_width);
        for t in 0..fiber_width {
            let x = params.point::<F>(&domain, leaf + t * num_leaves);
            let mut inv: Vec<F> = points.iter().map(|z| x - z).collect();
            batch_inverse(&mut inv)?;

            let mut coef = F::one();
            let mut value = F::zero();
            for (claim, p) in claims.iter().zip(point_index.iter()) {
                let size = batch_sizes[claim.batch];
                let opened = openings[claim.batch].values[t * size + claim.poly];
                value.add_assign(&(coef * (opened - claim.value) * inv[*p]));
                coef.mul_assign(&lambda);
            }
            fiber.push(value);
        }
        Ok(fiber)
    })
}
