use crate::errors::{PlonkError, Result};
use crate::plonk::{
    constraint_system::{pad_columns, ColumnType, ConstraintSystem},
    helpers::{
        all_constraints, combine_constraints, lagrange_at, opening_points, rotated_point,
        vanishing_at, OpenedValues, PlaceholderChallenges, PointEvaluator, PolyLayout,
    },
    preprocessor::PlaceholderVerifierParams,
    proof::PlaceholderProof,
    transcript::{
        transcript_get_challenge_alpha, transcript_get_challenge_beta_gamma,
        transcript_get_challenge_gate_theta, transcript_get_challenge_theta,
        transcript_get_challenge_y, transcript_init_placeholder,
    },
};
use crate::poly_commit::{
    lpc::{self, LpcClaim},
    transcript::PolyComTranscript,
};
use ark_std::{end_timer, start_timer};
use merlin::Transcript;
use placeholder_algebra::prelude::*;

/// Verify a Placeholder proof for the public inputs.
/// The transcript must have the same state as the prover's one.
///
/// Every check is evaluated before the result is returned; a failed check is reported as
/// [PlonkError::VerificationError], a constraint system that does not match the
/// parameters or badly shaped public inputs as [PlonkError::MalformedInput].
pub fn verifier<F: Domain>(
    transcript: &mut Transcript,
    cs: &ConstraintSystem<F>,
    verifier_params: &PlaceholderVerifierParams<F>,
    public_inputs: &[Vec<F>],
    proof: &PlaceholderProof<F>,
) -> Result<()> {
    let verifier_time = start_timer!(|| "Placeholder verifier");
    let layout = &verifier_params.layout;
    if PolyLayout::new(cs, layout.permutation_chunk_size)? != *layout {
        return Err(PlonkError::MalformedInput(
            "the parameters belong to another constraint system".to_string(),
        ));
    }
    let desc = &layout.desc;
    let n = desc.rows_amount;
    pad_columns(ColumnType::PublicInput, public_inputs, desc)?;
    if proof.lookup_commitment.is_some() != layout.has_lookups() {
        return Err(PlonkError::VerificationError);
    }

    transcript_init_placeholder(
        transcript,
        verifier_params,
        &cs.content_digest(),
        public_inputs,
    );
    let mut challenges = PlaceholderChallenges::default();
    compute_challenges(&mut challenges, transcript, proof, n);

    let points = opening_points(cs, layout);
    if proof.evaluations.len() != points.len() {
        return Err(PlonkError::VerificationError);
    }
    transcript.append_field_elems(&proof.evaluations);

    let y = challenges.y;
    let omega = verifier_params.omega;
    let max_public_rows = public_inputs.iter().map(|c| c.len()).max().unwrap_or(0);
    let lagrange = lagrange_at(&y, &omega, n, max_public_rows.max(1))?;
    let opened = OpenedValues::new(&points, &proof.evaluations, y, lagrange[0]);

    // 1. the public input columns interpolate the public inputs
    let public_inputs_ok = public_inputs.iter().enumerate().all(|(i, column)| {
        let expected: F = column
            .iter()
            .zip(lagrange.iter())
            .map(|(v, l)| *v * l)
            .sum();
        opened.poly(layout.public_input(i), 0) == expected
    });

    // 2. the combined constraint is a multiple of Z_H
    let constraints = all_constraints(cs, layout, &verifier_params.delta, &challenges, &opened);
    let combined = combine_constraints(&constraints, &challenges.alpha);
    let y_n = y.pow(&[n as u64]);
    let mut y_power = F::one();
    let mut quotient = F::zero();
    for i in 0..layout.quotient_parts {
        quotient.add_assign(&(opened.poly(layout.quotient(i), 0) * y_power));
        y_power.mul_assign(&y_n);
    }
    let quotient_ok = combined == vanishing_at(&y, n) * quotient;

    // 3. the opened values are the committed ones
    let claims: Vec<LpcClaim<F>> = points
        .iter()
        .zip(proof.evaluations.iter())
        .map(|((p, rotation), value)| LpcClaim {
            batch: layout.batch_position(p.batch),
            poly: p.index,
            point: rotated_point(&y, &omega, n, *rotation),
            value: *value,
        })
        .collect();
    let roots = proof.commitments(&verifier_params.fixed_root);
    let batch_sizes: Vec<usize> = layout
        .batches()
        .iter()
        .map(|b| layout.batch_size(*b))
        .collect();
    let lpc_ok = lpc::verify(
        transcript,
        &verifier_params.fri_params,
        &roots,
        &batch_sizes,
        &claims,
        &proof.eval_proof,
    );
    end_timer!(verifier_time);

    if public_inputs_ok && quotient_ok && lpc_ok {
        Ok(())
    } else {
        Err(PlonkError::VerificationError)
    }
}

fn compute_challenges<F: Scalar>(
    challenges: &mut PlaceholderChallenges<F>,
    transcript: &mut Transcript,
    proof: &PlaceholderProof<F>,
    n: usize,
) {
    // 1. compute the compression challenge.
    transcript.append_commitment(&proof.witness_commitment);
    challenges.theta = transcript_get_challenge_theta(transcript, n);

    // 2. compute the permutation and lookup challenges.
    if let Some(root) = &proof.lookup_commitment {
        transcript.append_commitment(root);
    }
    let [beta, gamma, beta_lookup, gamma_lookup, delta_lookup] =
        transcript_get_challenge_beta_gamma(transcript, n);
    challenges.beta = beta;
    challenges.gamma = gamma;
    challenges.beta_lookup = beta_lookup;
    challenges.gamma_lookup = gamma_lookup;
    challenges.delta_lookup = delta_lookup;

    // 3. compute the gate and combination challenges.
    transcript.append_commitment(&proof.running_products_commitment);
    challenges.theta_gate = transcript_get_challenge_gate_theta(transcript, n);
    challenges.alpha = transcript_get_challenge_alpha(transcript, n);

    // 4. compute the evaluation point.
    transcript.append_commitment(&proof.quotient_commitment);
    challenges.y = transcript_get_challenge_y(transcript, n);
}
