use crate::errors::{PlonkError, Result};
use crate::plonk::{
    constraint_system::{AssignmentTable, ConstraintSystem},
    helpers::{
        all_constraints, combine_constraints, opening_points, rotated_point, DomainTable,
        PlaceholderChallenges, PolyLayout, PolyRef, FIXED_BATCH, LOOKUP_BATCH, RUNNING_BATCH,
        WITNESS_BATCH,
    },
    lookup, permutation,
    preprocessor::{quotient_shift, PlaceholderProverParams},
    proof::PlaceholderProof,
    transcript::{
        transcript_get_challenge_alpha, transcript_get_challenge_beta_gamma,
        transcript_get_challenge_gate_theta, transcript_get_challenge_theta,
        transcript_get_challenge_y, transcript_init_placeholder,
    },
};
use crate::poly_commit::{
    field_polynomial::FpPolynomial,
    fri::{FriBatch, FriParams},
    lpc::{self, LpcClaim},
    transcript::PolyComTranscript,
};
use ark_poly::Radix2EvaluationDomain;
use ark_std::{cfg_into_iter, cfg_iter, end_timer, start_timer};
use merlin::Transcript;
use placeholder_algebra::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The columns the prover committed to, as values on `H`.
#[allow(dead_code)]
pub(crate) struct ProverTables<F> {
    /// Witness columns, then public input columns.
    pub(crate) witness: Vec<Vec<F>>,
    /// The sorted lookup columns.
    pub(crate) lookup: Vec<Vec<F>>,
    /// The running products.
    pub(crate) running: Vec<Vec<F>>,
}

/// Placeholder prover: it produces a proof that `table` satisfies the constraint system
/// `cs`. The verifier must use a transcript with the same state as the prover.
/// It returns [PlonkError] if the table does not fit the constraint system, or if the
/// parameters were not computed for `cs`.
///
/// With the `debug` feature, the assignment is checked against every constraint first.
pub fn prover<R: CryptoRng + RngCore, F: Domain>(
    prng: &mut R,
    transcript: &mut Transcript,
    cs: &ConstraintSystem<F>,
    prover_params: &PlaceholderProverParams<F>,
    table: &AssignmentTable<F>,
) -> Result<PlaceholderProof<F>> {
    #[cfg(feature = "debug")]
    {
        let layout = &prover_params.verifier_params.layout;
        let u = layout.desc.usable_rows_amount;
        let usable = |p: PolyRef| {
            prover_params.fixed_values[p.index][..u].to_vec()
        };
        let fixed = crate::plonk::constraint_system::FixedAssignment {
            constants: (0..layout.desc.constant_columns)
                .map(|i| usable(layout.constant(i)))
                .collect(),
            selectors: (0..layout.desc.selector_columns)
                .map(|i| usable(layout.selector(i)))
                .collect(),
        };
        cs.verify_assignment(&fixed, table)?;
    }
    prove_with_tables(prng, transcript, cs, prover_params, table).map(|(proof, _, _)| proof)
}

fn commit_values<F: Domain>(
    fri_params: &FriParams,
    domain: &Radix2EvaluationDomain<F::Field>,
    values: &[Vec<F>],
) -> Result<FriBatch<F>> {
    let polys: Vec<FpPolynomial<F>> = cfg_iter!(values)
        .map(|v| FpPolynomial::ifft_with_domain(domain, v))
        .collect();
    FriBatch::commit(fri_params, polys)
}

/// Run the prover and also return the committed columns and the challenges.
pub(crate) fn prove_with_tables<R: CryptoRng + RngCore, F: Domain>(
    prng: &mut R,
    transcript: &mut Transcript,
    cs: &ConstraintSystem<F>,
    prover_params: &PlaceholderProverParams<F>,
    table: &AssignmentTable<F>,
) -> Result<(PlaceholderProof<F>, ProverTables<F>, PlaceholderChallenges<F>)> {
    let prover_time = start_timer!(|| "Placeholder prover");
    let params = &prover_params.verifier_params;
    let layout = &params.layout;
    if PolyLayout::new(cs, layout.permutation_chunk_size)? != *layout {
        return Err(PlonkError::MalformedInput(
            "the parameters belong to another constraint system".to_string(),
        ));
    }
    let desc = &layout.desc;
    let n = desc.rows_amount;
    let u = desc.usable_rows_amount;
    let fri_params = &params.fri_params;
    let domain = prover_params.domain()?;
    let mut challenges = PlaceholderChallenges::default();

    transcript_init_placeholder(transcript, params, &cs.content_digest(), &table.public_inputs);

    // 1. commit the witness and public input columns
    let witness_time = start_timer!(|| "Commit the witness");
    let (mut witness, public_inputs) = table.padded(desc)?;
    for column in witness.iter_mut() {
        for value in column.iter_mut().skip(u) {
            *value = F::random(prng);
        }
    }
    witness.extend(public_inputs);
    let witness_batch = commit_values(fri_params, &domain, &witness)?;
    transcript.append_commitment(&witness_batch.root());
    end_timer!(witness_time);

    challenges.theta = transcript_get_challenge_theta(transcript, n);

    // 2. sort the lookup columns
    let mut h_l0 = vec![F::zero(); n];
    h_l0[0] = F::one();
    let lookup_columns = if layout.has_lookups() {
        let lookup_time = start_timer!(|| "Lookup sorted columns");
        let mut h_table = DomainTable::new(&prover_params.group, &h_l0, 1);
        h_table.set_batch(FIXED_BATCH, &prover_params.fixed_values);
        h_table.set_batch(WITNESS_BATCH, &witness);
        let columns = lookup::prove_sorted(prng, cs, layout, &h_table, &challenges.theta);
        end_timer!(lookup_time);
        Some(columns)
    } else {
        None
    };
    let lookup_batch = lookup_columns
        .as_ref()
        .map(|columns| commit_values(fri_params, &domain, &columns.sorted))
        .transpose()?;
    if let Some(batch) = &lookup_batch {
        transcript.append_commitment(&batch.root());
    }

    let [beta, gamma, beta_lookup, gamma_lookup, delta_lookup] =
        transcript_get_challenge_beta_gamma(transcript, n);
    challenges.beta = beta;
    challenges.gamma = gamma;
    challenges.beta_lookup = beta_lookup;
    challenges.gamma_lookup = gamma_lookup;
    challenges.delta_lookup = delta_lookup;

    // 3. commit the running products
    let running_time = start_timer!(|| "Running products");
    let column_of = |p: PolyRef| {
        if p.batch == FIXED_BATCH {
            prover_params.fixed_values[p.index].as_slice()
        } else {
            witness[p.index].as_slice()
        }
    };
    let columns: Vec<&[F]> = (0..layout.permutation_columns)
        .map(|j| column_of(layout.permutation_column(j)))
        .collect();
    let sigmas: Vec<&[F]> = (0..layout.permutation_columns)
        .map(|j| column_of(layout.sigma(j)))
        .collect();
    let mut running = permutation::prove_eval(
        prng,
        layout,
        &columns,
        &sigmas,
        &prover_params.group,
        &params.delta,
        &challenges.beta,
        &challenges.gamma,
    )?;
    if let Some(columns) = &lookup_columns {
        running.push(lookup::prove_running_product(
            prng,
            layout,
            columns,
            &challenges.beta_lookup,
            &challenges.gamma_lookup,
        )?);
    }
    let running_batch = commit_values(fri_params, &domain, &running)?;
    transcript.append_commitment(&running_batch.root());
    end_timer!(running_time);

    challenges.theta_gate = transcript_get_challenge_gate_theta(transcript, n);
    challenges.alpha = transcript_get_challenge_alpha(transcript, n);

    // 4. compute and commit the quotient
    let quotient_time = start_timer!(|| "Quotient polynomial");
    let quotient_domain = prover_params.quotient_domain()?;
    let shift = quotient_shift::<F>();
    let to_coset = |batch: &FriBatch<F>| -> Vec<Vec<F>> {
        cfg_iter!(batch.polys)
            .map(|p| p.coset_fft_with_domain(&quotient_domain, &shift))
            .collect()
    };
    let witness_coset = to_coset(&witness_batch);
    let lookup_coset = lookup_batch.as_ref().map(&to_coset).unwrap_or_default();
    let running_coset = to_coset(&running_batch);

    let blowup = prover_params.z_h_inv.len();
    let mut coset_table =
        DomainTable::new(&prover_params.coset_points, &prover_params.l0_coset, blowup);
    coset_table.set_batch(FIXED_BATCH, &prover_params.fixed_coset);
    coset_table.set_batch(WITNESS_BATCH, &witness_coset);
    coset_table.set_batch(LOOKUP_BATCH, &lookup_coset);
    coset_table.set_batch(RUNNING_BATCH, &running_coset);
    let quotient_values: Vec<F> = cfg_into_iter!(0..coset_table.size())
        .map(|i| {
            let values = all_constraints(cs, layout, &params.delta, &challenges, &coset_table.row(i));
            combine_constraints(&values, &challenges.alpha) * prover_params.z_h_inv[i % blowup]
        })
        .collect();
    let quotient = FpPolynomial::coset_ifft_with_domain(
        &quotient_domain,
        &quotient_values,
        &shift.inv()?,
    );
    let coefs = quotient.get_coefs_ref();
    let quotient_parts: Vec<FpPolynomial<F>> = (0..layout.quotient_parts)
        .map(|i| {
            let start = (i * n).min(coefs.len());
            let end = ((i + 1) * n).min(coefs.len());
            FpPolynomial::from_coefs(coefs[start..end].to_vec())
        })
        .collect();
    let quotient_batch = FriBatch::commit(fri_params, quotient_parts)?;
    transcript.append_commitment(&quotient_batch.root());
    end_timer!(quotient_time);

    challenges.y = transcript_get_challenge_y(transcript, n);

    // 5. open every polynomial at its rotations of y
    let eval_time = start_timer!(|| "Evaluation proof");
    let batches: Vec<Option<&FriBatch<F>>> = vec![
        Some(&prover_params.fixed_batch),
        Some(&witness_batch),
        lookup_batch.as_ref(),
        Some(&running_batch),
        Some(&quotient_batch),
    ];
    let points = opening_points(cs, layout);
    let claims = points
        .iter()
        .map(|(p, rotation)| {
            let poly = batches[p.batch]
                .and_then(|batch| batch.polys.get(p.index))
                .ok_or(PlonkError::ProofError)?;
            let point = rotated_point(&challenges.y, &params.omega, n, *rotation);
            Ok(LpcClaim {
                batch: layout.batch_position(p.batch),
                poly: p.index,
                point,
                value: poly.eval(&point),
            })
        })
        .collect::<Result<Vec<LpcClaim<F>>>>()?;
    let evaluations: Vec<F> = claims.iter().map(|c| c.value).collect();
    transcript.append_field_elems(&evaluations);

    let committed: Vec<&FriBatch<F>> = batches.iter().flatten().copied().collect();
    let eval_proof = lpc::prove(transcript, fri_params, &committed, &claims)?;
    end_timer!(eval_time);
    end_timer!(prover_time);

    let proof = PlaceholderProof {
        witness_commitment: witness_batch.root(),
        lookup_commitment: lookup_batch.as_ref().map(|b| b.root()),
        running_products_commitment: running_batch.root(),
        quotient_commitment: quotient_batch.root(),
        evaluations,
        eval_proof,
    };
    let tables = ProverTables {
        witness,
        lookup: lookup_columns.map(|c| c.sorted).unwrap_or_default(),
        running,
    };
    Ok((proof, tables, challenges))
}
