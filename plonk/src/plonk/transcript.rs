use crate::plonk::preprocessor::PlaceholderVerifierParams;
use crate::poly_commit::transcript::PolyComTranscript;
use merlin::Transcript;
use placeholder_algebra::prelude::*;
use rand_chacha::ChaChaRng;

/// Initialize the transcript of a Placeholder proof.
pub(crate) fn transcript_init_placeholder<F: Scalar>(
    transcript: &mut Transcript,
    params: &PlaceholderVerifierParams<F>,
    constraint_system_digest: &[u8],
    public_inputs: &[Vec<F>],
) {
    transcript.append_message(b"New Domain", b"Placeholder");

    let desc = &params.layout.desc;
    transcript.append_u64(b"rows amount", desc.rows_amount as u64);
    transcript.append_u64(b"usable rows amount", desc.usable_rows_amount as u64);
    transcript.append_message(b"field size", &F::get_field_size_le_bytes());
    transcript.append_u64(b"witness columns", desc.witness_columns as u64);
    transcript.append_u64(b"public input columns", desc.public_input_columns as u64);
    transcript.append_u64(b"constant columns", desc.constant_columns as u64);
    transcript.append_u64(b"selector columns", desc.selector_columns as u64);
    transcript.append_u64(
        b"permutation chunk size",
        params.layout.permutation_chunk_size as u64,
    );

    let fri = &params.fri_params;
    transcript.append_u64(b"FRI expand factor", fri.expand_factor_log as u64);
    transcript.append_u64(b"FRI lambda", fri.lambda as u64);
    transcript.append_u64(b"FRI grinding", fri.grinding_bits as u64);
    for step in fri.step_list.iter() {
        transcript.append_u64(b"FRI step", *step as u64);
    }

    transcript.append_message(b"constraint system", constraint_system_digest);
    transcript.append_commitment(&params.fixed_root);
    transcript.append_field_elem(&params.omega);
    transcript.append_field_elem(&params.delta);

    // trailing zeros do not change the statement
    for column in public_inputs.iter() {
        let mut padded = column.clone();
        padded.resize(desc.usable_rows_amount, F::zero());
        transcript.append_field_elems(&padded);
    }
}

/// Return the challenge result. The challenge is never an `order`-th root of unity.
pub(crate) fn transcript_get_challenge_field_elem<F: Scalar>(
    transcript: &mut Transcript,
    order: usize,
    label: &'static [u8],
) -> F {
    let buff = transcript.get_challenge_bytes(label);
    let mut prng = ChaChaRng::from_seed(buff);
    loop {
        let elem = F::random(&mut prng);
        // elem should not be root-of-unity
        if elem.pow(&[order as u64]) != F::one() {
            return elem;
        }
    }
}

/// Return the challenge result by label: "theta".
pub(crate) fn transcript_get_challenge_theta<F: Scalar>(
    transcript: &mut Transcript,
    order: usize,
) -> F {
    transcript_get_challenge_field_elem(transcript, order, b"theta")
}

/// Return the challenges `beta, gamma` of the permutation and `beta, gamma, delta` of
/// the lookup argument.
pub(crate) fn transcript_get_challenge_beta_gamma<F: Scalar>(
    transcript: &mut Transcript,
    order: usize,
) -> [F; 5] {
    [
        transcript_get_challenge_field_elem(transcript, order, b"beta"),
        transcript_get_challenge_field_elem(transcript, order, b"gamma"),
        transcript_get_challenge_field_elem(transcript, order, b"lookup beta"),
        transcript_get_challenge_field_elem(transcript, order, b"lookup gamma"),
        transcript_get_challenge_field_elem(transcript, order, b"lookup delta"),
    ]
}

/// Return the challenge result by label: "gate theta".
pub(crate) fn transcript_get_challenge_gate_theta<F: Scalar>(
    transcript: &mut Transcript,
    order: usize,
) -> F {
    transcript_get_challenge_field_elem(transcript, order, b"gate theta")
}

/// Return the challenge result by label: "alpha".
pub(crate) fn transcript_get_challenge_alpha<F: Scalar>(
    transcript: &mut Transcript,
    order: usize,
) -> F {
    transcript_get_challenge_field_elem(transcript, order, b"alpha")
}

/// Return the evaluation point, which is outside of `H`.
pub(crate) fn transcript_get_challenge_y<F: Scalar>(
    transcript: &mut Transcript,
    order: usize,
) -> F {
    transcript_get_challenge_field_elem(transcript, order, b"y")
}

#[cfg(test)]
mod test {
    use crate::plonk::transcript::transcript_get_challenge_field_elem;
    use crate::poly_commit::transcript::new_transcript;
    use placeholder_algebra::{bls12_381::BLSScalar, prelude::*};

    type F = BLSScalar;

    #[test]
    fn test_challenge_not_root_of_unity() {
        let mut t1 = new_transcript(b"test");
        let mut t2 = new_transcript(b"test");
        for _ in 0..16 {
            let a: F = transcript_get_challenge_field_elem(&mut t1, 8, b"y");
            let b: F = transcript_get_challenge_field_elem(&mut t2, 8, b"y");
            assert_eq!(a, b);
            assert_ne!(a.pow(&[8]), F::one());
        }
        // order 1 only rules out the element one
        let c: F = transcript_get_challenge_field_elem(&mut t1, 1, b"y");
        assert_ne!(c, F::one());
    }
}
