use merlin::Transcript;
use placeholder_algebra::prelude::*;
use placeholder_crypto::merkle_tree::MerkleDigest;
use rand_chacha::ChaChaRng;

/// The protocol label every Placeholder transcript starts with.
pub const TRANSCRIPT_LABEL: &[u8] = b"Placeholder";

/// Create a transcript seeded with `initial_bytes`.
pub fn new_transcript(initial_bytes: &[u8]) -> Transcript {
    let mut transcript = Transcript::new(TRANSCRIPT_LABEL);
    transcript.append_message(b"initial bytes", initial_bytes);
    transcript
}

/// The trait for polynomial commitment transcript.
pub trait PolyComTranscript {
    /// Append the commitment to the transcript.
    fn append_commitment(&mut self, commitment: &MerkleDigest);

    /// Append the field to the transcript.
    fn append_field_elem<F: Scalar>(&mut self, point: &F);

    /// Append a list of field elements, prefixed by its length.
    fn append_field_elems<F: Scalar>(&mut self, elems: &[F]);

    /// Get challenge result.
    fn get_challenge_field_elem<F: Scalar>(&mut self, label: &'static [u8]) -> F;

    /// Get an index in `[0, bound)`, `bound` must be a power of two.
    fn get_challenge_index(&mut self, label: &'static [u8], bound: usize) -> usize;

    /// Get 32 challenge bytes.
    fn get_challenge_bytes(&mut self, label: &'static [u8]) -> [u8; 32];
}

impl PolyComTranscript for Transcript {
    fn append_commitment(&mut self, commitment: &MerkleDigest) {
        self.append_message(b"append commitment", commitment);
    }

    fn append_field_elem<F: Scalar>(&mut self, field_elem: &F) {
        self.append_message(b"append field point", &field_elem.to_bytes());
    }

    fn append_field_elems<F: Scalar>(&mut self, elems: &[F]) {
        self.append_u64(b"field points", elems.len() as u64);
        for elem in elems {
            self.append_field_elem(elem);
        }
    }

    fn get_challenge_field_elem<F: Scalar>(&mut self, label: &'static [u8]) -> F {
        let buff = self.get_challenge_bytes(label);
        F::random(&mut ChaChaRng::from_seed(buff))
    }

    fn get_challenge_index(&mut self, label: &'static [u8], bound: usize) -> usize {
        debug_assert!(bound.is_power_of_two());
        let mut buff = [0u8; 8];
        self.challenge_bytes(label, &mut buff);
        (u64::from_le_bytes(buff) as usize) & (bound - 1)
    }

    fn get_challenge_bytes(&mut self, label: &'static [u8]) -> [u8; 32] {
        let mut buff = [0u8; 32];
        self.challenge_bytes(label, &mut buff);
        buff
    }
}

#[cfg(test)]
mod test {
    use crate::poly_commit::transcript::{new_transcript, PolyComTranscript};
    use placeholder_algebra::bls12_381::BLSScalar;

    type F = BLSScalar;

    #[test]
    fn test_transcript_determinism() {
        let run = || {
            let mut transcript = new_transcript(b"test");
            transcript.append_commitment(&[7u8; 32]);
            transcript.append_field_elem(&F::from(3u32));
            let a: F = transcript.get_challenge_field_elem(b"a");
            let b: F = transcript.get_challenge_field_elem(b"b");
            let i = transcript.get_challenge_index(b"i", 1024);
            (a, b, i)
        };
        let (a1, b1, i1) = run();
        let (a2, b2, i2) = run();
        assert_eq!(a1, a2);
        assert_eq!(b1, b2);
        assert_eq!(i1, i2);
        assert_ne!(a1, b1);
        assert!(i1 < 1024);
    }

    #[test]
    fn test_transcript_order_sensitivity() {
        let mut t1 = new_transcript(b"test");
        t1.append_field_elem(&F::from(1u32));
        t1.append_field_elem(&F::from(2u32));
        let c1: F = t1.get_challenge_field_elem(b"c");

        let mut t2 = new_transcript(b"test");
        t2.append_field_elem(&F::from(2u32));
        t2.append_field_elem(&F::from(1u32));
        let c2: F = t2.get_challenge_field_elem(b"c");
        assert_ne!(c1, c2);

        let mut t3 = new_transcript(b"other");
        t3.append_field_elem(&F::from(1u32));
        t3.append_field_elem(&F::from(2u32));
        let c3: F = t3.get_challenge_field_elem(b"c");
        assert_ne!(c1, c3);
    }
}
