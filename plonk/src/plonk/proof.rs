use crate::errors::{PlonkError, Result};
use crate::poly_commit::lpc::LpcProof;
use crate::utils::{ByteReader, ByteWriter};
use placeholder_algebra::prelude::*;
use placeholder_crypto::merkle_tree::MerkleDigest;

/// A Placeholder proof.
///
/// The evaluations follow the canonical order of the opened (polynomial, rotation) pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderProof<F> {
    /// The commitment to the witness and public input columns.
    pub witness_commitment: MerkleDigest,
    /// The commitment to the sorted lookup columns, if the circuit has lookups.
    pub lookup_commitment: Option<MerkleDigest>,
    /// The commitment to the running products.
    pub running_products_commitment: MerkleDigest,
    /// The commitment to the quotient parts.
    pub quotient_commitment: MerkleDigest,
    /// The opened values.
    pub evaluations: Vec<F>,
    /// The proof of the opened values.
    pub eval_proof: LpcProof<F>,
}

impl<F: Scalar> PlaceholderProof<F> {
    /// The commitments in batch order.
    pub fn commitments(&self, fixed_root: &MerkleDigest) -> Vec<MerkleDigest> {
        let mut roots = vec![*fixed_root, self.witness_commitment];
        roots.extend(self.lookup_commitment);
        roots.push(self.running_products_commitment);
        roots.push(self.quotient_commitment);
        roots
    }

    /// Encode the proof in the wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        writer.write_digest(&self.witness_commitment);
        match &self.lookup_commitment {
            Some(root) => {
                writer.write_u8(1);
                writer.write_digest(root);
            }
            None => writer.write_u8(0),
        }
        writer.write_digest(&self.running_products_commitment);
        writer.write_digest(&self.quotient_commitment);
        writer.write_fields(&self.evaluations);
        self.eval_proof.write(&mut writer);
        writer.into_bytes()
    }

    /// Decode a proof from the wire format, rejecting trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(bytes);
        let witness_commitment = reader.read_digest()?;
        let lookup_commitment = match reader.read_u8()? {
            0 => None,
            1 => Some(reader.read_digest()?),
            _ => return Err(PlonkError::DeserializationError),
        };
        let running_products_commitment = reader.read_digest()?;
        let quotient_commitment = reader.read_digest()?;
        let evaluations = reader.read_fields()?;
        let eval_proof = LpcProof::<F>::read(&mut reader)?;
        reader.finish()?;
        Ok(Self {
            witness_commitment,
            lookup_commitment,
            running_products_commitment,
            quotient_commitment,
            evaluations,
            eval_proof,
        })
    }
}

#[cfg(test)]
mod test {
    use crate::plonk::proof::PlaceholderProof;
    use crate::poly_commit::fri::FriProof;
    use placeholder_algebra::{bls12_381::BLSScalar, prelude::*};

    type F = BLSScalar;

    #[test]
    fn test_proof_bytes() {
        let proof = PlaceholderProof::<F> {
            witness_commitment: [1u8; 32],
            lookup_commitment: None,
            running_products_commitment: [3u8; 32],
            quotient_commitment: [4u8; 32],
            evaluations: vec![F::from(5u32), F::from(6u32)],
            eval_proof: FriProof {
                fri_roots: vec![[7u8; 32]],
                final_polynomial: vec![F::one()],
                query_proofs: vec![],
                proof_of_work: Some(9),
            },
        };
        let bytes = proof.to_bytes();
        assert_eq!(PlaceholderProof::from_bytes(&bytes).unwrap(), proof);
        assert_eq!(proof.commitments(&[0u8; 32]).len(), 4);

        let with_lookup = PlaceholderProof {
            lookup_commitment: Some([2u8; 32]),
            ..proof
        };
        let bytes = with_lookup.to_bytes();
        assert_eq!(PlaceholderProof::from_bytes(&bytes).unwrap(), with_lookup);
        assert_eq!(with_lookup.commitments(&[0u8; 32])[2], [2u8; 32]);

        let mut bad = bytes.clone();
        bad[32] = 2;
        assert!(PlaceholderProof::<F>::from_bytes(&bad).is_err());
        assert!(PlaceholderProof::<F>::from_bytes(&bytes[..bytes.len() - 1]).is_err());
        let mut long = bytes;
        long.push(0);
        assert!(PlaceholderProof::<F>::from_bytes(&long).is_err());
    }
}
