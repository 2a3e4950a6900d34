//! FRI low-degree test over a multiplicative coset of a radix-2 domain.
//!
//! The evaluation domain is `D = g * <w>` with `g` the multiplicative generator and
//! `|D| = max_degree * 2^expand_factor_log`. A layer of size `N` folded by `s` rounds is
//! committed as `N >> s` Merkle leaves; leaf `i` holds the values at the positions
//! `i + t * (N >> s)` for `t < 2^s`, which are exactly the points that fold together.
//!
//! The first layer is committed outside of this module (see [`FriBatch`]), its openings
//! are supplied through closures so that several batches can be tested as one combined
//! function.
use crate::errors::{PlonkError, Result};
use crate::poly_commit::{field_polynomial::FpPolynomial, transcript::PolyComTranscript};
use crate::utils::{batch_inverse, field_elems_to_bytes, ByteReader, ByteWriter};
use ark_poly::Radix2EvaluationDomain;
use ark_std::{cfg_into_iter, cfg_iter, end_timer, start_timer};
use merlin::Transcript;
use placeholder_algebra::prelude::*;
use placeholder_crypto::merkle_tree::{MerkleDigest, MerklePath, MerkleTree};
use sha2::{Digest, Sha256};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The largest supported proof-of-work difficulty.
pub const MAX_GRINDING_BITS: u32 = 32;

/// The parameters of a FRI instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriParams {
    /// The degree bound: tested functions have fewer than `max_degree` coefficients.
    pub max_degree: usize,
    /// Base-2 logarithm of the blowup factor.
    pub expand_factor_log: usize,
    /// Number of folding rounds per committed layer.
    pub step_list: Vec<usize>,
    /// Number of queries.
    pub lambda: usize,
    /// Leading zero bits required from the proof of work, zero disables grinding.
    pub grinding_bits: u32,
}

impl FriParams {
    /// Validate and build the parameters.
    pub fn new(
        max_degree: usize,
        expand_factor_log: usize,
        step_list: Vec<usize>,
        lambda: usize,
        grinding_bits: u32,
    ) -> Result<Self> {
        let log_degree = log2_exact(max_degree).ok_or_else(|| {
            PlonkError::FriParamsError(format!(
                "degree bound {} is not a power of two",
                max_degree
            ))
        })? as usize;
        if log_degree + expand_factor_log >= usize::BITS as usize - 1 {
            return Err(PlonkError::FriParamsError(
                "evaluation domain is too large".to_string(),
            ));
        }
        if step_list.is_empty() || step_list.iter().any(|s| *s == 0) {
            return Err(PlonkError::FriParamsError(
                "every FRI step must fold at least once".to_string(),
            ));
        }
        let total: usize = step_list.iter().sum();
        if total > log_degree {
            return Err(PlonkError::FriParamsError(format!(
                "{} folding rounds exceed log2 of the degree bound {}",
                total, max_degree
            )));
        }
        if lambda == 0 {
            return Err(PlonkError::FriParamsError(
                "at least one query is needed".to_string(),
            ));
        }
        if grinding_bits > MAX_GRINDING_BITS {
            return Err(PlonkError::FriParamsError(format!(
                "at most {} grinding bits are supported",
                MAX_GRINDING_BITS
            )));
        }
        Ok(Self {
            max_degree,
            expand_factor_log,
            step_list,
            lambda,
            grinding_bits,
        })
    }

    /// The size of the evaluation domain `D`.
    pub fn domain_size(&self) -> usize {
        self.max_degree << self.expand_factor_log
    }

    /// The total number of folding rounds.
    pub fn total_rounds(&self) -> usize {
        self.step_list.iter().sum()
    }

    /// The number of coefficients the final polynomial may have.
    pub fn final_degree_bound(&self) -> usize {
        self.max_degree >> self.total_rounds()
    }

    /// The number of values in a leaf of the `step`-th committed layer.
    pub fn fiber_width(&self, step: usize) -> usize {
        1 << self.step_list[step]
    }

    /// The number of leaves of the first layer.
    pub fn num_initial_leaves(&self) -> usize {
        self.domain_size() >> self.step_list[0]
    }

    /// The radix-2 domain underlying `D`.
    pub fn domain<F: Domain>(&self) -> Result<Radix2EvaluationDomain<F::Field>> {
        FpPolynomial::<F>::evaluation_domain(self.domain_size()).ok_or_else(|| {
            PlonkError::FriParamsError(format!(
                "the field has no domain of size {}",
                self.domain_size()
            ))
        })
    }

    /// The coset shift of `D`.
    pub fn shift<F: Scalar>() -> F {
        F::multiplicative_generator()
    }

    /// Return the point of `D` at `position`.
    pub fn point<F: Domain>(
        &self,
        domain: &Radix2EvaluationDomain<F::Field>,
        position: usize,
    ) -> F {
        let root = F::from_field(domain.group_gen);
        Self::shift::<F>() * root.pow(&[position as u64])
    }
}

/// Opened values of one Merkle leaf together with their authentication path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriOpening<F> {
    /// The leaf values, slot-major and polynomial-minor.
    pub values: Vec<F>,
    /// The authentication path of the leaf.
    pub path: MerklePath,
}

/// The openings for one query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriQueryProof<F> {
    /// One opening per initially committed batch.
    pub initial_openings: Vec<FriOpening<F>>,
    /// One opening per committed folding layer.
    pub round_openings: Vec<FriOpening<F>>,
}

/// FRI proof.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriProof<F> {
    /// The roots of the committed folding layers.
    pub fri_roots: Vec<MerkleDigest>,
    /// The coefficients of the last layer.
    pub final_polynomial: Vec<F>,
    /// The query openings.
    pub query_proofs: Vec<FriQueryProof<F>>,
    /// The proof-of-work nonce, present if grinding is enabled.
    pub proof_of_work: Option<u64>,
}

/// A batch of polynomials committed with a single Merkle tree over `D`.
#[derive(Debug, Clone)]
pub struct FriBatch<F> {
    /// The committed polynomials.
    pub polys: Vec<FpPolynomial<F>>,
    /// The evaluations of each polynomial over `D`.
    pub evals: Vec<Vec<F>>,
    tree: MerkleTree,
    fiber_width: usize,
}

impl<F: Domain> FriBatch<F> {
    /// Evaluate the polynomials over `D` and commit to them.
    pub fn commit(params: &FriParams, polys: Vec<FpPolynomial<F>>) -> Result<Self> {
        if polys.iter().any(|p| p.degree() >= params.max_degree) {
            return Err(PlonkError::DegreeError);
        }
        let domain = params.domain::<F>()?;
        let shift = FriParams::shift::<F>();
        let evals: Vec<Vec<F>> = cfg_iter!(polys)
            .map(|p| p.coset_fft_with_domain(&domain, &shift))
            .collect();
        Self::from_evaluations(params, polys, evals)
    }

    /// Commit to evaluations over `D`, without checking their degree.
    pub(crate) fn from_evaluations(
        params: &FriParams,
        polys: Vec<FpPolynomial<F>>,
        evals: Vec<Vec<F>>,
    ) -> Result<Self> {
        if evals.is_empty() || evals.iter().any(|e| e.len() != params.domain_size()) {
            return Err(PlonkError::MalformedInput(
                "a batch needs evaluations over the whole domain".to_string(),
            ));
        }
        let fiber_width = params.fiber_width(0);
        let tree = MerkleTree::new(&fiber_leaves(&evals, fiber_width))?;
        Ok(Self {
            polys,
            evals,
            tree,
            fiber_width,
        })
    }

    /// The Merkle root of the batch.
    pub fn root(&self) -> MerkleDigest {
        self.tree.root()
    }

    /// The number of committed polynomials.
    pub fn num_polys(&self) -> usize {
        self.evals.len()
    }

    /// Open the leaf at `leaf`.
    pub fn open(&self, leaf: usize) -> Result<FriOpening<F>> {
        Ok(FriOpening {
            values: fiber_values(&self.evals, self.fiber_width, leaf),
            path: self.tree.prove(leaf)?,
        })
    }
}

/// Check a batch opening against its root.
pub fn verify_batch_opening<F: Scalar>(
    root: &MerkleDigest,
    opening: &FriOpening<F>,
    leaf: usize,
    num_polys: usize,
    fiber_width: usize,
) -> bool {
    opening.values.len() == num_polys * fiber_width
        && opening
            .path
            .verify(root, leaf, &field_elems_to_bytes(&opening.values))
}

fn fiber_leaves<F: Scalar>(columns: &[Vec<F>], fiber_width: usize) -> Vec<Vec<u8>> {
    let num_leaves = columns[0].len() / fiber_width;
    cfg_into_iter!(0..num_leaves)
        .map(|leaf| field_elems_to_bytes(&fiber_values(columns, fiber_width, leaf)))
        .collect()
}

fn fiber_values<F: Scalar>(columns: &[Vec<F>], fiber_width: usize, leaf: usize) -> Vec<F> {
    let num_leaves = columns[0].len() / fiber_width;
    let mut values = Vec::with_capacity(fiber_width * columns.len());
    for t in 0..fiber_width {
        for column in columns {
            values.push(column[leaf + t * num_leaves]);
        }
    }
    values
}

#[inline]
fn fold<F: Scalar>(a: F, b: F, x_inv: &F, alpha: &F, two_inv: &F) -> F {
    ((a + b) + (a - b) * alpha * x_inv) * two_inv
}

/// Fold a whole layer over `shift * <root>` once.
fn fold_layer<F: Scalar>(
    values: &[F],
    shift: &F,
    root: &F,
    alpha: &F,
    two_inv: &F,
) -> Result<Vec<F>> {
    let half = values.len() / 2;
    let root_inv = root.inv()?;
    let mut x_inv = shift.inv()?;
    let mut inv_points = Vec::with_capacity(half);
    for _ in 0..half {
        inv_points.push(x_inv);
        x_inv.mul_assign(&root_inv);
    }
    Ok(cfg_into_iter!(0..half)
        .map(|i| fold(values[i], values[i + half], &inv_points[i], alpha, two_inv))
        .collect())
}

/// Fold one fiber down to a single value. The fiber holds the values at `x * zeta^t`,
/// `zeta` being a primitive root of order `fiber.len()`.
fn fold_fiber<F: Scalar>(fiber: &[F], x: &F, zeta: &F, alphas: &[F], two_inv: &F) -> Result<F> {
    let mut values = fiber.to_vec();
    let mut x = *x;
    let mut zeta = *zeta;
    for alpha in alphas {
        let half = values.len() / 2;
        let mut inv_points = Vec::with_capacity(half);
        let mut point = x;
        for _ in 0..half {
            inv_points.push(point);
            point.mul_assign(&zeta);
        }
        batch_inverse(&mut inv_points)?;
        values = (0..half)
            .map(|t| fold(values[t], values[t + half], &inv_points[t], alpha, two_inv))
            .collect();
        x = x.square();
        zeta = zeta.square();
    }
    values.first().copied().ok_or(PlonkError::VerificationError)
}

fn leading_zero_bits(digest: &[u8]) -> u32 {
    let mut bits = 0;
    for byte in digest {
        if *byte == 0 {
            bits += 8;
        } else {
            bits += byte.leading_zeros();
            break;
        }
    }
    bits
}

fn check_proof_of_work(seed: &[u8; 32], nonce: u64, bits: u32) -> bool {
    let mut hasher = Sha256::new();
    hasher.update(seed);
    hasher.update(nonce.to_le_bytes());
    leading_zero_bits(&hasher.finalize()) >= bits
}

fn grind(seed: &[u8; 32], bits: u32) -> Result<u64> {
    (0..=u64::MAX)
        .find(|nonce| check_proof_of_work(seed, *nonce, bits))
        .ok_or(PlonkError::ProofError)
}

fn draw_alphas<F: Scalar>(transcript: &mut Transcript, rounds: usize) -> Vec<F> {
    (0..rounds)
        .map(|_| transcript.get_challenge_field_elem(b"FRI alpha"))
        .collect()
}

/// Run the FRI prover on `layer0`, the values over `D` of a function whose first layer is
/// already committed. `open_initial` returns the openings of every initial batch at a leaf.
pub fn prove_eval<F, O>(
    transcript: &mut Transcript,
    params: &FriParams,
    layer0: Vec<F>,
    open_initial: O,
) -> Result<FriProof<F>>
where
    F: Domain,
    O: Fn(usize) -> Result<Vec<FriOpening<F>>>,
{
    let fri_time = start_timer!(|| format!("FRI prove over {} points", params.domain_size()));
    if layer0.len() != params.domain_size() {
        return Err(PlonkError::MalformedInput(
            "the first FRI layer must cover the whole domain".to_string(),
        ));
    }
    let domain = params.domain::<F>()?;
    let two_inv = F::from(2u32).inv()?;
    let mut shift = FriParams::shift::<F>();
    let mut root = F::from_field(domain.group_gen);

    let num_steps = params.step_list.len();
    let mut values = layer0;
    let mut layers = Vec::with_capacity(num_steps - 1);
    let mut fri_roots = Vec::with_capacity(num_steps - 1);
    for (k, step) in params.step_list.iter().enumerate() {
        for alpha in draw_alphas::<F>(transcript, *step) {
            values = fold_layer(&values, &shift, &root, &alpha, &two_inv)?;
            shift = shift.square();
            root = root.square();
        }
        if k + 1 < num_steps {
            let tree = MerkleTree::new(&fiber_leaves(
                core::slice::from_ref(&values),
                params.fiber_width(k + 1),
            ))?;
            transcript.append_commitment(&tree.root());
            fri_roots.push(tree.root());
            layers.push((values.clone(), tree));
        }
    }

    let final_domain = FpPolynomial::<F>::evaluation_domain(values.len())
        .ok_or(PlonkError::ProofError)?;
    let mut final_polynomial =
        FpPolynomial::coset_ifft_with_domain(&final_domain, &values, &shift.inv()?).coefs;
    final_polynomial.truncate(params.final_degree_bound());
    transcript.append_field_elems(&final_polynomial);

    let proof_of_work = if params.grinding_bits > 0 {
        let seed = transcript.get_challenge_bytes(b"FRI grinding");
        let nonce = grind(&seed, params.grinding_bits)?;
        transcript.append_u64(b"FRI nonce", nonce);
        Some(nonce)
    } else {
        None
    };

    let mut query_proofs = Vec::with_capacity(params.lambda);
    for _ in 0..params.lambda {
        let query = transcript.get_challenge_index(b"FRI query", params.domain_size());
        let initial_openings = open_initial(query % params.num_initial_leaves())?;

        let mut round_openings = Vec::with_capacity(layers.len());
        for (k, (layer, tree)) in layers.iter().enumerate() {
            let fiber_width = params.fiber_width(k + 1);
            let leaf = query % (layer.len() / fiber_width);
            round_openings.push(FriOpening {
                values: fiber_values(core::slice::from_ref(layer), fiber_width, leaf),
                path: tree.prove(leaf)?,
            });
        }
        query_proofs.push(FriQueryProof {
            initial_openings,
            round_openings,
        });
    }
    end_timer!(fri_time);

    Ok(FriProof {
        fri_roots,
        final_polynomial,
        query_proofs,
        proof_of_work,
    })
}

/// Run the FRI verifier. `initial_fiber` checks the initial openings of a query at a leaf
/// and returns the values of the tested function at the leaf positions.
/// Any failed check rejects the proof.
pub fn verify_eval<F, C>(
    transcript: &mut Transcript,
    params: &FriParams,
    proof: &FriProof<F>,
    initial_fiber: C,
) -> bool
where
    F: Domain,
    C: Fn(usize, &[FriOpening<F>]) -> Result<Vec<F>>,
{
    check_eval(transcript, params, proof, initial_fiber).is_ok()
}

fn check_eval<F, C>(
    transcript: &mut Transcript,
    params: &FriParams,
    proof: &FriProof<F>,
    initial_fiber: C,
) -> Result<()>
where
    F: Domain,
    C: Fn(usize, &[FriOpening<F>]) -> Result<Vec<F>>,
{
    let num_steps = params.step_list.len();
    if proof.fri_roots.len() != num_steps - 1
        || proof.query_proofs.len() != params.lambda
        || proof.final_polynomial.len() > params.final_degree_bound()
    {
        return Err(PlonkError::VerificationError);
    }

    let mut alphas = Vec::with_capacity(num_steps);
    for (k, step) in params.step_list.iter().enumerate() {
        alphas.push(draw_alphas::<F>(transcript, *step));
        if k + 1 < num_steps {
            transcript.append_commitment(&proof.fri_roots[k]);
        }
    }
    transcript.append_field_elems(&proof.final_polynomial);

    match (params.grinding_bits, proof.proof_of_work) {
        (0, None) => {}
        (bits, Some(nonce)) if bits > 0 => {
            let seed = transcript.get_challenge_bytes(b"FRI grinding");
            if !check_proof_of_work(&seed, nonce, bits) {
                return Err(PlonkError::VerificationError);
            }
            transcript.append_u64(b"FRI nonce", nonce);
        }
        _ => return Err(PlonkError::VerificationError),
    }

    let domain = params.domain::<F>()?;
    let two_inv = F::from(2u32).inv()?;
    let final_polynomial = FpPolynomial::from_coefs(proof.final_polynomial.clone());

    for query_proof in proof.query_proofs.iter() {
        let query = transcript.get_challenge_index(b"FRI query", params.domain_size());
        if query_proof.round_openings.len() != num_steps - 1 {
            return Err(PlonkError::VerificationError);
        }

        let mut shift = FriParams::shift::<F>();
        let mut root = F::from_field(domain.group_gen);
        let mut size = params.domain_size();
        let mut position = query;
        let mut expected = F::zero();
        for (k, step) in params.step_list.iter().enumerate() {
            let fiber_width = 1usize << step;
            let num_leaves = size / fiber_width;
            let leaf = position % num_leaves;

            let fiber = if k == 0 {
                initial_fiber(leaf, &query_proof.initial_openings)?
            } else {
                let opening = &query_proof.round_openings[k - 1];
                if !verify_batch_opening(&proof.fri_roots[k - 1], opening, leaf, 1, fiber_width)
                    || opening.values[position / num_leaves] != expected
                {
                    return Err(PlonkError::VerificationError);
                }
                opening.values.clone()
            };
            if fiber.len() != fiber_width {
                return Err(PlonkError::VerificationError);
            }

            let x = shift * root.pow(&[leaf as u64]);
            let zeta = root.pow(&[num_leaves as u64]);
            expected = fold_fiber(&fiber, &x, &zeta, &alphas[k], &two_inv)?;

            shift = shift.pow(&[fiber_width as u64]);
            root = root.pow(&[fiber_width as u64]);
            size = num_leaves;
            position = leaf;
        }

        let x = shift * root.pow(&[position as u64]);
        if final_polynomial.eval(&x) != expected {
            return Err(PlonkError::VerificationError);
        }
    }
    Ok(())
}

/// Commit to a single polynomial and prove that its degree is below the bound.
pub fn prove_polynomial<F: Domain>(
    transcript: &mut Transcript,
    params: &FriParams,
    poly: &FpPolynomial<F>,
) -> Result<(MerkleDigest, FriProof<F>)> {
    let batch = FriBatch::commit(params, vec![poly.clone()])?;
    let root = batch.root();
    transcript.append_commitment(&root);
    let layer0 = batch.evals[0].clone();
    let proof = prove_eval(transcript, params, layer0, |leaf| Ok(vec![batch.open(leaf)?]))?;
    Ok((root, proof))
}

/// Verify a proof produced by [`prove_polynomial`].
pub fn verify_polynomial<F: Domain>(
    transcript: &mut Transcript,
    params: &FriParams,
    root: &MerkleDigest,
    proof: &FriProof<F>,
) -> bool {
    transcript.append_commitment(root);
    let fiber_width = params.fiber_width(0);
    verify_eval(transcript, params, proof, |leaf, openings| match openings {
        [opening] if verify_batch_opening(root, opening, leaf, 1, fiber_width) => {
            Ok(opening.values.clone())
        }
        _ => Err(PlonkError::VerificationError),
    })
}

impl<F: Scalar> FriOpening<F> {
    pub(crate) fn write(&self, writer: &mut ByteWriter) {
        writer.write_fields(&self.values);
        writer.write_path(&self.path);
    }

    pub(crate) fn read(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            values: reader.read_fields()?,
            path: reader.read_path()?,
        })
    }
}

fn write_openings<F: Scalar>(writer: &mut ByteWriter, openings: &[FriOpening<F>]) {
    writer.write_u64(openings.len() as u64);
    for opening in openings {
        opening.write(writer);
    }
}

fn read_openings<F: Scalar>(reader: &mut ByteReader<'_>) -> Result<Vec<FriOpening<F>>> {
    let len = reader.read_u64()? as usize;
    // every opening takes at least its two length prefixes
    if len.saturating_mul(16) > reader.remaining() {
        return Err(PlonkError::DeserializationError);
    }
    (0..len).map(|_| FriOpening::read(reader)).collect()
}

impl<F: Scalar> FriProof<F> {
    pub(crate) fn write(&self, writer: &mut ByteWriter) {
        writer.write_digests(&self.fri_roots);
        writer.write_fields(&self.final_polynomial);
        writer.write_u64(self.query_proofs.len() as u64);
        for query_proof in self.query_proofs.iter() {
            write_openings(writer, &query_proof.initial_openings);
            write_openings(writer, &query_proof.round_openings);
        }
        match self.proof_of_work {
            Some(nonce) => {
                writer.write_u8(1);
                writer.write_u64(nonce);
            }
            None => writer.write_u8(0),
        }
    }

    pub(crate) fn read(reader: &mut ByteReader<'_>) -> Result<Self> {
        let fri_roots = reader.read_digests()?;
        let final_polynomial = reader.read_fields()?;
        let num_queries = reader.read_u64()? as usize;
        if num_queries.saturating_mul(16) > reader.remaining() {
            return Err(PlonkError::DeserializationError);
        }
        let mut query_proofs = Vec::with_capacity(num_queries);
        for _ in 0..num_queries {
            query_proofs.push(FriQueryProof {
                initial_openings: read_openings(reader)?,
                round_openings: read_openings(reader)?,
            });
        }
        let proof_of_work = match reader.read_u8()? {
            0 => None,
            1 => Some(reader.read_u64()?),
            _ => return Err(PlonkError::DeserializationError),
        };
        Ok(Self {
            fri_roots,
            final_polynomial,
            query_proofs,
            proof_of_work,
        })
    }

    /// Encode the proof in the wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        self.write(&mut writer);
        writer.into_bytes()
    }

    /// Decode a proof from the wire format, rejecting trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(bytes);
        let proof = Self::read(&mut reader)?;
        reader.finish()?;
        Ok(proof)
    }
}

#[cfg(test)]
mod test {
    use crate::poly_commit::{
        field_polynomial::FpPolynomial,
        fri::{
            leading_zero_bits, prove_eval, prove_polynomial, verify_polynomial, FriBatch,
            FriParams, FriProof,
        },
        transcript::{new_transcript, PolyComTranscript},
    };
    use placeholder_algebra::{bls12_381::BLSScalar, prelude::*};
    use rand_chacha::ChaChaRng;

    type F = BLSScalar;

    fn params(grinding_bits: u32) -> FriParams {
        FriParams::new(64, 2, vec![1, 2, 2], 20, grinding_bits).unwrap()
    }

    #[test]
    fn test_params_validation() {
        assert!(FriParams::new(48, 2, vec![1], 10, 0).is_err());
        assert!(FriParams::new(64, 2, vec![3, 4], 10, 0).is_err());
        assert!(FriParams::new(64, 2, vec![1, 0], 10, 0).is_err());
        assert!(FriParams::new(64, 2, vec![], 10, 0).is_err());
        assert!(FriParams::new(64, 2, vec![1], 0, 0).is_err());
        assert!(FriParams::new(64, 2, vec![1], 10, 64).is_err());

        let params = FriParams::new(64, 2, vec![3, 3], 10, 0).unwrap();
        assert_eq!(params.domain_size(), 256);
        assert_eq!(params.final_degree_bound(), 1);
        assert_eq!(params.num_initial_leaves(), 32);
    }

    #[test]
    fn test_fri_completeness() {
        let mut prng = ChaChaRng::from_seed([0u8; 32]);
        let params = params(0);
        for degree in [0usize, 17, 63] {
            let poly = FpPolynomial::<F>::random(&mut prng, degree);
            let mut transcript = new_transcript(b"fri test");
            let (root, proof) = prove_polynomial(&mut transcript, &params, &poly).unwrap();
            assert_eq!(proof.fri_roots.len(), 2);
            assert!(proof.final_polynomial.len() <= 2);
            assert!(proof.proof_of_work.is_none());

            let mut transcript = new_transcript(b"fri test");
            assert!(verify_polynomial(&mut transcript, &params, &root, &proof));

            // a constant folds to itself for every challenge
            if degree > 0 {
                let mut transcript = new_transcript(b"other");
                assert!(!verify_polynomial(&mut transcript, &params, &root, &proof));
            }
        }
    }

    #[test]
    fn test_fri_rejects_high_degree() {
        let mut prng = ChaChaRng::from_seed([1u8; 32]);
        let params = params(0);
        let poly = FpPolynomial::<F>::random(&mut prng, 127);
        let mut transcript = new_transcript(b"fri test");
        assert!(prove_polynomial(&mut transcript, &params, &poly).is_err());

        // bypass the prover's degree check
        let domain = params.domain::<F>().unwrap();
        let evals = vec![poly.coset_fft_with_domain(&domain, &FriParams::shift::<F>())];
        let batch = FriBatch::from_evaluations(&params, vec![poly], evals).unwrap();
        let root = batch.root();
        let mut transcript = new_transcript(b"fri test");
        transcript.append_commitment(&root);
        let proof = prove_eval(&mut transcript, &params, batch.evals[0].clone(), |leaf| {
            Ok(vec![batch.open(leaf)?])
        })
        .unwrap();

        let mut transcript = new_transcript(b"fri test");
        assert!(!verify_polynomial(&mut transcript, &params, &root, &proof));
    }

    #[test]
    fn test_fri_tampered_proof() {
        let mut prng = ChaChaRng::from_seed([2u8; 32]);
        let params = params(0);
        let poly = FpPolynomial::<F>::random(&mut prng, 40);
        let mut transcript = new_transcript(b"fri test");
        let (root, proof) = prove_polynomial(&mut transcript, &params, &poly).unwrap();

        let mut bad = proof.clone();
        bad.query_proofs[3].round_openings[0].values[0].add_assign(&F::one());
        let mut transcript = new_transcript(b"fri test");
        assert!(!verify_polynomial(&mut transcript, &params, &root, &bad));

        let mut bad = proof.clone();
        bad.final_polynomial[0].add_assign(&F::one());
        let mut transcript = new_transcript(b"fri test");
        assert!(!verify_polynomial(&mut transcript, &params, &root, &bad));

        let mut bad = proof.clone();
        bad.query_proofs.pop();
        let mut transcript = new_transcript(b"fri test");
        assert!(!verify_polynomial(&mut transcript, &params, &root, &bad));

        let mut bad = proof;
        bad.query_proofs[0].initial_openings[0].values[1].add_assign(&F::one());
        let mut transcript = new_transcript(b"fri test");
        assert!(!verify_polynomial(&mut transcript, &params, &root, &bad));
    }

    #[test]
    fn test_fri_grinding() {
        let mut prng = ChaChaRng::from_seed([3u8; 32]);
        let params = params(8);
        let poly = FpPolynomial::<F>::random(&mut prng, 30);
        let mut transcript = new_transcript(b"fri test");
        let (root, proof) = prove_polynomial(&mut transcript, &params, &poly).unwrap();
        assert!(proof.proof_of_work.is_some());

        let mut transcript = new_transcript(b"fri test");
        assert!(verify_polynomial(&mut transcript, &params, &root, &proof));

        let mut bad = proof;
        bad.proof_of_work = None;
        let mut transcript = new_transcript(b"fri test");
        assert!(!verify_polynomial(&mut transcript, &params, &root, &bad));

        assert_eq!(leading_zero_bits(&[0, 0, 0x10, 0xff]), 19);
        assert_eq!(leading_zero_bits(&[0x80]), 0);
    }

    #[test]
    fn test_fri_proof_bytes() {
        let mut prng = ChaChaRng::from_seed([4u8; 32]);
        let params = params(4);
        let poly = FpPolynomial::<F>::random(&mut prng, 20);
        let mut transcript = new_transcript(b"fri test");
        let (_, proof) = prove_polynomial(&mut transcript, &params, &poly).unwrap();

        let bytes = proof.to_bytes();
        assert_eq!(FriProof::<F>::from_bytes(&bytes).unwrap(), proof);
        assert!(FriProof::<F>::from_bytes(&bytes[..bytes.len() - 1]).is_err());
        let mut longer = bytes;
        longer.push(0);
        assert!(FriProof::<F>::from_bytes(&longer).is_err());
    }
}
