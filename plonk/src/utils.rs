use crate::errors::{PlonkError, Result};
use placeholder_algebra::prelude::*;
use placeholder_crypto::merkle_tree::{MerkleDigest, MerklePath, DIGEST_LEN};

/// Invert every element in place with a single field inversion.
pub fn batch_inverse<F: Scalar>(values: &mut [F]) -> Result<()> {
    let mut prefix = Vec::with_capacity(values.len());
    let mut acc = F::one();
    for v in values.iter() {
        prefix.push(acc);
        acc.mul_assign(v);
    }
    let mut inv = acc.inv().map_err(|_| PlonkError::DivisionByZero)?;
    for (v, p) in values.iter_mut().zip(prefix.into_iter()).rev() {
        let tmp = inv * p;
        inv.mul_assign(&*v);
        *v = tmp;
    }
    Ok(())
}

/// Concatenate the canonical encodings of field elements.
pub fn field_elems_to_bytes<F: Scalar>(elems: &[F]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(elems.len() * F::bytes_len());
    for e in elems {
        bytes.extend_from_slice(&e.to_bytes());
    }
    bytes
}

/// Writer for the proof wire format: little-endian integers, `u64` length prefixes and
/// fixed-size field elements and digests.
#[derive(Debug, Default)]
pub struct ByteWriter {
    bytes: Vec<u8>,
}

impl ByteWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a `u64` in little-endian.
    pub fn write_u64(&mut self, v: u64) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    /// Write a single byte.
    pub fn write_u8(&mut self, v: u8) {
        self.bytes.push(v);
    }

    /// Write a digest.
    pub fn write_digest(&mut self, d: &MerkleDigest) {
        self.bytes.extend_from_slice(d);
    }

    /// Write a length-prefixed list of digests.
    pub fn write_digests(&mut self, ds: &[MerkleDigest]) {
        self.write_u64(ds.len() as u64);
        for d in ds {
            self.write_digest(d);
        }
    }

    /// Write a field element.
    pub fn write_field<F: Scalar>(&mut self, f: &F) {
        self.bytes.extend_from_slice(&f.to_bytes());
    }

    /// Write a length-prefixed list of field elements.
    pub fn write_fields<F: Scalar>(&mut self, fs: &[F]) {
        self.write_u64(fs.len() as u64);
        for f in fs {
            self.write_field(f);
        }
    }

    /// Write a Merkle authentication path.
    pub fn write_path(&mut self, path: &MerklePath) {
        self.write_digests(&path.siblings);
    }

    /// Return the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Cursor over the proof wire format.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a new cursor over the provided byte slice.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Return the number of bytes remaining in the cursor.
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.offset)
    }

    fn read_exact(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(PlonkError::DeserializationError);
        }
        let start = self.offset;
        self.offset += len;
        Ok(&self.bytes[start..start + len])
    }

    /// Read a little-endian `u64`.
    pub fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.read_exact(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_exact(1)?[0])
    }

    /// Read a length prefix, refusing lengths that cannot fit in the remaining bytes.
    fn read_len(&mut self, item_size: usize) -> Result<usize> {
        let len = self.read_u64()?;
        let len = usize::try_from(len).map_err(|_| PlonkError::DeserializationError)?;
        if len.saturating_mul(item_size) > self.remaining() {
            return Err(PlonkError::DeserializationError);
        }
        Ok(len)
    }

    /// Read a digest.
    pub fn read_digest(&mut self) -> Result<MerkleDigest> {
        let mut d = [0u8; DIGEST_LEN];
        d.copy_from_slice(self.read_exact(DIGEST_LEN)?);
        Ok(d)
    }

    /// Read a length-prefixed list of digests.
    pub fn read_digests(&mut self) -> Result<Vec<MerkleDigest>> {
        let len = self.read_len(DIGEST_LEN)?;
        (0..len).map(|_| self.read_digest()).collect()
    }

    /// Read a field element.
    pub fn read_field<F: Scalar>(&mut self) -> Result<F> {
        let bytes = self.read_exact(F::bytes_len())?;
        F::from_bytes(bytes).map_err(|_| PlonkError::DeserializationError)
    }

    /// Read a length-prefixed list of field elements.
    pub fn read_fields<F: Scalar>(&mut self) -> Result<Vec<F>> {
        let len = self.read_len(F::bytes_len())?;
        (0..len).map(|_| self.read_field()).collect()
    }

    /// Read a Merkle authentication path.
    pub fn read_path(&mut self) -> Result<MerklePath> {
        Ok(MerklePath {
            siblings: self.read_digests()?,
        })
    }

    /// Fail unless every byte was consumed.
    pub fn finish(&self) -> Result<()> {
        if self.remaining() == 0 {
            Ok(())
        } else {
            Err(PlonkError::DeserializationError)
        }
    }
}
