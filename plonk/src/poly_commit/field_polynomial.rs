use ark_poly::{EvaluationDomain, Radix2EvaluationDomain};
use placeholder_algebra::prelude::*;

/// Field polynomial in coefficient form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FpPolynomial<F> {
    /// Coefficients of the polynomial, low-order coefficient first
    pub coefs: Vec<F>,
}

impl<F: Scalar> FpPolynomial<F> {
    /// Return the polynomial coefs reference.
    pub fn get_coefs_ref(&self) -> &[F] {
        self.coefs.as_slice()
    }

    /// Return the constant zero polynomial
    /// # Example
    /// ```
    /// use placeholder_plonk::poly_commit::field_polynomial::FpPolynomial;
    /// use placeholder_algebra::bls12_381::BLSScalar;
    /// use placeholder_algebra::{Zero, One};
    /// let poly = FpPolynomial::<BLSScalar>::zero();
    /// let zero = BLSScalar::zero();
    /// assert_eq!(poly.degree(), 0);
    /// assert_eq!(poly.eval(&zero), zero);
    /// assert_eq!(poly.eval(&BLSScalar::one()), zero);
    /// ```
    pub fn zero() -> Self {
        Self::from_coefs(vec![F::zero()])
    }

    /// Return the constant one polynomial
    pub fn one() -> Self {
        Self::from_coefs(vec![F::one()])
    }

    /// Build a polynomial from the coefficient vector, low-order coefficient first.
    /// High-order zero coefficient are trimmed.
    /// # Example
    /// ```
    /// use placeholder_plonk::poly_commit::field_polynomial::FpPolynomial;
    /// use placeholder_algebra::bls12_381::BLSScalar;
    /// use placeholder_algebra::{Zero, One};
    /// let zero = BLSScalar::zero();
    /// let one = BLSScalar::one();
    /// let two = one + one;
    /// let five = two + two + one;
    /// let poly = FpPolynomial::from_coefs(vec![one, zero, one]);
    /// assert_eq!(poly.degree(), 2);
    /// assert_eq!(poly.eval(&zero), one);
    /// assert_eq!(poly.eval(&one), two);
    /// assert_eq!(poly.eval(&two), five);
    /// let poly2 = FpPolynomial::from_coefs(vec![one, zero, one, zero, zero, zero]);
    /// assert_eq!(poly, poly2);
    /// ```
    pub fn from_coefs(coefs: Vec<F>) -> Self {
        let mut p = FpPolynomial { coefs };
        p.trim_coefs();
        p
    }

    /// Build a polynomial from its zeroes/roots.
    pub fn from_zeroes(zeroes: &[F]) -> Self {
        let mut r = Self::one();
        for root in zeroes.iter() {
            let mut p = r.clone();
            r.coefs.insert(0, F::zero());
            p.mul_scalar_assign(root);
            r.sub_assign(&p);
        }
        r
    }

    /// Return a polynomial of `degree` + 1 uniformly random coefficients.
    pub fn random<R: CryptoRng + RngCore>(prng: &mut R, degree: usize) -> FpPolynomial<F> {
        let coefs = (0..=degree).map(|_| F::random(prng)).collect();
        Self::from_coefs(coefs)
    }

    /// Remove high degree zero-coefficients
    fn trim_coefs(&mut self) {
        while self.coefs.len() > 1 && self.coefs.last().map_or(false, |c| c.is_zero()) {
            self.coefs.pop();
        }
        if self.coefs.is_empty() {
            self.coefs.push(F::zero());
        }
    }

    /// Return degree of the polynomial
    pub fn degree(&self) -> usize {
        self.coefs.len() - 1
    }

    /// Test if polynomial is the zero polynomial.
    pub fn is_zero(&self) -> bool {
        self.degree() == 0 && self.coefs[0].is_zero()
    }

    /// Evaluate a polynomial on a point.
    pub fn eval(&self, point: &F) -> F {
        self.coefs
            .iter()
            .rev()
            .fold(F::zero(), |acc, coef| acc * point + coef)
    }

    /// Add another polynomial to self.
    pub fn add_assign(&mut self, other: &Self) {
        if self.coefs.len() < other.coefs.len() {
            self.coefs.resize(other.coefs.len(), F::zero());
        }
        for (self_coef, other_coef) in self.coefs.iter_mut().zip(other.coefs.iter()) {
            self_coef.add_assign(other_coef);
        }
        self.trim_coefs();
    }

    /// Add with another polynomial, producing a new polynomial.
    pub fn add(&self, other: &Self) -> Self {
        let mut new = self.clone();
        new.add_assign(other);
        new
    }

    /// Subtracts another polynomial from self.
    pub fn sub_assign(&mut self, other: &Self) {
        if self.coefs.len() < other.coefs.len() {
            self.coefs.resize(other.coefs.len(), F::zero());
        }
        for (self_coef, other_coef) in self.coefs.iter_mut().zip(other.coefs.iter()) {
            self_coef.sub_assign(other_coef);
        }
        self.trim_coefs();
    }

    /// Subtract another polynomial from self, producing a new polynomial.
    pub fn sub(&self, other: &Self) -> Self {
        let mut new = self.clone();
        new.sub_assign(other);
        new
    }

    /// Negate the coefficients.
    pub fn neg(&self) -> Self {
        Self::from_coefs(self.coefs.iter().map(|c| c.neg()).collect())
    }

    /// Multiply self by a scalar.
    pub fn mul_scalar_assign(&mut self, scalar: &F) {
        for coef in self.coefs.iter_mut() {
            coef.mul_assign(scalar)
        }
        self.trim_coefs();
    }

    /// Multiply by a scalar, producing a new polynomial.
    pub fn mul_scalar(&self, scalar: &F) -> Self {
        let mut new = self.clone();
        new.mul_scalar_assign(scalar);
        new
    }

    /// Substitute the variable, i.e., compute `f(k * X)`.
    pub fn mul_var(&self, k: &F) -> Self {
        let mut r = F::one();
        let coefs = self
            .coefs
            .iter()
            .map(|coef| {
                let c = r * coef;
                r.mul_assign(k);
                c
            })
            .collect();
        Self::from_coefs(coefs)
    }
}

impl<F: Domain> FpPolynomial<F> {
    /// Return the radix-2 evaluation domain of `num_points` elements, if the field has one.
    pub fn evaluation_domain(num_points: usize) -> Option<Radix2EvaluationDomain<F::Field>> {
        if !num_points.is_power_of_two() {
            return None;
        }
        Radix2EvaluationDomain::<F::Field>::new(num_points)
    }

    /// Evaluate the polynomial on the domain. Coefficients beyond the domain size are
    /// folded onto the lower ones, which keeps the evaluations exact.
    pub fn fft_with_domain(&self, domain: &Radix2EvaluationDomain<F::Field>) -> Vec<F> {
        Self::fft_coefs(domain, self.coefs.iter().copied())
    }

    /// Evaluate the polynomial on the coset `k * domain`.
    pub fn coset_fft_with_domain(
        &self,
        domain: &Radix2EvaluationDomain<F::Field>,
        k: &F,
    ) -> Vec<F> {
        let mut r = F::one();
        let coefs = self.coefs.iter().map(|coef| {
            let c = r * coef;
            r.mul_assign(k);
            c
        });
        Self::fft_coefs(domain, coefs)
    }

    fn fft_coefs<I: Iterator<Item = F>>(
        domain: &Radix2EvaluationDomain<F::Field>,
        coefs: I,
    ) -> Vec<F> {
        let size = domain.size();
        let mut buckets = vec![F::zero(); size];
        for (i, c) in coefs.enumerate() {
            buckets[i % size].add_assign(&c);
        }
        let fields: Vec<F::Field> = buckets.iter().map(|c| c.get_field()).collect();
        domain
            .fft(&fields)
            .into_iter()
            .map(F::from_field)
            .collect()
    }

    /// Interpolate the polynomial from its values on the domain.
    pub fn ifft_with_domain(domain: &Radix2EvaluationDomain<F::Field>, values: &[F]) -> Self {
        let fields: Vec<F::Field> = values.iter().map(|v| v.get_field()).collect();
        let coefs = domain.ifft(&fields).into_iter().map(F::from_field).collect();
        Self::from_coefs(coefs)
    }

    /// Interpolate the polynomial from its values on the coset `k * domain`.
    pub fn coset_ifft_with_domain(
        domain: &Radix2EvaluationDomain<F::Field>,
        values: &[F],
        k_inv: &F,
    ) -> Self {
        Self::ifft_with_domain(domain, values).mul_var(k_inv)
    }
}

/// Return the elements `shift * root^i` for `i < domain.size()`.
pub fn domain_elements<F: Domain>(domain: &Radix2EvaluationDomain<F::Field>, shift: &F) -> Vec<F> {
    let root = F::from_field(domain.group_gen);
    let mut points = Vec::with_capacity(domain.size());
    let mut x = *shift;
    for _ in 0..domain.size() {
        points.push(x);
        x.mul_assign(&root);
    }
    points
}

#[cfg(test)]
mod test {
    use crate::poly_commit::field_polynomial::{domain_elements, FpPolynomial};
    use placeholder_algebra::{bls12_381::BLSScalar, prelude::*};
    use rand_chacha::ChaChaRng;

    type F = BLSScalar;

    #[test]
    fn test_from_zeroes() {
        let mut prng = ChaChaRng::from_seed([0u8; 32]);
        let zeroes: Vec<F> = (0..10).map(|_| F::random(&mut prng)).collect();
        let poly = FpPolynomial::from_zeroes(&zeroes);
        assert_eq!(poly.degree(), 10);
        for root in zeroes.iter() {
            assert_eq!(F::zero(), poly.eval(root));
        }
    }

    #[test]
    fn test_arithmetic() {
        let one = F::one();
        let two = one + one;
        let three = two + one;
        let p1 = FpPolynomial::from_coefs(vec![three, three, two, one]);
        let p2 = FpPolynomial::from_coefs(vec![three, two, one, one]);
        assert_eq!(
            p1.sub(&p2),
            FpPolynomial::from_coefs(vec![F::zero(), one, one])
        );
        assert_eq!(p1.add(&p2.neg()), p1.sub(&p2));
        assert!(p1.sub(&p1).is_zero());
        assert_eq!(p1.mul_scalar(&two), p1.add(&p1));

        let x = F::from(7u32);
        assert_eq!(p1.mul_var(&two).eval(&x), p1.eval(&(two * x)));
    }

    #[test]
    fn test_fft() {
        let mut prng = ChaChaRng::from_seed([1u8; 32]);
        let domain = FpPolynomial::<F>::evaluation_domain(16).unwrap();
        assert!(FpPolynomial::<F>::evaluation_domain(12).is_none());

        let poly = FpPolynomial::<F>::random(&mut prng, 15);
        let points = domain_elements::<F>(&domain, &F::one());
        let values = poly.fft_with_domain(&domain);
        for (x, v) in points.iter().zip(values.iter()) {
            assert_eq!(poly.eval(x), *v);
        }
        assert_eq!(FpPolynomial::ifft_with_domain(&domain, &values), poly);

        let k = F::multiplicative_generator();
        let coset_points = domain_elements::<F>(&domain, &k);
        let coset_values = poly.coset_fft_with_domain(&domain, &k);
        for (x, v) in coset_points.iter().zip(coset_values.iter()) {
            assert_eq!(poly.eval(x), *v);
        }
        let k_inv = k.inv().unwrap();
        assert_eq!(
            FpPolynomial::coset_ifft_with_domain(&domain, &coset_values, &k_inv),
            poly
        );
    }

    #[test]
    fn test_fft_wraps_high_coefficients() {
        let mut prng = ChaChaRng::from_seed([2u8; 32]);
        let domain = FpPolynomial::<F>::evaluation_domain(8).unwrap();
        let poly = FpPolynomial::<F>::random(&mut prng, 20);
        let k = F::multiplicative_generator();
        let points = domain_elements::<F>(&domain, &k);
        let values = poly.coset_fft_with_domain(&domain, &k);
        for (x, v) in points.iter().zip(values.iter()) {
            assert_eq!(poly.eval(x), *v);
        }
    }
}
