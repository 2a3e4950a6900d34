use criterion::{criterion_group, criterion_main, Criterion};
use placeholder_algebra::{bls12_381::BLSScalar, prelude::*};
use placeholder_plonk::poly_commit::{
    field_polynomial::FpPolynomial,
    fri::{prove_polynomial, verify_polynomial, FriParams},
    transcript::new_transcript,
};

fn bench_fri(c: &mut Criterion) {
    let mut prng = test_rng();

    let mut fri_group = c.benchmark_group("bench_fri");
    fri_group.sample_size(10);
    for log_degree in [10usize, 14] {
        let degree = 1 << log_degree;
        let params = FriParams::new(degree, 2, vec![2; (log_degree - 2) / 2], 40, 0).unwrap();
        let poly = FpPolynomial::<BLSScalar>::random(&mut prng, degree - 1);

        fri_group.bench_function(format!("prove degree 2^{}", log_degree), |b| {
            b.iter(|| {
                let mut transcript = new_transcript(b"TestFRI");
                prove_polynomial(&mut transcript, &params, &poly).unwrap()
            })
        });

        let mut transcript = new_transcript(b"TestFRI");
        let (root, proof) = prove_polynomial(&mut transcript, &params, &poly).unwrap();
        fri_group.bench_function(format!("verify degree 2^{}", log_degree), |b| {
            b.iter(|| {
                let mut transcript = new_transcript(b"TestFRI");
                assert!(verify_polynomial(&mut transcript, &params, &root, &proof))
            })
        });
    }
    fri_group.finish();
}

criterion_group!(benches, bench_fri);
criterion_main!(benches);
