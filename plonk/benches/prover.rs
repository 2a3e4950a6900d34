use criterion::{criterion_group, criterion_main, Criterion};
use placeholder_algebra::{bls12_381::BLSScalar, prelude::*};
use placeholder_plonk::plonk::constraint_system::{
    AssignmentTable, Cell, ColumnType, ConstraintSystem, ConstraintSystemBuilder, Expression,
    FixedAssignment, TableDescription, Variable,
};
use placeholder_plonk::plonk::preprocessor::{preprocess, PlaceholderParams};
use placeholder_plonk::plonk::prover::prover;
use placeholder_plonk::plonk::verifier::verifier;
use placeholder_plonk::poly_commit::transcript::new_transcript;

type F = BLSScalar;

// A chain of multiplications by the constant column, with the last product public.
fn chain_circuit(u: usize) -> (ConstraintSystem<F>, FixedAssignment<F>, AssignmentTable<F>) {
    let w = |i: usize| Expression::<F>::from(Variable::witness(i));
    let mut builder = ConstraintSystemBuilder::<F>::new();
    let mul = builder.add_gate(vec![w(0) * w(1) - w(2)]);
    let chain = builder.add_gate(vec![Expression::from(Variable::witness(0).rotated(1)) - w(2)]);
    for row in 0..u {
        builder.add_copy_constraint(
            Cell::new(ColumnType::Witness, 1, row),
            Cell::new(ColumnType::Constant, 0, row),
        );
    }
    builder.add_copy_constraint(
        Cell::new(ColumnType::Witness, 2, u - 1),
        Cell::new(ColumnType::PublicInput, 0, 0),
    );
    let desc = TableDescription::new(3, 1, 1, builder.num_selectors(), u);
    let cs = builder.build(desc).unwrap();

    let mut selectors = vec![vec![]; 2];
    selectors[mul] = vec![F::one(); u];
    selectors[chain] = vec![F::one(); u - 1];
    let constant = F::from(3u32);
    let fixed = FixedAssignment {
        constants: vec![vec![constant; u]],
        selectors,
    };

    let mut w0 = vec![F::from(2u32)];
    let mut w2 = vec![];
    for i in 0..u {
        w2.push(w0[i] * constant);
        if i + 1 < u {
            w0.push(w2[i]);
        }
    }
    let table = AssignmentTable {
        public_inputs: vec![vec![w2[u - 1]]],
        witness: vec![w0, vec![constant; u], w2],
    };
    (cs, fixed, table)
}

fn bench_placeholder(c: &mut Criterion) {
    let mut prng = test_rng();
    let (cs, fixed, table) = chain_circuit(1023);
    let prover_params = preprocess(&cs, &fixed, &PlaceholderParams::default()).unwrap();

    let mut prover_group = c.benchmark_group("bench_prover");
    prover_group.sample_size(10);
    prover_group.bench_function("prover".to_string(), |b| {
        b.iter(|| {
            let mut transcript = new_transcript(b"TestPlaceholder");
            prover(&mut prng, &mut transcript, &cs, &prover_params, &table).unwrap()
        })
    });
    prover_group.finish();

    let mut transcript = new_transcript(b"TestPlaceholder");
    let proof = prover(&mut prng, &mut transcript, &cs, &prover_params, &table).unwrap();
    let verifier_params_ref = &prover_params.verifier_params;

    let mut verifier_group = c.benchmark_group("bench_verifier");
    verifier_group.bench_function("verifier".to_string(), |b| {
        b.iter(|| {
            let mut transcript = new_transcript(b"TestPlaceholder");
            verifier(
                &mut transcript,
                &cs,
                verifier_params_ref,
                &table.public_inputs,
                &proof,
            )
            .unwrap()
        })
    });
    verifier_group.finish();
}

criterion_group!(benches, bench_placeholder);
criterion_main!(benches);
