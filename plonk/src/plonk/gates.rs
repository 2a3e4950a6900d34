use crate::plonk::{
    constraint_system::ConstraintSystem,
    helpers::{PointEvaluator, PolyLayout},
};
use placeholder_algebra::prelude::*;

/// The gate constraint at a point: `sum_g q_g sum_c theta^k c`, where `k` counts the
/// constraints over all gates.
pub(crate) fn constraint_at<F: Scalar, E: PointEvaluator<F>>(
    cs: &ConstraintSystem<F>,
    layout: &PolyLayout,
    theta: &F,
    eval: &E,
) -> F {
    let mut power = F::one();
    let mut result = F::zero();
    for gate in cs.gates.iter() {
        let mut gate_sum = F::zero();
        for c in gate.constraints.iter() {
            gate_sum.add_assign(&(power * eval.expression(layout, c)));
            power.mul_assign(theta);
        }
        result.add_assign(&(eval.poly(layout.selector(gate.selector_index), 0) * gate_sum));
    }
    result
}

/// The largest degree of the gate constraint in the committed polynomials.
pub(crate) fn max_degree<F: Scalar>(cs: &ConstraintSystem<F>) -> usize {
    cs.max_gate_degree()
}

#[cfg(test)]
mod test {
    use crate::plonk::{
        constraint_system::{ConstraintSystemBuilder, Expression, TableDescription, Variable},
        gates::constraint_at,
        helpers::{PointEvaluator, PolyLayout, PolyRef},
    };
    use ark_std::collections::BTreeMap;
    use placeholder_algebra::{bls12_381::BLSScalar, prelude::*};

    type F = BLSScalar;

    struct MapEvaluator(BTreeMap<(PolyRef, i32), F>);

    impl PointEvaluator<F> for MapEvaluator {
        fn poly(&self, p: PolyRef, rotation: i32) -> F {
            self.0.get(&(p, rotation)).copied().unwrap_or_default()
        }
        fn x(&self) -> F {
            F::zero()
        }
        fn l0(&self) -> F {
            F::zero()
        }
    }

    #[test]
    fn test_gate_combination() {
        let mut builder = ConstraintSystemBuilder::<F>::new();
        let w = |i: usize| Expression::<F>::from(Variable::witness(i));
        let s0 = builder.add_gate(vec![w(0) - w(1), w(2)]);
        let s1 = builder.add_gate(vec![w(0) * w(2)]);
        let cs = builder.build(TableDescription::new(3, 0, 0, 2, 3)).unwrap();
        let layout = PolyLayout::new(&cs, 8).unwrap();

        let f = |v: u32| F::from(v);
        let mut values = BTreeMap::new();
        values.insert((layout.witness(0), 0), f(5));
        values.insert((layout.witness(1), 0), f(3));
        values.insert((layout.witness(2), 0), f(4));
        values.insert((layout.selector(s0), 0), f(1));
        values.insert((layout.selector(s1), 0), f(1));
        let theta = f(10);
        // (5 - 3) + 10 * 4 + 100 * 20
        assert_eq!(
            constraint_at(&cs, &layout, &theta, &MapEvaluator(values.clone())),
            f(2042)
        );

        values.insert((layout.selector(s1), 0), f(0));
        assert_eq!(
            constraint_at(&cs, &layout, &theta, &MapEvaluator(values)),
            f(42)
        );
    }
}
