//! Editing Property Tests
//!
//! Stack invariants and edit semantics exercised through the public API.

use approx::assert_abs_diff_eq;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use test_case::test_case;

use vmodel::model::{
    CommonParams, InsertionCase, LayerParams, LayerStack, ModelKind, Parameter, Placement,
};

fn iso(vp: f64, vs: f64) -> LayerParams {
    LayerParams::isotropic(vp, vs, CommonParams::new(2.7, 600.0, 300.0))
}

fn ti(vsv: f64, vsh: f64) -> LayerParams {
    LayerParams::transverse_isotropic(6.0, vsv, 6.1, vsh, 4.0, CommonParams::new(2.7, 600.0, 300.0))
}

fn iso_layer(vs: f64) -> LayerParams {
    iso(vs * 1.8, vs)
}

fn ti_layer(vs: f64) -> LayerParams {
    ti(vs, vs * 1.05)
}

fn assert_invariants(stack: &LayerStack) {
    let n = stack.len();
    for param in stack.kind().parameters() {
        assert_eq!(stack.column(param).unwrap().len(), n, "column {} length", param);
    }
    assert_eq!(stack.depths().len(), n);
    for i in 0..n {
        assert!(stack.thickness()[i] > 0.0, "layer {} thickness {}", i, stack.thickness()[i]);
        let previous = if i == 0 { 0.0 } else { stack.depths()[i - 1] };
        assert!(stack.depths()[i] > previous);
        assert_abs_diff_eq!(stack.depths()[i] - previous, stack.thickness()[i], epsilon = 1e-9);
    }
}

#[test_case(ModelKind::Isotropic ; "isotropic")]
#[test_case(ModelKind::TransverseIsotropic ; "transverse isotropic")]
fn test_random_edits_preserve_invariants(kind: ModelKind) {
    let mut rng = StdRng::seed_from_u64(0x9E37_79B9_7F4A_7C15);
    let (param, layer): (Parameter, fn(f64) -> LayerParams) = match kind {
        ModelKind::Isotropic => (Parameter::Vs, iso_layer),
        ModelKind::TransverseIsotropic => (Parameter::Vsh, ti_layer),
    };

    let mut stack = LayerStack::new(kind);
    stack.append_layer(50.0, &layer(3.5)).unwrap();

    for step in 0..300 {
        let total = stack.total_depth();
        if step % 3 == 0 {
            let lo = rng.random::<f64>() * total * 1.2 - total * 0.1;
            let hi = lo + rng.random::<f64>() * 20.0 + 0.01;
            let fraction = rng.random::<f64>() - 0.5;
            stack.perturb(param, fraction, lo, hi).unwrap();
        } else {
            let thickness = rng.random::<f64>() * 10.0 + 0.1;
            let top = rng.random::<f64>() * total * 1.2 - total * 0.05;
            let case = stack
                .insert_layer(thickness, &layer(2.0 + rng.random::<f64>() * 2.5), Placement::Top(top))
                .unwrap();
            if let InsertionCase::Surface { .. } = case {
                assert_eq!(stack.thickness()[0], thickness);
            }
        }
        assert_invariants(&stack);
    }
}

#[test_case(0 ; "empty stack")]
#[test_case(1 ; "one layer")]
#[test_case(7 ; "several layers")]
fn test_append_is_always_last(existing: usize) {
    let mut stack = LayerStack::new(ModelKind::Isotropic);
    for _ in 0..existing {
        stack.append_layer(3.0, &iso(6.0, 3.5)).unwrap();
    }
    let total = stack.total_depth();

    stack.insert_layer(2.0, &iso(8.0, 4.5), Placement::Top(total + 5.0)).unwrap();

    assert_eq!(stack.len(), existing + 1);
    assert_eq!(stack.layer(existing).unwrap(), iso(8.0, 4.5));
    assert_abs_diff_eq!(stack.total_depth(), total + 2.0, epsilon = 1e-12);
}

#[test]
fn test_split_single_layer() {
    let mut stack = LayerStack::new(ModelKind::Isotropic);
    stack.append_layer(10.0, &iso(6.0, 3.5)).unwrap();

    stack.insert_layer(2.0, &iso(5.0, 2.8), Placement::Top(5.0)).unwrap();

    assert_eq!(stack.thickness(), &[5.0, 2.0, 3.0]);
    assert_eq!(stack.column(Parameter::Vp).unwrap(), &[6.0, 5.0, 6.0]);
    assert_eq!(stack.column(Parameter::Vs).unwrap(), &[3.5, 2.8, 3.5]);
    assert_eq!(stack.total_depth(), 10.0);
}

#[test]
fn test_boundary_aligned_insert_has_no_sliver() {
    let mut stack = LayerStack::new(ModelKind::Isotropic);
    stack.append_layer(4.0, &iso(6.0, 3.5)).unwrap();
    stack.append_layer(6.0, &iso(7.0, 4.0)).unwrap();

    stack.insert_layer(2.0, &iso(5.0, 2.8), Placement::Top(4.0)).unwrap();

    assert_eq!(stack.thickness(), &[4.0, 2.0, 4.0]);
    assert!(stack.thickness().iter().all(|h| *h > 1e-6));
}

#[test]
fn test_perturb_whole_layer_is_multiplicative() {
    let mut stack = LayerStack::new(ModelKind::Isotropic);
    stack.append_layer(5.0, &iso(6.0, 3.0)).unwrap();
    stack.append_layer(5.0, &iso(7.0, 4.0)).unwrap();

    stack.perturb(Parameter::Vs, 0.1, 0.0, 5.0).unwrap();

    assert_eq!(stack.len(), 2);
    assert_abs_diff_eq!(stack.column(Parameter::Vs).unwrap()[0], 3.3, epsilon = 1e-12);
    assert_eq!(stack.column(Parameter::Vs).unwrap()[1], 4.0);
    assert_eq!(stack.column(Parameter::Vp).unwrap(), &[6.0, 7.0]);
    assert_eq!(stack.column(Parameter::Rho).unwrap(), &[2.7, 2.7]);
}

#[test_case(ModelKind::Isotropic, Parameter::Vpv ; "vpv on isotropic")]
#[test_case(ModelKind::Isotropic, Parameter::Vpf ; "vpf on isotropic")]
#[test_case(ModelKind::TransverseIsotropic, Parameter::Vs ; "vs on ti")]
#[test_case(ModelKind::TransverseIsotropic, Parameter::Vp ; "vp on ti")]
fn test_variant_rejection(kind: ModelKind, param: Parameter) {
    let mut stack = LayerStack::new(kind);
    match kind {
        ModelKind::Isotropic => stack.append_layer(5.0, &iso(6.0, 3.0)).unwrap(),
        ModelKind::TransverseIsotropic => stack.append_layer(5.0, &ti(3.0, 3.1)).unwrap(),
    }
    let before = stack.clone();

    let err = stack.perturb(param, 0.1, 0.0, 5.0).unwrap_err();

    assert_eq!(err.error_code(), "INCOMPATIBLE_PARAMETER");
    assert_eq!(stack, before);
}

#[test]
fn test_out_of_range_fraction_leaves_stack() {
    let mut stack = LayerStack::new(ModelKind::Isotropic);
    stack.append_layer(5.0, &iso(6.0, 3.0)).unwrap();
    let before = stack.clone();

    let err = stack.perturb(Parameter::Vs, 1.5, 0.0, 5.0).unwrap_err();

    assert_eq!(err.error_code(), "OUT_OF_RANGE_PERTURBATION");
    assert_eq!(stack, before);
}

#[test]
fn test_vsh_perturbation_touches_only_vsh() {
    let mut stack = LayerStack::new(ModelKind::TransverseIsotropic);
    stack.append_layer(10.0, &ti(3.0, 3.2)).unwrap();

    stack.perturb(Parameter::Vsh, -0.1, 2.0, 6.0).unwrap();

    assert_eq!(stack.thickness(), &[2.0, 4.0, 4.0]);
    let vsh = stack.column(Parameter::Vsh).unwrap();
    assert_eq!(vsh[0], 3.2);
    assert_abs_diff_eq!(vsh[1], 2.88, epsilon = 1e-12);
    assert_eq!(vsh[2], 3.2);
    assert_eq!(stack.column(Parameter::Vsv).unwrap(), &[3.0, 3.0, 3.0]);
    assert_eq!(stack.column(Parameter::Vph).unwrap(), &[6.1, 6.1, 6.1]);
}

#[test]
fn test_clone_does_not_alias() {
    let mut base = LayerStack::new(ModelKind::Isotropic);
    base.append_layer(10.0, &iso(6.0, 3.0)).unwrap();

    let mut experiment = base.clone();
    experiment.insert_layer(1.0, &iso(5.0, 2.5), Placement::Top(3.0)).unwrap();
    experiment.perturb(Parameter::Vp, 0.2, 0.0, 10.0).unwrap();

    assert_eq!(base.len(), 1);
    assert_eq!(base.column(Parameter::Vp).unwrap(), &[6.0]);
    assert_eq!(experiment.len(), 3);
}
