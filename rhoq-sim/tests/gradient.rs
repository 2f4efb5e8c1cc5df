//! Analytic gradients against central finite differences

use rhoq_core::{Circuit, GateRecord, Hamiltonian, ParameterBinding, ParameterExpr, PauliTerm};
use rhoq_sim::{GradConfig, GradOps};
use rhoq_state::DensityState;

const FD_STEP: f64 = 1e-4;
const FD_TOL: f64 = 1e-6;

fn binding(values: &[(&str, f64)]) -> ParameterBinding {
    let mut pr = ParameterBinding::new();
    for (name, v) in values {
        pr.set(*name, *v);
    }
    pr
}

/// Compare every analytic gradient entry against a central difference of
/// the engine's own value output.
fn check_gradients(
    circ: &Circuit,
    hams: &[Hamiltonian],
    names: &[&str],
    values: &[(&str, f64)],
    num_qubits: usize,
) {
    let state = DensityState::<f64>::new(num_qubits, 1).unwrap();
    let herm = circ.herm().unwrap();
    let ops = GradOps::new(&state, circ, &herm, hams)
        .unwrap()
        .with_params(&[], names);

    let pr = binding(values);
    let rows = ops.one_multi(&pr).unwrap();

    for (h, row) in rows.iter().enumerate() {
        assert!(row[0].im.abs() < 1e-9, "value should be real");
        for (p, name) in names.iter().enumerate() {
            let base = pr.get(name).unwrap();
            let plus = {
                let mut shifted = pr.clone();
                shifted.set(*name, base + FD_STEP);
                ops.one_multi(&shifted).unwrap()[h][0].re
            };
            let minus = {
                let mut shifted = pr.clone();
                shifted.set(*name, base - FD_STEP);
                ops.one_multi(&shifted).unwrap()[h][0].re
            };
            let fd = (plus - minus) / (2.0 * FD_STEP);
            let analytic = row[1 + p].re;
            assert!(
                (analytic - fd).abs() < FD_TOL,
                "ham {} param '{}': analytic {} vs finite difference {}",
                h,
                name,
                analytic,
                fd
            );
            assert!(row[1 + p].im.abs() < 1e-9);
        }
    }
}

#[test]
fn rx_scenario_value_and_gradient() {
    let theta = std::f64::consts::FRAC_PI_3;
    let state = DensityState::<f64>::new(1, 1).unwrap();
    let mut circ = Circuit::new(1);
    circ.push(GateRecord::rx(0, "theta")).unwrap();
    let herm = circ.herm().unwrap();
    let hams = [Hamiltonian::z(1, 0).unwrap()];
    let ops = GradOps::new(&state, &circ, &herm, &hams)
        .unwrap()
        .with_params(&[], &["theta"]);

    let row = ops.one_one(&binding(&[("theta", theta)])).unwrap();
    assert!((row[0].re - 0.5).abs() < 1e-10);
    assert!((row[1].re + 0.866_025_403_784_438_6).abs() < 1e-9);
}

#[test]
fn each_rotation_family_matches_finite_difference() {
    let families: Vec<(&str, Circuit)> = vec![
        ("rx", {
            let mut c = Circuit::new(1);
            c.push(GateRecord::h(0)).unwrap();
            c.push(GateRecord::rx(0, "a")).unwrap();
            c
        }),
        ("ry", {
            let mut c = Circuit::new(1);
            c.push(GateRecord::ry(0, "a")).unwrap();
            c
        }),
        ("rz", {
            let mut c = Circuit::new(1);
            c.push(GateRecord::h(0)).unwrap();
            c.push(GateRecord::rz(0, "a")).unwrap();
            c
        }),
        ("ps", {
            let mut c = Circuit::new(1);
            c.push(GateRecord::h(0)).unwrap();
            c.push(GateRecord::phase_shift(0, "a")).unwrap();
            c
        }),
        ("rxx", {
            let mut c = Circuit::new(2);
            c.push(GateRecord::h(0)).unwrap();
            c.push(GateRecord::rxx(0, 1, "a").unwrap()).unwrap();
            c
        }),
        ("ryy", {
            let mut c = Circuit::new(2);
            c.push(GateRecord::ry(1, 0.4)).unwrap();
            c.push(GateRecord::ryy(0, 1, "a").unwrap()).unwrap();
            c
        }),
        ("rzz", {
            let mut c = Circuit::new(2);
            c.push(GateRecord::h(0)).unwrap();
            c.push(GateRecord::h(1)).unwrap();
            c.push(GateRecord::rzz(0, 1, "a").unwrap()).unwrap();
            c
        }),
    ];

    for (_family, circ) in families {
        let n = circ.num_qubits();
        let hams = vec![
            Hamiltonian::z(n, 0).unwrap(),
            Hamiltonian::x(n, n - 1).unwrap(),
        ];
        for angle in [0.3, -1.2] {
            check_gradients(&circ, &hams, &["a"], &[("a", angle)], n);
        }
    }
}

#[test]
fn controlled_rotation_matches_finite_difference() {
    let mut circ = Circuit::new(2);
    circ.push(GateRecord::h(0)).unwrap();
    circ.push(
        GateRecord::new(
            rhoq_core::GateKind::Rx(ParameterExpr::name("a")),
            &[1],
            &[0],
        )
        .unwrap(),
    )
    .unwrap();
    let hams = [
        Hamiltonian::z(2, 1).unwrap(),
        Hamiltonian::from_terms(
            2,
            vec![PauliTerm::new(0.8, vec![(0, rhoq_core::Pauli::Z), (1, rhoq_core::Pauli::Z)]).unwrap()],
        )
        .unwrap(),
    ];
    check_gradients(&circ, &hams, &["a"], &[("a", 0.7)], 2);
}

#[test]
fn deep_circuit_with_shared_parameters_matches_finite_difference() {
    // depth-5, 3 qubits, parameter "a" appears twice with different
    // coefficients
    let mut circ = Circuit::new(3);
    circ.push(GateRecord::rx(0, "a")).unwrap();
    circ.push(GateRecord::ry(1, ParameterExpr::constant(0.3).add_term("a", 2.0)))
        .unwrap();
    circ.push(GateRecord::cnot(1, 0).unwrap()).unwrap();
    circ.push(GateRecord::rzz(1, 2, "b").unwrap()).unwrap();
    circ.push(GateRecord::phase_shift(2, "c")).unwrap();

    let hams = [
        Hamiltonian::z(3, 2).unwrap(),
        Hamiltonian::from_terms(
            3,
            vec![
                PauliTerm::new(0.5, vec![(0, rhoq_core::Pauli::X)]).unwrap(),
                PauliTerm::new(-0.7, vec![(1, rhoq_core::Pauli::Y), (2, rhoq_core::Pauli::Z)])
                    .unwrap(),
            ],
        )
        .unwrap(),
    ];
    check_gradients(
        &circ,
        &hams,
        &["a", "b", "c"],
        &[("a", 0.45), ("b", -0.8), ("c", 1.1)],
        3,
    );
}

#[test]
fn noisy_circuit_matches_finite_difference() {
    // amplitude damping between rotations forces the quadratic walk
    let mut circ = Circuit::new(2);
    circ.push(GateRecord::rx(0, "a")).unwrap();
    circ.push(GateRecord::amplitude_damping(0, 0.2).unwrap()).unwrap();
    circ.push(GateRecord::ry(1, "b")).unwrap();
    circ.push(GateRecord::cnot(1, 0).unwrap()).unwrap();
    circ.push(GateRecord::phase_damping(1, 0.15).unwrap()).unwrap();
    circ.push(GateRecord::rz(1, "c")).unwrap();

    let hams = [
        Hamiltonian::z(2, 1).unwrap(),
        Hamiltonian::x(2, 0).unwrap(),
    ];
    check_gradients(
        &circ,
        &hams,
        &["a", "b", "c"],
        &[("a", 0.6), ("b", 1.3), ("c", -0.5)],
        2,
    );
}

#[test]
fn noise_and_reversible_walks_agree_on_unitary_circuits() {
    // a zero-probability Pauli channel is the identity map but routes the
    // evaluation through the noise walk
    let mut clean = Circuit::new(2);
    clean.push(GateRecord::rx(0, "a")).unwrap();
    clean.push(GateRecord::cnot(1, 0).unwrap()).unwrap();
    clean.push(GateRecord::ry(1, "b")).unwrap();

    let mut noisy = Circuit::new(2);
    noisy.push(GateRecord::rx(0, "a")).unwrap();
    noisy.push(GateRecord::pauli_channel(0, 0.0, 0.0, 0.0).unwrap()).unwrap();
    noisy.push(GateRecord::cnot(1, 0).unwrap()).unwrap();
    noisy.push(GateRecord::ry(1, "b")).unwrap();

    let state = DensityState::<f64>::new(2, 1).unwrap();
    let hams = [Hamiltonian::z(2, 1).unwrap()];
    let pr = binding(&[("a", 0.9), ("b", -0.2)]);

    let clean_herm = clean.herm().unwrap();
    let clean_row = GradOps::new(&state, &clean, &clean_herm, &hams)
        .unwrap()
        .with_params(&[], &["a", "b"])
        .one_one(&pr)
        .unwrap();

    let noisy_herm = noisy.herm().unwrap();
    let noisy_row = GradOps::new(&state, &noisy, &noisy_herm, &hams)
        .unwrap()
        .with_params(&[], &["a", "b"])
        .one_one(&pr)
        .unwrap();

    for (a, b) in clean_row.iter().zip(noisy_row.iter()) {
        assert!((a - b).norm() < 1e-10);
    }
}

#[test]
fn multi_binding_multi_ham_shapes_and_values() {
    let mut circ = Circuit::new(2);
    circ.push(GateRecord::rx(0, "a")).unwrap();
    circ.push(GateRecord::cnot(1, 0).unwrap()).unwrap();
    let herm = circ.herm().unwrap();
    let state = DensityState::<f64>::new(2, 1).unwrap();
    let hams = [
        Hamiltonian::z(2, 0).unwrap(),
        Hamiltonian::z(2, 1).unwrap(),
        Hamiltonian::x(2, 0).unwrap(),
    ];
    let ops = GradOps::new(&state, &circ, &herm, &hams)
        .unwrap()
        .with_params(&[], &["a"])
        .with_config(GradConfig {
            batch_threads: 2,
            mea_threads: 2,
        });

    let bindings = vec![binding(&[("a", 0.2)]), binding(&[("a", 1.4)])];
    let all = ops.run(&bindings).unwrap();
    assert_eq!(all.len(), 2);
    for (b, per_binding) in all.iter().enumerate() {
        assert_eq!(per_binding.len(), 3);
        for row in per_binding {
            assert_eq!(row.len(), 2);
        }
        // matches the inline single-binding path
        let solo = ops.one_multi(&bindings[b]).unwrap();
        for (x, y) in per_binding.iter().flatten().zip(solo.iter().flatten()) {
            assert!((x - y).norm() < 1e-12);
        }
    }
}

#[test]
fn encoder_names_come_first_in_the_gradient_row() {
    let mut circ = Circuit::new(1);
    circ.push(GateRecord::rx(0, "enc")).unwrap();
    circ.push(GateRecord::ry(0, "ans")).unwrap();
    let herm = circ.herm().unwrap();
    let state = DensityState::<f64>::new(1, 1).unwrap();
    let hams = [Hamiltonian::z(1, 0).unwrap()];
    let ops = GradOps::new(&state, &circ, &herm, &hams)
        .unwrap()
        .with_params(&["enc"], &["ans"]);

    let pr = binding(&[("enc", 0.4), ("ans", 0.9)]);
    let row = ops.one_one(&pr).unwrap();
    assert_eq!(row.len(), 3);

    // column 1 is the encoder gradient: shift enc and compare
    let mut shifted = pr.clone();
    shifted.set("enc", 0.4 + FD_STEP);
    let plus = ops.one_one(&shifted).unwrap()[0].re;
    shifted.set("enc", 0.4 - FD_STEP);
    let minus = ops.one_one(&shifted).unwrap()[0].re;
    assert!((row[1].re - (plus - minus) / (2.0 * FD_STEP)).abs() < FD_TOL);
}
