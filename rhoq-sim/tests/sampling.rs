//! Sampling statistics over noisy and entangled circuits

use rhoq_core::{Circuit, GateRecord, ParameterBinding};
use rhoq_sim::sampling;
use rhoq_state::DensityState;
use std::collections::HashMap;

fn key_map(keys: &[&str]) -> HashMap<String, usize> {
    keys.iter()
        .enumerate()
        .map(|(i, k)| (k.to_string(), i))
        .collect()
}

#[test]
fn bell_state_shots_are_perfectly_correlated() {
    let mut circ = Circuit::new(2);
    circ.push(GateRecord::h(0)).unwrap();
    circ.push(GateRecord::cnot(1, 0).unwrap()).unwrap();
    circ.push(GateRecord::measure(0, "q0")).unwrap();
    circ.push(GateRecord::measure(1, "q1")).unwrap();

    let state = DensityState::<f64>::new(2, 0).unwrap();
    let pr = ParameterBinding::new();
    let keys = key_map(&["q0", "q1"]);
    let shots = 10_000;
    let rows = sampling(&state, &circ, &pr, shots, &keys, 2024).unwrap();
    assert_eq!(rows.len(), shots * 2);

    let mut ones = 0usize;
    for shot in 0..shots {
        let (a, b) = (rows[shot * 2], rows[shot * 2 + 1]);
        assert_eq!(a, b, "only (0,0) and (1,1) can occur");
        ones += a as usize;
    }
    // roughly 50/50 for this seed
    assert!(ones > 4500 && ones < 5500, "got {} ones", ones);
}

#[test]
fn damped_qubit_biases_the_counts() {
    let mut circ = Circuit::new(1);
    circ.push(GateRecord::x(0)).unwrap();
    circ.push(GateRecord::amplitude_damping(0, 0.3).unwrap())
        .unwrap();
    circ.push(GateRecord::measure(0, "m")).unwrap();

    let state = DensityState::<f64>::new(1, 0).unwrap();
    let pr = ParameterBinding::new();
    let keys = key_map(&["m"]);
    let shots = 10_000;
    let rows = sampling(&state, &circ, &pr, shots, &keys, 55).unwrap();
    let ones: usize = rows.iter().map(|&b| b as usize).sum();
    // P(1) = 0.7 after damping
    assert!(ones > 6600 && ones < 7400, "got {} ones", ones);
}

#[test]
fn shots_reuse_the_template_state() {
    // the template keeps its prepared superposition; sampling works on
    // copies
    let mut state = DensityState::<f64>::new(1, 0).unwrap();
    state
        .apply_gate(&GateRecord::h(0), &ParameterBinding::new())
        .unwrap();
    let before = state.packed().to_vec();

    let mut circ = Circuit::new(1);
    circ.push(GateRecord::measure(0, "m")).unwrap();
    let keys = key_map(&["m"]);
    let rows = sampling(&state, &circ, &ParameterBinding::new(), 256, &keys, 9).unwrap();

    for (a, b) in state.packed().iter().zip(before.iter()) {
        assert!((a - b).norm() < 1e-15);
    }
    let ones: usize = rows.iter().map(|&b| b as usize).sum();
    assert!(ones > 64 && ones < 192);
}
