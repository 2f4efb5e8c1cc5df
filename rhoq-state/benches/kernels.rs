//! Gate kernel throughput over the packed density matrix

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rhoq_core::{GateRecord, ParameterBinding};
use rhoq_state::DensityState;

fn prepared_state(num_qubits: usize) -> DensityState<f64> {
    let mut state = DensityState::new(num_qubits, 42).unwrap();
    let pr = ParameterBinding::new();
    for q in 0..num_qubits {
        state.apply_gate(&GateRecord::h(q), &pr).unwrap();
    }
    state
}

fn bench_kernels(c: &mut Criterion) {
    let pr = ParameterBinding::new();
    let mut group = c.benchmark_group("kernels");

    for num_qubits in [6, 8] {
        let state = prepared_state(num_qubits);

        group.bench_function(format!("hadamard/{}q", num_qubits), |b| {
            b.iter_batched(
                || state.clone(),
                |mut s| {
                    s.apply_gate(black_box(&GateRecord::h(0)), &pr).unwrap();
                    s
                },
                criterion::BatchSize::LargeInput,
            )
        });

        group.bench_function(format!("zlike/{}q", num_qubits), |b| {
            b.iter_batched(
                || state.clone(),
                |mut s| {
                    s.apply_gate(black_box(&GateRecord::s(0)), &pr).unwrap();
                    s
                },
                criterion::BatchSize::LargeInput,
            )
        });

        group.bench_function(format!("cnot/{}q", num_qubits), |b| {
            let gate = GateRecord::cnot(1, 0).unwrap();
            b.iter_batched(
                || state.clone(),
                |mut s| {
                    s.apply_gate(black_box(&gate), &pr).unwrap();
                    s
                },
                criterion::BatchSize::LargeInput,
            )
        });

        group.bench_function(format!("rzz/{}q", num_qubits), |b| {
            let gate = GateRecord::rzz(0, 1, 0.35).unwrap();
            b.iter_batched(
                || state.clone(),
                |mut s| {
                    s.apply_gate(black_box(&gate), &pr).unwrap();
                    s
                },
                criterion::BatchSize::LargeInput,
            )
        });

        group.bench_function(format!("amplitude_damping/{}q", num_qubits), |b| {
            let gate = GateRecord::amplitude_damping(0, 0.1).unwrap();
            b.iter_batched(
                || state.clone(),
                |mut s| {
                    s.apply_gate(black_box(&gate), &pr).unwrap();
                    s
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_kernels);
criterion_main!(benches);
