//! Trajectory sampling: repeated measurement shots against a state copy
//!
//! Each shot forks the template state, runs the circuit and collects its
//! measurement outcomes into one row of the output. The parent RNG
//! pre-draws one sub-seed per shot, so shots parallelize freely while the
//! whole run stays deterministic in (seed, shot index).

use crate::error::{Result, SimError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rhoq_core::{Circuit, ParameterBinding};
use rhoq_state::{DensityState, Real};
use std::collections::HashMap;

/// Run `shots` measurement trajectories of `circ` against copies of
/// `state`
///
/// `key_map` assigns each measurement key a column; the result is a flat
/// row-major matrix of `shots × key_map.len()` bits.
///
/// # Errors
/// Fails if the circuit records an outcome whose key is missing from
/// `key_map`, or if circuit application fails.
pub fn sampling<T: Real>(
    state: &DensityState<T>,
    circ: &Circuit,
    pr: &ParameterBinding,
    shots: usize,
    key_map: &HashMap<String, usize>,
    seed: u64,
) -> Result<Vec<u8>> {
    let width = key_map.len();
    if width == 0 || shots == 0 {
        return Ok(Vec::new());
    }

    let mut parent = StdRng::seed_from_u64(seed);
    let shot_seeds: Vec<u64> = (0..shots)
        .map(|_| parent.gen_range(1..(1u64 << 20)))
        .collect();

    let mut out = vec![0u8; shots * width];
    out.par_chunks_mut(width)
        .enumerate()
        .try_for_each(|(shot, row)| -> Result<()> {
            let mut worker = state.fork(shot_seeds[shot]);
            let outcomes = worker.apply_circuit(circ, pr)?;
            for (key, bit) in &outcomes {
                let col = key_map
                    .get(key)
                    .ok_or_else(|| SimError::UnknownMeasureKey(key.clone()))?;
                row[*col] = *bit;
            }
            Ok(())
        })?;
    Ok(out)
}
