//! LA action selection: "bisection selection" over a probability simplex
//! (§4.4).
//!
//! Recursively bisects the unit interval: at each level the candidate set
//! is split at the 1/2 separator, with the single item whose cumulative
//! mass straddles the separator appearing in *both* halves, carrying only
//! the fraction of its probability that falls on that side. A coin flip
//! chooses a half, which is then rescaled (`*2`) back onto the simplex and
//! the process repeats until at most two candidates remain.

use rand::Rng;

const NEAR_CERTAIN: f64 = 1e-6;

/// Samples an action (partition index) from `p` with marginal distribution
/// equal to `p` (up to floating-point tolerance).
pub fn select_action<R: Rng + ?Sized>(p: &[f64], rng: &mut R) -> usize {
    let (max_idx, max_val) = argmax(p);
    if 1.0 - max_val < NEAR_CERTAIN {
        return max_idx;
    }

    let mut indices: Vec<usize> = (0..p.len()).collect();
    let mut probs: Vec<f64> = p.to_vec();

    loop {
        if indices.len() <= 2 {
            return sample_small(&indices, &probs, rng);
        }
        let (left_indices, left_probs, right_indices, right_probs) = bisect(&indices, &probs);
        if rng.gen::<f64>() < 0.5 {
            indices = left_indices;
            probs = left_probs;
        } else {
            indices = right_indices;
            probs = right_probs;
        }
    }
}

fn argmax(p: &[f64]) -> (usize, f64) {
    let mut best_idx = 0;
    let mut best_val = f64::MIN;
    for (i, &v) in p.iter().enumerate() {
        if v > best_val {
            best_val = v;
            best_idx = i;
        }
    }
    (best_idx, best_val)
}

/// Splits the current candidate set at the 0.5 separator, doubling each
/// half back onto the simplex. The boundary element is shared between both
/// halves with its probability mass divided proportionally.
fn bisect(indices: &[usize], probs: &[f64]) -> (Vec<usize>, Vec<f64>, Vec<usize>, Vec<f64>) {
    const SEPARATOR: f64 = 0.5;
    let mut running = 0.0;
    let mut boundary = probs.len() - 1;
    for (i, &p) in probs.iter().enumerate() {
        if running + p >= SEPARATOR {
            boundary = i;
            break;
        }
        running += p;
    }
    let left_frac = (SEPARATOR - running).max(0.0);
    let right_frac = (probs[boundary] - left_frac).max(0.0);

    let mut left_indices: Vec<usize> = indices[..boundary].to_vec();
    left_indices.push(indices[boundary]);
    let mut left_probs: Vec<f64> = probs[..boundary].to_vec();
    left_probs.push(left_frac);
    left_probs.iter_mut().for_each(|x| *x *= 2.0);

    let mut right_indices: Vec<usize> = vec![indices[boundary]];
    right_indices.extend_from_slice(&indices[boundary + 1..]);
    let mut right_probs: Vec<f64> = vec![right_frac];
    right_probs.extend_from_slice(&probs[boundary + 1..]);
    right_probs.iter_mut().for_each(|x| *x *= 2.0);

    (left_indices, left_probs, right_indices, right_probs)
}

fn sample_small<R: Rng + ?Sized>(indices: &[usize], probs: &[f64], rng: &mut R) -> usize {
    if indices.len() == 1 {
        return indices[0];
    }
    let total: f64 = probs.iter().sum();
    if total <= 0.0 {
        return indices[0];
    }
    let u = rng.gen::<f64>() * total;
    if u < probs[0] {
        indices[0]
    } else {
        indices[1]
    }
}
