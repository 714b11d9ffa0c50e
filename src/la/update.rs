//! LA reward/penalty (reward-inaction, linear L_R-P) probability update
//! (§4.4).

use itertools::Itertools;

const W0: f64 = 0.9;
const W1: f64 = 0.4;

/// Applies one round of the reward/penalty rule to `p` using the
/// accumulated signal vector `signal`, then zeroes `signal`.
///
/// `superstep` and `max_iterations` parameterize the max-signal boost
/// (`w`); `alpha`/`beta` are the reward/penalty learning rates.
pub fn update_probabilities(
    p: &mut [f64],
    signal: &mut [f64],
    superstep: i64,
    max_iterations: i64,
    alpha: f64,
    beta: f64,
) {
    let k = p.len();
    debug_assert_eq!(p.len(), signal.len());
    if k <= 1 {
        signal.iter_mut().for_each(|s| *s = 0.0);
        return;
    }

    // 1. Boost the maximum signal.
    let max_idx = argmax(signal);
    let w = ((W0 - W1) * superstep as f64 * (k as f64).sqrt()) / max_iterations.max(1) as f64;
    signal[max_idx] *= 1.0 + w;

    // 2. Partition into positive (>= mean) and negative (< mean) groups.
    let mean = signal.iter().sum::<f64>() / k as f64;
    let mut positive: Vec<usize> = Vec::new();
    let mut negative: Vec<usize> = Vec::new();
    for (i, &s) in signal.iter().enumerate() {
        if s >= mean {
            positive.push(i);
        } else {
            negative.push(i);
        }
    }

    // 3. Sum-normalize within each group.
    let mut normalized = vec![0.0; k];
    let positive_sum: f64 = positive.iter().map(|&i| signal[i]).sum();
    if positive_sum > 0.0 {
        for &i in &positive {
            normalized[i] = signal[i] / positive_sum;
        }
    }
    let negative_sum: f64 = negative.iter().map(|&i| signal[i]).sum();
    if !negative.is_empty() {
        if negative_sum > 0.0 {
            for &i in &negative {
                normalized[i] = signal[i] / negative_sum;
            }
        } else {
            let uniform = 1.0 / negative.len() as f64;
            for &i in &negative {
                normalized[i] = uniform;
            }
        }
    }

    // 4. Negative indices, ascending by normalized signal: inaction penalty.
    let negative_sorted = negative
        .iter()
        .copied()
        .sorted_by(|&a, &b| normalized[a].partial_cmp(&normalized[b]).unwrap());
    for i in negative_sorted {
        let rate = normalized[i] * beta;
        for j in 0..k {
            if j == i {
                continue;
            }
            p[j] = rate / (k as f64 - 1.0) + (1.0 - rate) * p[j];
        }
        p[i] *= 1.0 - rate;
    }

    // 5. Positive indices, ascending by normalized signal: reward.
    // Skipped entirely when sumPositiveSignals == 0 (§7 arithmetic
    // degeneracy): `normalized[i]` is 0 for every positive `i` in that
    // case, so the reward below is a no-op, matching the documented
    // fallback without a separate branch.
    let positive_sorted = positive
        .iter()
        .copied()
        .sorted_by(|&a, &b| normalized[a].partial_cmp(&normalized[b]).unwrap());
    for i in positive_sorted {
        let rate = normalized[i] * alpha;
        if rate == 0.0 {
            continue;
        }
        for j in 0..k {
            if j == i {
                continue;
            }
            p[j] *= 1.0 - rate;
        }
        p[i] += rate * (1.0 - p[i]);
    }

    // 6. Reset signal accumulator.
    signal.iter_mut().for_each(|s| *s = 0.0);
}

fn argmax(v: &[f64]) -> usize {
    let mut best_idx = 0;
    let mut best_val = f64::MIN;
    for (i, &x) in v.iter().enumerate() {
        if x > best_val {
            best_val = x;
            best_idx = i;
        }
    }
    best_idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_preserves_the_simplex() {
        let mut p = vec![0.25, 0.25, 0.25, 0.25];
        let mut signal = vec![1.0, 0.0, 2.0, 0.0];
        update_probabilities(&mut p, &mut signal, 10, 290, 0.98, 0.02);
        let sum: f64 = p.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum was {sum}");
        assert!(p.iter().all(|&x| x >= 0.0));
    }

    #[test]
    fn signal_is_reset_after_update() {
        let mut p = vec![0.5, 0.5];
        let mut signal = vec![3.0, 1.0];
        update_probabilities(&mut p, &mut signal, 5, 290, 0.98, 0.02);
        assert!(signal.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn rewarded_action_gains_probability_mass() {
        let mut p = vec![0.5, 0.5];
        let mut signal = vec![5.0, 0.0];
        update_probabilities(&mut p, &mut signal, 1, 290, 0.98, 0.02);
        assert!(p[0] > 0.5);
    }

    #[test]
    fn all_zero_signal_still_preserves_simplex() {
        let mut p = vec![0.3, 0.3, 0.4];
        let mut signal = vec![0.0, 0.0, 0.0];
        update_probabilities(&mut p, &mut signal, 1, 290, 0.98, 0.02);
        let sum: f64 = p.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn single_action_space_is_a_no_op() {
        let mut p = vec![1.0];
        let mut signal = vec![1.0];
        update_probabilities(&mut p, &mut signal, 1, 290, 0.98, 0.02);
        assert_eq!(p, vec![1.0]);
        assert_eq!(signal, vec![0.0]);
    }
}
