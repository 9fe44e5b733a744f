//! Timing side-channel validation for constant-time comparisons.
//!
//! Uses Welch's t-test to check that digest verification timing does not
//! depend on where two digests first differ. Class A compares equal
//! digests, class B digests that differ in the first byte (the case an
//! early-exit comparison would return fastest on). |t| > 4.5 would suggest
//! leakage at >99.999% confidence.
//!
//! **Caveat:** This is a statistical test; heavy scheduling noise can
//! cause rare false positives.

use lockbox_core::{constant_time_eq, Digest, HashBox};
use std::time::Instant;

/// Number of timing samples per class.
const SAMPLES: usize = 10_000;

/// Welch's t-test threshold.
const T_THRESHOLD: f64 = 4.5;

#[inline(never)]
fn black_box_verify(a: &Digest, b: &Digest) -> bool {
    std::hint::black_box(a.verify_digest(std::hint::black_box(b)))
}

#[inline(never)]
fn black_box_eq(a: &[u8], b: &[u8]) -> bool {
    std::hint::black_box(constant_time_eq(a, std::hint::black_box(b)))
}

/// Welch's t-statistic: `(mean_a - mean_b) / sqrt(var_a/n_a + var_b/n_b)`.
#[allow(clippy::cast_precision_loss)]
fn welch_t_statistic(a: &[f64], b: &[f64]) -> f64 {
    if a.len() < 2 || b.len() < 2 {
        return f64::NAN;
    }

    let n_a = a.len() as f64;
    let n_b = b.len() as f64;

    let mean_a: f64 = a.iter().sum::<f64>() / n_a;
    let mean_b: f64 = b.iter().sum::<f64>() / n_b;

    let var_a: f64 = a.iter().map(|x| (x - mean_a).powi(2)).sum::<f64>() / (n_a - 1.0);
    let var_b: f64 = b.iter().map(|x| (x - mean_b).powi(2)).sum::<f64>() / (n_b - 1.0);

    let denominator = (var_a / n_a + var_b / n_b).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }

    (mean_a - mean_b) / denominator
}

/// Time `f(a)` and `f(b)` interleaved, returning the t-statistic.
#[allow(clippy::cast_precision_loss)]
fn measure(mut class_a: impl FnMut() -> bool, mut class_b: impl FnMut() -> bool) -> f64 {
    for _ in 0..100 {
        class_a();
        class_b();
    }

    let mut times_a = Vec::with_capacity(SAMPLES);
    let mut times_b = Vec::with_capacity(SAMPLES);
    for _ in 0..SAMPLES {
        let start = Instant::now();
        let _ = class_a();
        times_a.push(start.elapsed().as_nanos() as f64);

        let start = Instant::now();
        let _ = class_b();
        times_b.push(start.elapsed().as_nanos() as f64);
    }
    welch_t_statistic(&times_a, &times_b)
}

#[test]
fn verify_digest_constant_time_no_timing_leak() {
    let hash_box = HashBox::new();
    let stored = hash_box.compute(b"timing payload").expect("compute");
    let same = hash_box.compute(b"timing payload").expect("compute");

    let mut flipped = stored.as_bytes().to_vec();
    flipped[0] ^= 0xFF;
    let differs_early = Digest::unkeyed(flipped).expect("digest");

    let t = measure(
        || black_box_verify(&stored, &same),
        || black_box_verify(&stored, &differs_early),
    );
    let abs_t = t.abs();
    eprintln!("verify_digest timing: |t| = {abs_t:.2} (threshold: {T_THRESHOLD})");
    assert!(
        abs_t < T_THRESHOLD,
        "timing side-channel detected in Digest::verify_digest: |t| = {abs_t:.2}"
    );
}

#[test]
fn constant_time_eq_no_timing_leak() {
    let a = [0x5Au8; 64];
    let b = a;
    let mut c = a;
    c[0] ^= 0x01;

    let t = measure(|| black_box_eq(&a, &b), || black_box_eq(&a, &c));
    let abs_t = t.abs();
    eprintln!("constant_time_eq timing: |t| = {abs_t:.2} (threshold: {T_THRESHOLD})");
    assert!(
        abs_t < T_THRESHOLD,
        "timing side-channel detected in constant_time_eq: |t| = {abs_t:.2}"
    );
}

#[test]
fn welch_t_test_identical_distributions() {
    let a = vec![1.0; 100];
    let b = vec![1.0; 100];
    let t = welch_t_statistic(&a, &b);
    assert!(t.abs() < 0.001, "identical distributions should yield t ≈ 0, got {t}");
}

#[test]
fn welch_t_test_different_distributions() {
    let a: Vec<f64> = (0..1000).map(|i| 100.0 + f64::from(i % 3)).collect();
    let b: Vec<f64> = (0..1000).map(|i| 200.0 + f64::from(i % 3)).collect();
    let t = welch_t_statistic(&a, &b);
    assert!(t.abs() > 100.0, "clearly different distributions should yield |t| >> 4.5, got {t:.2}");
}
