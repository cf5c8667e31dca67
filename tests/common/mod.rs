//! Общие помощники интеграционных тестов

use opencl_gauss_jordan::gauss_jordan::{ComputeBackend, Inverter, NoopObserver};
use opencl_gauss_jordan::{MatrixPair, PivotPolicy};

#[allow(dead_code)]
pub fn assert_close(actual: &[f64], expected: &[f64], tol: f64, what: &str) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{}: length mismatch: {} vs {}",
        what,
        actual.len(),
        expected.len()
    );
    for (i, (x, y)) in actual.iter().zip(expected).enumerate() {
        let diff = (x - y).abs();
        if !(diff <= tol) {
            panic!("{} at index {}: {} vs {} (diff={}, tol={})", what, i, x, y, diff, tol);
        }
    }
}

/// Обращает `a` (по строкам) и возвращает итоговую пару
#[allow(dead_code)]
pub fn invert_with<B: ComputeBackend>(backend: B, policy: PivotPolicy, a: Vec<f64>, n: usize) -> MatrixPair {
    let mut pair = MatrixPair::new(a, n).unwrap();
    Inverter::new(backend)
        .with_policy(policy)
        .invert_pair(&mut pair, &mut NoopObserver)
        .unwrap();
    pair
}
