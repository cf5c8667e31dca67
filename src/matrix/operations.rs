//! Операции над матрицами на CPU: генерация исходных данных и проверка результата

use super::types::MatrixType;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Единичная матрица n x n по строкам
pub fn identity(size: usize) -> Vec<f64> {
    let mut m = vec![0.0f64; size * size];
    for i in 0..size {
        m[i * size + i] = 1.0;
    }
    m
}

/// Инициализирует матрицу A заданного типа и единичную матрицу B.
///
/// С `seed` генерация воспроизводима.
pub fn initialize_matrices(matrix_type: MatrixType, size: usize, seed: Option<u64>) -> (Vec<f64>, Vec<f64>) {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let matrix_elements = size * size;

    let a = match matrix_type {
        MatrixType::Random => {
            (0..matrix_elements).map(|_| rng.gen_range(1..=9) as f64).collect()
        },
        MatrixType::DiagonallyDominant => {
            let mut a: Vec<f64> = (0..matrix_elements).map(|_| rng.gen_range(1..=9) as f64).collect();
            // сумма внедиагональных элементов строки не превышает 9(n-1)
            for i in 0..size {
                a[i * size + i] += 9.0 * size as f64;
            }
            a
        },
        MatrixType::Identity => identity(size),
        MatrixType::Permutation => {
            let mut order: Vec<usize> = (0..size).collect();
            order.shuffle(&mut rng);
            let mut a = vec![0.0f64; matrix_elements];
            for (row, &col) in order.iter().enumerate() {
                a[row * size + col] = 1.0;
            }
            a
        },
    };

    (a, identity(size))
}

/// CPU реализация матричного умножения C = A * B
pub fn cpu_matrix_multiply(a: &[f64], b: &[f64], c: &mut [f64], size: usize) {
    for i in 0..size {
        if i % 256 == 0 {
            log::debug!("CPU: обработка строки {}/{}", i, size);
        }
        for j in 0..size {
            let mut sum = 0.0f64;
            for k in 0..size {
                sum += a[i * size + k] * b[k * size + j];
            }
            c[i * size + j] = sum;
        }
    }
}

/// Максимальное по модулю отклонение A * B от единичной матрицы
pub fn residual_norm(a: &[f64], b: &[f64], size: usize) -> f64 {
    let mut product = vec![0.0f64; size * size];
    cpu_matrix_multiply(a, b, &mut product, size);

    let mut max_diff = 0.0f64;
    for i in 0..size {
        for j in 0..size {
            let expected = if i == j { 1.0 } else { 0.0 };
            let diff = (product[i * size + j] - expected).abs();
            // NaN не должен проходить проверку
            if diff.is_nan() {
                return f64::NAN;
            }
            max_diff = max_diff.max(diff);
        }
    }
    max_diff
}

/// Сравнивает два результата поэлементно с допуском `epsilon`
pub fn compare_results(first: &[f64], second: &[f64], size: usize, epsilon: f64) -> bool {
    let mut max_diff = 0.0f64;
    let mut diff_count = 0;

    for i in 0..size {
        for j in 0..size {
            let idx = i * size + j;
            let diff = (first[idx] - second[idx]).abs();
            if !(diff <= epsilon) {
                diff_count += 1;
                max_diff = max_diff.max(diff);
            }
        }
    }

    if diff_count > 0 {
        log::warn!(
            "Обнаружены расхождения: {} элементов, максимальная разница {}",
            diff_count,
            max_diff
        );
        false
    } else {
        log::info!("Результаты совпадают в пределах {}", epsilon);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_matrix_uses_digits_one_to_nine() {
        let (a, b) = initialize_matrices(MatrixType::Random, 16, Some(7));
        assert!(a.iter().all(|&x| (1.0..=9.0).contains(&x) && x.fract() == 0.0));
        assert_eq!(b, identity(16));
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let (a1, _) = initialize_matrices(MatrixType::Random, 8, Some(42));
        let (a2, _) = initialize_matrices(MatrixType::Random, 8, Some(42));
        assert_eq!(a1, a2);
    }

    #[test]
    fn permutation_has_single_one_per_row_and_column() {
        let n = 10;
        let (a, _) = initialize_matrices(MatrixType::Permutation, n, Some(3));
        for i in 0..n {
            let row: f64 = (0..n).map(|j| a[i * n + j]).sum();
            let col: f64 = (0..n).map(|j| a[j * n + i]).sum();
            assert_eq!(row, 1.0);
            assert_eq!(col, 1.0);
        }
    }

    #[test]
    fn multiply_and_residual() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let inv = [-2.0, 1.0, 1.5, -0.5];
        let mut c = [0.0; 4];
        cpu_matrix_multiply(&a, &inv, &mut c, 2);
        assert_eq!(c, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(residual_norm(&a, &inv, 2), 0.0);
        assert!(residual_norm(&a, &identity(2), 2) > 1.0);
    }

    #[test]
    fn residual_reports_nan() {
        let a = identity(2);
        let b = [f64::NAN, 0.0, 0.0, 1.0];
        assert!(residual_norm(&a, &b, 2).is_nan());
    }

    #[test]
    fn compare_treats_nan_as_mismatch() {
        assert!(compare_results(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0, 4.0 + 1e-12], 2, 1e-9));
        assert!(!compare_results(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.5, 3.0, 4.0], 2, 1e-9));
        assert!(!compare_results(&[f64::NAN; 4], &[0.0; 4], 2, 1e-9));
    }
}
