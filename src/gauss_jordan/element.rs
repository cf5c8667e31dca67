//! Поэлементные формулы метода, общие для всех бэкендов.
//! Ядра OpenCL в [`crate::matrix::kernels`] повторяют их без FMA.

/// Множитель строки i на шаге k: A[i][k] / A[k][k]
#[inline]
pub fn pivot_factor(a_ik: f64, a_kk: f64) -> f64 {
    a_ik / a_kk
}

/// Исключение: x - factor * x_k, где x_k есть элемент ведущей строки того же столбца
#[inline]
pub fn eliminate(value: f64, factor: f64, pivot_row_value: f64) -> f64 {
    value - factor * pivot_row_value
}

/// Нормализация элемента B на диагональный элемент своей строки в A
#[inline]
pub fn normalize(value: f64, diagonal: f64) -> f64 {
    value / diagonal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroes_pivot_column() {
        let (a_ik, a_kk) = (3.0, 1.0);
        let f = pivot_factor(a_ik, a_kk);
        assert_eq!(eliminate(a_ik, f, a_kk), 0.0);
    }

    #[test]
    fn zero_pivot_gives_non_finite() {
        assert!(pivot_factor(2.0, 0.0).is_infinite());
        assert!(eliminate(0.0, f64::INFINITY, 0.0).is_nan());
        assert!(normalize(1.0, 0.0).is_infinite());
    }
}
