//! OpenCL ядра метода Гаусса-Жордана

/// Имя ядра фазы чтения шага исключения
pub const PIVOT_FACTORS_KERNEL: &str = "pivot_factors";
/// Имя ядра фазы записи шага исключения
pub const ITERATION_KERNEL: &str = "iteration";
/// Имя ядра нормализации
pub const NORMALIZATION_KERNEL: &str = "normalization";

/// Исходный код ядер.
///
/// Шаг k разбит на два запуска в одной упорядоченной очереди: `pivot_factors`
/// сохраняет множители строк до того, как `iteration` перезапишет столбец k.
pub static GAUSS_JORDAN_KERNELS: &str = r#"
#pragma OPENCL EXTENSION cl_khr_fp64 : enable
#pragma OPENCL FP_CONTRACT OFF

__kernel void pivot_factors(
    __global const double* a,
    __global double* factors,
    const int n,
    const int k
) {
    const int i = get_global_id(0);
    if (i >= n) {
        return;
    }

    factors[i] = (i == k) ? 0.0 : a[(size_t)i * n + k] / a[(size_t)k * n + k];
}

__kernel void iteration(
    __global double* a,
    __global double* b,
    __global const double* factors,
    const int n,
    const int k
) {
    const int i = get_global_id(0);
    const int j = get_global_id(1);
    // Строка k ведущая и не изменяется на своём шаге
    if (i >= n || j >= n || i == k) {
        return;
    }

    const double factor = factors[i];
    const size_t idx = (size_t)i * n + j;
    const size_t pivot_idx = (size_t)k * n + j;

    a[idx] = a[idx] - factor * a[pivot_idx];
    b[idx] = b[idx] - factor * b[pivot_idx];
}

__kernel void normalization(
    __global const double* a,
    __global double* b,
    const int n
) {
    const int i = get_global_id(0);
    const int j = get_global_id(1);
    if (i >= n || j >= n) {
        return;
    }

    b[(size_t)i * n + j] = b[(size_t)i * n + j] / a[(size_t)i * n + i];
}
"#;
