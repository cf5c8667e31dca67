//! Модуль для работы с матрицами
//! 
//! Предоставляет:
//! - Типы матриц и расширенную пару (A, B)
//! - Генерацию исходных данных и проверочные операции на CPU
//! - Исходный код OpenCL ядер метода Гаусса-Жордана

mod types;
pub mod operations;
pub mod kernels;

pub use types::{MatrixPair, MatrixType};
pub use operations::{
    compare_results, cpu_matrix_multiply, identity, initialize_matrices, residual_norm,
};
pub use kernels::GAUSS_JORDAN_KERNELS;
