//! Обращение плотной квадратной матрицы методом Гаусса-Жордана
//! на OpenCL-устройстве или в пуле потоков CPU

pub mod config;
pub mod error;
pub mod gauss_jordan;
pub mod matrix;
pub mod opencl;
pub mod utils;

// Реэкспортируем макросы на уровень крейта
#[macro_use]
mod macros {
    /// Макрос для обработки кодов возврата OpenCL.
    ///
    /// Первый аргумент: вариант [`crate::error::Error`] (`Environment`,
    /// `Dispatch`, `Transfer`), второй: название операции для сообщения.
    #[macro_export]
    macro_rules! cl_check {
        ($kind:ident, $op:expr, $expr:expr) => {{
            #[allow(unused_unsafe)]
            let code: $crate::opencl::types::cl_int = unsafe { $expr };
            let result: $crate::error::Result<()> = if code != $crate::opencl::types::CL_SUCCESS {
                Err($crate::error::Error::$kind { op: $op, code })
            } else {
                Ok(())
            };
            result
        }};
    }

    /// Макрос для функций OpenCL, возвращающих объект и код через последний аргумент
    #[macro_export]
    macro_rules! cl_create {
        ($kind:ident, $op:expr, $func:ident($($arg:expr),* $(,)?)) => {{
            let mut code: $crate::opencl::types::cl_int = $crate::opencl::types::CL_SUCCESS;
            let obj = unsafe { $func($($arg,)* &mut code) };
            let result: $crate::error::Result<_> = if obj.is_null() || code != $crate::opencl::types::CL_SUCCESS {
                Err($crate::error::Error::$kind { op: $op, code })
            } else {
                Ok(obj)
            };
            result
        }};
    }
}

// Реэкспорт основных типов для удобства
pub use config::{BackendKind, DeviceKind, InversionConfig, PivotPolicy};
pub use error::{Error, Result};
pub use gauss_jordan::{invert, run_with_config, InversionReport, Inverter};
pub use matrix::{MatrixPair, MatrixType};
