//! Модуль для работы с OpenCL
//! 
//! Содержит низкоуровневые привязки и безопасные обертки для OpenCL.
//! Привязки линкуются с libOpenCL, поэтому собираются только с feature `opencl`.

pub mod types;
pub mod utils;
#[cfg(feature = "opencl")]
pub mod bindings;
#[cfg(feature = "opencl")]
pub mod callbacks;
#[cfg(feature = "opencl")]
pub mod context;
#[cfg(feature = "opencl")]
pub mod kernel;
