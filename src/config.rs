//! Конфигурация запуска
//!
//! Читается из JSON, все поля необязательны:
//!
//! ```json
//! {
//!     "dimension": 1024,
//!     "backend": "opencl",
//!     "device_type": "gpu",
//!     "pivot_policy": { "mode": "fail_fast", "tolerance": 1e-12 }
//! }
//! ```

use crate::error::{Error, Result};
use crate::matrix::{MatrixType, GAUSS_JORDAN_KERNELS};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

/// Размерность по умолчанию
pub const DEFAULT_DIMENSION: usize = 1024;
/// Верхняя граница размера локальной рабочей группы по умолчанию
pub const DEFAULT_WORK_GROUP_SIZE: usize = 256;
/// Порог вырожденности ведущего элемента по умолчанию
pub const DEFAULT_PIVOT_TOLERANCE: f64 = 1e-12;

/// Где выполняются ядра
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Пул потоков rayon
    #[default]
    Cpu,
    /// Устройство OpenCL
    Opencl,
}

/// Тип устройства OpenCL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    #[default]
    Gpu,
    Cpu,
    All,
}

/// Реакция на нулевой или почти нулевой ведущий элемент.
///
/// Перестановок строк нет: на шаге k ведущей всегда является строка k.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PivotPolicy {
    /// Остановиться с [`Error::SingularMatrix`], если |A[k][k]| <= tolerance
    /// или значение не конечно. Порог абсолютный и не масштабируется по
    /// величине элементов A: для матриц порядка 1e-13 его нужно уменьшить.
    FailFast { tolerance: f64 },
    /// Не проверять: NaN/Inf попадут в результат
    Propagate,
}

impl Default for PivotPolicy {
    fn default() -> Self {
        PivotPolicy::FailFast { tolerance: DEFAULT_PIVOT_TOLERANCE }
    }
}

impl PivotPolicy {
    /// Проверяет ведущий элемент шага `step`
    pub fn check(&self, step: usize, pivot: f64) -> Result<()> {
        match *self {
            PivotPolicy::FailFast { tolerance } if !pivot.is_finite() || pivot.abs() <= tolerance => {
                Err(Error::SingularMatrix { step, pivot })
            },
            _ => Ok(()),
        }
    }

    pub fn reads_pivots(&self) -> bool {
        matches!(self, PivotPolicy::FailFast { .. })
    }
}

/// Параметры запуска
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InversionConfig {
    pub dimension: usize,
    pub backend: BackendKind,
    pub device_type: DeviceKind,
    /// Верхняя граница размера локальной группы по второй оси
    pub work_group_size: usize,
    /// Число потоков CPU-бэкенда; при `None` используется глобальный пул rayon
    pub threads: Option<usize>,
    pub pivot_policy: PivotPolicy,
    /// Файл с исходным кодом ядер вместо встроенного
    pub kernel_path: Option<PathBuf>,
    pub matrix_type: MatrixType,
    pub seed: Option<u64>,
    /// Проверять ||A * B - I|| после обращения
    pub verify: bool,
    pub show_progress: bool,
}

impl Default for InversionConfig {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            backend: BackendKind::default(),
            device_type: DeviceKind::default(),
            work_group_size: DEFAULT_WORK_GROUP_SIZE,
            threads: None,
            pivot_policy: PivotPolicy::default(),
            kernel_path: None,
            matrix_type: MatrixType::default(),
            seed: None,
            verify: false,
            show_progress: true,
        }
    }
}

impl InversionConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(Error::InvalidConfig("dimension должна быть больше нуля".into()));
        }
        if self.dimension > i32::MAX as usize {
            return Err(Error::InvalidConfig(format!(
                "dimension {} не помещается в аргумент ядра int",
                self.dimension
            )));
        }
        if self.work_group_size == 0 {
            return Err(Error::InvalidConfig("work_group_size должен быть больше нуля".into()));
        }
        if self.threads == Some(0) {
            return Err(Error::InvalidConfig("threads должен быть больше нуля".into()));
        }
        if let PivotPolicy::FailFast { tolerance } = self.pivot_policy {
            if !(tolerance >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "tolerance должен быть неотрицательным, получено {}",
                    tolerance
                )));
            }
        }
        Ok(())
    }

    /// Исходный код ядер: файл `kernel_path`, читаемый целиком, или встроенный текст
    pub fn kernel_source(&self) -> Result<Cow<'static, str>> {
        match &self.kernel_path {
            Some(path) => fs::read_to_string(path)
                .map(Cow::Owned)
                .map_err(|source| Error::KernelSource { path: path.clone(), source }),
            None => Ok(Cow::Borrowed(GAUSS_JORDAN_KERNELS)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config = InversionConfig::from_json("{}").unwrap();
        assert_eq!(config.dimension, 1024);
        assert_eq!(config.backend, BackendKind::Cpu);
        assert_eq!(config.work_group_size, 256);
        assert_eq!(config.pivot_policy, PivotPolicy::FailFast { tolerance: 1e-12 });
    }

    #[test]
    fn parses_all_fields() {
        let config = InversionConfig::from_json(
            r#"{
                "dimension": 3,
                "backend": "opencl",
                "device_type": "cpu",
                "threads": 2,
                "pivot_policy": { "mode": "propagate" },
                "matrix_type": "identity",
                "seed": 9,
                "verify": true
            }"#,
        )
        .unwrap();
        assert_eq!(config.dimension, 3);
        assert_eq!(config.backend, BackendKind::Opencl);
        assert_eq!(config.device_type, DeviceKind::Cpu);
        assert_eq!(config.threads, Some(2));
        assert_eq!(config.pivot_policy, PivotPolicy::Propagate);
        assert_eq!(config.matrix_type, MatrixType::Identity);
        assert_eq!(config.seed, Some(9));
        assert!(config.verify);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            InversionConfig::from_json(r#"{"dimension": 0}"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            InversionConfig::from_json(r#"{"work_group_size": 0}"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            InversionConfig::from_json(r#"{"pivot_policy": {"mode": "fail_fast", "tolerance": -1.0}}"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            InversionConfig::from_json(r#"{"backend": "cuda"}"#),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn pivot_policy_checks() {
        let strict = PivotPolicy::FailFast { tolerance: 1e-9 };
        assert!(strict.check(0, 2.0).is_ok());
        assert!(matches!(
            strict.check(3, 1e-12),
            Err(Error::SingularMatrix { step: 3, .. })
        ));
        assert!(strict.check(0, f64::NAN).is_err());
        assert!(PivotPolicy::Propagate.check(0, 0.0).is_ok());
        assert!(!PivotPolicy::Propagate.reads_pivots());
    }

    #[test]
    fn tolerance_is_absolute() {
        let default = PivotPolicy::default();
        assert!(matches!(
            default.check(0, 1e-13),
            Err(Error::SingularMatrix { step: 0, .. })
        ));
        assert!(PivotPolicy::FailFast { tolerance: 0.0 }.check(0, 1e-13).is_ok());
    }

    #[test]
    fn embedded_kernel_source_by_default() {
        let config = InversionConfig::default();
        assert!(config.kernel_source().unwrap().contains("__kernel void iteration"));

        let missing = InversionConfig {
            kernel_path: Some(PathBuf::from("/nonexistent/kernels.cl")),
            ..InversionConfig::default()
        };
        assert!(matches!(missing.kernel_source(), Err(Error::KernelSource { .. })));
    }
}
