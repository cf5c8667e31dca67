//! Параллельный метод Гаусса-Жордана
//!
//! Пара (A, B), B = I, изменяется на месте: n шагов исключения с барьером
//! после каждого, затем деление строк B на диагональ A. Порядок фаз
//! задаёт [`orchestrator::run`], вычисления выполняет [`backend::DeviceSession`].

pub mod backend;
pub mod cpu;
pub mod element;
pub mod observer;
#[cfg(feature = "opencl")]
pub mod opencl;
pub mod orchestrator;
pub mod sequencer;

pub use backend::{ComputeBackend, DeviceSession, Phase, PhaseGuard};
pub use cpu::{CpuBackend, CpuSession};
pub use observer::{InversionObserver, NoopObserver};
#[cfg(feature = "opencl")]
pub use opencl::{OpenClBackend, OpenClSession};
pub use orchestrator::{run, InversionReport, Inverter};
pub use sequencer::{Sequencer, State};

use crate::config::{BackendKind, InversionConfig};
use crate::error::Result;
use crate::matrix::MatrixPair;
use ndarray::Array2;

/// Обратная матрица на CPU с политикой по умолчанию
pub fn invert(a: &Array2<f64>) -> Result<Array2<f64>> {
    Inverter::new(CpuBackend::new()).invert(a)
}

/// Обращает пару на бэкенде, выбранном в конфигурации
pub fn run_with_config(
    config: &InversionConfig,
    pair: &mut MatrixPair,
    observer: &mut dyn InversionObserver,
) -> Result<InversionReport> {
    config.validate()?;
    match config.backend {
        BackendKind::Cpu => {
            let backend = match config.threads {
                Some(threads) => CpuBackend::with_threads(threads)?,
                None => CpuBackend::new(),
            };
            Inverter::new(backend)
                .with_policy(config.pivot_policy)
                .invert_pair(pair, observer)
        },
        #[cfg(feature = "opencl")]
        BackendKind::Opencl => Inverter::new(OpenClBackend::from_config(config)?)
            .with_policy(config.pivot_policy)
            .invert_pair(pair, observer),
        #[cfg(not(feature = "opencl"))]
        BackendKind::Opencl => Err(crate::error::Error::BackendUnavailable("opencl")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn two_by_two() -> MatrixPair {
        MatrixPair::new(vec![1.0, 2.0, 3.0, 4.0], 2).unwrap()
    }

    #[test]
    fn cpu_config_with_own_pool() {
        let config = InversionConfig {
            dimension: 2,
            threads: Some(2),
            ..InversionConfig::default()
        };
        let mut pair = two_by_two();
        let report = run_with_config(&config, &mut pair, &mut NoopObserver).unwrap();

        assert!(report.backend.contains('2'));
        assert_eq!(report.steps, 2);
        assert_eq!(pair.b(), &[-2.0, 1.0, 1.5, -0.5]);
    }

    #[cfg(not(feature = "opencl"))]
    #[test]
    fn opencl_without_feature_is_unavailable() {
        let config = InversionConfig {
            dimension: 2,
            backend: BackendKind::Opencl,
            ..InversionConfig::default()
        };
        let mut pair = two_by_two();
        assert!(matches!(
            run_with_config(&config, &mut pair, &mut NoopObserver),
            Err(Error::BackendUnavailable("opencl"))
        ));
    }

    #[test]
    fn invalid_config_rejected_before_session() {
        let config = InversionConfig {
            dimension: 0,
            ..InversionConfig::default()
        };
        let mut pair = two_by_two();
        assert!(matches!(
            run_with_config(&config, &mut pair, &mut NoopObserver),
            Err(Error::InvalidConfig(_))
        ));
        assert_eq!(pair.b(), &[1.0, 0.0, 0.0, 1.0]);
    }
}
