//! Последовательность фаз на хосте

use super::backend::{ComputeBackend, DeviceSession, Phase};
use super::observer::{InversionObserver, NoopObserver};
use super::sequencer::{Sequencer, State};
use crate::config::PivotPolicy;
use crate::error::Result;
use crate::matrix::MatrixPair;
use crate::utils::measure_time;
use std::time::Duration;

/// Итог одного обращения
#[derive(Debug, Clone)]
pub struct InversionReport {
    pub backend: String,
    pub dimension: usize,
    /// Число выполненных шагов исключения
    pub steps: usize,
    /// Время от загрузки до выгрузки включительно
    pub elapsed: Duration,
    /// Минимальный |A[k][k]|; известен, только если политика читает ведущие элементы
    pub min_abs_pivot: Option<f64>,
}

/// Выполняет обращение пары на открытой сессии.
///
/// Загружает A и B, выполняет n шагов исключения с барьером после каждого,
/// нормализацию с барьером и выгружает результат обратно в `pair`.
/// Ошибка любого шага прерывает запуск; `pair` меняется только при выгрузке.
pub fn run<S: DeviceSession>(
    session: &mut S,
    pair: &mut MatrixPair,
    policy: PivotPolicy,
    backend: &str,
    observer: &mut dyn InversionObserver,
) -> Result<InversionReport> {
    let n = pair.dimension();
    observer.algorithm_started(backend, n);

    let (outcome, elapsed) = measure_time(|| -> Result<(usize, Option<f64>)> {
        let mut seq = Sequencer::new(n);
        let mut min_abs_pivot: Option<f64> = None;

        session.upload(pair)?;
        seq.advance(State::Uploaded)?;
        log::info!("Матрицы {}x{} загружены ({})", n, n, backend);

        for k in 0..n {
            seq.advance(State::Eliminating(k))?;

            if policy.reads_pivots() {
                let pivot = session.read_pivot(k)?;
                policy.check(k, pivot)?;
                min_abs_pivot = Some(min_abs_pivot.map_or(pivot.abs(), |m| m.min(pivot.abs())));
            }

            session.dispatch(Phase::Eliminate { pivot: k })?.wait()?;
            seq.settle();
            log::trace!("Шаг {} завершён", k);
            observer.step_completed(k, n);
        }

        seq.advance(State::Normalizing)?;
        session.dispatch(Phase::Normalize)?.wait()?;
        seq.settle();
        log::debug!("Нормализация завершена");

        session.download(pair)?;
        seq.advance(State::Downloaded)?;
        seq.advance(State::Complete)?;

        Ok((n, min_abs_pivot))
    });

    let (steps, min_abs_pivot) = outcome?;
    observer.algorithm_finished(elapsed);
    log::info!("Обращение {}x{} ({}) завершено за {:?}", n, n, backend, elapsed);

    Ok(InversionReport {
        backend: backend.to_string(),
        dimension: n,
        steps,
        elapsed,
        min_abs_pivot,
    })
}

/// Обращение матриц на выбранном бэкенде
pub struct Inverter<B: ComputeBackend> {
    backend: B,
    policy: PivotPolicy,
}

impl<B: ComputeBackend> Inverter<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            policy: PivotPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PivotPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn policy(&self) -> PivotPolicy {
        self.policy
    }

    /// Открывает сессию под размер пары и обращает её на месте
    pub fn invert_pair(
        &self,
        pair: &mut MatrixPair,
        observer: &mut dyn InversionObserver,
    ) -> Result<InversionReport> {
        let mut session = self.backend.open_session(pair.dimension())?;
        run(&mut session, pair, self.policy, &self.backend.name(), observer)
    }

    /// Возвращает обратную матрицу, не меняя `a`
    pub fn invert(&self, a: &ndarray::Array2<f64>) -> Result<ndarray::Array2<f64>> {
        let mut pair = MatrixPair::from_array(a)?;
        self.invert_pair(&mut pair, &mut NoopObserver)?;
        pair.inverse_array()
    }
}
