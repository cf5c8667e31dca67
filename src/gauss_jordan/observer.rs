//! Точки наблюдения за ходом алгоритма

use std::time::Duration;

/// Получает события начала, шагов и конца алгоритма. Все методы необязательны.
pub trait InversionObserver {
    fn algorithm_started(&mut self, _backend: &str, _dimension: usize) {}

    /// Шаг `step` завершён, включая барьер
    fn step_completed(&mut self, _step: usize, _dimension: usize) {}

    fn algorithm_finished(&mut self, _elapsed: Duration) {}
}

/// Наблюдатель, который ничего не делает
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl InversionObserver for NoopObserver {}
