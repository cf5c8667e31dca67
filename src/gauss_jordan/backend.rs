//! Абстракция вычислительного устройства
//!
//! Оркестратор видит устройство только через [`DeviceSession`]: загрузить пару
//! матриц, поставить фазу в очередь, дождаться барьера, выгрузить результат.

use crate::error::Result;
use crate::matrix::MatrixPair;

/// Одна фаза алгоритма над всей областью n x n
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Шаг исключения с ведущей строкой `pivot`
    Eliminate { pivot: usize },
    /// Деление строк B на диагональ A
    Normalize,
}

/// Сессия на устройстве с выделенными буферами A, B и столбцом множителей
pub trait DeviceSession {
    fn dimension(&self) -> usize;

    /// Блокирующее копирование пары на устройство
    fn upload(&mut self, pair: &MatrixPair) -> Result<()>;

    /// Ставит фазу в очередь. Результат виден только после [`finish`](Self::finish).
    fn enqueue(&mut self, phase: Phase) -> Result<()>;

    /// Барьер: ждёт завершения всей поставленной работы
    fn finish(&mut self) -> Result<()>;

    /// Текущее значение A[k][k] на устройстве
    fn read_pivot(&mut self, k: usize) -> Result<f64>;

    /// Блокирующее копирование A и B обратно в пару
    fn download(&mut self, pair: &mut MatrixPair) -> Result<()>;

    /// Ставит фазу в очередь и возвращает охрану барьера.
    ///
    /// Пока охрана жива, сессия заимствована, и следующую фазу поставить нельзя.
    fn dispatch(&mut self, phase: Phase) -> Result<PhaseGuard<'_, Self>>
    where
        Self: Sized,
    {
        self.enqueue(phase)?;
        Ok(PhaseGuard { session: self, phase, settled: false })
    }
}

/// Фаза в полёте. `wait` выполняет барьер; если охрану просто уронить,
/// барьер выполнится в `Drop`, а ошибка попадёт в лог.
#[must_use = "фаза завершается только после барьера"]
pub struct PhaseGuard<'s, S: DeviceSession> {
    session: &'s mut S,
    phase: Phase,
    settled: bool,
}

impl<S: DeviceSession> PhaseGuard<'_, S> {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn wait(mut self) -> Result<()> {
        self.settled = true;
        self.session.finish()
    }
}

impl<S: DeviceSession> Drop for PhaseGuard<'_, S> {
    fn drop(&mut self) {
        if !self.settled {
            if let Err(e) = self.session.finish() {
                log::error!("Барьер после {:?} не выполнен: {}", self.phase, e);
            }
        }
    }
}

/// Фабрика сессий
pub trait ComputeBackend {
    type Session: DeviceSession;

    /// Имя бэкенда для отчётов
    fn name(&self) -> String;

    /// Выделяет буферы под матрицы n x n
    fn open_session(&self, n: usize) -> Result<Self::Session>;
}
