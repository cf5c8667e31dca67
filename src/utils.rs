//! Вспомогательные функции и утилиты

use crate::gauss_jordan::InversionObserver;
use prettytable::{Cell, Row, Table};
use std::time::{Duration, Instant};

/// Измеряет время выполнения функции
pub fn measure_time<F, T>(f: F) -> (T, std::time::Duration) 
where 
    F: FnOnce() -> T
{
    let start = Instant::now();
    let result = f();
    let duration = start.elapsed();
    (result, duration)
}

/// Именованные замеры времени: `tic` запускает, `toc` останавливает
#[derive(Debug, Default)]
pub struct Profiler {
    running: Vec<(String, Instant)>,
    finished: Vec<(String, Duration)>,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tic(&mut self, name: &str) {
        self.running.retain(|(n, _)| n != name);
        self.running.push((name.to_string(), Instant::now()));
    }

    /// Останавливает замер; `None`, если `tic` для этого имени не было
    pub fn toc(&mut self, name: &str) -> Option<Duration> {
        let pos = self.running.iter().position(|(n, _)| n == name)?;
        let (name, start) = self.running.remove(pos);
        let elapsed = start.elapsed();
        self.record(&name, elapsed);
        Some(elapsed)
    }

    /// Добавляет готовый замер
    pub fn record(&mut self, name: &str, elapsed: Duration) {
        self.finished.push((name.to_string(), elapsed));
    }

    pub fn get(&self, name: &str) -> Option<Duration> {
        self.finished
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, d)| *d)
    }

    pub fn report(&self) -> Table {
        let mut table = Table::new();
        table.set_titles(Row::new(vec![Cell::new("Этап"), Cell::new("Время, мс")]));
        for (name, elapsed) in &self.finished {
            table.add_row(Row::new(vec![
                Cell::new(name),
                Cell::new(&format!("{:.3}", elapsed.as_secs_f64() * 1000.0)),
            ]));
        }
        table
    }
}

impl InversionObserver for Profiler {
    fn algorithm_started(&mut self, backend: &str, dimension: usize) {
        log::debug!("Профилирование {} для {}x{}", backend, dimension, dimension);
        self.tic("gauss_jordan");
    }

    fn algorithm_finished(&mut self, _elapsed: Duration) {
        self.toc("gauss_jordan");
    }
}

/// Левый верхний угол матрицы `limit` x `limit` в виде таблицы
pub fn corner_table(data: &[f64], size: usize, limit: usize) -> Table {
    let shown = limit.min(size);
    let mut table = Table::new();
    for i in 0..shown {
        let mut cells: Vec<Cell> = (0..shown)
            .map(|j| Cell::new(&format!("{:.3}", data[i * size + j])))
            .collect();
        if shown < size {
            cells.push(Cell::new("..."));
        }
        table.add_row(Row::new(cells));
    }
    if shown < size {
        table.add_row(Row::new(vec![Cell::new("..."); shown]));
    }
    table
}
