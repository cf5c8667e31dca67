//! CPU-бэкенд на пуле потоков rayon
//!
//! Сессия ведёт себя как упорядоченная очередь команд: `enqueue` только
//! записывает фазу, `finish` выполняет накопленные фазы по порядку.
//! Каждая фаза является параллельным проходом по строкам, завершение `for_each`
//! служит барьером.

use super::backend::{ComputeBackend, DeviceSession, Phase};
use super::element::{eliminate, normalize, pivot_factor};
use crate::error::{Error, Result};
use crate::matrix::MatrixPair;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;

/// Фабрика CPU-сессий
#[derive(Clone, Default)]
pub struct CpuBackend {
    pool: Option<Arc<ThreadPool>>,
}

impl CpuBackend {
    /// Использует глобальный пул rayon
    pub fn new() -> Self {
        Self { pool: None }
    }

    /// Отдельный пул на `threads` потоков
    pub fn with_threads(threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("gauss-jordan-{}", i))
            .build()?;
        Ok(Self { pool: Some(Arc::new(pool)) })
    }

    pub fn threads(&self) -> usize {
        self.pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, |pool| pool.current_num_threads())
    }
}

impl ComputeBackend for CpuBackend {
    type Session = CpuSession;

    fn name(&self) -> String {
        format!("CPU (rayon, {} потоков)", self.threads())
    }

    fn open_session(&self, n: usize) -> Result<CpuSession> {
        if n == 0 {
            return Err(Error::InvalidDimension { rows: 0, cols: 0 });
        }
        Ok(CpuSession {
            n,
            a: vec![0.0; n * n],
            b: vec![0.0; n * n],
            factors: vec![0.0; n],
            queue: Vec::new(),
            pool: self.pool.clone(),
        })
    }
}

/// Буферы A, B и столбец множителей в памяти хоста
pub struct CpuSession {
    n: usize,
    a: Vec<f64>,
    b: Vec<f64>,
    factors: Vec<f64>,
    queue: Vec<Phase>,
    pool: Option<Arc<ThreadPool>>,
}

impl DeviceSession for CpuSession {
    fn dimension(&self) -> usize {
        self.n
    }

    fn upload(&mut self, pair: &MatrixPair) -> Result<()> {
        self.finish()?;
        check_dimension(self.n, pair.dimension())?;
        self.a.copy_from_slice(pair.a());
        self.b.copy_from_slice(pair.b());
        Ok(())
    }

    fn enqueue(&mut self, phase: Phase) -> Result<()> {
        if let Phase::Eliminate { pivot } = phase {
            if pivot >= self.n {
                return Err(Error::DimensionMismatch { expected: self.n, got: pivot + 1 });
            }
        }
        self.queue.push(phase);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.queue.is_empty() {
            return Ok(());
        }
        let pending = std::mem::take(&mut self.queue);
        let CpuSession { n, a, b, factors, pool, .. } = self;
        let n = *n;

        let run = move || {
            for phase in pending {
                match phase {
                    Phase::Eliminate { pivot } => eliminate_step(n, a, b, factors, pivot),
                    Phase::Normalize => normalize_rows(n, a, b),
                }
            }
        };
        match pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
        Ok(())
    }

    fn read_pivot(&mut self, k: usize) -> Result<f64> {
        self.finish()?;
        if k >= self.n {
            return Err(Error::DimensionMismatch { expected: self.n, got: k + 1 });
        }
        Ok(self.a[k * self.n + k])
    }

    fn download(&mut self, pair: &mut MatrixPair) -> Result<()> {
        self.finish()?;
        check_dimension(self.n, pair.dimension())?;
        let (a, b) = pair.buffers_mut();
        a.copy_from_slice(&self.a);
        b.copy_from_slice(&self.b);
        Ok(())
    }
}

fn check_dimension(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(Error::DimensionMismatch { expected: expected * expected, got: got * got });
    }
    Ok(())
}

/// Шаг исключения k: сначала все множители, затем запись строк i != k
fn eliminate_step(n: usize, a: &mut [f64], b: &mut [f64], factors: &mut [f64], k: usize) {
    {
        let a: &[f64] = a;
        let a_kk = a[k * n + k];
        factors.par_iter_mut().enumerate().for_each(|(i, factor)| {
            *factor = if i == k { 0.0 } else { pivot_factor(a[i * n + k], a_kk) };
        });
    }

    let pivot_a = a[k * n..(k + 1) * n].to_vec();
    let pivot_b = b[k * n..(k + 1) * n].to_vec();
    let factors: &[f64] = factors;

    a.par_chunks_mut(n)
        .zip(b.par_chunks_mut(n))
        .enumerate()
        .filter(|(i, _)| *i != k)
        .for_each(|(i, (row_a, row_b))| {
            let factor = factors[i];
            for (x, &p) in row_a.iter_mut().zip(&pivot_a) {
                *x = eliminate(*x, factor, p);
            }
            for (x, &p) in row_b.iter_mut().zip(&pivot_b) {
                *x = eliminate(*x, factor, p);
            }
        });
}

fn normalize_rows(n: usize, a: &[f64], b: &mut [f64]) {
    b.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
        let diagonal = a[i * n + i];
        for x in row.iter_mut() {
            *x = normalize(*x, diagonal);
        }
    });
}
