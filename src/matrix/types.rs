//! Типы матриц и связанные структуры

use crate::error::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Способ заполнения исходной матрицы A
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixType {
    /// Случайные целые от 1 до 9
    #[default]
    Random,
    /// Случайные целые от 1 до 9 с доминирующей диагональю
    DiagonallyDominant,
    /// Единичная матрица
    Identity,
    /// Случайная перестановка строк единичной матрицы
    Permutation,
}

/// Расширенная пара матриц (A, B) размера n x n, хранение по строкам.
///
/// B создаётся единичной. После обращения A приведена к диагональному виду,
/// а B содержит обратную к исходной A.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixPair {
    n: usize,
    a: Vec<f64>,
    b: Vec<f64>,
}

impl MatrixPair {
    /// Создаёт пару из элементов A (по строкам) и единичной B
    pub fn new(a: Vec<f64>, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::InvalidDimension { rows: 0, cols: 0 });
        }
        if a.len() != n * n {
            return Err(Error::DimensionMismatch { expected: n * n, got: a.len() });
        }
        Ok(Self {
            n,
            a,
            b: super::operations::identity(n),
        })
    }

    pub fn from_array(a: &Array2<f64>) -> Result<Self> {
        let (rows, cols) = a.dim();
        if rows != cols || rows == 0 {
            return Err(Error::InvalidDimension { rows, cols });
        }
        Self::new(a.iter().copied().collect(), rows)
    }

    pub fn dimension(&self) -> usize {
        self.n
    }

    pub fn a(&self) -> &[f64] {
        &self.a
    }

    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Изменяемый доступ к обеим матрицам одновременно
    pub fn buffers_mut(&mut self) -> (&mut [f64], &mut [f64]) {
        (&mut self.a, &mut self.b)
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.a, self.b)
    }

    /// Копия B в виде `Array2`
    pub fn inverse_array(&self) -> Result<Array2<f64>> {
        Array2::from_shape_vec((self.n, self.n), self.b.clone()).map_err(|_| {
            Error::DimensionMismatch { expected: self.n * self.n, got: self.b.len() }
        })
    }
}
