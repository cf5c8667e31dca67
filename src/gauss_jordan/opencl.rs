//! OpenCL-бэкенд
//!
//! Шаг исключения состоит из двух ядер в одной упорядоченной очереди (`pivot_factors`,
//! затем `iteration`), после них оркестратор вызывает `clFinish`.

use super::backend::{ComputeBackend, DeviceSession, Phase};
use crate::config::{DeviceKind, InversionConfig};
use crate::error::{Error, Result};
use crate::matrix::kernels::{ITERATION_KERNEL, NORMALIZATION_KERNEL, PIVOT_FACTORS_KERNEL};
use crate::matrix::{MatrixPair, GAUSS_JORDAN_KERNELS};
use crate::opencl::context::ClContext;
use crate::opencl::kernel::{ClBuffer, ClKernel, ClProgram};
use crate::opencl::types::*;
use crate::opencl::utils::round_up;
use std::borrow::Cow;

/// Фабрика OpenCL-сессий
#[derive(Debug, Clone)]
pub struct OpenClBackend {
    device_type: cl_device_type,
    work_group_size: usize,
    kernel_source: Cow<'static, str>,
}

impl OpenClBackend {
    /// GPU, группы до 256 элементов, встроенные ядра
    pub fn new() -> Self {
        Self {
            device_type: CL_DEVICE_TYPE_GPU,
            work_group_size: 256,
            kernel_source: Cow::Borrowed(GAUSS_JORDAN_KERNELS),
        }
    }

    pub fn from_config(config: &InversionConfig) -> Result<Self> {
        let device_type = match config.device_type {
            DeviceKind::Gpu => CL_DEVICE_TYPE_GPU,
            DeviceKind::Cpu => CL_DEVICE_TYPE_CPU,
            DeviceKind::All => CL_DEVICE_TYPE_ALL,
        };
        Ok(Self {
            device_type,
            work_group_size: config.work_group_size,
            kernel_source: config.kernel_source()?,
        })
    }

    pub fn with_device_type(mut self, device_type: cl_device_type) -> Self {
        self.device_type = device_type;
        self
    }

    pub fn with_work_group_size(mut self, work_group_size: usize) -> Self {
        self.work_group_size = work_group_size;
        self
    }
}

impl Default for OpenClBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for OpenClBackend {
    type Session = OpenClSession;

    fn name(&self) -> String {
        "OpenCL".to_string()
    }

    fn open_session(&self, n: usize) -> Result<OpenClSession> {
        if n == 0 || n > i32::MAX as usize {
            return Err(Error::InvalidDimension { rows: n, cols: n });
        }

        let ctx = ClContext::new(self.device_type)?;
        log::info!("Компиляция OpenCL программы...");
        let program = ClProgram::build(&ctx, &self.kernel_source)?;
        let factors_kernel = program.kernel(PIVOT_FACTORS_KERNEL)?;
        let iteration = program.kernel(ITERATION_KERNEL)?;
        let normalization = program.kernel(NORMALIZATION_KERNEL)?;

        let a = ClBuffer::new(&ctx, CL_MEM_READ_WRITE, n * n)?;
        let b = ClBuffer::new(&ctx, CL_MEM_READ_WRITE, n * n)?;
        let factors = ClBuffer::new(&ctx, CL_MEM_READ_WRITE, n)?;

        // локальная группа {1, wg}, как одна строка на группу
        let wg = self.work_group_size.min(n).min(ctx.max_work_group_size().max(1));
        let local = [1, wg];
        let global = [n, round_up(n, wg)];
        log::debug!("Глобальный диапазон {:?}, локальная группа {:?}", global, local);

        let n_arg = n as i32;
        factors_kernel.set_arg_buffer(0, &a)?;
        factors_kernel.set_arg_buffer(1, &factors)?;
        factors_kernel.set_arg_i32(2, n_arg)?;

        iteration.set_arg_buffer(0, &a)?;
        iteration.set_arg_buffer(1, &b)?;
        iteration.set_arg_buffer(2, &factors)?;
        iteration.set_arg_i32(3, n_arg)?;

        normalization.set_arg_buffer(0, &a)?;
        normalization.set_arg_buffer(1, &b)?;
        normalization.set_arg_i32(2, n_arg)?;

        Ok(OpenClSession {
            n,
            global,
            local,
            factors_kernel,
            iteration,
            normalization,
            _program: program,
            a,
            b,
            factors,
            ctx,
        })
    }
}

/// Буферы и ядра на устройстве. Контекст объявлен последним и освобождается последним.
pub struct OpenClSession {
    n: usize,
    global: [usize; 2],
    local: [usize; 2],
    factors_kernel: ClKernel,
    iteration: ClKernel,
    normalization: ClKernel,
    _program: ClProgram,
    a: ClBuffer,
    b: ClBuffer,
    factors: ClBuffer,
    ctx: ClContext,
}

impl OpenClSession {
    pub fn device_name(&self) -> &str {
        self.ctx.device_name()
    }

    pub fn platform_name(&self) -> &str {
        self.ctx.platform_name()
    }
}

impl DeviceSession for OpenClSession {
    fn dimension(&self) -> usize {
        self.n
    }

    fn upload(&mut self, pair: &MatrixPair) -> Result<()> {
        self.a.write(&self.ctx, pair.a())?;
        self.b.write(&self.ctx, pair.b())
    }

    fn enqueue(&mut self, phase: Phase) -> Result<()> {
        match phase {
            Phase::Eliminate { pivot } => {
                if pivot >= self.n {
                    return Err(Error::DimensionMismatch { expected: self.n, got: pivot + 1 });
                }
                let k = pivot as i32;
                self.factors_kernel.set_arg_i32(3, k)?;
                self.iteration.set_arg_i32(4, k)?;
                self.factors_kernel.enqueue(&self.ctx, &[self.n], None)?;
                self.iteration.enqueue(&self.ctx, &self.global, Some(&self.local[..]))
            },
            Phase::Normalize => self.normalization.enqueue(&self.ctx, &[self.n, self.n], None),
        }
    }

    fn finish(&mut self) -> Result<()> {
        self.ctx.finish()
    }

    fn read_pivot(&mut self, k: usize) -> Result<f64> {
        self.a.read_element(&self.ctx, k * self.n + k)
    }

    fn download(&mut self, pair: &mut MatrixPair) -> Result<()> {
        let (a, b) = pair.buffers_mut();
        self.a.read(&self.ctx, a)?;
        self.b.read(&self.ctx, b)
    }
}
