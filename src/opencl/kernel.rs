//! Программы, ядра и буферы OpenCL с автоматическим освобождением

use super::bindings::*;
use super::context::ClContext;
use super::types::*;
use super::utils::to_c_string;
use crate::error::{Error, Result};
use crate::{cl_check, cl_create};
use std::ffi::c_void;
use std::mem::size_of;
use std::ptr;

/// Скомпилированная программа
pub struct ClProgram {
    program: cl_program,
}

impl ClProgram {
    /// Создаёт программу из исходного текста и собирает её для устройства контекста.
    /// При ошибке сборки возвращает [`Error::Build`] с логом компилятора.
    pub fn build(ctx: &ClContext, source: &str) -> Result<Self> {
        let source_ptr = source.as_ptr() as *const i8;
        let source_len = source.len();
        let program = cl_create!(Environment, "Создание программы", clCreateProgramWithSource(
            ctx.context(),
            1,
            &source_ptr,
            &source_len
        ))?;
        let program = Self { program };

        let device = ctx.device();
        let status = unsafe {
            clBuildProgram(program.program, 1, &device, ptr::null(), None, ptr::null_mut())
        };
        if status != CL_SUCCESS {
            let log = program.build_log(device);
            return Err(Error::Build { code: status, log });
        }

        Ok(program)
    }

    fn build_log(&self, device: cl_device_id) -> String {
        let mut log_size = 0usize;
        let status = unsafe {
            clGetProgramBuildInfo(
                self.program,
                device,
                CL_PROGRAM_BUILD_LOG,
                0,
                ptr::null_mut(),
                &mut log_size
            )
        };
        if status != CL_SUCCESS || log_size == 0 {
            return String::new();
        }

        let mut build_log = vec![0u8; log_size];
        unsafe {
            clGetProgramBuildInfo(
                self.program,
                device,
                CL_PROGRAM_BUILD_LOG,
                log_size,
                build_log.as_mut_ptr() as *mut c_void,
                ptr::null_mut()
            );
        }
        String::from_utf8_lossy(&build_log).trim_end_matches('\0').to_string()
    }

    /// Создаёт ядро по имени функции `__kernel`
    pub fn kernel(&self, name: &str) -> Result<ClKernel> {
        let c_name = to_c_string(name);
        let kernel = cl_create!(Environment, "Создание ядра", clCreateKernel(
            self.program,
            c_name.as_ptr()
        ))
        .inspect_err(|_| log::error!("Ядро '{}' не найдено в программе", name))?;

        Ok(ClKernel {
            kernel,
            name: name.to_string(),
        })
    }
}

impl Drop for ClProgram {
    fn drop(&mut self) {
        unsafe {
            clReleaseProgram(self.program);
        }
    }
}

/// Вычислительное ядро
pub struct ClKernel {
    kernel: cl_kernel,
    name: String,
}

impl ClKernel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_arg_buffer(&self, index: u32, buffer: &ClBuffer) -> Result<()> {
        cl_check!(Dispatch, "Установка аргумента-буфера", clSetKernelArg(
            self.kernel,
            index,
            size_of::<cl_mem>(),
            &buffer.mem as *const _ as *const c_void
        ))
    }

    pub fn set_arg_i32(&self, index: u32, value: i32) -> Result<()> {
        cl_check!(Dispatch, "Установка скалярного аргумента", clSetKernelArg(
            self.kernel,
            index,
            size_of::<i32>(),
            &value as *const i32 as *const c_void
        ))
    }

    /// Ставит ядро в очередь над диапазоном `global`. Не ждёт завершения.
    pub fn enqueue(&self, ctx: &ClContext, global: &[usize], local: Option<&[usize]>) -> Result<()> {
        if let Some(local) = local {
            debug_assert_eq!(global.len(), local.len());
        }
        cl_check!(Dispatch, "Запуск ядра", clEnqueueNDRangeKernel(
            ctx.queue(),
            self.kernel,
            global.len() as cl_uint,
            ptr::null(),
            global.as_ptr(),
            local.map_or(ptr::null(), |l| l.as_ptr()),
            0,
            ptr::null(),
            ptr::null_mut()
        ))
    }
}

impl Drop for ClKernel {
    fn drop(&mut self) {
        unsafe {
            clReleaseKernel(self.kernel);
        }
    }
}

/// Буфер чисел двойной точности в памяти устройства
pub struct ClBuffer {
    mem: cl_mem,
    len: usize,
}

impl ClBuffer {
    /// Выделяет буфер на `len` элементов `f64`
    pub fn new(ctx: &ClContext, flags: cl_mem_flags, len: usize) -> Result<Self> {
        let mem = cl_create!(Environment, "Создание буфера", clCreateBuffer(
            ctx.context(),
            flags,
            len * size_of::<f64>(),
            ptr::null_mut()
        ))?;
        Ok(Self { mem, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Блокирующее копирование хост -> устройство
    pub fn write(&self, ctx: &ClContext, data: &[f64]) -> Result<()> {
        self.check_len(data.len())?;
        cl_check!(Transfer, "Копирование на устройство", clEnqueueWriteBuffer(
            ctx.queue(),
            self.mem,
            CL_TRUE,
            0,
            data.len() * size_of::<f64>(),
            data.as_ptr() as *const c_void,
            0,
            ptr::null(),
            ptr::null_mut()
        ))
    }

    /// Блокирующее копирование устройство -> хост
    pub fn read(&self, ctx: &ClContext, out: &mut [f64]) -> Result<()> {
        self.check_len(out.len())?;
        cl_check!(Transfer, "Чтение с устройства", clEnqueueReadBuffer(
            ctx.queue(),
            self.mem,
            CL_TRUE,
            0,
            out.len() * size_of::<f64>(),
            out.as_mut_ptr() as *mut c_void,
            0,
            ptr::null(),
            ptr::null_mut()
        ))
    }

    /// Читает один элемент по индексу
    pub fn read_element(&self, ctx: &ClContext, index: usize) -> Result<f64> {
        if index >= self.len {
            return Err(Error::DimensionMismatch { expected: self.len, got: index + 1 });
        }
        let mut value = 0.0f64;
        cl_check!(Transfer, "Чтение элемента с устройства", clEnqueueReadBuffer(
            ctx.queue(),
            self.mem,
            CL_TRUE,
            index * size_of::<f64>(),
            size_of::<f64>(),
            &mut value as *mut f64 as *mut c_void,
            0,
            ptr::null(),
            ptr::null_mut()
        ))?;
        Ok(value)
    }

    fn check_len(&self, got: usize) -> Result<()> {
        if got != self.len {
            return Err(Error::DimensionMismatch { expected: self.len, got });
        }
        Ok(())
    }
}

impl Drop for ClBuffer {
    fn drop(&mut self) {
        unsafe {
            clReleaseMemObject(self.mem);
        }
    }
}
