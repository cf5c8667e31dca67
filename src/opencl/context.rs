//! Контекст и очередь команд OpenCL

use super::bindings::*;
use super::callbacks::log_context_callback;
use super::types::*;
use crate::error::{Error, Result};
use crate::{cl_check, cl_create};
use std::ffi::c_void;
use std::ptr;

const CL_PLATFORM_NOT_FOUND_KHR: cl_int = -1001;

/// Выбранное устройство вместе с контекстом и упорядоченной очередью команд.
///
/// Очередь создаётся без `CL_QUEUE_OUT_OF_ORDER_EXEC_MODE_ENABLE`, поэтому
/// команды выполняются в порядке постановки.
pub struct ClContext {
    device: cl_device_id,
    context: cl_context,
    queue: cl_command_queue,
    platform_name: String,
    device_name: String,
    max_work_group_size: usize,
}

impl ClContext {
    /// Находит первую платформу с устройством заданного типа и создаёт контекст
    pub fn new(device_type: cl_device_type) -> Result<Self> {
        let mut num_platforms: cl_uint = 0;
        let status = unsafe { clGetPlatformIDs(0, ptr::null_mut(), &mut num_platforms) };
        if status == CL_PLATFORM_NOT_FOUND_KHR || num_platforms == 0 {
            return Err(Error::NoPlatform);
        }
        cl_check!(Environment, "Поиск платформ", status)?;

        let mut platforms = vec![ptr::null_mut(); num_platforms as usize];
        cl_check!(Environment, "Поиск платформ", clGetPlatformIDs(
            num_platforms,
            platforms.as_mut_ptr(),
            ptr::null_mut()
        ))?;

        for platform in platforms {
            let mut device: cl_device_id = ptr::null_mut();
            let mut num_devices: cl_uint = 0;
            let status = unsafe {
                clGetDeviceIDs(platform, device_type, 1, &mut device, &mut num_devices)
            };
            if status == CL_SUCCESS && num_devices > 0 && !device.is_null() {
                return Self::with_device(platform, device);
            }
        }

        Err(Error::NoDevice(device_type_name(device_type).to_string()))
    }

    fn with_device(platform: cl_platform_id, device: cl_device_id) -> Result<Self> {
        let platform_name = query_string(|size, value, size_ret| unsafe {
            clGetPlatformInfo(platform, CL_PLATFORM_NAME, size, value, size_ret)
        })?;
        let device_name = query_string(|size, value, size_ret| unsafe {
            clGetDeviceInfo(device, CL_DEVICE_NAME, size, value, size_ret)
        })?;

        let mut max_work_group_size = 0usize;
        cl_check!(Environment, "Запрос CL_DEVICE_MAX_WORK_GROUP_SIZE", clGetDeviceInfo(
            device,
            CL_DEVICE_MAX_WORK_GROUP_SIZE,
            std::mem::size_of::<usize>(),
            &mut max_work_group_size as *mut _ as *mut c_void,
            ptr::null_mut()
        ))?;

        log::info!("Платформа: {}", platform_name);
        log::info!("Устройство: {} (max work group size {})", device_name, max_work_group_size);

        let context = cl_create!(Environment, "Создание контекста", clCreateContext(
            ptr::null(),
            1,
            &device,
            Some(log_context_callback),
            ptr::null_mut()
        ))?;

        let queue = match cl_create!(Environment, "Создание очереди команд", clCreateCommandQueue(
            context,
            device,
            0
        )) {
            Ok(queue) => queue,
            Err(e) => {
                unsafe { clReleaseContext(context) };
                return Err(e);
            }
        };

        Ok(Self {
            device,
            context,
            queue,
            platform_name,
            device_name,
            max_work_group_size,
        })
    }

    pub fn device(&self) -> cl_device_id {
        self.device
    }

    pub fn context(&self) -> cl_context {
        self.context
    }

    pub fn queue(&self) -> cl_command_queue {
        self.queue
    }

    pub fn platform_name(&self) -> &str {
        &self.platform_name
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn max_work_group_size(&self) -> usize {
        self.max_work_group_size
    }

    /// Блокируется, пока все команды очереди не завершатся
    pub fn finish(&self) -> Result<()> {
        cl_check!(Dispatch, "Ожидание завершения очереди", clFinish(self.queue))
    }
}

impl Drop for ClContext {
    fn drop(&mut self) {
        unsafe {
            clReleaseCommandQueue(self.queue);
            clReleaseContext(self.context);
        }
    }
}

/// Двухшаговый запрос строкового параметра: сначала размер, затем значение
fn query_string<F>(query: F) -> Result<String>
where
    F: Fn(usize, *mut c_void, *mut usize) -> cl_int,
{
    let mut size = 0usize;
    cl_check!(Environment, "Запрос размера строки", query(0, ptr::null_mut(), &mut size as *mut usize))?;
    let mut buffer = vec![0u8; size];
    cl_check!(Environment, "Запрос строки", query(
        size,
        buffer.as_mut_ptr() as *mut c_void,
        ptr::null_mut()
    ))?;
    while buffer.last() == Some(&0) {
        buffer.pop();
    }
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn device_type_name(device_type: cl_device_type) -> &'static str {
    match device_type {
        CL_DEVICE_TYPE_GPU => "GPU",
        CL_DEVICE_TYPE_CPU => "CPU",
        CL_DEVICE_TYPE_DEFAULT => "DEFAULT",
        _ => "ALL",
    }
}
