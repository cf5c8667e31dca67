use std::ffi::{c_void, CStr};

/// Тип callback-функции для контекста OpenCL
pub type ContextNotifyCallback = Option<
    unsafe extern "C" fn(
        errinfo: *const i8,
        private_info: *const c_void,
        cb: usize,
        user_data: *mut c_void,
    )
>;

/// Пересылает сообщения драйвера в лог
pub unsafe extern "C" fn log_context_callback(
    errinfo: *const i8,
    _private_info: *const c_void,
    _cb: usize,
    _user_data: *mut c_void,
) {
    if errinfo.is_null() {
        return;
    }
    let message = CStr::from_ptr(errinfo as *const std::ffi::c_char);
    log::error!("OpenCL: {}", message.to_string_lossy());
}
