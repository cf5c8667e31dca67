//! Типы ошибок крейта

use crate::gauss_jordan::sequencer::State;
use crate::opencl::utils::error_name;
use std::path::PathBuf;
use thiserror::Error;

/// Result с ошибкой крейта
pub type Result<T> = std::result::Result<T, Error>;

/// Ошибки обращения матрицы
#[derive(Error, Debug)]
pub enum Error {
    /// Не найдено ни одной вычислительной платформы
    #[error("Не найдено ни одной платформы OpenCL")]
    NoPlatform,

    /// На платформе нет устройства нужного типа
    #[error("Не найдено устройство OpenCL типа '{0}'")]
    NoDevice(String),

    /// Ошибка настройки окружения (контекст, очередь, буферы)
    #[error("{op}: код OpenCL {code} ({})", error_name(.code))]
    Environment {
        /// Операция, на которой произошёл сбой
        op: &'static str,
        /// Код возврата OpenCL
        code: i32,
    },

    /// Программа ядер не скомпилировалась
    #[error("Ошибка компиляции программы: код {code} ({}), лог:\n{log}", error_name(.code))]
    Build {
        /// Код возврата clBuildProgram
        code: i32,
        /// Лог компилятора
        log: String,
    },

    /// Ошибка установки аргументов или запуска ядра
    #[error("{op}: код OpenCL {code} ({})", error_name(.code))]
    Dispatch {
        /// Операция, на которой произошёл сбой
        op: &'static str,
        /// Код возврата OpenCL
        code: i32,
    },

    /// Ошибка копирования между хостом и устройством
    #[error("{op}: код OpenCL {code} ({})", error_name(.code))]
    Transfer {
        /// Операция, на которой произошёл сбой
        op: &'static str,
        /// Код возврата OpenCL
        code: i32,
    },

    /// Нулевой или почти нулевой ведущий элемент
    #[error("Вырожденная или почти вырожденная матрица: ведущий элемент {pivot:e} на шаге {step}")]
    SingularMatrix {
        /// Номер шага исключения
        step: usize,
        /// Значение A[k][k]
        pivot: f64,
    },

    /// Размер данных не совпадает с размерностью сессии
    #[error("Несовпадение размеров: ожидалось {expected} элементов, получено {got}")]
    DimensionMismatch {
        /// Ожидаемое число элементов
        expected: usize,
        /// Фактическое число элементов
        got: usize,
    },

    /// Матрица не квадратная или пустая
    #[error("Недопустимая размерность матрицы {rows}x{cols}")]
    InvalidDimension {
        /// Число строк
        rows: usize,
        /// Число столбцов
        cols: usize,
    },

    /// Нарушен порядок фаз алгоритма
    #[error("Недопустимый переход {from:?} -> {to:?}")]
    InvalidTransition {
        /// Текущее состояние
        from: State,
        /// Запрошенное состояние
        to: State,
    },

    /// Бэкенд не собран в этой конфигурации
    #[error("Бэкенд '{0}' недоступен: крейт собран без соответствующей feature")]
    BackendUnavailable(&'static str),

    /// Не удалось прочитать исходный код ядер
    #[error("Не удалось прочитать исходный код ядер из {path:?}: {source}")]
    KernelSource {
        /// Путь к файлу
        path: PathBuf,
        /// Причина
        source: std::io::Error,
    },

    /// Не удалось прочитать файл конфигурации
    #[error("Не удалось прочитать конфигурацию {path:?}: {source}")]
    ConfigIo {
        /// Путь к файлу
        path: PathBuf,
        /// Причина
        source: std::io::Error,
    },

    /// Конфигурация не разбирается как JSON
    #[error("Некорректный JSON конфигурации: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Значение конфигурации вне допустимого диапазона
    #[error("Некорректная конфигурация: {0}")]
    InvalidConfig(String),

    /// Не удалось создать пул потоков
    #[error("Не удалось создать пул потоков: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
