//! Обращение матрицы методом Гаусса-Жордана
//!
//! Использование: `gauss_jordan [config.json]`. Без аргумента используется матрица 1024x1024
//! из случайных цифр 1..9 на CPU.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use opencl_gauss_jordan::{
    gauss_jordan::InversionObserver,
    matrix::{initialize_matrices, residual_norm},
    run_with_config,
    utils::{corner_table, measure_time, Profiler},
    InversionConfig, MatrixPair,
};
use prettytable::{row, Table};
use std::time::Duration;

/// Размер выводимого угла матриц
const CORNER: usize = 4;

/// Профилировщик и индикатор прогресса по шагам исключения
struct ConsoleObserver {
    profiler: Profiler,
    style: Option<ProgressStyle>,
    progress: Option<ProgressBar>,
}

impl ConsoleObserver {
    fn new(show_progress: bool) -> Result<Self> {
        let style = if show_progress {
            Some(ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] шаг {pos}/{len} ({eta})")?
                .progress_chars("#>-"))
        } else {
            None
        };
        Ok(Self {
            profiler: Profiler::new(),
            style,
            progress: None,
        })
    }
}

impl InversionObserver for ConsoleObserver {
    fn algorithm_started(&mut self, backend: &str, dimension: usize) {
        self.profiler.algorithm_started(backend, dimension);
        if let Some(style) = &self.style {
            let pb = ProgressBar::new(dimension as u64);
            pb.set_style(style.clone());
            self.progress = Some(pb);
        }
    }

    fn step_completed(&mut self, step: usize, _dimension: usize) {
        if let Some(pb) = &self.progress {
            pb.set_position(step as u64 + 1);
        }
    }

    fn algorithm_finished(&mut self, elapsed: Duration) {
        self.profiler.algorithm_finished(elapsed);
        if let Some(pb) = self.progress.take() {
            pb.finish_with_message("Исключение завершено");
        }
    }
}

fn load_config() -> Result<InversionConfig> {
    match std::env::args().nth(1) {
        Some(path) => InversionConfig::from_file(&path)
            .with_context(|| format!("Не удалось загрузить конфигурацию {}", path)),
        None => Ok(InversionConfig::default()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    config.validate().context("Проверка конфигурации")?;
    let n = config.dimension;

    println!("Обращение матрицы методом Гаусса-Жордана");
    println!("Размер матрицы: {}x{}", n, n);
    println!("Бэкенд: {:?}, тип матрицы: {:?}", config.backend, config.matrix_type);

    let (a, _) = initialize_matrices(config.matrix_type, n, config.seed);
    let original = config.verify.then(|| a.clone());
    let mut pair = MatrixPair::new(a, n).context("Подготовка матриц")?;

    println!("\nВходная матрица A:");
    corner_table(pair.a(), n, CORNER).printstd();

    let mut observer = ConsoleObserver::new(config.show_progress)?;
    let report = run_with_config(&config, &mut pair, &mut observer)
        .context("Обращение матрицы")?;

    println!("\nМатрица A после исключения (диагональ ведущих элементов):");
    corner_table(pair.a(), n, CORNER).printstd();
    println!("\nОбратная матрица B:");
    corner_table(pair.b(), n, CORNER).printstd();

    let mut summary = Table::new();
    summary.add_row(row!["Бэкенд", report.backend]);
    summary.add_row(row!["Размер", format!("{}x{}", report.dimension, report.dimension)]);
    summary.add_row(row!["Шагов исключения", report.steps]);
    summary.add_row(row![
        "min |A[k][k]|",
        report.min_abs_pivot.map_or("не проверялся".to_string(), |p| format!("{:e}", p))
    ]);

    if let Some(original) = original {
        let (residual, duration) = measure_time(|| residual_norm(&original, pair.b(), n));
        observer.profiler.record("verify", duration);
        summary.add_row(row!["max |A*B - I|", format!("{:e}", residual)]);
    }

    println!("\nИтоговая статистика:");
    summary.printstd();
    println!("\nПрофиль:");
    observer.profiler.report().printstd();

    Ok(())
}
