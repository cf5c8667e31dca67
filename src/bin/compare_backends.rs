//! Сравнение бэкендов на одной и той же матрице
use anyhow::{Context, Result};
use opencl_gauss_jordan::{
    gauss_jordan::{ComputeBackend, CpuBackend, Inverter, NoopObserver},
    matrix::{compare_results, initialize_matrices},
    InversionConfig, InversionReport, MatrixPair, PivotPolicy,
};
use prettytable::{row, Table};

/// Допуск при сравнении результатов разных бэкендов
const EPSILON: f64 = 1e-8;

fn run_backend<B: ComputeBackend>(
    backend: B,
    policy: PivotPolicy,
    a: &[f64],
    n: usize,
) -> Result<(InversionReport, Vec<f64>)> {
    let name = backend.name();
    println!("Вычисления: {}...", name);
    let mut pair = MatrixPair::new(a.to_vec(), n)?;
    let report = Inverter::new(backend)
        .with_policy(policy)
        .invert_pair(&mut pair, &mut NoopObserver)
        .with_context(|| format!("Обращение на {}", name))?;
    let (_, inverse) = pair.into_parts();
    Ok((report, inverse))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => InversionConfig::from_file(&path)
            .with_context(|| format!("Не удалось загрузить конфигурацию {}", path))?,
        None => InversionConfig::default(),
    };
    let n = config.dimension;
    println!("Сравнение бэкендов на матрице {}x{} ({:?})\n", n, n, config.matrix_type);

    let (a, _) = initialize_matrices(config.matrix_type, n, config.seed);

    #[allow(unused_mut)]
    let mut results = vec![
        run_backend(CpuBackend::with_threads(1)?, config.pivot_policy, &a, n)?,
        run_backend(CpuBackend::new(), config.pivot_policy, &a, n)?,
    ];

    #[cfg(feature = "opencl")]
    results.push(run_backend(
        opencl_gauss_jordan::gauss_jordan::OpenClBackend::from_config(&config)?,
        config.pivot_policy,
        &a,
        n,
    )?);
    #[cfg(not(feature = "opencl"))]
    println!("OpenCL пропущен: крейт собран без feature \"opencl\"");

    let (baseline, reference) = &results[0];
    let baseline_secs = baseline.elapsed.as_secs_f64();

    let mut stats_table = Table::new();
    stats_table.add_row(row!["Бэкенд", "Время, мс", "Ускорение", "Совпадает с 1 потоком"]);
    for (report, inverse) in &results {
        let secs = report.elapsed.as_secs_f64();
        let matches = compare_results(inverse, reference, n, EPSILON);
        stats_table.add_row(row![
            report.backend,
            format!("{:.3}", secs * 1000.0),
            format!("{:.2}x", baseline_secs / secs),
            if matches { "да" } else { "нет" }
        ]);
    }

    println!("\nИтоговая статистика:");
    stats_table.printstd();

    Ok(())
}
