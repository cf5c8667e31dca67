//! Сверка OpenCL-бэкенда с CPU. Требует устройство OpenCL:
//! `cargo test --features opencl -- --ignored`
#![cfg(feature = "opencl")]

mod common;

use common::{assert_close, invert_with};
use opencl_gauss_jordan::gauss_jordan::{CpuBackend, OpenClBackend};
use opencl_gauss_jordan::matrix::{initialize_matrices, residual_norm};
use opencl_gauss_jordan::opencl::types::CL_DEVICE_TYPE_ALL;
use opencl_gauss_jordan::{Error, MatrixPair, MatrixType, PivotPolicy};

fn device_backend() -> OpenClBackend {
    OpenClBackend::new().with_device_type(CL_DEVICE_TYPE_ALL)
}

#[test]
#[ignore = "нужно устройство OpenCL"]
fn matches_cpu_on_digits_matrix() {
    let n = 100;
    let (a, _) = initialize_matrices(MatrixType::DiagonallyDominant, n, Some(1));
    let gpu = invert_with(device_backend(), PivotPolicy::default(), a.clone(), n);
    let cpu = invert_with(CpuBackend::new(), PivotPolicy::default(), a.clone(), n);
    assert_close(gpu.b(), cpu.b(), 1e-12, "opencl vs cpu");
    assert!(residual_norm(&a, gpu.b(), n) < 1e-9);
}

#[test]
#[ignore = "нужно устройство OpenCL"]
fn work_group_not_dividing_dimension() {
    let n = 37;
    let (a, _) = initialize_matrices(MatrixType::DiagonallyDominant, n, Some(2));
    let backend = device_backend().with_work_group_size(16);
    let pair = invert_with(backend, PivotPolicy::default(), a.clone(), n);
    assert!(residual_norm(&a, pair.b(), n) < 1e-9);
}

#[test]
#[ignore = "нужно устройство OpenCL"]
fn concrete_scenarios() {
    let pair = invert_with(device_backend(), PivotPolicy::default(), vec![1.0, 2.0, 3.0, 4.0], 2);
    assert_close(pair.b(), &[-2.0, 1.0, 1.5, -0.5], 1e-9, "2x2");

    let pair = invert_with(device_backend(), PivotPolicy::default(), vec![5.0], 1);
    assert_close(pair.b(), &[0.2], 1e-15, "1x1");
}

#[test]
#[ignore = "нужно устройство OpenCL"]
fn singular_matrix_on_device() {
    let mut pair = MatrixPair::new(vec![1.0, 2.0, 2.0, 4.0], 2).unwrap();
    let err = opencl_gauss_jordan::Inverter::new(device_backend())
        .invert_pair(&mut pair, &mut opencl_gauss_jordan::gauss_jordan::NoopObserver)
        .unwrap_err();
    assert!(matches!(err, Error::SingularMatrix { step: 1, .. }));
}

#[test]
#[ignore = "нужно устройство OpenCL"]
fn broken_kernel_source_reports_build_log() {
    use opencl_gauss_jordan::gauss_jordan::ComputeBackend;
    use opencl_gauss_jordan::InversionConfig;

    let dir = std::env::temp_dir().join("gauss_jordan_broken_kernel.cl");
    std::fs::write(&dir, "__kernel void iteration( { }").unwrap();
    let config = InversionConfig {
        kernel_path: Some(dir.clone()),
        device_type: opencl_gauss_jordan::DeviceKind::All,
        ..InversionConfig::default()
    };
    let backend = OpenClBackend::from_config(&config).unwrap();
    let err = backend.open_session(4).err().unwrap();
    assert!(matches!(err, Error::Build { .. }));
    let _ = std::fs::remove_file(dir);
}
