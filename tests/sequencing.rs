//! Порядок обращений оркестратора к устройству

use opencl_gauss_jordan::gauss_jordan::{
    run, ComputeBackend, CpuBackend, CpuSession, DeviceSession, InversionObserver, Phase,
};
use opencl_gauss_jordan::{Error, MatrixPair, PivotPolicy, Result};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Upload,
    Enqueue(Phase),
    Finish,
    ReadPivot(usize),
    Download,
}

/// Записывает события и делегирует вычисления CPU-сессии
struct RecordingSession {
    inner: CpuSession,
    events: Vec<Event>,
    fail_on_finish: Option<usize>,
}

impl RecordingSession {
    fn new(n: usize) -> Self {
        Self {
            inner: CpuBackend::new().open_session(n).unwrap(),
            events: Vec::new(),
            fail_on_finish: None,
        }
    }

    fn finishes(&self) -> usize {
        self.events.iter().filter(|e| **e == Event::Finish).count()
    }
}

impl DeviceSession for RecordingSession {
    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn upload(&mut self, pair: &MatrixPair) -> Result<()> {
        self.events.push(Event::Upload);
        self.inner.upload(pair)
    }

    fn enqueue(&mut self, phase: Phase) -> Result<()> {
        self.events.push(Event::Enqueue(phase));
        self.inner.enqueue(phase)
    }

    fn finish(&mut self) -> Result<()> {
        if self.fail_on_finish == Some(self.finishes()) {
            return Err(Error::Dispatch { op: "Ожидание завершения очереди", code: -36 });
        }
        self.events.push(Event::Finish);
        self.inner.finish()
    }

    fn read_pivot(&mut self, k: usize) -> Result<f64> {
        self.events.push(Event::ReadPivot(k));
        self.inner.read_pivot(k)
    }

    fn download(&mut self, pair: &mut MatrixPair) -> Result<()> {
        self.events.push(Event::Download);
        self.inner.download(pair)
    }
}

#[derive(Default)]
struct CountingObserver {
    started: usize,
    steps: Vec<usize>,
    finished: usize,
}

impl InversionObserver for CountingObserver {
    fn algorithm_started(&mut self, _backend: &str, _dimension: usize) {
        self.started += 1;
    }

    fn step_completed(&mut self, step: usize, _dimension: usize) {
        self.steps.push(step);
    }

    fn algorithm_finished(&mut self, _elapsed: Duration) {
        self.finished += 1;
    }
}

#[test]
fn every_phase_is_followed_by_a_barrier() {
    let n = 3;
    let mut session = RecordingSession::new(n);
    let mut pair = MatrixPair::new(vec![4.0, 1.0, 2.0, 1.0, 5.0, 1.0, 2.0, 1.0, 6.0], n).unwrap();
    let mut observer = CountingObserver::default();

    run(&mut session, &mut pair, PivotPolicy::Propagate, "mock", &mut observer).unwrap();

    let mut expected = vec![Event::Upload];
    for k in 0..n {
        expected.push(Event::Enqueue(Phase::Eliminate { pivot: k }));
        expected.push(Event::Finish);
    }
    expected.push(Event::Enqueue(Phase::Normalize));
    expected.push(Event::Finish);
    expected.push(Event::Download);
    assert_eq!(session.events, expected);

    assert_eq!(observer.started, 1);
    assert_eq!(observer.steps, vec![0, 1, 2]);
    assert_eq!(observer.finished, 1);
}

#[test]
fn fail_fast_reads_pivot_after_previous_barrier() {
    let n = 2;
    let mut session = RecordingSession::new(n);
    let mut pair = MatrixPair::new(vec![1.0, 2.0, 3.0, 4.0], n).unwrap();
    let policy = PivotPolicy::FailFast { tolerance: 1e-12 };

    run(&mut session, &mut pair, policy, "mock", &mut CountingObserver::default()).unwrap();

    assert_eq!(
        session.events,
        vec![
            Event::Upload,
            Event::ReadPivot(0),
            Event::Enqueue(Phase::Eliminate { pivot: 0 }),
            Event::Finish,
            Event::ReadPivot(1),
            Event::Enqueue(Phase::Eliminate { pivot: 1 }),
            Event::Finish,
            Event::Enqueue(Phase::Normalize),
            Event::Finish,
            Event::Download,
        ]
    );
}

#[test]
fn failed_barrier_aborts_run() {
    let n = 3;
    let mut session = RecordingSession::new(n);
    session.fail_on_finish = Some(1);
    let mut pair = MatrixPair::new(vec![4.0, 1.0, 2.0, 1.0, 5.0, 1.0, 2.0, 1.0, 6.0], n).unwrap();
    let mut observer = CountingObserver::default();

    let err = run(&mut session, &mut pair, PivotPolicy::Propagate, "mock", &mut observer).unwrap_err();
    assert!(matches!(err, Error::Dispatch { code: -36, .. }));

    // второй шаг поставлен, третий нет, выгрузки не было
    assert!(!session.events.contains(&Event::Enqueue(Phase::Eliminate { pivot: 2 })));
    assert!(!session.events.contains(&Event::Download));
    assert_eq!(observer.steps, vec![0]);
    assert_eq!(observer.finished, 0);
    assert_eq!(pair.b(), &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn singular_pivot_stops_before_dispatch() {
    let n = 2;
    let mut session = RecordingSession::new(n);
    let mut pair = MatrixPair::new(vec![1.0, 2.0, 2.0, 4.0], n).unwrap();

    let err = run(&mut session, &mut pair, PivotPolicy::default(), "mock", &mut CountingObserver::default())
        .unwrap_err();
    assert!(matches!(err, Error::SingularMatrix { step: 1, .. }));
    assert_eq!(session.events.last(), Some(&Event::ReadPivot(1)));
}

#[test]
fn session_of_other_size_is_rejected() {
    let mut session = RecordingSession::new(3);
    let mut pair = MatrixPair::new(vec![1.0, 0.0, 0.0, 1.0], 2).unwrap();
    let err = run(&mut session, &mut pair, PivotPolicy::default(), "mock", &mut CountingObserver::default())
        .unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { .. }));
}
