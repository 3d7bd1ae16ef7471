use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

use nuspec_runtime::RuntimeMode;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NufftKind {
    Direct,
    Fast,
}

/// One executed non-uniform transform.
///
/// Kernel fields are `None` for direct transforms and for fast transforms
/// whose kernel could not be built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NufftTrace {
    pub operation_id: String,
    pub kind: NufftKind,
    pub direction: i8,
    pub samples: usize,
    pub m: usize,
    pub grid_len: Option<usize>,
    pub nspread: Option<usize>,
    pub precision: Option<f64>,
    pub ier: i32,
    pub mode: RuntimeMode,
    pub timing_ns: u128,
}

impl NufftTrace {
    #[must_use]
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

const TRACE_CAPACITY: usize = 4096;

static TRACE_LOG: OnceLock<Mutex<VecDeque<NufftTrace>>> = OnceLock::new();
static OPERATION_COUNTER: AtomicU64 = AtomicU64::new(1);

fn trace_log() -> &'static Mutex<VecDeque<NufftTrace>> {
    TRACE_LOG.get_or_init(|| Mutex::new(VecDeque::new()))
}

pub(crate) fn next_operation_id(kind: NufftKind) -> String {
    let next = OPERATION_COUNTER.fetch_add(1, Ordering::Relaxed);
    match kind {
        NufftKind::Direct => format!("nudft-op-{next:016x}"),
        NufftKind::Fast => format!("nufft-op-{next:016x}"),
    }
}

pub(crate) fn record_trace(trace: NufftTrace) {
    if let Ok(mut log) = trace_log().lock() {
        if log.len() == TRACE_CAPACITY {
            let _ = log.pop_front();
        }
        log.push_back(trace);
    }
}

/// Drain the recorded non-uniform transform traces, oldest first.
#[must_use]
pub fn take_nufft_traces() -> Vec<NufftTrace> {
    trace_log()
        .lock()
        .map(|mut log| log.drain(..).collect())
        .unwrap_or_default()
}
