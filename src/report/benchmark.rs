//! Timing of the preprocessing phases.

use super::*;
use std::sync::atomic::{compiler_fence, Ordering::SeqCst};
use std::time::Instant;

/// Run the given lambda, print how long it took, report the duration under
/// the given key and hand the lambda's result back.
pub fn report_time_with_key<Out, F: FnOnce() -> Out>(name: &str, key: &'static str, f: F) -> Out {
    compiler_fence(SeqCst);
    let start = Instant::now();
    eprintln!("starting {}", name);
    let res = f();
    let t_passed = start.elapsed();
    compiler_fence(SeqCst);
    let t_passed = t_passed.as_secs_f64() * 1000.0;
    eprintln!("{} done - took: {}ms", name, t_passed);
    report!(key, t_passed);
    res
}
