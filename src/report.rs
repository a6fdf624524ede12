//! Structured reporting of preprocessing and experiment runs.
//!
//! Values are collected into a JSON object through the `report!` macro and
//! RAII context guards, and printed as one JSON document when the
//! [`ReportingGuard`] obtained from [`enable_reporting`] is dropped. When
//! reporting was never enabled all calls are no-ops, so library code can
//! report unconditionally.

use serde_json::{Map, Value};
use std::{cell::RefCell, mem::swap};

pub use serde_json::json;

#[derive(Debug, Default)]
pub struct Reporter {
    current: Map<String, Value>,
    context_stack: Vec<(String, Map<String, Value>)>,
}

impl Reporter {
    fn push_context(&mut self, key: String) {
        let mut parent = Map::new();
        swap(&mut parent, &mut self.current);
        self.context_stack.push((key, parent));
    }

    fn pop_context(&mut self) {
        let (key, mut parent) = self.context_stack.pop().expect("tried to pop from empty context");
        swap(&mut parent, &mut self.current);
        let prev = self.current.insert(key, Value::Object(parent));
        debug_assert!(prev.is_none());
    }

    fn report(&mut self, key: String, val: Value) {
        self.current.insert(key, val);
    }
}

thread_local! {
    static REPORTER: RefCell<Option<Reporter>> = const { RefCell::new(None) };
}

/// Guard for a nested reporting context. All values reported while the guard
/// lives end up in a sub object under the context key.
#[must_use]
pub struct ContextGuard(());

impl Drop for ContextGuard {
    fn drop(&mut self) {
        REPORTER.with(|reporter| {
            if let Some(r) = reporter.borrow_mut().as_mut() {
                r.pop_context()
            }
        });
    }
}

pub fn push_context(key: String) -> ContextGuard {
    REPORTER.with(|reporter| {
        if let Some(r) = reporter.borrow_mut().as_mut() {
            r.push_context(key)
        }
    });
    ContextGuard(())
}

pub fn report(key: String, val: Value) {
    if cfg!(feature = "report-to-stderr") {
        eprintln!("{}: {}", key, val);
    }
    REPORTER.with(|reporter| {
        if let Some(r) = reporter.borrow_mut().as_mut() {
            r.report(key, val)
        }
    });
}

/// Printed the collected report as JSON to stdout on drop.
#[must_use]
pub struct ReportingGuard(());

impl Drop for ReportingGuard {
    fn drop(&mut self) {
        REPORTER.with(|reporter| {
            if let Some(r) = reporter.borrow_mut().as_mut() {
                assert!(r.context_stack.is_empty());
                let mut object = Map::new();
                swap(&mut object, &mut r.current);
                println!("{}", Value::Object(object));
            };
        });
    }
}

#[macro_export]
macro_rules! report {
    ($k:expr, $($json:tt)+) => { $crate::report::report($k.to_string(), $crate::report::json!($($json)+)) };
}

pub fn enable_reporting(program: &str) -> ReportingGuard {
    REPORTER.with(|reporter| reporter.replace(Some(Reporter::default())));

    report!("program", program);
    report!("args", std::env::args().collect::<Vec<String>>());

    ReportingGuard(())
}

pub mod benchmark;
pub use benchmark::*;
