#![forbid(unsafe_code)]

//! Calls into the precompiled compute module.
//!
//! # Initialization
//!
//! The module is initialized lazily on the first call. Initialization runs at
//! most once per [`Gateway`]: concurrent callers wait on the same mutex and
//! observe the outcome, and a failed initialization is remembered and
//! reported to every later caller.
//!
//! ```text
//! Uninitialized ──init ok──▶ Ready
//!       │
//!       └──init err──▶ Unavailable(reason)   (terminal)
//! ```
//!
//! The mutex guards initialization only. Once `Ready`, each call takes a
//! shared handle to the module and invokes it unlocked, so computations
//! run concurrently and a module may call back into its gateway.
//!
//! # Failures
//!
//! A module signals failure either by faulting or by returning a string in
//! place of data. Both become a [`ForeignComputationError`].

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use numer_core::Value;
use tracing::{debug, info, warn};

use crate::error::{ForeignComputationError, ForeignFailure};
use crate::marshal::Arg;

/// A precompiled module exposing one function per method.
///
/// After initialization the module is shared between callers, so `invoke`
/// may run on several threads at once.
pub trait ComputeModule: Send + Sync {
    /// One-time setup. An `Err` makes the module permanently unavailable.
    fn initialize(&mut self) -> Result<(), String>;

    /// Call `function` with positional arguments. `Err` is a fault.
    fn invoke(&self, function: &str, args: &[Arg]) -> Result<Value, String>;
}

/// Initialization state visible to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayStatus {
    Uninitialized,
    Ready,
    Unavailable(String),
}

/// Where the module lives as it moves through initialization.
enum ModuleSlot {
    Pending(Box<dyn ComputeModule>),
    Ready(Arc<dyn ComputeModule>),
    Unavailable(String),
}

struct GatewayInner {
    slot: ModuleSlot,
    init_runs: u32,
}

impl GatewayInner {
    fn status(&self) -> GatewayStatus {
        match &self.slot {
            ModuleSlot::Pending(_) => GatewayStatus::Uninitialized,
            ModuleSlot::Ready(_) => GatewayStatus::Ready,
            ModuleSlot::Unavailable(reason) => GatewayStatus::Unavailable(reason.clone()),
        }
    }

    fn ensure_initialized(&mut self) -> Result<Arc<dyn ComputeModule>, String> {
        let placeholder = ModuleSlot::Unavailable("initialization interrupted".to_owned());
        let mut module = match std::mem::replace(&mut self.slot, placeholder) {
            ModuleSlot::Ready(module) => {
                self.slot = ModuleSlot::Ready(Arc::clone(&module));
                return Ok(module);
            }
            ModuleSlot::Unavailable(reason) => {
                self.slot = ModuleSlot::Unavailable(reason.clone());
                return Err(reason);
            }
            ModuleSlot::Pending(module) => module,
        };
        self.init_runs = self.init_runs.saturating_add(1);
        match module.initialize() {
            Ok(()) => {
                info!("compute module initialized");
                let module: Arc<dyn ComputeModule> = Arc::from(module);
                self.slot = ModuleSlot::Ready(Arc::clone(&module));
                Ok(module)
            }
            Err(reason) => {
                warn!(%reason, "compute module failed to initialize");
                self.slot = ModuleSlot::Unavailable(reason.clone());
                Err(reason)
            }
        }
    }
}

/// Shared entry point to a [`ComputeModule`].
///
/// `Gateway` is `Sync`; share it between sessions with `Arc`.
pub struct Gateway {
    inner: Mutex<GatewayInner>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl Gateway {
    #[must_use]
    pub fn new(module: impl ComputeModule + 'static) -> Self {
        Self {
            inner: Mutex::new(GatewayInner {
                slot: ModuleSlot::Pending(Box::new(module)),
                init_runs: 0,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, GatewayInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn status(&self) -> GatewayStatus {
        self.lock().status()
    }

    /// How many times module initialization has actually run.
    #[must_use]
    pub fn init_runs(&self) -> u32 {
        self.lock().init_runs
    }

    /// Initialize the module if that has not happened yet.
    pub fn ensure_initialized(&self) -> Result<(), ForeignComputationError> {
        self.lock()
            .ensure_initialized()
            .map(drop)
            .map_err(|reason| ForeignComputationError {
                function: String::new(),
                failure: ForeignFailure::Unavailable(reason),
            })
    }

    /// Invoke `function`, initializing the module first if needed.
    pub fn call(&self, function: &str, args: &[Arg]) -> Result<Value, ForeignComputationError> {
        let fail = |failure: ForeignFailure| {
            warn!(function, ?failure, "foreign computation failed");
            ForeignComputationError {
                function: function.to_owned(),
                failure,
            }
        };
        let module = self
            .lock()
            .ensure_initialized()
            .map_err(|reason| fail(ForeignFailure::Unavailable(reason)))?;
        debug!(function, args = args.len(), "invoking compute module");
        match module.invoke(function, args) {
            Ok(Value::Text(message)) => Err(fail(ForeignFailure::Returned(message))),
            Ok(value) => Ok(value),
            Err(fault) => Err(fail(ForeignFailure::Fault(fault))),
        }
    }
}

type ModuleFn = Box<dyn Fn(&[Arg]) -> Result<Value, String> + Send + Sync>;
type InitFn = Box<dyn FnMut() -> Result<(), String> + Send + Sync>;

/// A [`ComputeModule`] assembled from named closures.
///
/// Useful for embedding native implementations and for tests.
#[derive(Default)]
pub struct FunctionTable {
    functions: BTreeMap<String, ModuleFn>,
    init: Option<InitFn>,
}

impl FunctionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under `name`, replacing any previous one.
    #[must_use]
    pub fn with_function<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Arg]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Box::new(f));
        self
    }

    /// Run `init` once when the gateway first initializes the module.
    #[must_use]
    pub fn with_init<F>(mut self, init: F) -> Self
    where
        F: FnMut() -> Result<(), String> + Send + Sync + 'static,
    {
        self.init = Some(Box::new(init));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

impl ComputeModule for FunctionTable {
    fn initialize(&mut self) -> Result<(), String> {
        match self.init.as_mut() {
            Some(init) => init(),
            None => Ok(()),
        }
    }

    fn invoke(&self, function: &str, args: &[Arg]) -> Result<Value, String> {
        let f = self
            .functions
            .get(function)
            .ok_or_else(|| format!("unknown function {function:?}"))?;
        f(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Barrier, OnceLock, Weak};
    use std::thread;

    fn counting_table(counter: Arc<AtomicUsize>, fail: bool) -> FunctionTable {
        FunctionTable::new()
            .with_init(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                if fail {
                    Err("module binary missing".into())
                } else {
                    Ok(())
                }
            })
            .with_function("sum", |args| {
                let total: f64 = args
                    .iter()
                    .filter_map(Arg::as_f64_seq)
                    .flat_map(|seq| seq.iter().copied())
                    .sum();
                Ok(Value::Number(total))
            })
            .with_function("reject", |_| Ok(Value::from("Invalid interval")))
            .with_function("fault", |_| Err("stack overflow".into()))
    }

    #[test]
    fn init_runs_once_across_threads() {
        let counter = Arc::new(AtomicUsize::new(0));
        let gateway = Arc::new(Gateway::new(counting_table(counter.clone(), false)));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gateway = Arc::clone(&gateway);
                thread::spawn(move || gateway.call("sum", &[Arg::F64Seq(vec![1.0, 2.0])]))
            })
            .collect();
        for handle in handles {
            let value = handle.join().expect("thread").expect("call");
            assert_eq!(value, Value::Number(3.0));
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(gateway.init_runs(), 1);
        assert_eq!(gateway.status(), GatewayStatus::Ready);
    }

    #[test]
    fn failed_init_is_memoized() {
        let counter = Arc::new(AtomicUsize::new(0));
        let gateway = Gateway::new(counting_table(counter.clone(), true));
        for _ in 0..3 {
            let err = gateway.call("sum", &[]).expect_err("unavailable");
            assert_eq!(
                err.failure,
                ForeignFailure::Unavailable("module binary missing".into())
            );
        }
        assert!(gateway.ensure_initialized().is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(matches!(gateway.status(), GatewayStatus::Unavailable(_)));
    }

    #[test]
    fn string_return_is_an_error() {
        let gateway = Gateway::new(counting_table(Arc::new(AtomicUsize::new(0)), false));
        let err = gateway.call("reject", &[]).expect_err("string return");
        assert_eq!(err.function, "reject");
        assert_eq!(err.message(), "Invalid interval");
    }

    #[test]
    fn faults_and_unknown_functions_are_errors() {
        let gateway = Gateway::new(counting_table(Arc::new(AtomicUsize::new(0)), false));
        let err = gateway.call("fault", &[]).expect_err("fault");
        assert_eq!(err.failure, ForeignFailure::Fault("stack overflow".into()));
        let err = gateway.call("missing", &[]).expect_err("unknown");
        assert!(err.message().contains("missing"));
    }

    #[test]
    fn status_starts_uninitialized() {
        let gateway = Gateway::new(FunctionTable::new());
        assert_eq!(gateway.status(), GatewayStatus::Uninitialized);
        gateway.ensure_initialized().expect("no init hook");
        assert_eq!(gateway.status(), GatewayStatus::Ready);
    }

    #[test]
    fn calls_run_concurrently_once_ready() {
        let barrier = Arc::new(Barrier::new(2));
        let meet = Arc::clone(&barrier);
        let table = FunctionTable::new().with_function("meet", move |_| {
            meet.wait();
            Ok(Value::Number(1.0))
        });
        let gateway = Arc::new(Gateway::new(table));
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let gateway = Arc::clone(&gateway);
                thread::spawn(move || gateway.call("meet", &[]))
            })
            .collect();
        for handle in handles {
            let value = handle.join().expect("thread").expect("call");
            assert_eq!(value, Value::Number(1.0));
        }
        assert_eq!(gateway.init_runs(), 1);
    }

    #[test]
    fn module_may_call_back_into_its_gateway() {
        let slot: Arc<OnceLock<Weak<Gateway>>> = Arc::new(OnceLock::new());
        let outer = Arc::clone(&slot);
        let table = FunctionTable::new()
            .with_function("leaf", |_| Ok(Value::Number(2.0)))
            .with_function("outer", move |args| {
                let gateway = outer
                    .get()
                    .and_then(Weak::upgrade)
                    .ok_or("gateway dropped")?;
                let leaf = gateway.call("leaf", args).map_err(|err| err.to_string())?;
                Ok(Value::Number(leaf.as_f64().unwrap_or(0.0) + 1.0))
            });
        let gateway = Arc::new(Gateway::new(table));
        slot.set(Arc::downgrade(&gateway)).expect("set once");
        assert_eq!(gateway.call("outer", &[]).expect("nested call"), Value::Number(3.0));
    }
}
