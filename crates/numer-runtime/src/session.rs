#![forbid(unsafe_code)]

//! One mounted method: inputs, examples, and the calculate round trip.

use std::sync::Arc;

use numer_core::{Example, Fields, MethodId, MethodSchema, Value};
use tracing::{debug, info_span, warn};

use crate::error::{NumerError, NumerResult};
use crate::example::load_example;
use crate::gateway::Gateway;
use crate::marshal::align;
use crate::store::ParameterStore;

/// Computes extra call parameters from the current ones.
///
/// Used for values the user does not enter directly, such as a symbolic
/// derivative or a reference integral derived from the entered equation.
pub trait ParamHook {
    fn external_params(&self, params: &Fields) -> Result<Fields, String>;
}

impl<F> ParamHook for F
where
    F: Fn(&Fields) -> Result<Fields, String>,
{
    fn external_params(&self, params: &Fields) -> Result<Fields, String> {
        self(params)
    }
}

/// State and actions of a mounted method page.
pub struct MethodSession<'s> {
    id: MethodId,
    schema: &'s MethodSchema,
    store: ParameterStore<'s>,
    gateway: Arc<Gateway>,
    external: Fields,
    hook: Option<Box<dyn ParamHook + 's>>,
}

impl std::fmt::Debug for MethodSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodSession")
            .field("id", &self.id)
            .field("store", &self.store)
            .field("external", &self.external)
            .field("hook", &self.hook.is_some())
            .finish_non_exhaustive()
    }
}

impl<'s> MethodSession<'s> {
    /// Mount a method.
    ///
    /// The first declared example is loaded when one exists and loads
    /// cleanly; otherwise the store starts from defaults.
    #[must_use]
    pub fn mount(id: MethodId, schema: &'s MethodSchema, gateway: Arc<Gateway>) -> Self {
        let mut session = Self {
            id,
            schema,
            store: ParameterStore::new(&schema.input),
            gateway,
            external: Fields::new(),
            hook: None,
        };
        if let Some(example) = schema.examples.examples.first()
            && let Err(err) = session.load_example(example)
        {
            warn!(method = %session.id, %err, "first example rejected, using defaults");
            session.store.reset_to_default();
        }
        session
    }

    /// Parameters supplied outside the input form, merged last.
    #[must_use]
    pub fn with_external(mut self, external: Fields) -> Self {
        self.external = external;
        self
    }

    /// Compute external parameters from the current values before each call.
    #[must_use]
    pub fn with_hook(mut self, hook: impl ParamHook + 's) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn id(&self) -> &MethodId {
        &self.id
    }

    #[must_use]
    pub fn schema(&self) -> &'s MethodSchema {
        self.schema
    }

    #[must_use]
    pub fn store(&self) -> &ParameterStore<'s> {
        &self.store
    }

    /// Declared examples in order.
    #[must_use]
    pub fn examples(&self) -> &'s [Example] {
        &self.schema.examples.examples
    }

    pub fn set_size(&mut self, size: usize) -> usize {
        self.store.set_size(size)
    }

    pub fn set_scalar(&mut self, name: &str, value: Value) -> NumerResult<()> {
        self.store.set_scalar(name, value)
    }

    pub fn set_cell(&mut self, name: &str, row: usize, col: usize, value: Value) -> NumerResult<()> {
        self.store.set_cell(name, row, col, value)
    }

    pub fn reset(&mut self) {
        self.store.reset_to_default();
    }

    /// Load an example; the store is left untouched when its size cannot
    /// be inferred.
    pub fn load_example(&mut self, example: &Example) -> NumerResult<()> {
        let loaded = load_example(&self.schema.input, example)?;
        self.store.apply_example(loaded.size, loaded.values);
        Ok(())
    }

    pub fn load_named_example(&mut self, name: &str) -> NumerResult<()> {
        let schema = self.schema;
        let example = schema
            .examples
            .find(name)
            .ok_or_else(|| NumerError::UnknownExample {
                name: name.to_owned(),
            })?;
        self.load_example(example)
    }

    /// Everything the next call will see: values, size, then external params.
    pub fn merged_params(&self) -> NumerResult<Fields> {
        let params = self.store.params();
        let mut external = self.external.clone();
        if let Some(hook) = &self.hook {
            let computed = hook
                .external_params(&params)
                .map_err(|reason| NumerError::ExternalParams { reason })?;
            external.merge_from(&computed);
        }
        let mut merged = params;
        merged.merge_from(&external);
        Ok(merged)
    }

    /// Marshal the current parameters, call the module, and store the outcome.
    ///
    /// Every failure is also written to the store as user-visible text.
    pub fn calculate(&mut self) -> NumerResult<&Value> {
        let span = info_span!("calculate", method = %self.id);
        let _guard = span.enter();

        let outcome = self.merged_params().and_then(|merged| {
            let args = align(&self.schema.io, &merged)?;
            Ok(self.gateway.call(&self.schema.io.function, &args)?)
        });
        match outcome {
            Ok(value) => {
                if !self.schema.io.outputs.describes(&value) {
                    debug!(method = %self.id, "result does not match the declared outputs");
                }
                Ok(self.store.set_result(value))
            }
            Err(err) => {
                let message = match &err {
                    NumerError::ForeignComputation(e) => e.message().to_owned(),
                    other => other.to_string(),
                };
                self.store.set_error(message);
                Err(err)
            }
        }
    }
}
