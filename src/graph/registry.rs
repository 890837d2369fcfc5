// src/graph/registry.rs
// Tagged-dispatch table for backward passes. Instead of attaching gradients
// to operators directly, each operation kind registers a gradient function
// under its name; the engine looks the function up during backpropagation.

use crate::backend::{SimnetF, Tensor};
use crate::ops::Operator;
use std::collections::HashMap;

/// Everything a gradient function may need: the operator (for attribute
/// access through `as_any`), its input tensors, the cached forward output
/// and the gradient flowing in from downstream.
pub struct GradientContext<'a, T>
where
    T: SimnetF,
{
    pub op: &'a dyn Operator<T>,
    pub inputs: &'a [&'a Tensor<T>],
    pub output: &'a Tensor<T>,
    pub grad_output: &'a Tensor<T>,
}

/// A registered backward pass. Returns one gradient per operator input, in
/// input order.
pub type GradientFn<T> = fn(&GradientContext<'_, T>) -> Result<Vec<Tensor<T>>, String>;

pub struct GradientRegistry<T>
where
    T: SimnetF,
{
    entries: HashMap<&'static str, GradientFn<T>>,
}

impl<T> GradientRegistry<T>
where
    T: SimnetF,
{
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registry with every gradient this crate ships pre-registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        crate::ops::mex::register_gradient(&mut registry);
        registry
    }

    /// Registers `gradient` under the operation-kind `name`. Re-registering
    /// a name replaces the previous entry.
    pub fn register(&mut self, name: &'static str, gradient: GradientFn<T>) {
        self.entries.insert(name, gradient);
    }

    pub fn lookup(&self, name: &str) -> Option<GradientFn<T>> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for GradientRegistry<T>
where
    T: SimnetF,
{
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<T> std::fmt::Debug for GradientRegistry<T>
where
    T: SimnetF,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("GradientRegistry")
            .field("entries", &names)
            .finish()
    }
}
