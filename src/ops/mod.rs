// src/ops/mod.rs
// All operators in the computational graph implement this trait. Gradients
// do NOT live here: they are looked up by name in the graph's
// GradientRegistry, so an operator only describes its forward pass and
// exposes enough of itself (via as_any) for its registered gradient
// function to read its attributes back.

use crate::backend::{SimnetF, Tensor};
use std::any::Any;

pub trait Operator<T>: std::fmt::Debug
where
    T: SimnetF,
{
    /// Computes the output tensor from the input tensors.
    fn compute(&self, inputs: &[&Tensor<T>]) -> Result<Tensor<T>, String>;

    /// Number of inputs this operator expects.
    fn num_inputs(&self) -> usize;

    /// Stable operation-kind identifier, the key under which a gradient
    /// function may be registered.
    fn name(&self) -> &'static str;

    /// Downcasting hook for gradient functions that need attribute access.
    fn as_any(&self) -> &dyn Any;

    fn clone_op(&self) -> Box<dyn Operator<T>>;
}

pub mod dims;
pub mod mex;

pub use dims::{Dim, SpecDim, expand_dim_specification};
pub use mex::{Mex, MexConfig, mex};
