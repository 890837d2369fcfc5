// src/backend/kernel.rs
// The seam between the graph glue and the precompiled MEX kernel.
// Everything numeric about MEX happens on the other side of this trait.

use crate::backend::number::SimnetF;
use crate::backend::tensor::Tensor;
use std::fmt::Debug;

/// Attributes attached to a Mex operation. `padding` and `strides` are the
/// already-expanded per-axis values (see `ops::dims`), aligned to the
/// spatial axes [height, width, depth]. The backward pass forwards the
/// exact same set to the gradient entry points.
#[derive(Debug, Clone, PartialEq)]
pub struct MexAttrs {
    pub num_instances: usize,
    pub softmax_mode: bool,
    pub padding: [i32; 3],
    pub strides: [i32; 3],
    pub epsilon: f32,
    pub blocks_out_of_bounds_value: f32,
    pub blocks_round_down: bool,
    pub use_unshared_regions: bool,
    pub shared_offset_region: Vec<i32>,
    pub unshared_offset_region: Vec<i32>,
}

impl Default for MexAttrs {
    fn default() -> Self {
        Self {
            num_instances: 1,
            softmax_mode: false,
            padding: [0, 0, 0],
            strides: [1, 1, 1],
            epsilon: 1.0,
            blocks_out_of_bounds_value: 0.0,
            blocks_round_down: true,
            use_unshared_regions: true,
            shared_offset_region: vec![-1],
            unshared_offset_region: vec![-1],
        }
    }
}

/// Arguments for the auxiliary offsets/region layout query. The defaults
/// mirror the native helper's own: identity strides, no padding, shared and
/// unshared regions left at "full size".
#[derive(Debug, Clone, PartialEq)]
pub struct MexDimsQuery {
    pub input_dim: Vec<i32>,
    pub num_instances: i32,
    pub blocks: Vec<i32>,
    pub padding: Vec<i32>,
    pub strides: Vec<i32>,
    pub blocks_round_down: bool,
    pub use_unshared_regions: bool,
    pub shared_offset_region: Vec<i32>,
    pub unshared_offset_region: Vec<i32>,
}

impl MexDimsQuery {
    pub fn new(input_dim: Vec<i32>, num_instances: i32, blocks: Vec<i32>) -> Self {
        Self {
            input_dim,
            num_instances,
            blocks,
            padding: vec![0],
            strides: vec![1],
            blocks_round_down: true,
            use_unshared_regions: true,
            shared_offset_region: vec![-1],
            unshared_offset_region: vec![-1],
        }
    }
}

/// Opaque MEX kernel. Implementations wrap the precompiled native library
/// (see `backend::native`) or stand in for it in tests; this crate never
/// looks at how forward and the two gradients are computed.
pub trait MexKernel<T>: Debug
where
    T: SimnetF,
{
    /// Forward pass: aggregates `input` over regions parameterized by
    /// `offsets`, producing the output tensor.
    fn forward(
        &self,
        input: &Tensor<T>,
        offsets: &Tensor<T>,
        attrs: &MexAttrs,
    ) -> Result<Tensor<T>, String>;

    /// Gradient of the output with respect to `input`.
    fn input_grad(
        &self,
        input: &Tensor<T>,
        offsets: &Tensor<T>,
        output: &Tensor<T>,
        grad_output: &Tensor<T>,
        attrs: &MexAttrs,
    ) -> Result<Tensor<T>, String>;

    /// Gradient of the output with respect to `offsets`.
    fn offsets_grad(
        &self,
        input: &Tensor<T>,
        offsets: &Tensor<T>,
        output: &Tensor<T>,
        grad_output: &Tensor<T>,
        attrs: &MexAttrs,
    ) -> Result<Tensor<T>, String>;

    /// Region/offset layout helper: returns the number of offset regions
    /// for the given configuration, so callers can size offsets tensors.
    fn offsets_layout(&self, query: &MexDimsQuery) -> Result<i32, String>;
}
