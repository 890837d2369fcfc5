// src/ops/mex.rs
// The MEX operator: graph-side glue around the opaque kernel. Construction
// goes through `mex()`, which expands the user-facing strides/padding
// shorthand against the input shape before anything reaches the kernel.

use crate::backend::{MexAttrs, MexDimsQuery, MexKernel, SimnetF, Tensor};
use crate::graph::engine::{AutodiffEngine, NodeId};
use crate::graph::registry::{GradientContext, GradientRegistry};
use crate::ops::Operator;
use crate::ops::dims::{Dim, expand_raw};
use std::any::Any;
use std::sync::Arc;

/// User-facing MEX configuration. `padding` and `strides` are still in
/// shorthand form (length 2 or 3, -1 meaning "use the full corresponding
/// image dimension"); the builder expands them.
#[derive(Debug, Clone, PartialEq)]
pub struct MexConfig {
    pub num_instances: usize,
    pub softmax_mode: bool,
    pub padding: Vec<i32>,
    pub strides: Vec<i32>,
    pub epsilon: f32,
    pub blocks_out_of_bounds_value: f32,
    pub blocks_round_down: bool,
    pub use_unshared_regions: bool,
    pub shared_offset_region: Vec<i32>,
    pub unshared_offset_region: Vec<i32>,
}

impl Default for MexConfig {
    fn default() -> Self {
        Self {
            num_instances: 1,
            softmax_mode: false,
            padding: vec![0, 0, 0],
            strides: vec![1, 1, 1],
            epsilon: 1.0,
            blocks_out_of_bounds_value: 0.0,
            blocks_round_down: true,
            use_unshared_regions: true,
            shared_offset_region: vec![-1],
            unshared_offset_region: vec![-1],
        }
    }
}

impl MexConfig {
    /// Resolves the shorthand against a concrete image shape, producing the
    /// attribute set the kernel sees. Fails fast with an InvalidArgument
    /// error if either specification is malformed.
    pub fn into_attrs(self, image_shape: &[Dim]) -> Result<MexAttrs, String> {
        let strides = expand_raw(image_shape, &self.strides)?;
        let padding = expand_raw(image_shape, &self.padding)?;

        Ok(MexAttrs {
            num_instances: self.num_instances,
            softmax_mode: self.softmax_mode,
            padding,
            strides,
            epsilon: self.epsilon,
            blocks_out_of_bounds_value: self.blocks_out_of_bounds_value,
            blocks_round_down: self.blocks_round_down,
            use_unshared_regions: self.use_unshared_regions,
            shared_offset_region: self.shared_offset_region,
            unshared_offset_region: self.unshared_offset_region,
        })
    }
}

/// MEX aggregation operator. Takes two inputs, the image tensor and the
/// learned offsets tensor, and dispatches the forward pass to the kernel.
pub struct Mex<T>
where
    T: SimnetF,
{
    attrs: MexAttrs,
    kernel: Arc<dyn MexKernel<T>>,
}

impl<T> Mex<T>
where
    T: SimnetF,
{
    pub fn new(attrs: MexAttrs, kernel: Arc<dyn MexKernel<T>>) -> Self {
        Self { attrs, kernel }
    }

    pub fn attrs(&self) -> &MexAttrs {
        &self.attrs
    }

    pub fn kernel(&self) -> &Arc<dyn MexKernel<T>> {
        &self.kernel
    }
}

impl<T> std::fmt::Debug for Mex<T>
where
    T: SimnetF,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mex").field("attrs", &self.attrs).finish()
    }
}

impl<T> Clone for Mex<T>
where
    T: SimnetF,
{
    fn clone(&self) -> Self {
        Self {
            attrs: self.attrs.clone(),
            kernel: Arc::clone(&self.kernel),
        }
    }
}

impl<T> Operator<T> for Mex<T>
where
    T: SimnetF,
{
    fn compute(&self, inputs: &[&Tensor<T>]) -> Result<Tensor<T>, String> {
        if inputs.len() != 2 {
            return Err("Mex operation requires exactly 2 inputs (input, offsets)".to_string());
        }
        self.kernel.forward(inputs[0], inputs[1], &self.attrs)
    }

    fn num_inputs(&self) -> usize {
        2
    }

    fn name(&self) -> &'static str {
        "Mex"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_op(&self) -> Box<dyn Operator<T>> {
        Box::new(self.clone())
    }
}

/// Backward pass for "Mex". Reads the attribute set back from the op and
/// forwards the identical set to both kernel gradient entry points,
/// returning [grad_input, grad_offsets] in input order.
fn mex_grad<T>(ctx: &GradientContext<'_, T>) -> Result<Vec<Tensor<T>>, String>
where
    T: SimnetF,
{
    let op = ctx
        .op
        .as_any()
        .downcast_ref::<Mex<T>>()
        .ok_or_else(|| "Mex gradient invoked on a non-Mex operation".to_string())?;

    if ctx.inputs.len() != 2 {
        return Err(format!(
            "Mex gradient expects 2 inputs (input, offsets), got {}",
            ctx.inputs.len()
        ));
    }
    let input = ctx.inputs[0];
    let offsets = ctx.inputs[1];

    let grad_input =
        op.kernel
            .input_grad(input, offsets, ctx.output, ctx.grad_output, &op.attrs)?;
    let grad_offsets =
        op.kernel
            .offsets_grad(input, offsets, ctx.output, ctx.grad_output, &op.attrs)?;

    Ok(vec![grad_input, grad_offsets])
}

/// Registers the Mex backward pass. Called by
/// `GradientRegistry::with_defaults`; exposed for engines built on a custom
/// registry.
pub fn register_gradient<T>(registry: &mut GradientRegistry<T>)
where
    T: SimnetF,
{
    registry.register("Mex", mex_grad);
}

/// Applies MEX to `input` and `offsets`, expanding the strides and padding
/// shorthand against the input's shape first.
pub fn mex<T>(
    engine: &mut AutodiffEngine<T>,
    input: NodeId,
    offsets: NodeId,
    kernel: Arc<dyn MexKernel<T>>,
    config: MexConfig,
) -> Result<NodeId, String>
where
    T: SimnetF,
{
    let image_shape: Vec<Dim> = engine
        .get_tensor(input)
        .ok_or_else(|| format!("Input node {} not found", input.0))?
        .shape()
        .iter()
        .map(|&d| Dim::Known(d))
        .collect();

    let attrs = config.into_attrs(&image_shape)?;
    let op = Mex::new(attrs, kernel);
    engine.apply_operation(Box::new(op), vec![input, offsets])
}

/// Queries the kernel's offsets/region layout helper, for sizing offsets
/// tensors before building the graph.
pub fn mex_dims_helper<T>(
    kernel: &dyn MexKernel<T>,
    query: &MexDimsQuery,
) -> Result<i32, String>
where
    T: SimnetF,
{
    kernel.offsets_layout(query)
}
