//! # simnets
//!
//! Rust bindings for the SimNets MEX operator: a generalized max/softmax
//! pooling primitive whose numerical kernel lives in a precompiled native
//! library. This crate provides the glue around that kernel:
//!
//! - A small eager autodiff graph with an explicit gradient registry
//! - The `Mex` operator and its backward pass, dispatching to the kernel
//!   through the [`MexKernel`] trait seam
//! - Expansion of user-facing dimension specifications (`-1` meaning "use
//!   the full corresponding image dimension") into explicit per-axis values
//!   before they reach the kernel
//! - Marshalling for the native offsets/region layout helper (behind the
//!   `native` feature)
//!
//! The kernel's numerics are opaque here on purpose: everything numeric is
//! reached through [`MexKernel`], and tests exercise the glue with mock
//! kernels.

pub mod backend;
pub mod graph;
pub mod ops;

// Re-export commonly used types for convenience
pub use backend::{MexAttrs, MexDimsQuery, MexKernel, SimnetF, SimnetN, Tensor};
#[cfg(feature = "native")]
pub use backend::NativeKernel;
pub use graph::{AutodiffEngine, GradientRegistry, NodeId};
pub use ops::dims::{Dim, SpecDim, expand_dim_specification};
pub use ops::mex::{Mex, MexConfig, mex};
