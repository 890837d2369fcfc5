pub mod engine;
pub mod registry;

pub use engine::{AutodiffEngine, Node, NodeId};
pub use registry::{GradientContext, GradientFn, GradientRegistry};
