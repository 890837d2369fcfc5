pub mod kernel;
pub mod number;
pub mod tensor;

// Native helper bindings, only meaningful when the precompiled library is
// available at link time.
#[cfg(feature = "native")]
pub mod native;

pub use kernel::{MexAttrs, MexDimsQuery, MexKernel};
#[cfg(feature = "native")]
pub use native::NativeKernel;
pub use number::{SimnetF, SimnetN};
pub use tensor::Tensor;
