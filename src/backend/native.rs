// src/backend/native.rs
// FFI marshalling for the precompiled offsets/region layout helper
// (libmex_dims_helper.so). Every array argument crosses the boundary as a
// (length, pointer) pair of C ints, in the exact order the helper expects:
// input_dim, padding, strides, num_instances, blocks_round_down,
// use_unshared_regions, blocks, shared_offset_region, unshared_offset_region.

use crate::backend::kernel::{MexAttrs, MexDimsQuery, MexKernel};
use crate::backend::number::SimnetF;
use crate::backend::tensor::Tensor;
use libc::c_int;

unsafe extern "C" {
    fn get_mex_offsets_nregions(
        input_dim_len: c_int,
        input_dim: *const c_int,
        padding_len: c_int,
        padding: *const c_int,
        strides_len: c_int,
        strides: *const c_int,
        num_instances: c_int,
        blocks_round_down: c_int,
        use_unshared_regions: c_int,
        blocks_len: c_int,
        blocks: *const c_int,
        shared_offset_region_len: c_int,
        shared_offset_region: *const c_int,
        unshared_offset_region_len: c_int,
        unshared_offset_region: *const c_int,
    ) -> c_int;
}

fn array_arg(values: &[i32]) -> Result<(c_int, *const c_int), String> {
    let len = c_int::try_from(values.len())
        .map_err(|_| format!("Array argument too long for the helper: {} values", values.len()))?;
    Ok((len, values.as_ptr()))
}

/// Queries the native helper for the number of offset regions.
///
/// The pointers passed down are borrowed from `query` and only live for the
/// duration of the call; the helper reads them synchronously and keeps no
/// references.
pub fn offsets_nregions(query: &MexDimsQuery) -> Result<i32, String> {
    let (input_dim_len, input_dim) = array_arg(&query.input_dim)?;
    let (padding_len, padding) = array_arg(&query.padding)?;
    let (strides_len, strides) = array_arg(&query.strides)?;
    let (blocks_len, blocks) = array_arg(&query.blocks)?;
    let (shared_len, shared) = array_arg(&query.shared_offset_region)?;
    let (unshared_len, unshared) = array_arg(&query.unshared_offset_region)?;

    let nregions = unsafe {
        get_mex_offsets_nregions(
            input_dim_len,
            input_dim,
            padding_len,
            padding,
            strides_len,
            strides,
            query.num_instances,
            query.blocks_round_down as c_int,
            query.use_unshared_regions as c_int,
            blocks_len,
            blocks,
            shared_len,
            shared,
            unshared_len,
            unshared,
        )
    };

    if nregions < 0 {
        return Err(format!(
            "Native offsets helper rejected the configuration (returned {})",
            nregions
        ));
    }
    Ok(nregions)
}

/// Kernel backed by the precompiled native libraries. Only the offsets
/// layout helper has a stable C ABI today; the forward and gradient kernels
/// live inside a framework plugin and have no callable entry point yet, so
/// those methods report the missing binding instead of computing.
#[derive(Debug, Default)]
pub struct NativeKernel;

impl<T> MexKernel<T> for NativeKernel
where
    T: SimnetF,
{
    fn forward(
        &self,
        _input: &Tensor<T>,
        _offsets: &Tensor<T>,
        _attrs: &MexAttrs,
    ) -> Result<Tensor<T>, String> {
        Err("Native MEX forward kernel is not bound".to_string())
    }

    fn input_grad(
        &self,
        _input: &Tensor<T>,
        _offsets: &Tensor<T>,
        _output: &Tensor<T>,
        _grad_output: &Tensor<T>,
        _attrs: &MexAttrs,
    ) -> Result<Tensor<T>, String> {
        Err("Native MEX input gradient kernel is not bound".to_string())
    }

    fn offsets_grad(
        &self,
        _input: &Tensor<T>,
        _offsets: &Tensor<T>,
        _output: &Tensor<T>,
        _grad_output: &Tensor<T>,
        _attrs: &MexAttrs,
    ) -> Result<Tensor<T>, String> {
        Err("Native MEX offsets gradient kernel is not bound".to_string())
    }

    fn offsets_layout(&self, query: &MexDimsQuery) -> Result<i32, String> {
        offsets_nregions(query)
    }
}

// These tests link against libmex_dims_helper.so, so they only run when the
// native feature (and the library) is present, like the rest of this module.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbound_kernel_entry_points_report_it() {
        let kernel = NativeKernel;
        let input = Tensor::<f32>::zeros(&[2, 10, 20, 3]);
        let offsets = Tensor::<f32>::zeros(&[8, 4]);
        let attrs = MexAttrs::default();

        let err = kernel.forward(&input, &offsets, &attrs).unwrap_err();
        assert!(err.contains("not bound"), "{}", err);

        let err = kernel
            .input_grad(&input, &offsets, &input, &input, &attrs)
            .unwrap_err();
        assert!(err.contains("not bound"), "{}", err);

        let err = kernel
            .offsets_grad(&input, &offsets, &input, &input, &attrs)
            .unwrap_err();
        assert!(err.contains("not bound"), "{}", err);
    }

    #[test]
    fn layout_query_reaches_the_helper() {
        let kernel = NativeKernel;
        let query = MexDimsQuery::new(vec![3, 10, 20], 2, vec![3, 3, 3]);
        let nregions = kernel.offsets_layout(&query).unwrap();
        assert!(nregions >= 0);
    }
}
