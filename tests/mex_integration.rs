// End-to-end exercise of the public API: build a graph, apply MEX with a
// shorthand dimension specification, run backward, and check that gradients
// land on both the input and the offsets with the kernel seeing fully
// expanded attributes throughout.

use simnets::{
    AutodiffEngine, MexAttrs, MexConfig, MexDimsQuery, MexKernel, Tensor, mex,
    ops::mex::mex_dims_helper,
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct StubKernel {
    attrs_seen: Mutex<Vec<MexAttrs>>,
}

impl MexKernel<f32> for StubKernel {
    fn forward(
        &self,
        input: &Tensor<f32>,
        _offsets: &Tensor<f32>,
        attrs: &MexAttrs,
    ) -> Result<Tensor<f32>, String> {
        self.attrs_seen.lock().unwrap().push(attrs.clone());
        let batch = input.shape()[0];
        Ok(Tensor::full(&[batch, 1, 1, attrs.num_instances], 3.0))
    }

    fn input_grad(
        &self,
        input: &Tensor<f32>,
        _offsets: &Tensor<f32>,
        _output: &Tensor<f32>,
        _grad_output: &Tensor<f32>,
        attrs: &MexAttrs,
    ) -> Result<Tensor<f32>, String> {
        self.attrs_seen.lock().unwrap().push(attrs.clone());
        Ok(Tensor::ones(input.shape()))
    }

    fn offsets_grad(
        &self,
        _input: &Tensor<f32>,
        offsets: &Tensor<f32>,
        _output: &Tensor<f32>,
        _grad_output: &Tensor<f32>,
        attrs: &MexAttrs,
    ) -> Result<Tensor<f32>, String> {
        self.attrs_seen.lock().unwrap().push(attrs.clone());
        Ok(Tensor::full(offsets.shape(), 0.25))
    }

    fn offsets_layout(&self, query: &MexDimsQuery) -> Result<i32, String> {
        // Shape-only stand-in: one region per instance.
        Ok(query.num_instances)
    }
}

#[test]
fn mex_end_to_end() {
    let mut engine = AutodiffEngine::<f32>::new();
    let kernel = Arc::new(StubKernel::default());

    // Size the offsets tensor through the layout helper, as a real caller
    // would before building the graph.
    let nregions = mex_dims_helper::<f32>(
        kernel.as_ref(),
        &MexDimsQuery::new(vec![3, 10, 20], 4, vec![3, 3, 3]),
    )
    .unwrap();
    assert_eq!(nregions, 4);

    let input = engine.create_variable(Tensor::randn(&[2, 10, 20, 3]), true);
    let offsets = engine.create_variable(Tensor::randn(&[nregions as usize, 27]), true);

    let config = MexConfig {
        num_instances: 4,
        softmax_mode: true,
        strides: vec![-1, 5],
        padding: vec![2, 2, 2],
        epsilon: 0.5,
        ..MexConfig::default()
    };
    let out = mex(&mut engine, input, offsets, kernel.clone(), config).unwrap();

    let output = engine.get_tensor(out).unwrap();
    assert_eq!(output.shape(), &[2, 1, 1, 4]);
    assert!(output.to_vec().iter().all(|&x| x == 3.0));

    engine.backward(out).unwrap();

    let grad_input = engine.get_gradient(input).unwrap();
    assert_eq!(grad_input.shape(), &[2, 10, 20, 3]);
    assert!(grad_input.to_vec().iter().all(|&g| g == 1.0));

    let grad_offsets = engine.get_gradient(offsets).unwrap();
    assert_eq!(grad_offsets.shape(), &[4, 27]);
    assert!(grad_offsets.to_vec().iter().all(|&g| g == 0.25));

    // Forward plus two gradient calls, all with the same expanded attrs.
    let seen = kernel.attrs_seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    for attrs in seen.iter() {
        assert_eq!(attrs.strides, [10, 20, 5]);
        assert_eq!(attrs.padding, [2, 2, 2]);
        assert!(attrs.softmax_mode);
        assert_eq!(attrs.epsilon, 0.5);
        assert_eq!(attrs.num_instances, 4);
    }
}

#[test]
fn malformed_shorthand_fails_before_the_kernel() {
    let mut engine = AutodiffEngine::<f32>::new();
    let kernel = Arc::new(StubKernel::default());

    let input = engine.create_variable(Tensor::zeros(&[2, 10, 20, 3]), true);
    let offsets = engine.create_variable(Tensor::zeros(&[4, 27]), true);

    let config = MexConfig {
        strides: vec![1, 2, 3, 4],
        ..MexConfig::default()
    };
    let err = mex(&mut engine, input, offsets, kernel.clone(), config).unwrap_err();
    assert!(err.contains("Bad dimensions specification"), "{}", err);
    assert!(kernel.attrs_seen.lock().unwrap().is_empty());
}

#[test]
fn batchless_input_is_accepted() {
    let mut engine = AutodiffEngine::<f32>::new();
    let kernel = Arc::new(StubKernel::default());

    // Rank-3 input: [height, width, depth] with no batch axis. The
    // expander treats the missing batch as unknown; the kernel still gets
    // fully concrete strides.
    let input = engine.create_variable(Tensor::zeros(&[10, 20, 3]), true);
    let offsets = engine.create_variable(Tensor::zeros(&[4, 27]), true);

    let config = MexConfig {
        strides: vec![-1, -1, -1],
        ..MexConfig::default()
    };
    mex(&mut engine, input, offsets, kernel.clone(), config).unwrap();

    let seen = kernel.attrs_seen.lock().unwrap();
    assert_eq!(seen[0].strides, [10, 20, 3]);
}
