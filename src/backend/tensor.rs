// src/backend/tensor.rs
// Tensor wrapper to handle dynamic-rank arrays more elegantly.
// CPU only: kernels that need anything faster live behind the MexKernel seam.

use crate::backend::number::{SimnetF, SimnetN};
use ndarray::{ArrayD, IxDyn};
use rand_distr::{Distribution, StandardNormal};

#[derive(Debug, Clone)]
pub struct Tensor<T>
where
    T: SimnetN,
{
    data: ArrayD<T>,
}

impl<T> Tensor<T>
where
    T: SimnetN,
{
    pub fn new(data: ArrayD<T>) -> Self {
        Self { data }
    }

    pub fn from_vec(data: Vec<T>, shape: &[usize]) -> Result<Self, String> {
        ArrayD::from_shape_vec(IxDyn(shape), data)
            .map(Self::new)
            .map_err(|e| format!("Failed to create tensor: {}", e))
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self::new(ArrayD::zeros(IxDyn(shape)))
    }

    pub fn ones(shape: &[usize]) -> Self {
        Self::new(ArrayD::ones(IxDyn(shape)))
    }

    pub fn full(shape: &[usize], value: T) -> Self {
        Self::new(ArrayD::from_elem(IxDyn(shape), value))
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &ArrayD<T> {
        &self.data
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.data.iter().copied().collect()
    }

    /// Element-wise addition. Used by the engine to accumulate gradients,
    /// so shapes must match exactly (no broadcasting).
    pub fn add(&self, other: &Self) -> Result<Self, String> {
        if self.shape() != other.shape() {
            return Err(format!(
                "Shape mismatch in tensor addition: {:?} vs {:?}",
                self.shape(),
                other.shape()
            ));
        }
        Ok(Self::new(&self.data + &other.data))
    }

    pub fn mul_scalar(&self, scalar: T) -> Self {
        Self::new(self.data.mapv(|x| x * scalar))
    }
}

impl<T> Tensor<T>
where
    T: SimnetF,
{
    /// Standard normal initialization, handy for offsets tensors.
    pub fn randn(shape: &[usize]) -> Self
    where
        StandardNormal: Distribution<T>,
    {
        let mut rng = rand::rng();
        let data = ArrayD::from_shape_simple_fn(IxDyn(shape), || StandardNormal.sample(&mut rng));
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn creation_and_shape() {
        let t = Tensor::from_vec(vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(t.ndim(), 2);
        assert_eq!(t.len(), 6);
    }

    #[test]
    fn from_vec_rejects_bad_shape() {
        let result = Tensor::from_vec(vec![1.0f32, 2.0, 3.0], &[2, 3]);
        assert!(result.is_err());
    }

    #[test]
    fn zeros_ones_full() {
        let z = Tensor::<f64>::zeros(&[2, 2]);
        assert!(z.to_vec().iter().all(|&x| x == 0.0));

        let o = Tensor::<f64>::ones(&[2, 2]);
        assert!(o.to_vec().iter().all(|&x| x == 1.0));

        let f = Tensor::full(&[3], 2.5f32);
        assert_eq!(f.to_vec(), vec![2.5, 2.5, 2.5]);
    }

    #[test]
    fn addition_accumulates() {
        let a = Tensor::from_vec(vec![1.0f32, 2.0], &[2]).unwrap();
        let b = Tensor::from_vec(vec![3.0f32, 4.0], &[2]).unwrap();
        let c = a.add(&b).unwrap();
        assert_abs_diff_eq!(c.to_vec()[0], 4.0, epsilon = 1e-6);
        assert_abs_diff_eq!(c.to_vec()[1], 6.0, epsilon = 1e-6);
    }

    #[test]
    fn addition_rejects_shape_mismatch() {
        let a = Tensor::<f32>::zeros(&[2, 3]);
        let b = Tensor::<f32>::zeros(&[3, 2]);
        assert!(a.add(&b).is_err());
    }

    #[test]
    fn scalar_multiplication() {
        let a = Tensor::from_vec(vec![1.0f64, -2.0, 3.0], &[3]).unwrap();
        let scaled = a.mul_scalar(2.0);
        assert_eq!(scaled.to_vec(), vec![2.0, -4.0, 6.0]);
    }

    #[test]
    fn randn_has_requested_shape() {
        let t = Tensor::<f32>::randn(&[4, 5]);
        assert_eq!(t.shape(), &[4, 5]);
        assert!(t.to_vec().iter().all(|x| x.is_finite()));
    }
}
