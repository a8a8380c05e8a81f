use crate::PolicyError;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Row-major matrix.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Mat {
    /// Elements, row by row.
    pub data: Vec<f32>,
    /// `[rows, cols]`.
    pub shape: [usize; 2],
}

impl Mat {
    /// Fails with `ShapeMismatch` if `data` does not hold `rows * cols` elements.
    pub fn new(data: Vec<f32>, shape: [usize; 2]) -> Result<Self, PolicyError> {
        if data.len() != shape[0] * shape[1] {
            return Err(PolicyError::ShapeMismatch(format!(
                "{} elements for shape {:?}",
                data.len(),
                shape
            )));
        }
        Ok(Self { data, shape })
    }

    /// A matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            shape: [rows, cols],
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.shape[0]
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.shape[1]
    }

    /// Element at row `i`, column `j`. Panics when out of range.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.data[i * self.shape[1] + j]
    }

    /// Matrix product `self * x`.
    pub fn matmul(&self, x: &Mat) -> Result<Self, PolicyError> {
        let (m, l, n) = (self.rows(), self.cols(), x.cols());
        if x.rows() != l {
            return Err(PolicyError::ShapeMismatch(format!(
                "matmul {:?} x {:?}",
                self.shape, x.shape
            )));
        }
        let mut data = vec![0.0f32; m * n];
        for i in 0..m {
            for k in 0..l {
                let a = self.data[i * l + k];
                for j in 0..n {
                    data[i * n + j] += a * x.data[k * n + j];
                }
            }
        }

        Ok(Self {
            shape: [m, n],
            data,
        })
    }

    /// Adds a column vector `b` to every column.
    pub fn add_bias(&self, b: &Mat) -> Result<Self, PolicyError> {
        if b.shape != [self.rows(), 1] {
            return Err(PolicyError::ShapeMismatch(format!(
                "bias {:?} for matrix {:?}",
                b.shape, self.shape
            )));
        }
        let n = self.cols();
        let data = self
            .data
            .iter()
            .enumerate()
            .map(|(ix, a)| *a + b.data[ix / n])
            .collect();

        Ok(Mat {
            data,
            shape: self.shape,
        })
    }

    /// Elementwise `max(x, 0)`.
    pub fn relu(&self) -> Self {
        self.map(|a| a.max(0.0))
    }

    /// Elementwise `tanh`.
    pub fn tanh(&self) -> Self {
        self.map(f32::tanh)
    }

    /// Transposed copy.
    pub fn transpose(&self) -> Self {
        let (m, n) = (self.rows(), self.cols());
        let mut data = vec![0.0f32; m * n];
        for i in 0..m {
            for j in 0..n {
                data[j * m + i] = self.data[i * n + j];
            }
        }
        Self {
            data,
            shape: [n, m],
        }
    }

    fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            data: self.data.iter().map(|a| f(*a)).collect(),
            shape: self.shape,
        }
    }
}

impl From<Array2<f32>> for Mat {
    fn from(x: Array2<f32>) -> Self {
        let (m, n) = x.dim();
        Self {
            data: x.iter().cloned().collect(),
            shape: [m, n],
        }
    }
}

impl From<Vec<f32>> for Mat {
    /// A column vector.
    fn from(x: Vec<f32>) -> Self {
        let shape = [x.len(), 1];
        Self { shape, data: x }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_matmul() {
        let x: Mat = array![[1.0f32, 2., 3.], [4., 5., 6.]].into();
        let y: Mat = vec![7.0f32, 8., 9.].into();
        let z = x.matmul(&y).unwrap();
        assert_eq!(z, Mat::new(vec![50.0, 122.0], [2, 1]).unwrap());
        assert!(y.matmul(&x).is_err());
    }

    #[test]
    fn test_add_bias_and_activations() {
        let x = Mat::new(vec![-1.0, 2.0, -3.0, 4.0], [2, 2]).unwrap();
        let b: Mat = vec![1.0, -1.0].into();
        let y = x.add_bias(&b).unwrap();
        assert_eq!(y.data, vec![0.0, 3.0, -4.0, 3.0]);
        assert_eq!(y.relu().data, vec![0.0, 3.0, 0.0, 3.0]);
        assert!(x.add_bias(&Mat::zeros(3, 1)).is_err());
    }

    #[test]
    fn test_transpose() {
        let x: Mat = array![[1.0f32, 2., 3.], [4., 5., 6.]].into();
        let t = x.transpose();
        assert_eq!(t.shape, [3, 2]);
        assert_eq!(t.data, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }
}
