use crate::{Mat, PolicyError};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
/// Multilayer perceptron with ReLU activation function and `tanh` output.
pub struct Mlp {
    /// Weights of layers, `(out, in)`.
    ws: Vec<Mat>,

    /// Biases of layers, `(out, 1)`.
    bs: Vec<Mat>,
}

impl Mlp {
    /// Constructs an MLP from its layers.
    pub fn new(ws: Vec<Mat>, bs: Vec<Mat>) -> Result<Self, PolicyError> {
        let mlp = Self { ws, bs };
        mlp.validate()?;
        Ok(mlp)
    }

    /// Initializes layers of sizes `dims` uniformly in `±1/sqrt(in)`.
    pub fn init(dims: &[usize], seed: u64) -> Result<Self, PolicyError> {
        if dims.len() < 2 {
            return Err(PolicyError::ShapeMismatch(format!("layer sizes {:?}", dims)));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let (ws, bs) = dims
            .windows(2)
            .map(|d| {
                let (n_in, n_out) = (d[0], d[1]);
                let bound = 1.0 / (n_in.max(1) as f32).sqrt();
                let w = (0..n_in * n_out)
                    .map(|_| rng.gen_range(-bound..=bound))
                    .collect();
                let b = (0..n_out).map(|_| rng.gen_range(-bound..=bound)).collect();
                (
                    Mat {
                        data: w,
                        shape: [n_out, n_in],
                    },
                    Mat {
                        data: b,
                        shape: [n_out, 1],
                    },
                )
            })
            .unzip();
        Self::new(ws, bs)
    }

    /// Checks that layers are chained consistently.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.ws.is_empty() || self.ws.len() != self.bs.len() {
            return Err(PolicyError::ShapeMismatch(format!(
                "{} weights and {} biases",
                self.ws.len(),
                self.bs.len()
            )));
        }
        for (i, (w, b)) in self.ws.iter().zip(self.bs.iter()).enumerate() {
            if w.data.len() != w.rows() * w.cols() || b.data.len() != b.rows() * b.cols() {
                return Err(PolicyError::ShapeMismatch(format!("layer {} data length", i)));
            }
            if b.shape != [w.rows(), 1] {
                return Err(PolicyError::ShapeMismatch(format!(
                    "layer {}: weight {:?}, bias {:?}",
                    i, w.shape, b.shape
                )));
            }
            if i > 0 && self.ws[i - 1].rows() != w.cols() {
                return Err(PolicyError::ShapeMismatch(format!(
                    "layer {} expects {} inputs, previous layer has {} outputs",
                    i,
                    w.cols(),
                    self.ws[i - 1].rows()
                )));
            }
        }
        Ok(())
    }

    /// Number of inputs.
    pub fn input_dim(&self) -> usize {
        self.ws.first().map(|w| w.cols()).unwrap_or(0)
    }

    /// Number of outputs.
    pub fn output_dim(&self) -> usize {
        self.ws.last().map(|w| w.rows()).unwrap_or(0)
    }

    /// Maps `(in, batch)` to `(out, batch)`.
    pub fn forward(&self, x: &Mat) -> Result<Mat, PolicyError> {
        let n_layers = self.ws.len();
        let mut x = x.clone();
        for i in 0..n_layers {
            x = self.ws[i].matmul(&x)?.add_bias(&self.bs[i])?;
            if i != n_layers - 1 {
                x = x.relu();
            }
        }
        Ok(x.tanh())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_shape_and_range() {
        let mlp = Mlp::init(&[3, 8, 2], 0).unwrap();
        assert_eq!((mlp.input_dim(), mlp.output_dim()), (3, 2));
        let x = Mat::new(vec![10.0; 3 * 5], [3, 5]).unwrap();
        let y = mlp.forward(&x).unwrap();
        assert_eq!(y.shape, [2, 5]);
        assert!(y.data.iter().all(|v| v.abs() <= 1.0));
        assert!(mlp.forward(&Mat::zeros(4, 1)).is_err());
    }

    #[test]
    fn test_validate_rejects_broken_chain() {
        let ws = vec![Mat::zeros(4, 3), Mat::zeros(2, 5)];
        let bs = vec![Mat::zeros(4, 1), Mat::zeros(2, 1)];
        assert!(matches!(
            Mlp::new(ws, bs),
            Err(PolicyError::ShapeMismatch(_))
        ));
        assert!(Mlp::new(vec![Mat::zeros(4, 3)], vec![Mat::zeros(3, 1)]).is_err());
        assert!(Mlp::init(&[3], 0).is_err());
    }

    #[test]
    fn test_known_values() {
        let w = Mat::new(vec![1.0, -1.0], [1, 2]).unwrap();
        let b = Mat::new(vec![0.5], [1, 1]).unwrap();
        let mlp = Mlp::new(vec![w], vec![b]).unwrap();
        let y = mlp.forward(&vec![1.0, 1.0].into()).unwrap();
        assert!((y.data[0] - 0.5f32.tanh()).abs() < 1e-6);
    }
}
