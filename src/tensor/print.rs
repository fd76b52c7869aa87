use crate::tensor::Tensor;
use std::fmt;

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "形状: {:?}", self.shape())?;
        write!(f, "{:.4}", self.data)
    }
}
