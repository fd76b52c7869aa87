use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use std::cmp::PartialEq;

impl From<f32> for Tensor {
    /// 实现 From<f32> trait 用于将`f32`类型转换为形状为`[1]`的张量
    fn from(scalar: f32) -> Self {
        Tensor::new(&[scalar], &[1])
    }
}

impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Tensor {
    /// 对张量中的所有元素求和，返回纯数
    pub fn sum(&self) -> f32 {
        self.data.sum()
    }

    /// 张量的L2范数（对所有元素求平方和再开方，即Frobenius范数），对应pytorch的`torch.norm(x)`。
    /// 结果总是非负的（含NaN的张量除外）。
    pub fn norm(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// 逐元素开方，返回新的张量
    pub fn sqrt(&self) -> Tensor {
        Tensor {
            data: self.data.mapv(f32::sqrt),
        }
    }

    /// 原地执行`self += alpha * other`，对应pytorch的`x.add_(other, alpha=alpha)`。
    /// `other`须与`self`形状严格一致，或为标量。
    pub fn scaled_add_assign(&mut self, alpha: f32, other: &Tensor) {
        if self.is_same_shape(other) {
            self.data.scaled_add(alpha, &other.data);
        } else if let Some(number) = other.number() {
            self.data += alpha * number;
        } else {
            panic!(
                "{}",
                TensorError::OperatorError {
                    operator: Operator::AddAssign,
                    tensor1_shape: self.shape().to_vec(),
                    tensor2_shape: other.shape().to_vec(),
                }
            )
        }
    }

    /// 是否所有元素都是有限值（非inf、非NaN）
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }
}
