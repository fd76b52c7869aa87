/*
 * @Description  : 张量的（逐元素）除法。
 *                 形状规则同加法：形状严格一致，或其中一方为标量/纯数。
 *                 注意：这里不检查除数是否为零，按IEEE 754得到inf或NaN，由调用方自行保护。
 */

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use std::ops::Div;

/*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓f32 /（不）带引用的张量↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
impl Div<Tensor> for f32 {
    type Output = Tensor;

    fn div(self, tensor: Tensor) -> Tensor {
        Tensor {
            data: self / &tensor.data,
        }
    }
}
impl<'a> Div<&'a Tensor> for f32 {
    type Output = Tensor;

    fn div(self, tensor: &'a Tensor) -> Tensor {
        Tensor {
            data: self / &tensor.data,
        }
    }
}
/*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑f32 /（不）带引用的张量↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

/*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓（不）带引用的张量 / f32↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
impl Div<f32> for Tensor {
    type Output = Self;

    fn div(self, scalar: f32) -> Self {
        Self {
            data: self.data / scalar,
        }
    }
}
impl Div<f32> for &Tensor {
    type Output = Tensor;

    fn div(self, scalar: f32) -> Tensor {
        Tensor {
            data: &self.data / scalar,
        }
    }
}
/*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑（不）带引用的张量 / f32↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

/*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓（不）带引用的张量 /（不）带引用的张量↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
impl Div for Tensor {
    type Output = Self;

    fn div(self, other: Self) -> Self {
        div_within_tensors(&self, &other)
    }
}

impl<'a> Div<&'a Self> for Tensor {
    type Output = Self;

    fn div(self, other: &'a Self) -> Self {
        div_within_tensors(&self, other)
    }
}

impl Div<Tensor> for &Tensor {
    type Output = Tensor;

    fn div(self, other: Tensor) -> Tensor {
        div_within_tensors(self, &other)
    }
}

impl<'b> Div<&'b Tensor> for &Tensor {
    type Output = Tensor;

    fn div(self, other: &'b Tensor) -> Tensor {
        div_within_tensors(self, other)
    }
}
/*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑（不）带引用的张量 /（不）带引用的张量↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

fn div_within_tensors(tensor_1: &Tensor, tensor_2: &Tensor) -> Tensor {
    let data = if tensor_1.is_same_shape(tensor_2) {
        &tensor_1.data / &tensor_2.data
    } else if let Some(number) = tensor_2.number() {
        &tensor_1.data / number
    } else if let Some(number) = tensor_1.number() {
        number / &tensor_2.data
    } else {
        panic!(
            "{}",
            TensorError::OperatorError {
                operator: Operator::Div,
                tensor1_shape: tensor_1.shape().to_vec(),
                tensor2_shape: tensor_2.shape().to_vec(),
            }
        )
    };
    Tensor { data }
}
