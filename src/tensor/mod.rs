use ndarray::{Array, ArrayD, IxDyn};
use rand::Rng;
use rand::distributions::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

use crate::errors::TensorError;

mod ops {
    pub mod add;
    pub mod add_assign;
    pub mod div;
    pub mod mul;
    pub mod mul_assign;
    pub mod others;
    pub mod sub;
    pub mod sub_assign;
}

mod print;
mod property;


/// 定义张量的结构体。其可以是标量、向量、矩阵或更高维度的数组。
/// 注：只要通Tensor初始化的都是张量（即使标量也是张量）；
/// 而通常意义上的数字（类型为usize、i32、f64等）就只是纯数（number），在这里不被认为是张量。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tensor {
    data: ArrayD<f32>,
}

impl Tensor {
    /// 创建一个张量，若为标量，`shape`可以是[]、[1]、[1,1]、[1,1,1]...
    /// 若为向量，`shape`可以是[n]、[1,n]、[n,1]；
    /// 若为矩阵，`shape`可以是[n,m]；
    /// 若为更高维度的数组，`shape`可以是[c,n,m,...]；
    /// 注：`data`的长度必须和`shape`中所有元素的乘积相等（shape为`[]`时乘积为1），否则会panic。
    pub fn new(data: &[f32], shape: &[usize]) -> Self {
        let expected_len = shape.iter().product::<usize>();
        assert!(
            data.len() == expected_len,
            "{}",
            TensorError::ShapeDataMismatch {
                data_len: data.len(),
                shape: shape.to_vec(),
            }
        );
        // 长度已校验，这里不会失败
        let data = Array::from_shape_vec(IxDyn(shape), data.to_vec()).unwrap();
        Self { data }
    }

    /// 创建一个全零张量
    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: ArrayD::zeros(IxDyn(shape)),
        }
    }

    /// 创建一个与`self`形状相同的全零张量（对应pytorch的`torch.zeros_like`）
    pub fn zeros_like(&self) -> Self {
        Self::zeros(self.shape())
    }

    /// 创建一个随机张量，其值在[min, max]的闭区间
    pub fn new_random(min: f32, max: f32, shape: &[usize]) -> Self {
        let mut rng = rand::thread_rng();
        let data = (0..shape.iter().product::<usize>())
            .map(|_| Uniform::from(min..=max).sample(&mut rng))
            .collect::<Vec<_>>();
        Self::new(&data, shape)
    }

    /// 创建一个服从正态分布的随机张量（Box-Muller变换）。
    pub fn new_normal(mean: f32, std_dev: f32, shape: &[usize]) -> Self {
        let mut rng = rand::thread_rng();
        let data_len = shape.iter().product::<usize>();
        let mut data = Vec::with_capacity(data_len);

        while data.len() < data_len {
            let u1: f32 = rng.r#gen();
            let u2: f32 = rng.r#gen();
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            let z0 = mean + std_dev * r * theta.cos();
            let z1 = mean + std_dev * r * theta.sin();

            if z0.is_finite() {
                data.push(z0);
            }
            if data.len() < data_len && z1.is_finite() {
                data.push(z1);
            }
        }

        Self::new(&data, shape)
    }
}

// 私有方法
impl Tensor {
    /// 标量张量首个（也是唯一一个）元素的下标
    fn generate_index_array(&self) -> Vec<usize> {
        vec![0; self.dimension()]
    }
}
