/*
 * @Description  : 优化器基础trait，以及供工厂返回的多态句柄
 */

use enum_dispatch::enum_dispatch;

use super::{Adam, LARS, SGD};
use crate::errors::OptimizerError;
use crate::nn::Parameter;

/// 优化器核心 trait（PyTorch 风格）
///
/// `PyTorch` 风格训练循环：
/// ```ignore
/// optimizer.zero_grad();
/// // ……由外部完成前向传播与反向传播，把梯度写入各参数……
/// optimizer.step(None, None)?; // ← 只更新参数，不做 forward/backward
/// ```
#[enum_dispatch]
pub trait Optimizer {
    /// 参数更新（使用参数上已有的梯度）
    ///
    /// # 参数
    /// - `epoch`: 显式指定的轮次。只有 LARS 记录轮次，为`None`时 LARS 使用并递增内部计数器
    /// - `closure`: 重新计算损失的闭包。若提供，会在修改任何参数之前被调用且仅调用一次
    ///
    /// # 返回
    /// 闭包的返回值；未提供闭包时为`None`
    fn step(
        &mut self,
        epoch: Option<usize>,
        closure: Option<&mut dyn FnMut() -> f32>,
    ) -> Result<Option<f32>, OptimizerError>;

    /// 清空所有绑定参数的梯度
    fn zero_grad(&mut self);

    /// 获取学习率
    fn learning_rate(&self) -> f32;

    /// 设置学习率
    fn set_learning_rate(&mut self, lr: f32);

    /// 重置累积状态（如动量）
    fn reset(&mut self);

    /// 优化器绑定的参数（按更新顺序）
    fn params(&self) -> Vec<Parameter>;

    /// 优化算法名称，用于日志
    fn name(&self) -> &'static str;
}

/// 由工厂构造的优化器（三选一）
#[enum_dispatch(Optimizer)]
#[derive(Debug)]
pub enum OptimizerKind {
    SGD,
    Adam,
    LARS,
}

impl OptimizerKind {
    pub fn as_lars(&self) -> Option<&LARS> {
        match self {
            Self::LARS(lars) => Some(lars),
            _ => None,
        }
    }

    pub fn as_lars_mut(&mut self) -> Option<&mut LARS> {
        match self {
            Self::LARS(lars) => Some(lars),
            _ => None,
        }
    }

    pub fn as_sgd(&self) -> Option<&SGD> {
        match self {
            Self::SGD(sgd) => Some(sgd),
            _ => None,
        }
    }

    pub fn as_adam(&self) -> Option<&Adam> {
        match self {
            Self::Adam(adam) => Some(adam),
            _ => None,
        }
    }
}

/// 给所有参数清空梯度，供各优化器的`zero_grad()`复用
pub(super) fn clear_grads<'a>(params: impl IntoIterator<Item = &'a Parameter>) {
    for param in params {
        param.zero_grad();
    }
}

/// 超参数须非负且有限
pub(super) fn check_non_negative(name: &'static str, value: f32) -> Result<(), OptimizerError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(OptimizerError::InvalidHyperparameter { name, value })
    }
}

/// 动量系数须在`[0, 1)`内
pub(super) fn check_momentum(name: &'static str, value: f32) -> Result<(), OptimizerError> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(OptimizerError::InvalidHyperparameter { name, value })
    }
}
