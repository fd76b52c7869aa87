/*
 * @Description  : Adam优化器实现，语义同`torch.optim.Adam`（权重衰减以 L2 形式加到梯度上）
 */

use std::collections::HashMap;

use log::debug;

use super::Optimizer;
use super::base::{check_momentum, check_non_negative, clear_grads};
use crate::errors::OptimizerError;
use crate::nn::{Parameter, ParameterData, ParameterId};
use crate::tensor::Tensor;

/// Adam 的超参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdamConfig {
    pub lr: f32,
    /// β1 (一阶矩衰减)
    pub beta1: f32,
    /// β2 (二阶矩衰减)
    pub beta2: f32,
    /// 数值稳定项
    pub epsilon: f32,
    pub weight_decay: f32,
}

impl AdamConfig {
    pub const fn new(lr: f32) -> Self {
        Self {
            lr,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            weight_decay: 0.0,
        }
    }
}

/// 单个参数的 Adam 状态
#[derive(Debug, Clone)]
struct AdamState {
    /// 一阶矩估计
    m: Tensor,
    /// 二阶矩估计
    v: Tensor,
    /// 该参数已被更新的次数
    t: i32,
}

/// Adam 优化器（PyTorch 风格）
///
/// Adam: Adaptive Moment Estimation
/// - g = ∇θ + λθ
/// - m = β1 * m + (1 - β1) * g
/// - v = β2 * v + (1 - β2) * g²
/// - θ = θ - α * `m_hat` / (√`v_hat` + ε)
#[derive(Debug)]
pub struct Adam {
    /// 要优化的参数
    params: Vec<Parameter>,
    config: AdamConfig,
    /// 各参数的矩估计（按 `ParameterId` 索引，高效查找）
    state: HashMap<ParameterId, AdamState>,
}

impl Adam {
    /// 以默认的 β1、β2、ε 创建 Adam 优化器
    pub fn new(params: &[Parameter], lr: f32) -> Result<Self, OptimizerError> {
        Self::new_with_config(params, AdamConfig::new(lr))
    }

    /// 创建带完整配置的 Adam 优化器
    pub fn new_with_config(
        params: &[Parameter],
        config: AdamConfig,
    ) -> Result<Self, OptimizerError> {
        if params.is_empty() {
            return Err(OptimizerError::EmptyParameters);
        }
        check_non_negative("lr", config.lr)?;
        check_momentum("beta1", config.beta1)?;
        check_momentum("beta2", config.beta2)?;
        check_non_negative("epsilon", config.epsilon)?;
        check_non_negative("weight_decay", config.weight_decay)?;
        Ok(Self {
            params: params.to_vec(),
            config,
            state: HashMap::new(),
        })
    }

    pub const fn config(&self) -> &AdamConfig {
        &self.config
    }

    /// 获取指定参数的动量状态（一阶矩 m）
    ///
    /// 用于调试和可视化优化过程
    pub fn get_momentum(&self, param: &Parameter) -> Option<&Tensor> {
        self.state.get(&param.id()).map(|s| &s.m)
    }

    /// 获取指定参数的速度状态（二阶矩 v）
    pub fn get_velocity(&self, param: &Parameter) -> Option<&Tensor> {
        self.state.get(&param.id()).map(|s| &s.v)
    }

    /// 获取指定参数的时间步
    pub fn timestep(&self, param: &Parameter) -> usize {
        self.state.get(&param.id()).map_or(0, |s| s.t as usize)
    }
}

impl Optimizer for Adam {
    fn step(
        &mut self,
        _epoch: Option<usize>,
        closure: Option<&mut dyn FnMut() -> f32>,
    ) -> Result<Option<f32>, OptimizerError> {
        let loss = closure.map(|f| f());
        let AdamConfig {
            lr,
            beta1,
            beta2,
            epsilon,
            weight_decay,
        } = self.config;

        let mut updated = 0;
        for param in &self.params {
            let mut data = param.data_mut();
            let ParameterData { value, grad } = &mut *data;
            let Some(grad) = grad.as_ref() else {
                continue;
            };

            let mut grad = grad.clone();
            if weight_decay != 0.0 {
                grad.scaled_add_assign(weight_decay, value);
            }

            let state = self.state.entry(param.id()).or_insert_with(|| AdamState {
                m: value.zeros_like(),
                v: value.zeros_like(),
                t: 0,
            });
            state.t += 1;

            // 原地更新一阶矩估计: m = β1 * m + (1 - β1) * g
            state.m *= beta1;
            state.m.scaled_add_assign(1.0 - beta1, &grad);

            // 原地更新二阶矩估计: v = β2 * v + (1 - β2) * g²
            let grad_squared = &grad * &grad;
            state.v *= beta2;
            state.v.scaled_add_assign(1.0 - beta2, &grad_squared);

            // 偏差修正
            let m_hat = &state.m / (1.0 - beta1.powi(state.t));
            let v_hat = &state.v / (1.0 - beta2.powi(state.t));

            // 参数更新: θ = θ - α * m_hat / (√v_hat + ε)
            let denominator = v_hat.sqrt() + epsilon;
            let update = &m_hat / &denominator;
            value.scaled_add_assign(-lr, &update);
            updated += 1;
        }
        debug!("Adam step: 更新了{updated}个参数");
        Ok(loss)
    }

    fn zero_grad(&mut self) {
        clear_grads(&self.params);
    }

    fn learning_rate(&self) -> f32 {
        self.config.lr
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.config.lr = lr;
    }

    fn reset(&mut self) {
        self.state.clear();
    }

    fn params(&self) -> Vec<Parameter> {
        self.params.clone()
    }

    fn name(&self) -> &'static str {
        "adam"
    }
}
