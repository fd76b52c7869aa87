/*
 * @Description  : 带动量（可选 Nesterov）与 L2 权重衰减的随机梯度下降，语义同`torch.optim.SGD`
 */

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use log::debug;

use super::Optimizer;
use super::base::{check_momentum, check_non_negative, clear_grads};
use crate::errors::OptimizerError;
use crate::nn::{Parameter, ParameterData, ParameterId};
use crate::tensor::Tensor;

/// SGD 的超参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SgdConfig {
    pub lr: f32,
    pub momentum: f32,
    pub dampening: f32,
    pub weight_decay: f32,
    pub nesterov: bool,
}

impl SgdConfig {
    /// 无动量、无权重衰减的朴素 SGD
    pub const fn new(lr: f32) -> Self {
        Self {
            lr,
            momentum: 0.0,
            dampening: 0.0,
            weight_decay: 0.0,
            nesterov: false,
        }
    }
}

/// SGD 优化器（PyTorch 风格）
///
/// - g = ∇θ + λθ
/// - b = μ * b + (1 - τ) * g（首步 b = g）
/// - Nesterov：g = g + μ * b；否则 g = b
/// - θ = θ - α * g
///
/// # 使用示例
/// ```ignore
/// let mut optimizer = SGD::new(&model.parameters(), 0.01)?;
/// optimizer.zero_grad();
/// // ……写入梯度……
/// optimizer.step(None, None)?;
/// ```
#[derive(Debug)]
pub struct SGD {
    /// 要优化的参数
    params: Vec<Parameter>,
    config: SgdConfig,
    /// 动量缓存（按 `ParameterId` 索引）
    momentum_buffers: HashMap<ParameterId, Tensor>,
}

impl SGD {
    /// 创建朴素 SGD 优化器
    pub fn new(params: &[Parameter], lr: f32) -> Result<Self, OptimizerError> {
        Self::new_with_config(params, SgdConfig::new(lr))
    }

    /// 创建带完整配置的 SGD 优化器
    pub fn new_with_config(params: &[Parameter], config: SgdConfig) -> Result<Self, OptimizerError> {
        if params.is_empty() {
            return Err(OptimizerError::EmptyParameters);
        }
        check_non_negative("lr", config.lr)?;
        check_momentum("momentum", config.momentum)?;
        check_non_negative("dampening", config.dampening)?;
        check_non_negative("weight_decay", config.weight_decay)?;
        if config.nesterov && (config.momentum <= 0.0 || config.dampening != 0.0) {
            // Nesterov 需要正的动量且不能有阻尼
            return Err(OptimizerError::InvalidHyperparameter {
                name: "nesterov",
                value: config.momentum,
            });
        }
        Ok(Self {
            params: params.to_vec(),
            config,
            momentum_buffers: HashMap::new(),
        })
    }

    pub const fn config(&self) -> &SgdConfig {
        &self.config
    }

    /// 获取指定参数的动量缓存
    pub fn momentum_buffer(&self, param: &Parameter) -> Option<&Tensor> {
        self.momentum_buffers.get(&param.id())
    }
}

impl Optimizer for SGD {
    fn step(
        &mut self,
        _epoch: Option<usize>,
        closure: Option<&mut dyn FnMut() -> f32>,
    ) -> Result<Option<f32>, OptimizerError> {
        let loss = closure.map(|f| f());
        let SgdConfig {
            lr,
            momentum,
            dampening,
            weight_decay,
            nesterov,
        } = self.config;

        let mut updated = 0;
        for param in &self.params {
            let mut data = param.data_mut();
            let ParameterData { value, grad } = &mut *data;
            let Some(grad) = grad.as_ref() else {
                continue;
            };

            let mut d_p = grad.clone();
            if weight_decay != 0.0 {
                d_p.scaled_add_assign(weight_decay, value);
            }
            if momentum != 0.0 {
                // 首步直接用梯度初始化动量缓存
                let buf = match self.momentum_buffers.entry(param.id()) {
                    Entry::Occupied(entry) => {
                        let buf = entry.into_mut();
                        *buf *= momentum;
                        buf.scaled_add_assign(1.0 - dampening, &d_p);
                        buf
                    }
                    Entry::Vacant(entry) => entry.insert(d_p.clone()),
                };
                if nesterov {
                    d_p.scaled_add_assign(momentum, buf);
                } else {
                    d_p = buf.clone();
                }
            }
            value.scaled_add_assign(-lr, &d_p);
            updated += 1;
        }
        debug!("SGD step: 更新了{updated}个参数");
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
        self.momentum_buffers.clear();
    }

    fn params(&self) -> Vec<Parameter> {
        self.params.clone()
    }

    fn name(&self) -> &'static str {
        "sgd"
    }
}
