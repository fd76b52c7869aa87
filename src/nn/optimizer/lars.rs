/*
 * @Description  : LARS（Layer-wise Adaptive Rate Scaling，逐层自适应学习率缩放）优化器
 *
 * 参考：You et al. "Large Batch Training of Convolutional Networks" (2017)
 *
 * 每个参数的有效学习率为`lr * trust_ratio`，其中
 * `trust_ratio = eta * ||θ|| / ||d||`：
 * - 经典动量（classic_momentum = true）：d 为（加上权重衰减后的）梯度
 * - 非经典动量：d 为由动量得到的更新量
 * 当分母为零或结果不是有限值时，`trust_ratio`回退为 1.0。
 */

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::base::{check_momentum, clear_grads};
use super::{Optimizer, ParameterGroup};
use crate::errors::OptimizerError;
use crate::nn::{Parameter, ParameterData, ParameterId};
use crate::tensor::Tensor;

/// LARS 单个参数组的超参数
///
/// 除学习率与`len_reduced`外均有默认值，可用结构体更新语法覆盖：
/// ```ignore
/// let config = LarsConfig {
///     use_nesterov: true,
///     weight_decay: 1e-6,
///     ..LarsConfig::new(0.3, reduced.len())
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LarsConfig {
    pub lr: f32,
    /// 动量系数，默认 0.9
    pub momentum: f32,
    /// 默认 false
    pub use_nesterov: bool,
    /// L2 权重衰减系数，只作用于前`len_reduced`个参数，默认 0
    pub weight_decay: f32,
    /// 默认 true
    pub classic_momentum: bool,
    /// trust ratio 的缩放系数，默认 0.001
    pub eta: f32,
    /// 参数组中前多少个参数参与权重衰减
    pub len_reduced: usize,
}

impl LarsConfig {
    pub const fn new(lr: f32, len_reduced: usize) -> Self {
        Self {
            lr,
            momentum: 0.9,
            use_nesterov: false,
            weight_decay: 0.0,
            classic_momentum: true,
            eta: 0.001,
            len_reduced,
        }
    }
}

/// 可序列化的 LARS 状态
///
/// 动量缓存按所有参数组展平后的下标排列，未被更新过的参数为`None`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LarsState {
    pub epoch: usize,
    pub momentum_buffers: Vec<Option<Tensor>>,
}

/// LARS 优化器
///
/// # 使用示例
/// ```ignore
/// let partitioned = ParameterPartitioner::default().partition_modules(&[&model]);
/// let (params, len_reduced) = partitioned.into_ordered();
/// let mut optimizer = LARS::new(&params, LarsConfig::new(0.1, len_reduced))?;
///
/// // 训练循环
/// optimizer.zero_grad();
/// // ……由外部写入梯度……
/// optimizer.step(None, None)?;
/// ```
#[derive(Debug)]
pub struct LARS {
    param_groups: Vec<ParameterGroup>,
    /// 构造时给定的动量系数，Nesterov 前瞻项使用它（而非参数组各自的动量系数）
    momentum: f32,
    /// 未显式指定 epoch 时，每次`step()`后自增
    epoch: usize,
    /// 动量缓存（按 `ParameterId` 索引）
    momentum_buffers: HashMap<ParameterId, Tensor>,
}

impl LARS {
    /// 以单个参数组创建 LARS 优化器
    pub fn new(params: &[Parameter], config: LarsConfig) -> Result<Self, OptimizerError> {
        let group = ParameterGroup::new(params.to_vec(), config)?;
        Self::with_groups(vec![group], config.momentum)
    }

    /// 以多个参数组创建 LARS 优化器
    ///
    /// `momentum`为优化器级的动量系数，仅用于 Nesterov 前瞻项
    pub fn with_groups(
        param_groups: Vec<ParameterGroup>,
        momentum: f32,
    ) -> Result<Self, OptimizerError> {
        if param_groups.iter().all(ParameterGroup::is_empty) {
            return Err(OptimizerError::EmptyParameters);
        }
        check_momentum("momentum", momentum)?;

        let mut lars = Self {
            param_groups: Vec::with_capacity(param_groups.len()),
            momentum,
            epoch: 0,
            momentum_buffers: HashMap::new(),
        };
        for group in param_groups {
            lars.add_param_group(group)?;
        }
        Ok(lars)
    }

    /// 追加一个参数组，其中的参数不得已出现在其他参数组中
    pub fn add_param_group(&mut self, group: ParameterGroup) -> Result<(), OptimizerError> {
        let existing = self
            .param_groups
            .iter()
            .flat_map(|g| g.params().iter().map(Parameter::id))
            .collect::<HashSet<_>>();
        if let Some(dup) = group.params().iter().find(|p| existing.contains(&p.id())) {
            return Err(OptimizerError::DuplicateParameter(format!("{:?}", dup.id())));
        }
        self.param_groups.push(group);
        Ok(())
    }

    pub fn param_groups(&self) -> &[ParameterGroup] {
        &self.param_groups
    }

    pub const fn momentum(&self) -> f32 {
        self.momentum
    }

    pub const fn epoch(&self) -> usize {
        self.epoch
    }

    pub const fn set_epoch(&mut self, epoch: usize) {
        self.epoch = epoch;
    }

    /// 获取指定参数的动量缓存（该参数首次带梯度参与`step()`后才存在）
    pub fn momentum_buffer(&self, param: &Parameter) -> Option<&Tensor> {
        self.momentum_buffers.get(&param.id())
    }

    /// 导出状态（epoch + 动量缓存）
    pub fn state_dict(&self) -> LarsState {
        LarsState {
            epoch: self.epoch,
            momentum_buffers: self
                .all_params()
                .map(|p| self.momentum_buffers.get(&p.id()).cloned())
                .collect(),
        }
    }

    /// 导入状态，动量缓存的个数与形状必须与当前绑定的参数一致
    pub fn load_state_dict(&mut self, state: LarsState) -> Result<(), OptimizerError> {
        let params = self.all_params().cloned().collect::<Vec<_>>();
        if state.momentum_buffers.len() != params.len() {
            return Err(OptimizerError::StateMismatch(format!(
                "状态中有{}个动量缓存，但优化器绑定了{}个参数",
                state.momentum_buffers.len(),
                params.len()
            )));
        }
        for (param, buffer) in params.iter().zip(&state.momentum_buffers) {
            if let Some(buffer) = buffer {
                let shape = param.shape();
                if buffer.shape() != shape.as_slice() {
                    return Err(OptimizerError::ShapeMismatch {
                        expected: shape,
                        got: buffer.shape().to_vec(),
                    });
                }
            }
        }

        self.epoch = state.epoch;
        self.momentum_buffers = params
            .iter()
            .zip(state.momentum_buffers)
            .filter_map(|(param, buffer)| buffer.map(|b| (param.id(), b)))
            .collect();
        Ok(())
    }

    /// 以 JSON 格式保存状态
    pub fn save_state_json(&self, path: impl AsRef<Path>) -> Result<(), OptimizerError> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, &self.state_dict())?;
        Ok(())
    }

    /// 从 JSON 文件加载状态
    pub fn load_state_json(&mut self, path: impl AsRef<Path>) -> Result<(), OptimizerError> {
        let reader = BufReader::new(File::open(path)?);
        let state: LarsState = serde_json::from_reader(reader)?;
        self.load_state_dict(state)
    }

    fn all_params(&self) -> impl Iterator<Item = &Parameter> {
        self.param_groups.iter().flat_map(|g| g.params().iter())
    }
}

impl Optimizer for LARS {
    fn step(
        &mut self,
        epoch: Option<usize>,
        closure: Option<&mut dyn FnMut() -> f32>,
    ) -> Result<Option<f32>, OptimizerError> {
        // 闭包须在任何参数被修改前执行
        let loss = closure.map(|f| f());

        let epoch = epoch.unwrap_or_else(|| {
            let current = self.epoch;
            self.epoch += 1;
            current
        });

        let mut updated = 0;
        for group in &self.param_groups {
            let config = group.config();
            // 下标即位置计数器：没有梯度的参数同样占一个位置
            for (counter, param) in group.params().iter().enumerate() {
                let mut data = param.data_mut();
                let ParameterData { value, grad } = &mut *data;
                let Some(grad) = grad.as_mut() else {
                    continue;
                };

                if group.is_decay_eligible(counter) {
                    grad.scaled_add_assign(config.weight_decay, value);
                }

                let next_v = self
                    .momentum_buffers
                    .entry(param.id())
                    .or_insert_with(|| value.zeros_like());

                let trust_ratio = if config.classic_momentum {
                    let trust_ratio = compute_trust_ratio(config.eta, value.norm(), grad.norm());
                    let scaled_lr = config.lr * trust_ratio;

                    *next_v *= config.momentum;
                    next_v.scaled_add_assign(scaled_lr, grad);

                    if config.use_nesterov {
                        let mut update = self.momentum * &*next_v;
                        update.scaled_add_assign(scaled_lr, grad);
                        *value -= &update;
                    } else {
                        *value -= &*next_v;
                    }
                    trust_ratio
                } else {
                    *next_v *= config.momentum;
                    *next_v += &*grad;

                    let update = if config.use_nesterov {
                        self.momentum * &*next_v + &*grad
                    } else {
                        next_v.clone()
                    };

                    let trust_ratio = compute_trust_ratio(config.eta, value.norm(), update.norm());
                    value.scaled_add_assign(-config.lr * trust_ratio, &update);
                    trust_ratio
                };
                trace!("LARS 参数 {:?}：trust_ratio = {trust_ratio}", param.id());
                updated += 1;
            }
        }
        debug!("LARS step: epoch = {epoch}，更新了{updated}个参数");
        Ok(loss)
    }

    fn zero_grad(&mut self) {
        clear_grads(self.all_params());
    }

    /// 第一个参数组的学习率
    fn learning_rate(&self) -> f32 {
        self.param_groups.first().map_or(0.0, ParameterGroup::lr)
    }

    /// 同时设置所有参数组的学习率
    fn set_learning_rate(&mut self, lr: f32) {
        for group in &mut self.param_groups {
            group.set_lr(lr);
        }
    }

    fn reset(&mut self) {
        self.momentum_buffers.clear();
        self.epoch = 0;
    }

    fn params(&self) -> Vec<Parameter> {
        self.all_params().cloned().collect()
    }

    fn name(&self) -> &'static str {
        "lars"
    }
}

/// `eta * w_norm / d_norm`；范数退化（分母为零、非有限值等）时回退为 1.0，从不报错
pub(crate) fn compute_trust_ratio(eta: f32, w_norm: f32, d_norm: f32) -> f32 {
    if w_norm >= 0.0 && d_norm > 0.0 && d_norm.is_finite() {
        let ratio = eta * w_norm / d_norm;
        if ratio.is_finite() {
            return ratio;
        }
    }
    1.0
}
