/*
 * @Description  : LARS 的参数组：一组有序参数及其共享的超参数
 */

use std::collections::HashSet;

use log::warn;

use super::LarsConfig;
use super::base::{check_momentum, check_non_negative};
use crate::errors::OptimizerError;
use crate::nn::Parameter;

/// 参数组
///
/// 权重衰减按**位置**而非名称决定：下标在`[0, len_reduced)`的参数参与衰减，
/// `[len_reduced, len)`的参数不参与。因此参数顺序在构造后不可更改，本类型也不提供任何重排接口。
#[derive(Debug, Clone)]
pub struct ParameterGroup {
    params: Vec<Parameter>,
    config: LarsConfig,
}

impl ParameterGroup {
    /// 创建参数组并校验配置，`config.len_reduced`不得超过参数个数
    pub fn new(params: Vec<Parameter>, config: LarsConfig) -> Result<Self, OptimizerError> {
        if config.len_reduced > params.len() {
            return Err(OptimizerError::LenReducedOutOfRange {
                len_reduced: config.len_reduced,
                len: params.len(),
            });
        }
        check_non_negative("lr", config.lr)?;
        check_momentum("momentum", config.momentum)?;
        check_non_negative("weight_decay", config.weight_decay)?;
        check_non_negative("eta", config.eta)?;

        let unique = params.iter().map(Parameter::id).collect::<HashSet<_>>();
        if unique.len() != params.len() {
            warn!("参数组中存在重复的参数，它们在每一步中会被更新多次");
        }
        Ok(Self { params, config })
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub const fn config(&self) -> &LarsConfig {
        &self.config
    }

    pub const fn lr(&self) -> f32 {
        self.config.lr
    }

    pub(super) const fn set_lr(&mut self, lr: f32) {
        self.config.lr = lr;
    }

    pub const fn len_reduced(&self) -> usize {
        self.config.len_reduced
    }

    /// 第`index`个参数是否参与权重衰减
    pub const fn is_decay_eligible(&self, index: usize) -> bool {
        index < self.config.len_reduced
    }
}
