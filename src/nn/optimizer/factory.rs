/*
 * @Description  : 优化器工厂：按训练模式选取学习率、权重衰减与算法，构造 SGD / Adam / LARS 之一
 */

use log::info;

use super::{
    Adam, AdamConfig, Algorithm, LARS, LarsConfig, Mode, OptimizerConfig, OptimizerKind, SGD,
    SgdConfig,
};
use crate::errors::OptimizerError;
use crate::nn::{Module, Parameter, ParameterPartitioner};

/// SGD 与 LARS 使用的动量系数
const MOMENTUM: f32 = 0.9;
/// LARS 的 trust ratio 系数
const LARS_ETA: f32 = 0.001;

/// 以默认跳过列表（`bn`、`bias`）构造优化器
///
/// # 参数
/// - `models`: 参数来源，按给定顺序拼接各模块的参数
/// - `mode`: 训练模式，决定使用`config`中的哪一套设置
/// - `config`: 学习率须已按 batch size 缩放
///
/// # 错误
/// 算法名未知时返回`OptimizerError::UnknownAlgorithm`，此时不会构造任何优化器
pub fn build(
    models: &[&dyn Module],
    mode: Mode,
    config: &OptimizerConfig,
) -> Result<OptimizerKind, OptimizerError> {
    build_with_partitioner(models, mode, config, &ParameterPartitioner::default())
}

/// 同`build`，但可指定参数分组器（仅 LARS 使用）
pub fn build_with_partitioner(
    models: &[&dyn Module],
    mode: Mode,
    config: &OptimizerConfig,
    partitioner: &ParameterPartitioner,
) -> Result<OptimizerKind, OptimizerError> {
    let settings = config.settings(mode);
    let algorithm = settings.algorithm.parse::<Algorithm>()?;
    let lr = settings.learning_rate;
    let weight_decay = settings.weight_decay;
    info!("构造优化器：mode = {mode}，algorithm = {algorithm}，lr = {lr}，weight_decay = {weight_decay}");

    let optimizer: OptimizerKind = match algorithm {
        Algorithm::Sgd => {
            let sgd_config = SgdConfig {
                momentum: MOMENTUM,
                weight_decay,
                nesterov: true,
                ..SgdConfig::new(lr)
            };
            SGD::new_with_config(&all_parameters(models), sgd_config)?.into()
        }
        Algorithm::Adam => {
            let adam_config = AdamConfig {
                weight_decay,
                ..AdamConfig::new(lr)
            };
            Adam::new_with_config(&all_parameters(models), adam_config)?.into()
        }
        Algorithm::Lars => {
            let (params, len_reduced) = partitioner.partition_modules(models).into_ordered();
            let lars_config = LarsConfig {
                momentum: MOMENTUM,
                use_nesterov: true,
                weight_decay,
                classic_momentum: true,
                eta: LARS_ETA,
                ..LarsConfig::new(lr, len_reduced)
            };
            LARS::new(&params, lars_config)?.into()
        }
    };
    Ok(optimizer)
}

/// 不分组，按模块顺序拼接所有参数
fn all_parameters(models: &[&dyn Module]) -> Vec<Parameter> {
    models.iter().flat_map(|m| m.parameters()).collect()
}
