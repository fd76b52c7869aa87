/*
 * @Description  : 优化器模块，实现 PyTorch 风格的梯度优化算法（SGD、Adam、LARS），
 *                 以及按训练模式选择优化器的工厂
 */

mod adam;
mod base;
mod config;
mod factory;
mod lars;
mod param_group;
mod sgd;

pub use adam::{Adam, AdamConfig};
pub use base::{Optimizer, OptimizerKind};
pub use config::{Algorithm, BASE_BATCH_SIZE, Mode, ModeSettings, OptimizerConfig, TrainingArgs};
pub use factory::{build, build_with_partitioner};
pub use lars::{LARS, LarsConfig, LarsState};
#[cfg(test)]
pub(crate) use lars::compute_trust_ratio;
pub use param_group::ParameterGroup;
pub use sgd::{SGD, SgdConfig};
