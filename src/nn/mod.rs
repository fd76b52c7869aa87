/*
 * @Description  : 负责神经网络（neural network）训练中“参数更新”这一环：
 *                 参数句柄、模块（参数的提供方）、参数分组，以及各优化器
 */

mod module;
pub mod optimizer;
mod parameter;
mod partitioner;

pub use module::{Module, ParameterDict};
pub use parameter::{Parameter, ParameterId};
pub(crate) use parameter::ParameterData;
pub use partitioner::{DEFAULT_SKIP_LIST, ParameterPartitioner, PartitionedParameters};

#[cfg(test)]
mod tests;
