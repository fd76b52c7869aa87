/*
 * @Description  : Module trait 定义，以及最简单的模块实现`ParameterDict`
 */

use super::Parameter;
use crate::tensor::Tensor;

/// 模块 trait
///
/// # 设计原则
/// - `forward()` **不是** trait 方法（本库不负责前向/反向计算）
/// - `named_parameters()` 返回有序的`(名称, 参数)`列表，顺序即参数的枚举顺序，
///   参数分组和优化器工厂都依赖这个顺序
///
/// # 使用示例
///
/// ```ignore
/// use lars_torch::nn::{Module, Parameter};
///
/// struct Classifier {
///     conv_weight: Parameter,
///     bn_weight: Parameter,
///     fc_bias: Parameter,
/// }
///
/// impl Module for Classifier {
///     fn named_parameters(&self) -> Vec<(String, Parameter)> {
///         vec![
///             ("conv.weight".to_string(), self.conv_weight.clone()),
///             ("bn.weight".to_string(), self.bn_weight.clone()),
///             ("fc.bias".to_string(), self.fc_bias.clone()),
///         ]
///     }
/// }
/// ```
pub trait Module {
    /// 获取所有可训练参数及其名称（有序）
    ///
    /// 这是 Module trait 的唯一必须实现的方法。
    fn named_parameters(&self) -> Vec<(String, Parameter)>;

    /// 获取所有可训练参数（顺序同`named_parameters()`）
    fn parameters(&self) -> Vec<Parameter> {
        self.named_parameters()
            .into_iter()
            .map(|(_, param)| param)
            .collect()
    }

    /// 获取参数（张量）个数
    fn num_params(&self) -> usize {
        self.named_parameters().len()
    }

    /// 获取所有参数的元素总数
    fn num_elements(&self) -> usize {
        self.parameters().iter().map(Parameter::size).sum()
    }

    /// 清空所有参数的梯度
    fn zero_grad(&self) {
        for param in self.parameters() {
            param.zero_grad();
        }
    }
}

/// 按插入顺序保存的具名参数集合（PyTorch 中的`nn.ParameterDict`）
///
/// 名称重复时后插入的参数会替换先前的，但保留原位置。
#[derive(Debug, Clone, Default)]
pub struct ParameterDict {
    entries: Vec<(String, Parameter)>,
}

impl ParameterDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以初始值新建一个参数并登记到`name`下，返回该参数的句柄
    pub fn insert(&mut self, name: &str, value: Tensor) -> Parameter {
        let param = Parameter::new(value);
        self.insert_parameter(name, param.clone());
        param
    }

    /// 登记一个已有的参数（可用于在多个模块间共享参数）
    pub fn insert_parameter(&mut self, name: &str, param: Parameter) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = param,
            None => self.entries.push((name.to_string(), param)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, param)| param)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Module for ParameterDict {
    fn named_parameters(&self) -> Vec<(String, Parameter)> {
        self.entries.clone()
    }
}
