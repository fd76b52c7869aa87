use thiserror::Error;
mod ops;
pub use self::ops::*;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
    // 构造张量用
    #[error("数据长度为{data_len}，与形状{shape:?}所需的元素个数不一致")]
    ShapeDataMismatch { data_len: usize, shape: Vec<usize> },
    // 张量二元运算
    #[error(
        "形状不一致，故无法{operator}：第一个张量的形状为{tensor1_shape:?}，第二个张量的形状为{tensor2_shape:?}"
    )]
    OperatorError {
        operator: Operator,
        tensor1_shape: Vec<usize>,
        tensor2_shape: Vec<usize>,
    },
    #[error("张量形状不兼容")]
    IncompatibleShape,
}

/// 优化器（及其配置、分组、工厂）相关的错误
///
/// 除了`Serialization`和`Io`，其余变体都属于“配置错误”：应在构造优化器时就被发现，
/// 而不是等到`step()`执行到一半才暴露出来。
#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("未知的优化算法`{0}`，可选：sgd、adam、lars")]
    UnknownAlgorithm(String),
    #[error("未知的训练模式`{0}`，可选：pretrain、finetune")]
    UnknownMode(String),
    #[error("len_reduced（{len_reduced}）超出了参数组的参数个数（{len}）")]
    LenReducedOutOfRange { len_reduced: usize, len: usize },
    #[error("优化器没有任何可优化的参数")]
    EmptyParameters,
    #[error("参数{0}出现在多个参数组中")]
    DuplicateParameter(String),
    #[error("超参数`{name}`的取值{value}不合法")]
    InvalidHyperparameter { name: &'static str, value: f32 },
    #[error("形状不匹配：预期{expected:?}，实际得到{got:?}")]
    ShapeMismatch { expected: Vec<usize>, got: Vec<usize> },
    #[error("优化器状态与当前绑定的参数不一致：{0}")]
    StateMismatch(String),
    #[error("序列化失败：{0}")]
    Serialization(#[from] serde_json::Error),
    #[error("读写文件失败：{0}")]
    Io(#[from] std::io::Error),
}
