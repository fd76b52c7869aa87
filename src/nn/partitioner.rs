/*
 * @Description  : 参数分组器：按名称把参数分为“参与权重衰减”与“不参与权重衰减”两组
 */

use log::info;

use super::{Module, Parameter};

/// 默认的跳过列表：归一化层（`bn`）和偏置（`bias`）参数不做权重衰减
pub const DEFAULT_SKIP_LIST: [&str; 2] = ["bn", "bias"];

/// 分组结果。两组内部都保持输入中的相对顺序
#[derive(Debug, Clone, Default)]
pub struct PartitionedParameters {
    /// 名称不含任何跳过子串的参数（参与权重衰减）
    pub reduced: Vec<(String, Parameter)>,
    /// 名称含有至少一个跳过子串的参数（不参与权重衰减）
    pub excluded: Vec<(String, Parameter)>,
}

impl PartitionedParameters {
    pub fn len(&self) -> usize {
        self.reduced.len() + self.excluded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 先`reduced`后`excluded`拼接成一个有序列表，同时返回`len_reduced`。
    ///
    /// LARS 按位置判断是否做权重衰减：下标在`[0, len_reduced)`的参数才会衰减，
    /// 所以拼接顺序不能改变。
    pub fn into_ordered(self) -> (Vec<Parameter>, usize) {
        let len_reduced = self.reduced.len();
        let params = self
            .reduced
            .into_iter()
            .chain(self.excluded)
            .map(|(_, param)| param)
            .collect();
        (params, len_reduced)
    }
}

/// 参数分组器
///
/// 名称匹配规则为区分大小写的子串包含：只要名称包含任意一个跳过子串，该参数就被排除在权重衰减之外。
#[derive(Debug, Clone)]
pub struct ParameterPartitioner {
    skip_list: Vec<String>,
}

impl Default for ParameterPartitioner {
    fn default() -> Self {
        Self::new(&DEFAULT_SKIP_LIST)
    }
}

impl ParameterPartitioner {
    pub fn new(skip_list: &[&str]) -> Self {
        Self {
            skip_list: skip_list.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn skip_list(&self) -> &[String] {
        &self.skip_list
    }

    /// 名称是否命中跳过列表
    pub fn is_excluded(&self, name: &str) -> bool {
        self.skip_list.iter().any(|skip| name.contains(skip.as_str()))
    }

    /// 对一串有序的具名参数分组，不会丢弃或重复任何参数
    pub fn partition<I>(&self, named_params: I) -> PartitionedParameters
    where
        I: IntoIterator<Item = (String, Parameter)>,
    {
        let (excluded, reduced): (Vec<_>, Vec<_>) = named_params
            .into_iter()
            .partition(|(name, _)| self.is_excluded(name));
        PartitionedParameters { reduced, excluded }
    }

    /// 对多个模块分组：按模块的给定顺序依次拼接各自的具名参数后再分组
    pub fn partition_modules(&self, models: &[&dyn Module]) -> PartitionedParameters {
        let partitioned = self.partition(models.iter().flat_map(|m| m.named_parameters()));
        info!(
            "参数分组完成：reduced_params {} 个，removed_params {} 个",
            partitioned.reduced.len(),
            partitioned.excluded.len()
        );
        partitioned
    }
}
