/*
 * @Description  : 优化器相关配置：训练模式、算法选择、各模式下的学习率与权重衰减
 *
 * 学习率随 batch size 线性缩放（`lr * batch_size / 256`）由`TrainingArgs::optimizer_config()`完成，
 * 工厂只接收已经缩放好的`OptimizerConfig`。
 */

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::OptimizerError;

/// 线性缩放学习率时的基准 batch size
pub const BASE_BATCH_SIZE: usize = 256;

/// 训练模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// 预训练
    Pretrain,
    /// 微调
    Finetune,
}

impl FromStr for Mode {
    type Err = OptimizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretrain" => Ok(Self::Pretrain),
            "finetune" => Ok(Self::Finetune),
            _ => Err(OptimizerError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretrain => write!(f, "pretrain"),
            Self::Finetune => write!(f, "finetune"),
        }
    }
}

/// 优化算法，区分大小写地从`"sgd"`、`"adam"`、`"lars"`解析
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Sgd,
    Adam,
    Lars,
}

impl FromStr for Algorithm {
    type Err = OptimizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sgd" => Ok(Self::Sgd),
            "adam" => Ok(Self::Adam),
            "lars" => Ok(Self::Lars),
            _ => Err(OptimizerError::UnknownAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sgd => write!(f, "sgd"),
            Self::Adam => write!(f, "adam"),
            Self::Lars => write!(f, "lars"),
        }
    }
}

/// 某一训练模式下的优化器设置
///
/// `algorithm`保留为字符串：未知的算法名在工厂构造优化器时才报错（`UnknownAlgorithm`），
/// 而不是在反序列化配置时。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeSettings {
    /// 已按 batch size 缩放过的学习率
    pub learning_rate: f32,
    pub weight_decay: f32,
    pub algorithm: String,
}

/// 优化器工厂的输入配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub pretrain: ModeSettings,
    pub finetune: ModeSettings,
    /// 仅作记录，学习率已缩放完毕
    pub batch_size: usize,
}

impl OptimizerConfig {
    pub const fn settings(&self, mode: Mode) -> &ModeSettings {
        match mode {
            Mode::Pretrain => &self.pretrain,
            Mode::Finetune => &self.finetune,
        }
    }
}

/// 训练脚本的原始超参数（学习率尚未缩放），可从 JSON 读取
///
/// ```json
/// {
///     "batch_size": 512,
///     "learning_rate": 0.3,
///     "finetune_learning_rate": 0.1,
///     "weight_decay": 1e-6,
///     "finetune_weight_decay": 0.0,
///     "optimiser": "lars",
///     "finetune_optimiser": "sgd"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingArgs {
    pub batch_size: usize,
    pub learning_rate: f32,
    pub finetune_learning_rate: f32,
    pub weight_decay: f32,
    pub finetune_weight_decay: f32,
    pub optimiser: String,
    pub finetune_optimiser: String,
}

impl TrainingArgs {
    pub fn from_json(json: &str) -> Result<Self, OptimizerError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, OptimizerError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// 按线性缩放规则得到预训练学习率：`learning_rate * batch_size / 256`
    pub fn scaled_learning_rate(&self) -> f32 {
        scale_by_batch_size(self.learning_rate, self.batch_size)
    }

    /// 按线性缩放规则得到微调学习率
    pub fn scaled_finetune_learning_rate(&self) -> f32 {
        scale_by_batch_size(self.finetune_learning_rate, self.batch_size)
    }

    /// 生成供工厂使用的配置（学习率已缩放）
    pub fn optimizer_config(&self) -> OptimizerConfig {
        OptimizerConfig {
            pretrain: ModeSettings {
                learning_rate: self.scaled_learning_rate(),
                weight_decay: self.weight_decay,
                algorithm: self.optimiser.clone(),
            },
            finetune: ModeSettings {
                learning_rate: self.scaled_finetune_learning_rate(),
                weight_decay: self.finetune_weight_decay,
                algorithm: self.finetune_optimiser.clone(),
            },
            batch_size: self.batch_size,
        }
    }
}

fn scale_by_batch_size(lr: f32, batch_size: usize) -> f32 {
    lr * (batch_size as f32 / BASE_BATCH_SIZE as f32)
}
