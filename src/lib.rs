//! # LARS Torch
//!
//! `lars_torch`用纯rust实现了[LARS](https://arxiv.org/abs/1708.03888)（Layer-wise Adaptive Rate Scaling，
//! 逐层自适应学习率缩放）优化器，以及为其服务的参数分组（哪些参数参与权重衰减）和优化器工厂（按训练模式选择
//! SGD/Adam/LARS）逻辑。风格上尽量仿照pytorch的`torch.optim`。
//!
//! 梯度如何产生、参数如何初始化、训练循环如何组织，都不在本库的范围内：
//! 本库只负责“给定参数、梯度和优化器的持久状态，算出下一步的参数值”。
//!

pub mod errors;
pub mod nn;
pub mod tensor;
pub mod utils;
