/*
 * @Description  : 优化器工厂测试
 */

use approx::assert_abs_diff_eq;

use crate::assert_err;
use crate::errors::OptimizerError;
use crate::nn::optimizer::{
    Mode, ModeSettings, Optimizer, OptimizerConfig, OptimizerKind, build, build_with_partitioner,
};
use crate::nn::{Module, ParameterDict, ParameterPartitioner};
use crate::tensor::Tensor;

fn model() -> ParameterDict {
    let mut dict = ParameterDict::new();
    dict.insert("conv.weight", Tensor::new(&[1.0, 2.0], &[2]));
    dict.insert("bn.weight", Tensor::new(&[1.0], &[1]));
    dict.insert("fc.weight", Tensor::new(&[3.0], &[1]));
    dict.insert("fc.bias", Tensor::new(&[0.5], &[1]));
    dict
}

fn config(pretrain: &str, finetune: &str) -> OptimizerConfig {
    OptimizerConfig {
        pretrain: ModeSettings {
            learning_rate: 0.6,
            weight_decay: 1e-6,
            algorithm: pretrain.to_string(),
        },
        finetune: ModeSettings {
            learning_rate: 0.02,
            weight_decay: 0.0,
            algorithm: finetune.to_string(),
        },
        batch_size: 512,
    }
}

#[test]
fn test_build_lars_orders_reduced_first() {
    let model = model();
    let optimizer = build(&[&model], Mode::Pretrain, &config("lars", "sgd")).unwrap();
    assert_eq!(optimizer.name(), "lars");

    let lars = optimizer.as_lars().unwrap();
    assert_eq!(lars.param_groups().len(), 1);
    let group = &lars.param_groups()[0];
    assert_eq!(group.len(), 4);
    assert_eq!(group.len_reduced(), 2);

    let expected = ["conv.weight", "fc.weight", "bn.weight", "fc.bias"]
        .map(|name| model.get(name).unwrap().id());
    let actual = group.params().iter().map(|p| p.id()).collect::<Vec<_>>();
    assert_eq!(actual, expected);
}

#[test]
fn test_build_lars_hyperparameters() {
    let model = model();
    let optimizer = build(&[&model], Mode::Pretrain, &config("lars", "sgd")).unwrap();
    let lars = optimizer.as_lars().unwrap();
    let group_config = lars.param_groups()[0].config();

    assert_abs_diff_eq!(group_config.lr, 0.6);
    assert_eq!(group_config.momentum, 0.9);
    assert_eq!(group_config.weight_decay, 1e-6);
    assert_eq!(group_config.eta, 0.001);
    assert!(group_config.use_nesterov);
    assert!(group_config.classic_momentum);
    assert_eq!(lars.momentum(), 0.9);
    assert_eq!(lars.epoch(), 0);
}

#[test]
fn test_build_sgd_uses_all_parameters() {
    let model = model();
    let optimizer = build(&[&model], Mode::Finetune, &config("lars", "sgd")).unwrap();
    assert_eq!(optimizer.name(), "sgd");
    assert_abs_diff_eq!(optimizer.learning_rate(), 0.02);

    let sgd = optimizer.as_sgd().unwrap();
    assert_eq!(sgd.config().momentum, 0.9);
    assert!(sgd.config().nesterov);
    assert_eq!(sgd.config().weight_decay, 0.0);

    let ids = optimizer.params().iter().map(|p| p.id()).collect::<Vec<_>>();
    let expected = model.parameters().iter().map(|p| p.id()).collect::<Vec<_>>();
    assert_eq!(ids, expected);
}

#[test]
fn test_build_adam() {
    let model = model();
    let optimizer = build(&[&model], Mode::Pretrain, &config("adam", "sgd")).unwrap();
    assert!(matches!(optimizer, OptimizerKind::Adam(_)));
    let adam = optimizer.as_adam().unwrap();
    assert_abs_diff_eq!(adam.config().lr, 0.6);
    assert_eq!(adam.config().weight_decay, 1e-6);
    assert_eq!(optimizer.params().len(), 4);
}

#[test]
fn test_build_unknown_algorithm() {
    let model = model();
    assert_err!(
        build(&[&model], Mode::Pretrain, &config("bogus", "sgd")),
        OptimizerError::UnknownAlgorithm("bogus")
    );
    // 大小写敏感
    assert_err!(
        build(&[&model], Mode::Finetune, &config("lars", "Adam")),
        OptimizerError::UnknownAlgorithm("Adam")
    );
}

#[test]
fn test_build_concatenates_models() {
    let backbone = model();
    let mut head = ParameterDict::new();
    head.insert("head.weight", Tensor::new(&[1.0], &[1]));
    head.insert("head.bias", Tensor::new(&[0.0], &[1]));

    let optimizer = build(&[&backbone, &head], Mode::Pretrain, &config("lars", "sgd")).unwrap();
    let group = &optimizer.as_lars().unwrap().param_groups()[0];
    assert_eq!(group.len(), 6);
    assert_eq!(group.len_reduced(), 3);
    assert_eq!(group.params()[2].id(), head.get("head.weight").unwrap().id());
}

#[test]
fn test_build_with_custom_partitioner() {
    let model = model();
    let partitioner = ParameterPartitioner::new(&["bias"]);
    let optimizer = build_with_partitioner(
        &[&model],
        Mode::Pretrain,
        &config("lars", "sgd"),
        &partitioner,
    )
    .unwrap();
    let group = &optimizer.as_lars().unwrap().param_groups()[0];
    assert_eq!(group.len_reduced(), 3);
    assert_eq!(group.params()[3].id(), model.get("fc.bias").unwrap().id());
}

#[test]
fn test_build_lars_and_step() {
    let model = model();
    let mut optimizer = build(&[&model], Mode::Pretrain, &config("lars", "sgd")).unwrap();
    for param in model.parameters() {
        param.set_grad(Some(&param.value())).unwrap();
    }
    let before = model.get("conv.weight").unwrap().value();
    optimizer.step(None, None).unwrap();
    let after = model.get("conv.weight").unwrap().value();
    assert!(after.get(&[0]) < before.get(&[0]));
    assert_eq!(optimizer.as_lars().unwrap().epoch(), 1);
}
