/*
 * @Description  : SGD (随机梯度下降) 优化器测试
 */

use approx::assert_abs_diff_eq;

use super::{new_param, scalar_of};
use crate::assert_err;
use crate::errors::OptimizerError;
use crate::nn::optimizer::{Optimizer, SGD, SgdConfig};
use crate::tensor::Tensor;

#[test]
fn test_sgd_creation() {
    let p = new_param(&[1.0], &[1], None);
    let sgd = SGD::new(&[p], 0.01).unwrap();
    assert_eq!(sgd.learning_rate(), 0.01);
    assert_eq!(sgd.config().momentum, 0.0);
    assert!(!sgd.config().nesterov);
}

#[test]
fn test_sgd_learning_rate_modification() {
    let p = new_param(&[1.0], &[1], None);
    let mut sgd = SGD::new(&[p], 0.01).unwrap();
    sgd.set_learning_rate(0.001);
    assert_eq!(sgd.learning_rate(), 0.001);
}

#[test]
fn test_sgd_update_formula() {
    // θ_new = θ_old - α * ∇θ = 1.0 - 0.1 * 0.5
    let p = new_param(&[1.0], &[1], Some(&[0.5]));
    let mut sgd = SGD::new(&[p.clone()], 0.1).unwrap();
    sgd.step(None, None).unwrap();
    assert_abs_diff_eq!(scalar_of(&p), 0.95, epsilon = 1e-6);
    assert!(sgd.momentum_buffer(&p).is_none());
}

#[test]
fn test_sgd_weight_decay() {
    // g = 0 + 0.1 * 1.0，θ = 1.0 - 0.1 * 0.1
    let p = new_param(&[1.0], &[1], Some(&[0.0]));
    let config = SgdConfig {
        weight_decay: 0.1,
        ..SgdConfig::new(0.1)
    };
    let mut sgd = SGD::new_with_config(&[p.clone()], config).unwrap();
    sgd.step(None, None).unwrap();
    assert_abs_diff_eq!(scalar_of(&p), 0.99, epsilon = 1e-6);
    // SGD 不改写参数上的梯度
    assert_eq!(p.grad(), Some(Tensor::new(&[0.0], &[1])));
}

#[test]
fn test_sgd_nesterov_momentum() {
    let p = new_param(&[1.0], &[1], Some(&[0.5]));
    let config = SgdConfig {
        momentum: 0.9,
        nesterov: true,
        ..SgdConfig::new(0.1)
    };
    let mut sgd = SGD::new_with_config(&[p.clone()], config).unwrap();

    // 第一步：b = g = 0.5，d = 0.5 + 0.9*0.5 = 0.95
    sgd.step(None, None).unwrap();
    assert_abs_diff_eq!(scalar_of(&p), 0.905, epsilon = 1e-6);
    assert_abs_diff_eq!(
        sgd.momentum_buffer(&p).unwrap().number().unwrap(),
        0.5,
        epsilon = 1e-7
    );

    // 第二步：b = 0.9*0.5 + 0.5 = 0.95，d = 0.5 + 0.9*0.95 = 1.355
    sgd.step(None, None).unwrap();
    assert_abs_diff_eq!(scalar_of(&p), 0.905 - 0.1355, epsilon = 1e-6);
}

#[test]
fn test_sgd_classic_momentum_with_dampening() {
    let p = new_param(&[1.0], &[1], Some(&[1.0]));
    let config = SgdConfig {
        momentum: 0.5,
        dampening: 0.5,
        ..SgdConfig::new(0.1)
    };
    let mut sgd = SGD::new_with_config(&[p.clone()], config).unwrap();
    // 第一步不做阻尼：b = 1.0
    sgd.step(None, None).unwrap();
    assert_abs_diff_eq!(scalar_of(&p), 0.9, epsilon = 1e-6);
    // b = 0.5*1.0 + 0.5*1.0 = 1.0
    sgd.step(None, None).unwrap();
    assert_abs_diff_eq!(scalar_of(&p), 0.8, epsilon = 1e-6);
}

#[test]
fn test_sgd_skips_param_without_grad() {
    let a = new_param(&[1.0], &[1], None);
    let b = new_param(&[1.0], &[1], Some(&[1.0]));
    let mut sgd = SGD::new(&[a.clone(), b.clone()], 0.1).unwrap();
    sgd.step(None, None).unwrap();
    assert_eq!(scalar_of(&a), 1.0);
    assert_abs_diff_eq!(scalar_of(&b), 0.9, epsilon = 1e-6);
}

#[test]
fn test_sgd_invalid_config() {
    let p = new_param(&[1.0], &[1], None);
    // Nesterov 需要正动量
    let config = SgdConfig {
        nesterov: true,
        ..SgdConfig::new(0.1)
    };
    assert_err!(
        SGD::new_with_config(&[p.clone()], config),
        OptimizerError::InvalidHyperparameter {
            name: "nesterov",
            ..
        }
    );
    assert_err!(
        SGD::new(&[p], -1.0),
        OptimizerError::InvalidHyperparameter { name: "lr", .. }
    );
    assert_err!(SGD::new(&[], 0.1), OptimizerError::EmptyParameters);
}

#[test]
fn test_sgd_reset() {
    let p = new_param(&[1.0], &[1], Some(&[0.5]));
    let config = SgdConfig {
        momentum: 0.9,
        ..SgdConfig::new(0.1)
    };
    let mut sgd = SGD::new_with_config(&[p.clone()], config).unwrap();
    sgd.step(None, None).unwrap();
    assert!(sgd.momentum_buffer(&p).is_some());
    sgd.reset();
    assert!(sgd.momentum_buffer(&p).is_none());
}
