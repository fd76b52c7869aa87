/*
 * @Description  : Adam 优化器测试
 */

use approx::assert_abs_diff_eq;

use super::{new_param, scalar_of};
use crate::assert_err;
use crate::errors::OptimizerError;
use crate::nn::optimizer::{Adam, AdamConfig, Optimizer};

#[test]
fn test_adam_default_config() {
    let config = AdamConfig::new(0.001);
    assert_eq!(config.beta1, 0.9);
    assert_eq!(config.beta2, 0.999);
    assert_eq!(config.epsilon, 1e-8);
    assert_eq!(config.weight_decay, 0.0);
}

#[test]
fn test_adam_first_step() {
    // 首步偏差修正后 m_hat = g，v_hat = g²，更新量约为 sign(g)
    let p = new_param(&[1.0, -1.0], &[2], Some(&[0.5, -2.0]));
    let mut adam = Adam::new(&[p.clone()], 0.01).unwrap();
    adam.step(None, None).unwrap();

    let value = p.value();
    assert_abs_diff_eq!(value.get(&[0]), 0.99, epsilon = 1e-5);
    assert_abs_diff_eq!(value.get(&[1]), -0.99, epsilon = 1e-5);

    let m = adam.get_momentum(&p).unwrap();
    assert_abs_diff_eq!(m.get(&[0]), 0.05, epsilon = 1e-7);
    let v = adam.get_velocity(&p).unwrap();
    assert_abs_diff_eq!(v.get(&[1]), 0.004, epsilon = 1e-6);
    assert_eq!(adam.timestep(&p), 1);
}

#[test]
fn test_adam_second_step() {
    let p = new_param(&[1.0], &[1], Some(&[0.5]));
    let mut adam = Adam::new(&[p.clone()], 0.01).unwrap();
    adam.step(None, None).unwrap();
    adam.step(None, None).unwrap();

    // 梯度恒定时 m_hat = g，v_hat = g²，每步仍移动约 lr
    assert_abs_diff_eq!(scalar_of(&p), 0.98, epsilon = 1e-5);
    assert_eq!(adam.timestep(&p), 2);
}

#[test]
fn test_adam_weight_decay_is_added_to_grad() {
    // g = 0 + 0.5 * 1.0 ≠ 0，因此参数会移动
    let p = new_param(&[1.0], &[1], Some(&[0.0]));
    let config = AdamConfig {
        weight_decay: 0.5,
        ..AdamConfig::new(0.01)
    };
    let mut adam = Adam::new_with_config(&[p.clone()], config).unwrap();
    adam.step(None, None).unwrap();
    assert_abs_diff_eq!(scalar_of(&p), 0.99, epsilon = 1e-5);
}

#[test]
fn test_adam_timestep_is_per_parameter() {
    let a = new_param(&[1.0], &[1], Some(&[1.0]));
    let b = new_param(&[1.0], &[1], None);
    let mut adam = Adam::new(&[a.clone(), b.clone()], 0.01).unwrap();
    adam.step(None, None).unwrap();
    assert_eq!(adam.timestep(&a), 1);
    assert_eq!(adam.timestep(&b), 0);
    assert!(adam.get_momentum(&b).is_none());
}

#[test]
fn test_adam_invalid_config() {
    let p = new_param(&[1.0], &[1], None);
    let config = AdamConfig {
        beta2: 1.0,
        ..AdamConfig::new(0.01)
    };
    assert_err!(
        Adam::new_with_config(&[p], config),
        OptimizerError::InvalidHyperparameter { name: "beta2", .. }
    );
}

#[test]
fn test_adam_reset() {
    let p = new_param(&[1.0], &[1], Some(&[0.5]));
    let mut adam = Adam::new(&[p.clone()], 0.01).unwrap();
    adam.step(None, None).unwrap();
    adam.reset();
    assert!(adam.get_momentum(&p).is_none());
    assert_eq!(adam.timestep(&p), 0);
}
