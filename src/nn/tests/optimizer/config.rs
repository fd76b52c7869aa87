/*
 * @Description  : 训练模式、算法名与超参数配置测试
 */

use approx::assert_abs_diff_eq;

use crate::assert_err;
use crate::errors::OptimizerError;
use crate::nn::optimizer::{Algorithm, Mode, ModeSettings, OptimizerConfig, TrainingArgs};

const ARGS_JSON: &str = r#"{
    "batch_size": 512,
    "learning_rate": 0.3,
    "finetune_learning_rate": 0.1,
    "weight_decay": 1e-6,
    "finetune_weight_decay": 0.0,
    "optimiser": "lars",
    "finetune_optimiser": "sgd"
}"#;

#[test]
fn test_mode_parse() {
    assert_eq!("pretrain".parse::<Mode>().unwrap(), Mode::Pretrain);
    assert_eq!("finetune".parse::<Mode>().unwrap(), Mode::Finetune);
    assert_err!("eval".parse::<Mode>(), OptimizerError::UnknownMode("eval"));
    assert_eq!(Mode::Finetune.to_string(), "finetune");
}

#[test]
fn test_algorithm_parse_is_case_sensitive() {
    assert_eq!("sgd".parse::<Algorithm>().unwrap(), Algorithm::Sgd);
    assert_eq!("adam".parse::<Algorithm>().unwrap(), Algorithm::Adam);
    assert_eq!("lars".parse::<Algorithm>().unwrap(), Algorithm::Lars);
    assert_err!(
        "LARS".parse::<Algorithm>(),
        OptimizerError::UnknownAlgorithm("LARS")
    );
    assert_err!("".parse::<Algorithm>(), OptimizerError::UnknownAlgorithm(""));
}

#[test]
fn test_training_args_from_json() {
    let args = TrainingArgs::from_json(ARGS_JSON).unwrap();
    assert_eq!(args.batch_size, 512);
    assert_eq!(args.optimiser, "lars");
    assert_eq!(args.finetune_optimiser, "sgd");

    assert_err!(
        TrainingArgs::from_json("{\"batch_size\": 512}"),
        OptimizerError::Serialization { .. }
    );
}

#[test]
fn test_learning_rate_scaled_by_batch_size() {
    let args = TrainingArgs::from_json(ARGS_JSON).unwrap();
    assert_abs_diff_eq!(args.scaled_learning_rate(), 0.6, epsilon = 1e-6);
    assert_abs_diff_eq!(args.scaled_finetune_learning_rate(), 0.2, epsilon = 1e-6);

    let small = TrainingArgs {
        batch_size: 128,
        ..args
    };
    assert_abs_diff_eq!(small.scaled_learning_rate(), 0.15, epsilon = 1e-6);
}

#[test]
fn test_optimizer_config_settings() {
    let config = TrainingArgs::from_json(ARGS_JSON)
        .unwrap()
        .optimizer_config();
    assert_eq!(config.batch_size, 512);

    let pretrain = config.settings(Mode::Pretrain);
    assert_abs_diff_eq!(pretrain.learning_rate, 0.6, epsilon = 1e-6);
    assert_eq!(pretrain.weight_decay, 1e-6);
    assert_eq!(pretrain.algorithm, "lars");

    let finetune = config.settings(Mode::Finetune);
    assert_abs_diff_eq!(finetune.learning_rate, 0.2, epsilon = 1e-6);
    assert_eq!(finetune.weight_decay, 0.0);
    assert_eq!(finetune.algorithm, "sgd");
}

#[test]
fn test_optimizer_config_json_keeps_unknown_algorithm() {
    // 未知算法名在构造优化器时才报错，反序列化阶段照常接受
    let config = OptimizerConfig {
        pretrain: ModeSettings {
            learning_rate: 0.1,
            weight_decay: 0.0,
            algorithm: "bogus".to_string(),
        },
        finetune: ModeSettings {
            learning_rate: 0.01,
            weight_decay: 0.0,
            algorithm: "sgd".to_string(),
        },
        batch_size: 256,
    };
    let json = serde_json::to_string(&config).unwrap();
    let restored: OptimizerConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, config);
}
