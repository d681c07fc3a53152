//! Stage presets: the fixed flag list handed to the training entry point.
//!
//! The trainer parses flags with `HfArgumentParser`, so booleans must be the
//! literal strings `True`/`False` and learning rates are written in scientific
//! notation.

use crate::batch::BatchPlan;
use std::fmt;
use std::path::{Path, PathBuf};
use vtl_domain::config::LaunchConfig;
use vtl_domain::stage::Stage;

/// A single flag value, rendered the way the trainer expects it.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Bool(bool),
    Int(i64),
    /// Rendered in scientific notation (`1e-3`).
    Sci(f64),
    /// Rendered as a plain decimal (`0.03`).
    Decimal(f64),
    Text(String),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Sci(v) => write!(f, "{v:e}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u32> for ArgValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i32> for ArgValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&Path> for ArgValue {
    fn from(v: &Path) -> Self {
        Self::Text(v.display().to_string())
    }
}

impl From<PathBuf> for ArgValue {
    fn from(v: PathBuf) -> Self {
        Self::from(v.as_path())
    }
}

/// `--flag value`
#[derive(Debug, Clone, PartialEq)]
pub struct TrainArg {
    pub flag: &'static str,
    pub value: ArgValue,
}

impl TrainArg {
    pub fn new(flag: &'static str, value: impl Into<ArgValue>) -> Self {
        Self { flag, value: value.into() }
    }
}

/// Hyperparameters that differ between stages.
#[derive(Debug, Clone, PartialEq)]
pub struct StagePreset {
    pub stage: Stage,
    pub global_batch_size: u32,
    pub local_batch_size: u32,
    pub learning_rate: f64,
    pub save_steps: u32,
    pub save_total_limit: u32,
}

impl StagePreset {
    #[must_use]
    pub const fn for_stage(stage: Stage) -> Self {
        match stage {
            Stage::Pretrain => Self {
                stage,
                global_batch_size: 256,
                local_batch_size: 8,
                learning_rate: 1e-3,
                save_steps: 500,
                save_total_limit: 99,
            },
            Stage::Finetune => Self {
                stage,
                global_batch_size: 128,
                local_batch_size: 4,
                learning_rate: 2e-5,
                save_steps: 2000,
                save_total_limit: 99,
            },
        }
    }

    /// The preset with `[batch]` overrides applied.
    #[must_use]
    pub fn with_overrides(mut self, config: &LaunchConfig) -> Self {
        if let Some(global) = config.batch.global_batch_size {
            self.global_batch_size = global;
        }
        if let Some(local) = config.batch.local_batch_size {
            self.local_batch_size = local;
        }
        self
    }
}

/// `<output_dir>/<project>/<stage>_<run_name>`
#[must_use]
pub fn output_dir(config: &LaunchConfig, stage: Stage) -> PathBuf {
    config
        .paths
        .output_dir
        .join(&config.tracking.project)
        .join(format!("{stage}_{}", config.tracking.run_name))
}

/// Builds the ordered flag list for `preset`.
#[must_use]
pub fn training_args(config: &LaunchConfig, preset: &StagePreset, batch: &BatchPlan) -> Vec<TrainArg> {
    let stage = preset.stage;
    let model = &config.model;
    let data_root = config.paths.data_dir.join(stage.as_str());

    let adapter = match stage {
        Stage::Pretrain => TrainArg::new("--tune_mm_mlp_adapter", true),
        Stage::Finetune => TrainArg::new(
            "--pretrain_mm_mlp_adapter",
            output_dir(config, Stage::Pretrain).join("mm_projector.bin"),
        ),
    };

    vec![
        TrainArg::new("--deepspeed", config.paths.deepspeed_config.as_path()),
        TrainArg::new("--model_type", model.model_type.as_str()),
        TrainArg::new("--model_path", model.model_path.as_str()),
        TrainArg::new("--vision_tower", model.vision_tower.as_str()),
        TrainArg::new("--mm_projector_type", model.projector_type.as_str()),
        adapter,
        TrainArg::new("--data_path", data_root.join(format!("{stage}.json"))),
        TrainArg::new("--data_folder", data_root),
        TrainArg::new("--mm_vision_select_layer", model.vision_select_layer),
        TrainArg::new("--num_frames", model.num_frames),
        TrainArg::new("--bf16", true),
        TrainArg::new("--tf32", true),
        TrainArg::new("--fp16", false),
        TrainArg::new("--output_dir", output_dir(config, stage)),
        TrainArg::new("--num_train_epochs", 1_u32),
        TrainArg::new("--per_device_train_batch_size", batch.local),
        TrainArg::new("--per_device_eval_batch_size", config.batch.eval_batch_size),
        TrainArg::new("--gradient_accumulation_steps", batch.accumulation_steps),
        TrainArg::new("--evaluation_strategy", "no"),
        TrainArg::new("--save_strategy", "steps"),
        TrainArg::new("--save_steps", preset.save_steps),
        TrainArg::new("--save_total_limit", preset.save_total_limit),
        TrainArg { flag: "--learning_rate", value: ArgValue::Sci(preset.learning_rate) },
        TrainArg { flag: "--weight_decay", value: ArgValue::Decimal(0.0) },
        TrainArg { flag: "--warmup_ratio", value: ArgValue::Decimal(0.03) },
        TrainArg::new("--lr_scheduler_type", "cosine"),
        TrainArg::new("--logging_steps", 1_u32),
        TrainArg::new("--model_max_length", model.max_length),
        TrainArg::new("--gradient_checkpointing", true),
        TrainArg::new("--dataloader_num_workers", 4_u32),
        TrainArg::new("--lazy_preprocess", true),
        TrainArg::new("--report_to", config.tracking.report_to.as_str()),
        TrainArg::new("--run_name", config.tracking.run_name.as_str()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(local: u32, accumulation_steps: u32) -> BatchPlan {
        BatchPlan { global: 128, local, devices: 4, accumulation_steps }
    }

    fn value<'a>(args: &'a [TrainArg], flag: &str) -> Option<&'a ArgValue> {
        args.iter().find(|a| a.flag == flag).map(|a| &a.value)
    }

    #[test]
    fn values_render_for_the_trainer() {
        assert_eq!(ArgValue::Bool(true).to_string(), "True");
        assert_eq!(ArgValue::Bool(false).to_string(), "False");
        assert_eq!(ArgValue::Sci(1e-3).to_string(), "1e-3");
        assert_eq!(ArgValue::Sci(2e-5).to_string(), "2e-5");
        assert_eq!(ArgValue::Decimal(0.03).to_string(), "0.03");
        assert_eq!(ArgValue::Decimal(0.0).to_string(), "0");
        assert_eq!(ArgValue::Int(-2).to_string(), "-2");
    }

    #[test]
    fn presets_differ_per_stage() {
        let pretrain = StagePreset::for_stage(Stage::Pretrain);
        let finetune = StagePreset::for_stage(Stage::Finetune);
        assert_eq!((pretrain.global_batch_size, pretrain.local_batch_size), (256, 8));
        assert_eq!((finetune.global_batch_size, finetune.local_batch_size), (128, 4));
    }

    #[test]
    fn overrides_replace_only_given_sizes() {
        let mut config = LaunchConfig::default();
        config.batch.local_batch_size = Some(2);
        let preset = StagePreset::for_stage(Stage::Finetune).with_overrides(&config);
        assert_eq!(preset.global_batch_size, 128);
        assert_eq!(preset.local_batch_size, 2);
    }

    #[test]
    fn finetune_points_at_pretrained_projector() {
        let config = LaunchConfig::default();
        let preset = StagePreset::for_stage(Stage::Finetune);
        let args = training_args(&config, &preset, &plan(4, 8));

        assert_eq!(
            value(&args, "--pretrain_mm_mlp_adapter").map(ToString::to_string).as_deref(),
            Some("work_dirs/videollama2/pretrain_downstream/mm_projector.bin")
        );
        assert_eq!(
            value(&args, "--output_dir").map(ToString::to_string).as_deref(),
            Some("work_dirs/videollama2/finetune_downstream")
        );
        assert!(value(&args, "--tune_mm_mlp_adapter").is_none());
        assert_eq!(value(&args, "--gradient_accumulation_steps"), Some(&ArgValue::Int(8)));
    }

    #[test]
    fn pretrain_tunes_adapter_and_uses_its_data() {
        let config = LaunchConfig::default();
        let preset = StagePreset::for_stage(Stage::Pretrain);
        let args = training_args(&config, &preset, &plan(8, 8));

        assert_eq!(value(&args, "--tune_mm_mlp_adapter"), Some(&ArgValue::Bool(true)));
        assert_eq!(
            value(&args, "--data_path").map(ToString::to_string).as_deref(),
            Some("datasets/pretrain/pretrain.json")
        );
        assert_eq!(
            value(&args, "--learning_rate").map(ToString::to_string).as_deref(),
            Some("1e-3")
        );
    }

    #[test]
    fn flags_are_unique() {
        let config = LaunchConfig::default();
        for stage in Stage::ALL {
            let args = training_args(&config, &StagePreset::for_stage(stage), &plan(4, 8));
            let mut flags: Vec<_> = args.iter().map(|a| a.flag).collect();
            flags.sort_unstable();
            flags.dedup();
            assert_eq!(flags.len(), args.len(), "duplicate flag in {stage} preset");
        }
    }
}
