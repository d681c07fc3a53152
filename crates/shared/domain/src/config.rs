use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a launch needs besides the environment and positional arguments.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LaunchConfigInner {
    pub topology: TopologyConfig,
    pub batch: BatchConfig,
    pub paths: PathsConfig,
    pub model: ModelConfig,
    pub tracking: TrackingConfig,
    pub launcher: LauncherConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
///
/// Deserializes through [`LaunchConfigInner`] so the source format's own
/// scalar coercion applies to every field.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(from = "LaunchConfigInner")]
pub struct LaunchConfig {
    inner: Arc<LaunchConfigInner>,
}

impl From<LaunchConfigInner> for LaunchConfig {
    fn from(inner: LaunchConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

impl Deref for LaunchConfig {
    type Target = LaunchConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for LaunchConfig {
    fn deref_mut(&mut self) -> &mut LaunchConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Fallback values for the distributed topology.
///
/// These apply only when the matching environment group is incomplete.
/// Positional arguments take precedence over `world_size` and `nproc_per_node`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    pub world_size: u32,
    pub nproc_per_node: u32,
    pub master_addr: String,
    pub master_port: u16,
    pub rank: u32,
}

/// Batch size overrides. `None` keeps the stage preset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub global_batch_size: Option<u32>,
    pub local_batch_size: Option<u32>,
    pub eval_batch_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub deepspeed_config: PathBuf,
}

/// Model and vision tower identifiers forwarded to the trainer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub model_type: String,
    pub model_path: String,
    pub vision_tower: String,
    pub projector_type: String,
    pub vision_select_layer: i32,
    pub num_frames: u32,
    pub max_length: u32,
}

/// Experiment naming and reporting.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub project: String,
    pub run_name: String,
    pub offline: bool,
    pub report_to: String,
}

/// The external launcher and the training entry point it runs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    pub program: String,
    pub entry_point: PathBuf,
}

// --- Default ---

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            world_size: 1,
            nproc_per_node: 4,
            master_addr: "127.0.0.1".to_owned(),
            master_port: 16666,
            rank: 0,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { global_batch_size: None, local_batch_size: None, eval_batch_size: 4 }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("datasets"),
            output_dir: PathBuf::from("work_dirs"),
            deepspeed_config: PathBuf::from("scripts/zero2.json"),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_type: "videollama2".to_owned(),
            model_path: "mistralai/Mistral-7B-Instruct-v0.2".to_owned(),
            vision_tower: "openai/clip-vit-large-patch14-336".to_owned(),
            projector_type: "stc_connector".to_owned(),
            vision_select_layer: -2,
            num_frames: 8,
            max_length: 2048,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            project: "videollama2".to_owned(),
            run_name: "downstream".to_owned(),
            offline: true,
            report_to: "tensorboard".to_owned(),
        }
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            program: "torchrun".to_owned(),
            entry_point: PathBuf::from("videollama2/train_flash_attn.py"),
        }
    }
}
