use std::path::PathBuf;
use vtl_domain::config::{LaunchConfig, ModelConfig, TopologyConfig, TrackingConfig};
use vtl_domain::manifest::ManifestFile;
use vtl_domain::stage::Stage;

#[test]
fn config_defaults_match_launch_scripts() {
    let topology = TopologyConfig::default();
    assert_eq!(topology.world_size, 1);
    assert_eq!(topology.nproc_per_node, 4);
    assert_eq!(topology.master_addr, "127.0.0.1");
    assert_eq!(topology.master_port, 16666);
    assert_eq!(topology.rank, 0);

    let model = ModelConfig::default();
    assert_eq!(model.projector_type, "stc_connector");
    assert_eq!(model.vision_select_layer, -2);

    let tracking = TrackingConfig::default();
    assert!(tracking.offline);
    assert_eq!(tracking.project, "videollama2");
}

#[test]
fn partial_toml_keeps_other_defaults() {
    let raw = r#"
        [topology]
        master_port = 29500

        [batch]
        global_batch_size = 64

        [paths]
        output_dir = "/scratch/runs"
    "#;

    let cfg: LaunchConfig = toml::from_str(raw).expect("config deserialize");
    assert_eq!(cfg.topology.master_port, 29500);
    assert_eq!(cfg.topology.nproc_per_node, 4);
    assert_eq!(cfg.batch.global_batch_size, Some(64));
    assert_eq!(cfg.batch.local_batch_size, None);
    assert_eq!(cfg.paths.output_dir, PathBuf::from("/scratch/runs"));
    assert_eq!(cfg.paths.data_dir, PathBuf::from("datasets"));
    assert_eq!(cfg.launcher.program, "torchrun");
}

#[test]
fn deref_mut_detaches_clones() {
    let base = LaunchConfig::default();
    let mut edited = base.clone();
    edited.tracking.run_name = "ablation".to_owned();

    assert_eq!(base.tracking.run_name, "downstream");
    assert_eq!(edited.tracking.run_name, "ablation");
}

#[test]
fn stage_parses_case_insensitively() {
    assert_eq!("pretrain".parse::<Stage>(), Ok(Stage::Pretrain));
    assert_eq!(" Finetune ".parse::<Stage>(), Ok(Stage::Finetune));
    assert!("sft".parse::<Stage>().is_err());
    assert_eq!(Stage::Finetune.to_string(), "finetune");
}

#[test]
fn manifest_file_deserializes_from_json() {
    let raw = serde_json::json!({
        "requirements": ["einops"],
        "extras": { "metrics": ["nltk", "jieba"] }
    });

    let file: ManifestFile = serde_json::from_value(raw).expect("manifest deserialize");
    assert_eq!(file.requirements, vec!["einops".to_owned()]);
    assert_eq!(file.extras["metrics"].len(), 2);
}

#[test]
fn manifest_file_rejects_unknown_keys() {
    let raw = serde_json::json!({ "requires": ["einops"] });
    assert!(serde_json::from_value::<ManifestFile>(raw).is_err());
}
