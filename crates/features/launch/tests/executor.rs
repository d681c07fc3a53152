#![cfg(unix)]

use std::collections::HashMap;
use vtl_domain::config::LaunchConfig;
use vtl_launch::executor::{execute, exit_code};
use vtl_launch::{LaunchError, Launcher};

fn plan_for(program: &str) -> vtl_launch::LaunchPlan {
    let mut config = LaunchConfig::default();
    config.launcher.program = program.to_owned();
    let env: HashMap<&str, &str> = HashMap::new();
    Launcher::builder().config(config).build(&env).expect("plan")
}

#[test]
fn success_status_is_returned() {
    let status = execute(&plan_for("true")).expect("spawn true");
    assert!(status.success());
    assert_eq!(exit_code(status), 0);
}

#[test]
fn failure_status_is_propagated_unchanged() {
    let status = execute(&plan_for("false")).expect("spawn false");
    assert!(!status.success());
    assert_eq!(exit_code(status), 1);
}

#[test]
fn missing_program_is_a_spawn_error() {
    let err = execute(&plan_for("/nonexistent/vtl-torchrun")).unwrap_err();
    assert!(matches!(err, LaunchError::Spawn { context: Some(_), .. }));
}
