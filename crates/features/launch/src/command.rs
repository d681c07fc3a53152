use crate::batch::BatchPlan;
use crate::profile::TrainArg;
use crate::topology::Topology;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use vtl_domain::stage::Stage;

/// A fully resolved launcher invocation.
///
/// Nothing here is interpreted further: [`LaunchPlan::argv`] is exactly what the
/// child process receives after the program name.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchPlan {
    pub stage: Stage,
    pub program: String,
    pub entry_point: PathBuf,
    pub topology: Topology,
    pub batch: BatchPlan,
    pub train_args: Vec<TrainArg>,
    pub env: Vec<(&'static str, String)>,
}

impl LaunchPlan {
    /// Arguments consumed by the launcher itself.
    #[must_use]
    pub fn launcher_args(&self) -> Vec<String> {
        let t = &self.topology;
        vec![
            "--nnodes".to_owned(),
            t.world_size.to_string(),
            "--nproc_per_node".to_owned(),
            t.nproc_per_node.to_string(),
            format!("--master_addr={}", t.master_addr),
            format!("--master_port={}", t.master_port),
            "--node_rank".to_owned(),
            t.rank.to_string(),
        ]
    }

    /// Full argument vector, without the program name.
    #[must_use]
    pub fn argv(&self) -> Vec<String> {
        let mut argv = self.launcher_args();
        argv.push(self.entry_point.display().to_string());
        for arg in &self.train_args {
            argv.push(arg.flag.to_owned());
            argv.push(arg.value.to_string());
        }
        argv
    }

    /// Value passed for `flag`, if the plan carries it.
    #[must_use]
    pub fn flag_value(&self, flag: &str) -> Option<String> {
        self.train_args.iter().find(|a| a.flag == flag).map(|a| a.value.to_string())
    }

    /// A ready-to-spawn command inheriting stdio and the current environment.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(self.argv());
        command.envs(self.env.iter().map(|(k, v)| (*k, v.as_str())));
        command
    }
}

/// Renders a copy-pasteable shell command (exported variables first).
impl fmt::Display for LaunchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{key}={} ", shell_quote(value))?;
        }
        f.write_str(&shell_quote(&self.program))?;
        for arg in self.argv() {
            write!(f, " {}", shell_quote(&arg))?;
        }
        Ok(())
    }
}

fn shell_quote(raw: &str) -> String {
    let safe = !raw.is_empty()
        && raw.chars().all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if safe { raw.to_owned() } else { format!("'{}'", raw.replace('\'', r"'\''")) }
}
