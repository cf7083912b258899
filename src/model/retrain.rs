// src/model/retrain.rs
//
// External retraining hook. Training internals are out of scope; the store
// only needs "run the training procedure and tell me if it worked". The
// production implementation spawns the configured command and keeps its
// combined output in a log file for the dashboard.

use crate::config::RetrainConfig;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::info;

pub trait Retrainer {
    fn retrain(&self) -> Result<()>;
}

pub struct CommandRetrainer {
    cfg: RetrainConfig,
}

impl CommandRetrainer {
    pub fn new(cfg: &RetrainConfig) -> Self {
        Self { cfg: cfg.clone() }
    }
}

impl Retrainer for CommandRetrainer {
    fn retrain(&self) -> Result<()> {
        if self.cfg.command.is_empty() {
            bail!("no retrain command configured");
        }

        info!(
            "Running training command: {} {}",
            self.cfg.command,
            self.cfg.args.join(" ")
        );
        let output = Command::new(&self.cfg.command)
            .args(&self.cfg.args)
            .output()
            .with_context(|| format!("failed to spawn {}", self.cfg.command))?;

        let mut log = String::new();
        if !output.stdout.is_empty() {
            log.push_str("STDOUT:\n");
            log.push_str(&String::from_utf8_lossy(&output.stdout));
        }
        if !output.stderr.is_empty() {
            log.push_str("\nSTDERR:\n");
            log.push_str(&String::from_utf8_lossy(&output.stderr));
        }
        if log.is_empty() {
            log.push_str("training command produced no output\n");
        }

        if let Some(parent) = Path::new(&self.cfg.log_path).parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.cfg.log_path, &log)
            .with_context(|| format!("failed to write {}", self.cfg.log_path))?;

        if !output.status.success() {
            bail!("training command exited with {}", output.status);
        }
        info!("✓ Training command finished, log at {}", self.cfg.log_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command_is_rejected() {
        let retrainer = CommandRetrainer::new(&RetrainConfig {
            command: String::new(),
            args: Vec::new(),
            log_path: "models/train_last.log".to_string(),
        });
        assert!(retrainer.retrain().is_err());
    }
}
