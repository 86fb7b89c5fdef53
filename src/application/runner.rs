//! Executes operation scripts against a christree of string payloads.

use std::fmt;
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::application::script::{Command, Script};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{ChrisTree, SelectOptions, TreeDump, TreeError};

/// Result of one executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added { key: Vec<u8>, replaced: Option<String> },
    Removed { key: Vec<u8>, payload: Option<String> },
    Found { key: Vec<u8>, payload: Option<String> },
    Selected { payloads: Vec<String> },
    Dump(String),
    Layers(String),
    Verified { keys: usize, nodes: usize },
    Cleared { keys: usize },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Added { key, replaced: None } => write!(f, "add {}", hex::encode(key)),
            Outcome::Added {
                key,
                replaced: Some(old),
            } => write!(f, "add {} (replaced {old})", hex::encode(key)),
            Outcome::Removed { key, payload: None } => {
                write!(f, "remove {}: absent", hex::encode(key))
            }
            Outcome::Removed {
                key,
                payload: Some(p),
            } => write!(f, "remove {}: {p}", hex::encode(key)),
            Outcome::Found { key, payload: None } => write!(f, "get {}: absent", hex::encode(key)),
            Outcome::Found {
                key,
                payload: Some(p),
            } => write!(f, "get {}: {p}", hex::encode(key)),
            Outcome::Selected { payloads } => {
                write!(f, "select: {} [{}]", payloads.len(), payloads.join(", "))
            }
            Outcome::Dump(text) | Outcome::Layers(text) => write!(f, "{text}"),
            Outcome::Verified { keys, nodes } => write!(f, "verify: ok ({keys} keys, {nodes} nodes)"),
            Outcome::Cleared { keys } => write!(f, "clear: {keys} keys removed"),
        }
    }
}

/// Owns a tree and applies script commands to it.
#[derive(Debug)]
pub struct ScriptRunner {
    tree: ChrisTree<String>,
    options: SelectOptions,
}

impl ScriptRunner {
    pub fn new(tree: ChrisTree<String>, options: SelectOptions) -> Self {
        Self { tree, options }
    }

    pub fn from_settings(settings: &Settings) -> ApplicationResult<Self> {
        Ok(Self::new(settings.build_tree()?, settings.select_options()))
    }

    pub fn tree(&self) -> &ChrisTree<String> {
        &self.tree
    }

    pub fn into_tree(self) -> ChrisTree<String> {
        self.tree
    }

    /// Run every command in order, stopping at the first failure.
    #[instrument(level = "debug", skip(self, script), fields(commands = script.len()))]
    pub fn run(&mut self, script: &Script) -> ApplicationResult<Vec<Outcome>> {
        let mut outcomes = Vec::with_capacity(script.len());
        for (line, command) in &script.commands {
            let outcome = self
                .execute(command)
                .map_err(|source| ApplicationError::Command { line: *line, source })?;
            debug!(line, %outcome, "command executed");
            outcomes.push(outcome);
        }
        info!(commands = outcomes.len(), keys = self.tree.len(), "script finished");
        Ok(outcomes)
    }

    /// Parse and run the script stored at `path`.
    pub fn run_file(&mut self, path: &Path) -> ApplicationResult<Vec<Outcome>> {
        let text = std::fs::read_to_string(path).with_path_context("read script", path)?;
        let script: Script = text.parse()?;
        self.run(&script)
    }

    pub fn execute(&mut self, command: &Command) -> Result<Outcome, TreeError> {
        let outcome = match command {
            Command::Add { key, payload } => Outcome::Added {
                key: key.clone(),
                replaced: self.tree.add(key, payload.clone())?,
            },
            Command::Remove { key } => Outcome::Removed {
                key: key.clone(),
                payload: self.tree.remove(key)?,
            },
            Command::Get { key } => {
                self.tree.check_key(key)?;
                Outcome::Found {
                    key: key.clone(),
                    payload: self.tree.get(key).cloned(),
                }
            }
            Command::Select { mask, limit } => {
                let options = SelectOptions {
                    limit: limit.unwrap_or(self.options.limit),
                    ..self.options
                };
                let payloads = self.tree.select_with(mask, &options)?;
                Outcome::Selected {
                    payloads: payloads.into_iter().cloned().collect(),
                }
            }
            Command::Dump => Outcome::Dump(self.tree.to_tree_string().to_string()),
            Command::Layers => Outcome::Layers(self.tree.layer_dump()),
            Command::Verify => {
                self.tree.verify()?;
                Outcome::Verified {
                    keys: self.tree.len(),
                    nodes: self.tree.node_count(),
                }
            }
            Command::Clear => Outcome::Cleared {
                keys: self.tree.clear()?,
            },
        };
        Ok(outcome)
    }
}
