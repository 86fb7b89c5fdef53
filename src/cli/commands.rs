use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ScriptRunner};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::TreeDump;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Run { script }) => _run(cli, script),
        Some(Commands::Dump { script }) => _dump(cli, script),
        Some(Commands::Config { command }) => _config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see --help".to_string(),
        )),
    }
}

fn config_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.config_dir {
        Some(dir) if !dir.is_dir() => Err(CliError::InvalidArgs(format!(
            "not a directory: {}",
            dir.display()
        ))),
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir().map_err(|e| {
            CliError::Application(ApplicationError::OperationFailed {
                context: "determine working directory".to_string(),
                source: Box::new(e),
            })
        }),
    }
}

/// Settings with the command line's overrides applied on top.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let dir = config_dir(cli)?;
    let mut settings = Settings::load(Some(dir.as_path()))?;
    if let Some(depth) = cli.depth {
        settings.depth = depth;
        settings.validate()?;
    }
    debug!(?settings, "settings loaded");
    Ok(settings)
}

#[instrument(skip(cli))]
fn _run(cli: &Cli, script: &Path) -> CliResult<()> {
    let settings = load_settings(cli)?;
    let mut runner = ScriptRunner::from_settings(&settings)?;
    for outcome in runner.run_file(script)? {
        output::info(&outcome);
    }
    output::success(&format!("{} keys stored", runner.tree().len()));
    Ok(())
}

#[instrument(skip(cli))]
fn _dump(cli: &Cli, script: &Path) -> CliResult<()> {
    let settings = load_settings(cli)?;
    let mut runner = ScriptRunner::from_settings(&settings)?;
    runner.run_file(script)?;

    let tree = runner.into_tree();
    output::header("Tree");
    output::info(&tree.to_tree_string());
    output::header("Layers");
    output::info(&tree.layer_dump());
    tree.close();
    Ok(())
}

#[instrument(skip(cli))]
fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::detail(&"global: no config directory on this platform"),
            }
            let dir = config_dir(cli)?;
            output::action("local", &local_config_path(&dir).display());
        }
    }
    Ok(())
}
