//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{AllocationSession, DocumentService, EditOutcome};
use crate::cli::args::{Cli, Commands, ConfigCommands, ModeArg};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::render::{render_table, render_tree};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{AllocationMode, RowId};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let cwd = std::env::current_dir().map_err(|e| InfraError::io("current directory", e))?;
    let settings = Settings::load(Some(&cwd))?;
    let container = ServiceContainer::new(settings);

    match &cli.command {
        Some(Commands::Show) | None => cmd_show(cli, &container),
        Some(Commands::Tree) => cmd_tree(cli, &container),
        Some(Commands::Set { id, value }) => cmd_set(cli, &container, id, *value),
        Some(Commands::Allocate { id, amount, mode }) => {
            cmd_allocate(cli, &container, id, amount, *mode)
        }
        Some(Commands::Config { command }) => cmd_config(&container, command, &cwd),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

#[instrument(skip(cli, container))]
fn cmd_show(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    let session = container.open_session(cli.file.as_deref())?;
    print_snapshot(cli, container, &session)
}

#[instrument(skip(cli, container))]
fn cmd_tree(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    let session = container.open_session(cli.file.as_deref())?;
    if cli.json {
        return print_snapshot(cli, container, &session);
    }
    output::info(&render_tree(session.forest(), &container.settings.display));
    Ok(())
}

#[instrument(skip(cli, container))]
fn cmd_set(cli: &Cli, container: &ServiceContainer, id: &RowId, value: f64) -> CliResult<()> {
    let mut session = container.open_session(cli.file.as_deref())?;
    let outcome = session.set_value(id, value)?;
    report(&outcome);
    print_snapshot(cli, container, &session)
}

#[instrument(skip(cli, container))]
fn cmd_allocate(
    cli: &Cli,
    container: &ServiceContainer,
    id: &RowId,
    amount: &str,
    mode: Option<ModeArg>,
) -> CliResult<()> {
    let mode = mode
        .map(AllocationMode::from)
        .unwrap_or(container.settings.default_mode);
    debug!("allocate: mode={}", mode);

    let mut session = container.open_session(cli.file.as_deref())?;
    session.set_input(id.clone(), amount)?;
    let outcome = session.allocate(id, mode)?;
    report(&outcome);
    print_snapshot(cli, container, &session)
}

fn cmd_config(container: &ServiceContainer, command: &ConfigCommands, cwd: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("Global", &path.display()),
                None => output::warning("no config directory available on this platform"),
            }
            output::action("Local", &local_config_path(cwd).display());
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("no config directory available on this platform".into())
                })?
            } else {
                local_config_path(cwd)
            };
            if path.exists() {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("Created {}", path.display()));
            Ok(())
        }
    }
}

fn report(outcome: &EditOutcome) {
    match outcome {
        EditOutcome::Applied(edit) => output::success(&format!(
            "{} = {} (ancestors {:+})",
            edit.id, edit.new_value, edit.delta
        )),
        EditOutcome::NotFound(id) => {
            output::warning(&format!("row not found: {id}; table unchanged"))
        }
        EditOutcome::NoInput(id) => {
            output::warning(&format!("no amount entered for row {id}; table unchanged"))
        }
    }
}

fn print_snapshot(cli: &Cli, container: &ServiceContainer, session: &AllocationSession) -> CliResult<()> {
    if cli.json {
        let json = DocumentService::to_json(session.forest())?;
        output::info(&format!("{json}\n"));
    } else {
        output::header(&format!("{} rows", session.forest().len()));
        output::info(&render_table(session.forest(), &container.settings.display));
    }
    Ok(())
}
