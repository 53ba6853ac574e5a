use std::path::PathBuf;

use crossterm::event::{self, Event};

use crate::commands::{show_recent_files, PickerSession, RecentCategory, SessionStatus};
use crate::config::{self, Config, ConfigError};
use crate::host::Host;
use crate::keyboard::KeyboardHub;
use crate::placement::PlacementOutcome;
use crate::query_engine::SqliteQueryEngine;
use crate::settings::{self, SettingsDraft, SUPPORTED_QUERY_FIELDS};
use crate::terminal_ui::{self, TerminalGuard};
use crate::vault_index::{self, IndexError};
use crate::workspace::{Workspace, WorkspaceError};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("index error: {0}")]
    Index(#[from] IndexError),
    #[error("workspace error: {0}")]
    Workspace(#[from] WorkspaceError),
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Settings(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show(RecentCategory),
    Index(PathBuf),
    SetPlacement(String),
    SetQuery(RecentCategory, String),
    Workspace,
    Pin(bool),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub config_path: Option<PathBuf>,
    pub command: Command,
}

pub fn parse_cli_args(args: &[String]) -> Result<CliOptions, String> {
    let mut config_path = None;
    let mut positional: Vec<&str> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--config requires a path".to_string())?;
                config_path = Some(PathBuf::from(value));
            }
            "-h" | "--help" => positional.insert(0, "help"),
            other if other.starts_with("--config=") => {
                config_path = Some(PathBuf::from(&other["--config=".len()..]));
            }
            other if other.starts_with('-') => return Err(format!("unknown option: {other}")),
            other => positional.push(other),
        }
    }

    let command = match positional.as_slice() {
        [] | ["help", ..] => Command::Help,
        ["index", folder] => Command::Index(PathBuf::from(folder)),
        ["set-placement", value] => Command::SetPlacement(value.to_string()),
        ["set-query", category, text @ ..] => {
            let category = RecentCategory::parse(category)
                .ok_or_else(|| format!("unknown category: {category}"))?;
            Command::SetQuery(category, text.join(" "))
        }
        ["workspace"] => Command::Workspace,
        ["pin"] => Command::Pin(true),
        ["unpin"] => Command::Pin(false),
        [name] => match RecentCategory::parse(name) {
            Some(category) => Command::Show(category),
            None => return Err(format!("unknown command: {name}")),
        },
        [name, ..] => return Err(format!("unexpected arguments for '{name}'")),
    };

    Ok(CliOptions {
        config_path,
        command,
    })
}

pub fn usage() -> String {
    let mut text = String::from(
        "usage: recentpick [--config <path>] <command>\n\n\
         commands:\n  \
         modified                     show recently modified files\n  \
         created                      show recently created files\n  \
         index <folder>               index the notes in <folder>\n  \
         set-placement <tab|split|window>\n  \
         set-query <modified|created> <sql>   an empty query restores the default\n  \
         workspace                    print open tabs, splits and windows\n  \
         pin | unpin                  pin or unpin the current surface\n\n\
         columns a query may return:\n",
    );
    for (column, meaning) in SUPPORTED_QUERY_FIELDS {
        text.push_str(&format!("  \"{column}\" -> {meaning}\n"));
    }
    text
}

pub fn run_with_options(options: CliOptions) -> Result<(), RuntimeError> {
    match crate::logging::init() {
        Ok(path) => tracing::info!(log_path = %path.display(), "logging initialized"),
        Err(error) => eprintln!("[recentpick] logging disabled: {error}"),
    }

    let mut config = config::load(options.config_path.as_deref())?;
    match options.command {
        Command::Help => print!("{}", usage()),
        Command::Show(category) => show(&config, category)?,
        Command::Index(folder) => {
            let folder = folder.canonicalize().unwrap_or(folder);
            let indexed = vault_index::rebuild(&folder, &config.index_db_path)?;
            config.vault_root = Some(folder);
            config::save(&config)?;
            println!("[recentpick] indexed {indexed} notes");
        }
        Command::SetPlacement(value) => {
            let draft = SettingsDraft {
                placement: Some(value),
                ..Default::default()
            };
            save_draft(&config, &draft)?;
        }
        Command::SetQuery(category, text) => {
            let draft = match category {
                RecentCategory::Modified => SettingsDraft {
                    modified_query: Some(text),
                    ..Default::default()
                },
                RecentCategory::Created => SettingsDraft {
                    created_query: Some(text),
                    ..Default::default()
                },
            };
            save_draft(&config, &draft)?;
        }
        Command::Workspace => {
            let workspace = Workspace::load(&config.workspace_path, config.vault_root.clone())?;
            println!("{}", workspace.describe());
        }
        Command::Pin(pinned) => {
            let mut workspace = Workspace::load(&config.workspace_path, config.vault_root.clone())?;
            if let Some(current) = workspace.most_recent_surface() {
                workspace.set_pinned(current, pinned);
                workspace.save(&config.workspace_path)?;
            }
            println!("{}", workspace.describe());
        }
    }
    Ok(())
}

fn save_draft(current: &Config, draft: &SettingsDraft) -> Result<(), RuntimeError> {
    let next = settings::apply_draft(current, draft).map_err(RuntimeError::Settings)?;
    config::save(&next)?;
    println!("[recentpick] settings saved to {}", next.config_path.display());
    Ok(())
}

fn show(config: &Config, category: RecentCategory) -> Result<(), RuntimeError> {
    let engine = SqliteQueryEngine::new(&config.index_db_path);
    let keyboard = KeyboardHub::new();
    let mut workspace = Workspace::load(&config.workspace_path, config.vault_root.clone())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let session = runtime.block_on(show_recent_files(
        &engine,
        &mut workspace,
        &keyboard,
        config,
        category,
    ));

    let status = match session {
        Some(mut session) => run_picker(&mut session, &mut workspace),
        None => Ok(SessionStatus::Closed),
    };

    for notice in workspace.take_notices() {
        eprintln!("[recentpick] {notice}");
    }
    if let SessionStatus::Opened(outcome) = status? {
        report_placement(&workspace, &outcome);
        workspace.save(&config.workspace_path)?;
    }
    Ok(())
}

fn run_picker(session: &mut PickerSession, host: &mut dyn Host) -> Result<SessionStatus, RuntimeError> {
    let _terminal = TerminalGuard::enter()?;
    let mut out = std::io::stdout();
    let platform = host.platform();

    let status = loop {
        if let Err(error) = terminal_ui::paint(&mut out, session.picker()) {
            session.abort();
            return Err(error.into());
        }
        let event = match event::read() {
            Ok(event) => event,
            Err(error) => {
                session.abort();
                return Err(error.into());
            }
        };
        match event {
            Event::Key(key) => {
                let Some(key) = terminal_ui::to_key_event(key, platform) else {
                    continue;
                };
                match session.handle_key(host, &key) {
                    SessionStatus::Open => continue,
                    other => break other,
                }
            }
            Event::FocusLost => {
                session.abort();
                break SessionStatus::Closed;
            }
            _ => {}
        }
    };
    Ok(status)
}

fn report_placement(workspace: &Workspace, outcome: &PlacementOutcome) {
    match outcome {
        PlacementOutcome::Reused(id) | PlacementOutcome::Created(id) => {
            let verb = if matches!(outcome, PlacementOutcome::Created(_)) {
                "new"
            } else {
                "current"
            };
            let file = workspace
                .surface(*id)
                .and_then(|surface| surface.file.as_deref())
                .unwrap_or_default();
            println!("[recentpick] opened {file} in {verb} surface {id}");
        }
        PlacementOutcome::Failed(error) => eprintln!("[recentpick] {error}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_cli_args, usage, Command};
    use crate::commands::RecentCategory;
    use std::path::PathBuf;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn parses_named_actions() {
        let options = parse_cli_args(&args(&["modified"])).unwrap();
        assert_eq!(options.command, Command::Show(RecentCategory::Modified));

        let options = parse_cli_args(&args(&["show-recently-created-files"])).unwrap();
        assert_eq!(options.command, Command::Show(RecentCategory::Created));
    }

    #[test]
    fn parses_config_flag_in_both_forms() {
        let options = parse_cli_args(&args(&["--config", "a.toml", "workspace"])).unwrap();
        assert_eq!(options.config_path, Some(PathBuf::from("a.toml")));
        assert_eq!(options.command, Command::Workspace);

        let options = parse_cli_args(&args(&["--config=b.json5", "pin"])).unwrap();
        assert_eq!(options.config_path, Some(PathBuf::from("b.json5")));
        assert_eq!(options.command, Command::Pin(true));
    }

    #[test]
    fn set_query_joins_remaining_words() {
        let options = parse_cli_args(&args(&["set-query", "created", "SELECT", "1"])).unwrap();
        assert_eq!(
            options.command,
            Command::SetQuery(RecentCategory::Created, "SELECT 1".to_string())
        );

        let options = parse_cli_args(&args(&["set-query", "modified"])).unwrap();
        assert_eq!(
            options.command,
            Command::SetQuery(RecentCategory::Modified, String::new())
        );
    }

    #[test]
    fn rejects_unknown_input() {
        assert!(parse_cli_args(&args(&["deleted"])).is_err());
        assert!(parse_cli_args(&args(&["--verbose"])).is_err());
        assert!(parse_cli_args(&args(&["--config"])).is_err());
        assert!(parse_cli_args(&args(&["index"])).is_err());
    }

    #[test]
    fn empty_args_show_help() {
        assert_eq!(parse_cli_args(&[]).unwrap().command, Command::Help);
        assert!(usage().contains("\"Name\""));
    }
}
