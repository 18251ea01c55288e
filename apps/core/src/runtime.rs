use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::config::{self, Config, ConfigError};
use crate::contract::SearchResult;
use crate::logging::{self, LogLevel};
use crate::lookup::{HttpLookupService, LookupError, LookupService};
use crate::pipeline::{AppState, Completion, PendingSearch, SearchError, SearchTicket};
use crate::registry::upload_file_name;
use crate::render::{selection_html, selection_text};
use crate::selection::SelectionError;

pub const USAGE: &str = "usage: docsearch-core [--config <path>] [--endpoint <url>] [--html]";

const SESSION_HELP: &str = "commands:
  upload <path>    add a file name to the list (newest first)
  files            show the file list
  select <n|id>    choose a file by position or control id
  search <text>    search the selected file; separate keywords with commas
  show             redraw the file list and results
  quit             leave the session";

#[derive(Debug)]
pub enum RuntimeError {
    Config(ConfigError),
    Lookup(LookupError),
    Io(std::io::Error),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(error) => write!(f, "config error: {error}"),
            Self::Lookup(error) => write!(f, "lookup client error: {error}"),
            Self::Io(error) => write!(f, "io error: {error}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<ConfigError> for RuntimeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<LookupError> for RuntimeError {
    fn from(value: LookupError) -> Self {
        Self::Lookup(value)
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuntimeOptions {
    pub config_path: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub output: OutputFormat,
    pub show_help: bool,
}

pub fn parse_cli_args(args: &[String]) -> Result<RuntimeOptions, String> {
    let mut options = RuntimeOptions::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let value = iter.next().ok_or("--config requires a path")?;
                options.config_path = Some(PathBuf::from(value));
            }
            "--endpoint" => {
                let value = iter.next().ok_or("--endpoint requires a URL")?;
                options.endpoint = Some(value.clone());
            }
            "--html" => options.output = OutputFormat::Html,
            "--help" | "-h" => options.show_help = true,
            other => return Err(format!("unknown argument '{other}'. {USAGE}")),
        }
    }
    Ok(options)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Upload(String),
    Files,
    Select(String),
    Search(String),
    Show,
    Help,
    Quit,
    Nothing,
}

pub fn parse_command(line: &str) -> Result<SessionCommand, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(SessionCommand::Nothing);
    }

    let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (trimmed, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "upload" if rest.is_empty() => Err("upload requires a file path".to_string()),
        "upload" => Ok(SessionCommand::Upload(rest.to_string())),
        "files" | "ls" => Ok(SessionCommand::Files),
        "select" if rest.is_empty() => Err("select requires a position or id".to_string()),
        "select" => Ok(SessionCommand::Select(rest.to_string())),
        "search" => Ok(SessionCommand::Search(rest.to_string())),
        "show" => Ok(SessionCommand::Show),
        "help" | "?" => Ok(SessionCommand::Help),
        "quit" | "exit" => Ok(SessionCommand::Quit),
        other => Err(format!("unknown command '{other}'; type 'help'")),
    }
}

/// What the event loop must do after applying one command.
#[derive(Debug, Default)]
pub struct CommandEffect {
    pub output: Vec<String>,
    pub pending: Option<PendingSearch>,
    pub quit: bool,
}

pub fn apply_command(
    state: &mut AppState,
    command: SessionCommand,
    format: OutputFormat,
) -> CommandEffect {
    let mut effect = CommandEffect::default();
    match command {
        SessionCommand::Nothing => {}
        SessionCommand::Upload(raw) => match upload_file_name(&raw) {
            Some(name) => match state.add_file(&name) {
                Ok(()) => {
                    logging::info(&format!("file added name={name}"));
                    effect.output.push(selection_view(state, format));
                }
                Err(error) => effect.output.push(format!("[error] {error}")),
            },
            None => effect.output.push("[error] file name is required".to_string()),
        },
        SessionCommand::Files => effect.output.push(selection_view(state, format)),
        SessionCommand::Select(target) => {
            let chosen = match target.parse::<usize>() {
                Ok(0) => Err(SelectionError::OutOfRange {
                    index: 0,
                    len: state.selection().entries().len(),
                }),
                Ok(position) => state.select_index(position - 1),
                Err(_) => state.select(&target),
            };
            match chosen {
                Ok(entry) => effect.output.push(format!("selected: {}", entry.label)),
                Err(error) => effect.output.push(format!("[error] {error}")),
            }
        }
        SessionCommand::Search(query) => match state.begin_search(&query) {
            Ok(pending) => {
                logging::info(&format!(
                    "search issued generation={} file={} keywords={:?}",
                    pending.ticket.generation,
                    pending.request.payload.pdf_file_name,
                    pending.request.payload.keywords
                ));
                effect.output.push("searching...".to_string());
                effect.pending = Some(pending);
            }
            Err(error) => {
                logging::warn(&format!("search rejected: {error}"));
                effect.output.push(results_view(state, format));
                effect.output.push(format!("[alert] {error}"));
            }
        },
        SessionCommand::Show => {
            effect.output.push(selection_view(state, format));
            effect.output.push(results_view(state, format));
        }
        SessionCommand::Help => effect.output.push(SESSION_HELP.to_string()),
        SessionCommand::Quit => effect.quit = true,
    }
    effect
}

/// Applies a finished lookup and returns the lines to print, if any.
pub fn apply_completion(
    state: &mut AppState,
    ticket: &SearchTicket,
    outcome: Result<Option<SearchResult>, LookupError>,
    format: OutputFormat,
) -> Option<String> {
    match state.complete_search(ticket, outcome) {
        Completion::Rendered => {
            logging::info(&format!("search rendered generation={}", ticket.generation));
            Some(results_view(state, format))
        }
        Completion::Failed(error) => {
            if let SearchError::RequestFailed(reason) = &error {
                logging::warn(&format!(
                    "search failed generation={} reason={reason}",
                    ticket.generation
                ));
            }
            Some(results_view(state, format))
        }
        Completion::Discarded => {
            logging::debug(&format!(
                "stale search response discarded generation={}",
                ticket.generation
            ));
            None
        }
    }
}

fn selection_view(state: &AppState, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => selection_text(state.selection()),
        OutputFormat::Html => selection_html(state.selection()),
    }
}

fn results_view(state: &AppState, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => state.results().to_text(),
        OutputFormat::Html => state.results().to_html(),
    }
}

/// Loads the config, writes it on first run, then layers the session-only endpoint
/// overrides (environment first, `--endpoint` last) on top of what was saved.
pub fn prepare_config(
    options: &RuntimeOptions,
    env_endpoint: Option<&str>,
) -> Result<Config, RuntimeError> {
    let mut config = config::load(options.config_path.as_deref())?;
    if !config.config_path.exists() {
        config::save(&config)?;
        eprintln!(
            "[docsearch-core] wrote default config to {}",
            config.config_path.display()
        );
    }
    config::apply_endpoint_override(&mut config, env_endpoint)?;
    config::apply_endpoint_override(&mut config, options.endpoint.as_deref())?;
    Ok(config)
}

pub fn run_with_options(options: RuntimeOptions) -> Result<(), RuntimeError> {
    let config = prepare_config(&options, config::endpoint_from_env().as_deref())?;

    let level = LogLevel::parse(&config.log_level).unwrap_or(LogLevel::Info);
    match logging::init(level) {
        Ok(path) => eprintln!("[docsearch-core] logging to {}", path.display()),
        Err(error) => eprintln!("[docsearch-core] logging disabled: {error}"),
    }
    logging::info(&format!(
        "startup endpoint={} max_files={} config_path={}",
        config.endpoint,
        config.max_files,
        config.config_path.display()
    ));

    let lookup = HttpLookupService::from_config(&config)?;
    let state = AppState::from_config(&config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(event_loop(state, lookup, options.output))
}

type LookupOutcome = (SearchTicket, Result<Option<SearchResult>, LookupError>);

async fn event_loop(
    mut state: AppState,
    lookup: HttpLookupService,
    format: OutputFormat,
) -> Result<(), RuntimeError> {
    let (tx, mut rx) = mpsc::unbounded_channel::<LookupOutcome>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut in_flight = 0_usize;

    println!("{}", selection_view(&state, format));
    println!("{}", results_view(&state, format));

    while stdin_open || in_flight > 0 {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    continue;
                };

                let command = match parse_command(&line) {
                    Ok(command) => command,
                    Err(error) => {
                        println!("[error] {error}");
                        continue;
                    }
                };

                let effect = apply_command(&mut state, command, format);
                for output in &effect.output {
                    println!("{output}");
                }
                if let Some(pending) = effect.pending {
                    in_flight += 1;
                    let lookup = lookup.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let outcome = lookup.lookup(&pending.request).await;
                        let _ = tx.send((pending.ticket, outcome));
                    });
                }
                if effect.quit {
                    break;
                }
            }
            Some((ticket, outcome)) = rx.recv() => {
                in_flight = in_flight.saturating_sub(1);
                if let Some(output) = apply_completion(&mut state, &ticket, outcome, format) {
                    println!("{output}");
                }
            }
        }
    }

    logging::info("session closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        apply_command, apply_completion, parse_cli_args, parse_command, prepare_config,
        OutputFormat, RuntimeOptions, SessionCommand,
    };
    use crate::config::{self, DEFAULT_ENDPOINT};
    use crate::lookup::LookupError;
    use crate::pipeline::AppState;
    use crate::registry::FileRegistry;
    use std::path::PathBuf;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn cli_args_parse_all_flags() {
        let options = parse_cli_args(&args(&[
            "--config",
            "/tmp/docsearch.toml",
            "--endpoint",
            "http://localhost:9000/",
            "--html",
        ]))
        .unwrap();

        assert_eq!(options.config_path, Some(PathBuf::from("/tmp/docsearch.toml")));
        assert_eq!(options.endpoint.as_deref(), Some("http://localhost:9000/"));
        assert_eq!(options.output, OutputFormat::Html);
        assert!(!options.show_help);
    }

    #[test]
    fn cli_args_reject_missing_value_and_unknown_flag() {
        assert!(parse_cli_args(&args(&["--config"])).is_err());
        let error = parse_cli_args(&args(&["--verbose"])).unwrap_err();
        assert!(error.contains("unknown argument '--verbose'"));
    }

    #[test]
    fn commands_parse_verb_and_argument() {
        assert_eq!(
            parse_command("upload /tmp/My Spec.pdf").unwrap(),
            SessionCommand::Upload("/tmp/My Spec.pdf".into())
        );
        assert_eq!(
            parse_command("  search  valve, pressure ").unwrap(),
            SessionCommand::Search("valve, pressure".into())
        );
        assert_eq!(parse_command("search").unwrap(), SessionCommand::Search(String::new()));
        assert_eq!(parse_command("").unwrap(), SessionCommand::Nothing);
        assert!(parse_command("upload").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn upload_command_rerenders_file_list() {
        let mut state = AppState::new(FileRegistry::seeded(8, &["a.pdf"]));
        let effect = apply_command(
            &mut state,
            SessionCommand::Upload("C:\\docs\\b.pdf".into()),
            OutputFormat::Text,
        );

        assert_eq!(state.registry().list()[0], "b.pdf");
        assert_eq!(effect.output, vec!["( ) 1. b.pdf\n( ) 2. a.pdf".to_string()]);
    }

    #[test]
    fn select_command_is_one_based() {
        let mut state = AppState::new(FileRegistry::seeded(8, &["a.pdf", "b.pdf"]));
        let effect = apply_command(&mut state, SessionCommand::Select("2".into()), OutputFormat::Text);
        assert_eq!(effect.output, vec!["selected: b.pdf".to_string()]);

        let effect = apply_command(&mut state, SessionCommand::Select("0".into()), OutputFormat::Text);
        assert!(effect.output[0].starts_with("[error]"));
        assert_eq!(state.selection().get_selected(), Some("b.pdf"));
    }

    #[test]
    fn blank_search_alerts_without_pending_request() {
        let mut state = AppState::new(FileRegistry::seeded(8, &["a.pdf"]));
        state.select_index(0).unwrap();

        let effect = apply_command(&mut state, SessionCommand::Search("  ".into()), OutputFormat::Text);

        assert!(effect.pending.is_none());
        assert!(effect.output.iter().any(|line| line.starts_with("[alert]")));
    }

    #[test]
    fn failed_completion_prints_inline_error() {
        let mut state = AppState::new(FileRegistry::seeded(8, &["a.pdf"]));
        state.select_index(0).unwrap();
        let effect = apply_command(&mut state, SessionCommand::Search("valve".into()), OutputFormat::Html);
        let pending = effect.pending.expect("search should be issued");

        let output = apply_completion(
            &mut state,
            &pending.ticket,
            Err(LookupError::Status(500)),
            OutputFormat::Html,
        );

        assert_eq!(
            output.as_deref(),
            Some("<p>Error fetching data: No Result Found</p>")
        );
    }

    #[test]
    fn quit_command_stops_session() {
        let mut state = AppState::default();
        let effect = apply_command(&mut state, SessionCommand::Quit, OutputFormat::Text);
        assert!(effect.quit);
    }

    fn scratch_config_path(name: &str) -> PathBuf {
        let unique = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir()
            .join(format!("docsearch-runtime-{name}-{unique}"))
            .join("config.toml")
    }

    #[test]
    fn endpoint_overrides_apply_to_session_but_not_saved_file() {
        let path = scratch_config_path("overrides");
        let options = RuntimeOptions {
            config_path: Some(path.clone()),
            ..Default::default()
        };

        let session = prepare_config(&options, Some("http://transient.example/")).unwrap();
        assert_eq!(session.endpoint, "http://transient.example/");

        let saved = config::load(Some(&path)).unwrap();
        assert_eq!(saved.endpoint, DEFAULT_ENDPOINT);

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn cli_endpoint_wins_over_environment() {
        let path = scratch_config_path("cli-wins");
        let options = RuntimeOptions {
            config_path: Some(path.clone()),
            endpoint: Some("http://cli.example/".into()),
            ..Default::default()
        };

        let session = prepare_config(&options, Some("http://env.example/")).unwrap();
        assert_eq!(session.endpoint, "http://cli.example/");
        assert_eq!(config::load(Some(&path)).unwrap().endpoint, DEFAULT_ENDPOINT);

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
