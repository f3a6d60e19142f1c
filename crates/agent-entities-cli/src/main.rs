// crates/agent-entities-cli/src/main.rs
// ============================================================================
// Module: Agent Entities CLI Entry Point
// Description: Command dispatcher for entity type and entity workflows.
// Purpose: Manage a hosted agent's entity types from the command line.
// Dependencies: clap, agent-entities-{core,config,client}, serde_jcs, thiserror.
// ============================================================================

//! ## Overview
//! The CLI loads `agent-entities.toml`, resolves the target project, builds
//! the REST client, and runs one management operation. Text output is the
//! management layer's printed form; `--format json` emits canonical JSON of
//! the returned model instead. Errors go to stderr with exit code 1.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use agent_entities_client::ApiAuditSink;
use agent_entities_client::ApiFileAuditSink;
use agent_entities_client::ApiNoopAuditSink;
use agent_entities_client::ApiStderrAuditSink;
use agent_entities_client::HttpEntityTypesClient;
use agent_entities_client::RestClientConfig;
use agent_entities_config::AgentEntitiesConfig;
use agent_entities_config::AuditConfig;
use agent_entities_config::AuditSinkKind;
use agent_entities_core::AutoExpansionMode;
use agent_entities_core::DisplayName;
use agent_entities_core::EntityKind;
use agent_entities_core::EntityManagement;
use agent_entities_core::EntityType;
use agent_entities_core::EntityTypeId;
use agent_entities_core::EntityTypeManagement;
use agent_entities_core::ManagementError;
use agent_entities_core::ProjectId;
use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "agent-entities", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Config file path (defaults to agent-entities.toml or `AGENT_ENTITIES_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Project id (overrides config `project.id` and `GOOGLE_CLOUD_PROJECT`).
    #[arg(long, value_name = "ID", global = true)]
    project: Option<String>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Entity type management.
    EntityTypes {
        /// Selected entity type subcommand.
        #[command(subcommand)]
        command: EntityTypeCommand,
    },
    /// Entity management under an entity type.
    Entities {
        /// Selected entity subcommand.
        #[command(subcommand)]
        command: EntityCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Entity type subcommands.
#[derive(Subcommand, Debug)]
enum EntityTypeCommand {
    /// Create an entity type.
    Create(EntityTypeCreateCommand),
    /// Print ids of entity types with a display name.
    Ids(EntityTypeIdsCommand),
    /// List entity types in the project.
    List(FormatArgs),
    /// Show one entity type.
    Get(EntityTypeGetCommand),
    /// Delete an entity type.
    Delete(EntityTypeDeleteCommand),
}

/// Entity subcommands.
#[derive(Subcommand, Debug)]
enum EntityCommand {
    /// Create an entity value with synonyms.
    Create(EntityCreateCommand),
    /// List entity values and synonyms.
    List(EntityListCommand),
    /// Delete an entity value.
    Delete(EntityDeleteCommand),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the configuration file.
    Validate,
}

/// Output formats for read commands.
#[derive(ValueEnum, Copy, Clone, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// Canonical JSON output.
    Json,
}

/// Entity kinds accepted on the command line.
#[derive(ValueEnum, Copy, Clone, Debug, Default, PartialEq, Eq)]
enum KindArg {
    /// Values with synonym lists.
    #[default]
    Map,
    /// Plain values.
    List,
    /// Regular expression values.
    Regexp,
}

impl From<KindArg> for EntityKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Map => Self::Map,
            KindArg::List => Self::List,
            KindArg::Regexp => Self::Regexp,
        }
    }
}

/// Shared output format flag.
#[derive(Args, Debug)]
struct FormatArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for `entity-types create`.
#[derive(Args, Debug)]
struct EntityTypeCreateCommand {
    /// Display name of the new entity type.
    #[arg(long, value_name = "NAME")]
    display_name: String,
    /// Entity kind.
    #[arg(long, value_enum, default_value_t = KindArg::Map)]
    kind: KindArg,
    /// Enable automatic expansion of entity values.
    #[arg(long, action = ArgAction::SetTrue)]
    auto_expand: bool,
    /// Enable fuzzy extraction.
    #[arg(long, action = ArgAction::SetTrue)]
    fuzzy: bool,
}

/// Arguments for `entity-types ids`.
#[derive(Args, Debug)]
struct EntityTypeIdsCommand {
    /// Display name to match exactly.
    #[arg(long, value_name = "NAME")]
    display_name: String,
    /// Output format.
    #[command(flatten)]
    output: FormatArgs,
}

/// Arguments for `entity-types get`.
#[derive(Args, Debug)]
struct EntityTypeGetCommand {
    /// Entity type id.
    #[arg(long, value_name = "ID")]
    id: String,
    /// Output format.
    #[command(flatten)]
    output: FormatArgs,
}

/// Arguments for `entity-types delete`.
#[derive(Args, Debug)]
struct EntityTypeDeleteCommand {
    /// Entity type id.
    #[arg(long, value_name = "ID")]
    id: String,
}

/// Arguments for `entities create`.
#[derive(Args, Debug)]
struct EntityCreateCommand {
    /// Owning entity type id.
    #[arg(long, value_name = "ID")]
    entity_type_id: String,
    /// Entity value.
    #[arg(long, value_name = "VALUE")]
    value: String,
    /// Synonym for the value (repeatable).
    #[arg(long = "synonym", value_name = "SYNONYM")]
    synonyms: Vec<String>,
}

/// Arguments for `entities list`.
#[derive(Args, Debug)]
struct EntityListCommand {
    /// Owning entity type id.
    #[arg(long, value_name = "ID")]
    entity_type_id: String,
    /// Output format.
    #[command(flatten)]
    output: FormatArgs,
}

/// Arguments for `entities delete`.
#[derive(Args, Debug)]
struct EntityDeleteCommand {
    /// Owning entity type id.
    #[arg(long, value_name = "ID")]
    entity_type_id: String,
    /// Entity value to delete.
    #[arg(long, value_name = "VALUE")]
    value: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("agent-entities {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let globals = GlobalArgs {
        config: cli.config,
        project: cli.project,
    };
    match command {
        Commands::EntityTypes {
            command,
        } => command_entity_types(&globals, command),
        Commands::Entities {
            command,
        } => command_entities(&globals, command),
        Commands::Config {
            command,
        } => command_config(&globals, &command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Command Context
// ============================================================================

/// Global flags shared by every subcommand.
#[derive(Debug, Default)]
struct GlobalArgs {
    /// Explicit config path.
    config: Option<PathBuf>,
    /// Explicit project id.
    project: Option<String>,
}

/// Loaded config, resolved project, and a ready client.
struct CommandContext {
    /// Target project.
    project: ProjectId,
    /// REST backend.
    client: HttpEntityTypesClient,
}

/// Reads a process environment variable.
fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Loads config from an optional path.
fn load_config(path: Option<&Path>) -> CliResult<AgentEntitiesConfig> {
    AgentEntitiesConfig::load_with_env(path, &process_env)
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

/// Builds the context for a remote command.
fn build_context(globals: &GlobalArgs) -> CliResult<CommandContext> {
    let config = load_config(globals.config.as_deref())?;
    let project = config
        .resolve_project(globals.project.as_deref(), &process_env)
        .map_err(|err| CliError::new(err.to_string()))?;
    let token =
        config.resolve_access_token(&process_env).map_err(|err| CliError::new(err.to_string()))?;
    let audit = build_audit_sink(&config.audit)?;
    let client = HttpEntityTypesClient::new(rest_config(&config, token))
        .map_err(|err| CliError::new(format!("failed to build api client: {err}")))?
        .with_audit(audit);
    Ok(CommandContext {
        project,
        client,
    })
}

/// Maps the loaded config onto client transport settings.
fn rest_config(config: &AgentEntitiesConfig, access_token: Option<String>) -> RestClientConfig {
    let api = &config.api;
    RestClientConfig {
        endpoint: api.endpoint.clone(),
        api_version: api.api_version.clone(),
        language_code: api.language_code.clone(),
        timeout_ms: api.timeout_ms,
        max_response_bytes: api.max_response_bytes,
        page_size: api.page_size,
        max_pages: api.max_pages,
        allow_http: api.allow_http,
        user_agent: api.user_agent.clone(),
        operation_poll_interval_ms: api.operation_poll_interval_ms,
        operation_max_polls: api.operation_max_polls,
        access_token,
    }
}

/// Builds the configured audit sink.
fn build_audit_sink(config: &AuditConfig) -> CliResult<Arc<dyn ApiAuditSink>> {
    match config.sink {
        AuditSinkKind::None => Ok(Arc::new(ApiNoopAuditSink)),
        AuditSinkKind::Stderr => Ok(Arc::new(ApiStderrAuditSink)),
        AuditSinkKind::File => {
            let path = config.path.as_deref().ok_or_else(|| {
                CliError::new("audit.path is required for the file sink".to_string())
            })?;
            let sink = ApiFileAuditSink::new(path).map_err(|err| {
                CliError::new(format!("failed to open audit log {}: {err}", path.display()))
            })?;
            Ok(Arc::new(sink))
        }
    }
}

// ============================================================================
// SECTION: Entity Type Commands
// ============================================================================

/// Dispatches entity type subcommands.
fn command_entity_types(globals: &GlobalArgs, command: EntityTypeCommand) -> CliResult<ExitCode> {
    let context = build_context(globals)?;
    let management = EntityTypeManagement::new(&context.client);
    let mut stdout = std::io::stdout().lock();
    match command {
        EntityTypeCommand::Create(command) => {
            let entity_type = entity_type_from_args(&command)?;
            management
                .create_entity_type_from(&mut stdout, &context.project, &entity_type)
                .map_err(|err| management_error("entity-types create", &err))?;
        }
        EntityTypeCommand::Ids(command) => {
            let display_name = parse_display_name(&command.display_name)?;
            let ids = management
                .entity_type_ids(&display_name, &context.project)
                .map_err(|err| management_error("entity-types ids", &err))?;
            match command.output.format {
                OutputFormat::Text => {
                    for id in &ids {
                        write_line(&mut stdout, id.as_str())?;
                    }
                }
                OutputFormat::Json => {
                    let ids: Vec<&str> = ids.iter().map(EntityTypeId::as_str).collect();
                    write_canonical_json(&mut stdout, &ids)?;
                }
            }
        }
        EntityTypeCommand::List(output) => match output.format {
            OutputFormat::Text => {
                management
                    .list_entity_types(&mut stdout, &context.project)
                    .map_err(|err| management_error("entity-types list", &err))?;
            }
            OutputFormat::Json => {
                let types = management
                    .list_entity_types(&mut std::io::sink(), &context.project)
                    .map_err(|err| management_error("entity-types list", &err))?;
                write_canonical_json(&mut stdout, &types)?;
            }
        },
        EntityTypeCommand::Get(command) => {
            let id = parse_entity_type_id(&command.id)?;
            match command.output.format {
                OutputFormat::Text => {
                    management
                        .get_entity_type(&mut stdout, &id, &context.project)
                        .map_err(|err| management_error("entity-types get", &err))?;
                }
                OutputFormat::Json => {
                    let entity_type = management
                        .get_entity_type(&mut std::io::sink(), &id, &context.project)
                        .map_err(|err| management_error("entity-types get", &err))?;
                    write_canonical_json(&mut stdout, &entity_type)?;
                }
            }
        }
        EntityTypeCommand::Delete(command) => {
            let id = parse_entity_type_id(&command.id)?;
            management
                .delete_entity_type(&id, &context.project)
                .map_err(|err| management_error("entity-types delete", &err))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Builds the entity type definition for `entity-types create`.
fn entity_type_from_args(command: &EntityTypeCreateCommand) -> CliResult<EntityType> {
    let display_name = parse_display_name(&command.display_name)?;
    let mut entity_type = EntityType::new(&display_name, command.kind.into());
    if command.auto_expand {
        entity_type.auto_expansion_mode = AutoExpansionMode::Default;
    }
    entity_type.enable_fuzzy_extraction = command.fuzzy;
    Ok(entity_type)
}

// ============================================================================
// SECTION: Entity Commands
// ============================================================================

/// Dispatches entity subcommands.
fn command_entities(globals: &GlobalArgs, command: EntityCommand) -> CliResult<ExitCode> {
    let context = build_context(globals)?;
    let management = EntityManagement::new(&context.client);
    let mut stdout = std::io::stdout().lock();
    match command {
        EntityCommand::Create(command) => {
            let id = parse_entity_type_id(&command.entity_type_id)?;
            management
                .create_entity(
                    &mut stdout,
                    &context.project,
                    &id,
                    &command.value,
                    command.synonyms.as_slice(),
                )
                .map_err(|err| management_error("entities create", &err))?;
        }
        EntityCommand::List(command) => {
            let id = parse_entity_type_id(&command.entity_type_id)?;
            match command.output.format {
                OutputFormat::Text => {
                    management
                        .list_entities(&mut stdout, &context.project, &id)
                        .map_err(|err| management_error("entities list", &err))?;
                }
                OutputFormat::Json => {
                    let entities = management
                        .list_entities(&mut std::io::sink(), &context.project, &id)
                        .map_err(|err| management_error("entities list", &err))?;
                    write_canonical_json(&mut stdout, &entities)?;
                }
            }
        }
        EntityCommand::Delete(command) => {
            let id = parse_entity_type_id(&command.entity_type_id)?;
            management
                .delete_entity(&context.project, &id, &command.value)
                .map_err(|err| management_error("entities delete", &err))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(globals: &GlobalArgs, command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => command_config_validate(globals),
    }
}

/// Executes the config validation command.
fn command_config_validate(globals: &GlobalArgs) -> CliResult<ExitCode> {
    let _config = load_config(globals.config.as_deref())?;
    write_stdout_line("config ok").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Parsing Helpers
// ============================================================================

/// Parses a display name argument.
fn parse_display_name(value: &str) -> CliResult<DisplayName> {
    DisplayName::new(value).map_err(|err| CliError::new(format!("invalid display name: {err}")))
}

/// Parses an entity type id argument.
fn parse_entity_type_id(value: &str) -> CliResult<EntityTypeId> {
    EntityTypeId::new(value).map_err(|err| CliError::new(format!("invalid entity type id: {err}")))
}

/// Formats a management failure for a command.
fn management_error(command: &str, error: &ManagementError) -> CliError {
    CliError::new(format!("{command} failed: {error}"))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to an output stream.
fn write_line<W: Write + ?Sized>(out: &mut W, message: &str) -> CliResult<()> {
    writeln!(out, "{message}").map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes canonical JSON followed by a newline.
fn write_canonical_json<W: Write + ?Sized, T: Serialize>(
    out: &mut W,
    value: &T,
) -> CliResult<()> {
    let mut bytes = serde_jcs::to_vec(value)
        .map_err(|err| CliError::new(format!("failed to encode json output: {err}")))?;
    bytes.push(b'\n');
    out.write_all(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
