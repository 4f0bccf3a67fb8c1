// crates/toolwire-cli/src/main.rs
// ============================================================================
// Module: Toolwire CLI Entry Point
// Description: Command dispatcher for the Toolwire server and its clients.
// Purpose: Serve tools, call them, invoke the agent, and run evaluations.
// Dependencies: clap, serde_json, thiserror, tokio, toolwire-cli, toolwire-mcp
// ============================================================================

//! ## Overview
//! The `toolwire` binary starts the tool server and drives the client side of
//! the same wire contract: JSON-RPC tool calls over HTTP, streamed HTTP, or a
//! spawned stdio server, prompts against `/invocations`, the `/ping` health check,
//! and the out-of-process evaluation runner. All output goes through explicit
//! stdout/stderr helpers.

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
use std::time::Duration;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use toolwire_cli::EvaluationCommand;
use toolwire_cli::InvokeClient;
use toolwire_cli::McpClient;
use toolwire_cli::McpClientConfig;
use toolwire_cli::McpTransport;
use toolwire_cli::default_cases;
use toolwire_cli::generate_session_id;
use toolwire_config::ServerTransport;
use toolwire_config::ToolwireConfig;
use toolwire_mcp::InvocationRequest;
use toolwire_mcp::McpServer;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable used to hand the config path to a spawned server.
const CONFIG_ENV: &str = "TOOLWIRE_CONFIG";

/// Arguments that start a stdio server whatever `server.transport` says.
const STDIO_SERVE_ARGS: [&str; 3] = ["serve", "--transport", "stdio"];

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "toolwire", version, disable_help_subcommand = true)]
struct Cli {
    /// Config file path (defaults to toolwire.toml or `TOOLWIRE_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the tool server on the configured transport.
    Serve(ServeCommand),
    /// Tool server client utilities.
    Tools {
        /// Selected tools subcommand.
        #[command(subcommand)]
        command: ToolsCommand,
    },
    /// Send a prompt to the invocation endpoint.
    Invoke(InvokeCommand),
    /// Query the `/ping` health check next to the invocation endpoint.
    Ping,
    /// Send the builtin prompt cases and run the evaluator over the session.
    Evaluate(EvaluateCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Tools subcommands.
#[derive(Subcommand, Debug)]
enum ToolsCommand {
    /// List registered tools.
    List(ToolsListCommand),
    /// Call a tool by name.
    Call(ToolsCallCommand),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a Toolwire configuration file.
    Validate,
}

/// Tool server connection settings.
#[derive(Args, Debug, Default)]
struct McpClientArgs {
    /// Transport (defaults to the framing set by `server.stream_mode`).
    #[arg(long, value_enum)]
    transport: Option<McpTransportArg>,
    /// Tool server endpoint URL (defaults to the resolved remote endpoint).
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,
    /// Request timeout in milliseconds (defaults to `remote.timeout_ms`).
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,
}

/// Arguments for `serve`.
#[derive(Args, Debug, Default)]
struct ServeCommand {
    /// Transport override (defaults to `server.transport`).
    #[arg(long, value_enum)]
    transport: Option<ServeTransportArg>,
}

/// Arguments for `tools list`.
#[derive(Args, Debug)]
struct ToolsListCommand {
    /// Tool server connection settings.
    #[command(flatten)]
    client: McpClientArgs,
}

/// Arguments for `tools call`.
#[derive(Args, Debug)]
struct ToolsCallCommand {
    /// Tool name.
    name: String,
    /// Tool arguments as a JSON object.
    #[arg(long = "args", value_name = "JSON", default_value = "{}")]
    arguments: String,
    /// Tool server connection settings.
    #[command(flatten)]
    client: McpClientArgs,
}

/// Arguments for `invoke`.
#[derive(Args, Debug)]
struct InvokeCommand {
    /// Prompt text.
    prompt: String,
    /// User identifier (server default applies when omitted).
    #[arg(long, value_name = "ID")]
    user_id: Option<String>,
    /// Session identifier (generated when omitted).
    #[arg(long, value_name = "ID")]
    session_id: Option<String>,
}

/// Arguments for `evaluate`.
#[derive(Args, Debug)]
struct EvaluateCommand {
    /// Session to evaluate (generated when omitted).
    #[arg(long, value_name = "ID")]
    session_id: Option<String>,
    /// Agent identifier passed to the evaluator.
    #[arg(long, value_name = "ID")]
    agent_id: Option<String>,
    /// Evaluator name (repeatable; replaces the configured list).
    #[arg(long = "evaluator", value_name = "NAME", action = ArgAction::Append)]
    evaluators: Vec<String>,
    /// Evaluator program.
    #[arg(long, value_name = "PROGRAM")]
    program: Option<String>,
    /// Skip sending the builtin prompt cases.
    #[arg(long, action = ArgAction::SetTrue)]
    skip_cases: bool,
}

/// Transport selection for `serve`.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum ServeTransportArg {
    /// Content-Length framed JSON-RPC on stdin/stdout.
    Stdio,
    /// HTTP on `server.bind`.
    Http,
}

impl From<ServeTransportArg> for ServerTransport {
    fn from(value: ServeTransportArg) -> Self {
        match value {
            ServeTransportArg::Stdio => Self::Stdio,
            ServeTransportArg::Http => Self::Http,
        }
    }
}

/// Transport selection for tool server clients.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum McpTransportArg {
    /// Single JSON document per request.
    Http,
    /// Newline-delimited JSON documents.
    Ndjson,
    /// Server-sent events.
    Sse,
    /// Spawn `toolwire serve` and speak Content-Length framing.
    Stdio,
}

impl From<McpTransportArg> for McpTransport {
    fn from(value: McpTransportArg) -> Self {
        match value {
            McpTransportArg::Http => Self::Http,
            McpTransportArg::Ndjson => Self::Ndjson,
            McpTransportArg::Sse => Self::Sse,
            McpTransportArg::Stdio => Self::Stdio,
        }
    }
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
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve(command) => command_serve(config_path, &command).await,
        Commands::Tools {
            command,
        } => match command {
            ToolsCommand::List(command) => command_tools_list(config_path, &command).await,
            ToolsCommand::Call(command) => command_tools_call(config_path, &command).await,
        },
        Commands::Invoke(command) => command_invoke(config_path, command).await,
        Commands::Ping => command_ping(config_path).await,
        Commands::Evaluate(command) => command_evaluate(config_path, command).await,
        Commands::Config {
            command,
        } => match command {
            ConfigCommand::Validate => command_config_validate(config_path),
        },
    }
}

/// Loads and validates configuration.
fn load_config(config_path: Option<&Path>) -> CliResult<ToolwireConfig> {
    ToolwireConfig::load(config_path)
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(config_path: Option<&Path>, command: &ServeCommand) -> CliResult<ExitCode> {
    let config = serve_config(load_config(config_path)?, command);
    let server = McpServer::from_config(config)
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Applies `serve` flags on top of the loaded configuration.
fn serve_config(mut config: ToolwireConfig, command: &ServeCommand) -> ToolwireConfig {
    if let Some(transport) = command.transport {
        config.server.transport = transport.into();
    }
    config
}

// ============================================================================
// SECTION: Tools Commands
// ============================================================================

/// Executes `tools list`.
async fn command_tools_list(
    config_path: Option<&Path>,
    command: &ToolsListCommand,
) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let mut client = build_mcp_client(&command.client, &config, config_path)?;
    let tools = client
        .list_tools()
        .await
        .map_err(|err| CliError::new(format!("tools/list failed: {err}")))?;
    write_json_value(&serde_json::json!({ "tools": tools }))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `tools call`.
async fn command_tools_call(
    config_path: Option<&Path>,
    command: &ToolsCallCommand,
) -> CliResult<ExitCode> {
    let arguments = parse_tool_args(&command.arguments)?;
    let config = load_config(config_path)?;
    let mut client = build_mcp_client(&command.client, &config, config_path)?;
    let result = client
        .call_tool(&command.name, arguments)
        .await
        .map_err(|err| CliError::new(format!("tools/call failed: {err}")))?;
    write_json_value(&result)?;
    Ok(if result.is_error() { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

/// Parses `--args`, which must be a JSON object.
fn parse_tool_args(raw: &str) -> CliResult<Value> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|err| CliError::new(format!("invalid --args json: {err}")))?;
    if !value.is_object() {
        return Err(CliError::new("--args must be a json object".to_string()));
    }
    Ok(value)
}

/// Resolves client settings from flags, then configuration.
fn resolve_mcp_client_config(
    args: &McpClientArgs,
    config: &ToolwireConfig,
    config_path: Option<&Path>,
) -> CliResult<McpClientConfig> {
    let transport = args
        .transport
        .map_or_else(|| McpTransport::from_stream_mode(config.server.stream_mode), Into::into);
    let timeout = args.timeout_ms.map_or_else(|| config.remote.timeout(), Duration::from_millis);
    if transport == McpTransport::Stdio {
        let command = std::env::current_exe()
            .map_err(|err| CliError::new(format!("cannot locate toolwire binary: {err}")))?;
        let stdio_env = config_path
            .map(|path| vec![(CONFIG_ENV.to_string(), path.display().to_string())])
            .unwrap_or_default();
        return Ok(McpClientConfig {
            transport,
            endpoint: None,
            stdio_command: Some(command),
            stdio_args: STDIO_SERVE_ARGS.iter().map(ToString::to_string).collect(),
            stdio_env,
            timeout,
        });
    }
    let endpoint = match &args.endpoint {
        Some(endpoint) => endpoint.clone(),
        None => config
            .remote
            .endpoint()
            .map_err(|err| CliError::new(format!("invalid remote endpoint: {err}")))?
            .to_string(),
    };
    Ok(McpClientConfig::http(transport, &endpoint, timeout))
}

/// Builds a tool server client.
fn build_mcp_client(
    args: &McpClientArgs,
    config: &ToolwireConfig,
    config_path: Option<&Path>,
) -> CliResult<McpClient> {
    let client_config = resolve_mcp_client_config(args, config, config_path)?;
    McpClient::new(client_config)
        .map_err(|err| CliError::new(format!("tool client init failed: {err}")))
}

// ============================================================================
// SECTION: Invocation Commands
// ============================================================================

/// Executes `invoke`.
async fn command_invoke(config_path: Option<&Path>, command: InvokeCommand) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let client = build_invoke_client(&config)?;
    let request = InvocationRequest {
        prompt: Some(command.prompt),
        user_id: command.user_id,
        session_id: command.session_id,
    };
    let reply = client
        .invoke(&request)
        .await
        .map_err(|err| CliError::new(format!("invocation failed: {err}")))?;
    write_stderr_line(&format!("session: {}", reply.session_id))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    write_stdout_line(&reply.text()).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `ping`.
async fn command_ping(config_path: Option<&Path>) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let client = build_invoke_client(&config)?;
    let ping =
        client.ping().await.map_err(|err| CliError::new(format!("ping failed: {err}")))?;
    write_json_value(&ping)?;
    Ok(ExitCode::SUCCESS)
}

/// Builds the invocation client with the configured envelope priority.
fn build_invoke_client(config: &ToolwireConfig) -> CliResult<InvokeClient> {
    InvokeClient::new(&config.invocation, config.envelope.normalizer())
        .map_err(|err| CliError::new(format!("invocation client init failed: {err}")))
}

// ============================================================================
// SECTION: Evaluate Command
// ============================================================================

/// Executes `evaluate`.
async fn command_evaluate(
    config_path: Option<&Path>,
    command: EvaluateCommand,
) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let session_id = command.session_id.unwrap_or_else(generate_session_id);
    if !command.skip_cases {
        let client = build_invoke_client(&config)?;
        run_cases(&client, &session_id).await?;
    }
    let mut evaluation = EvaluationCommand::from_config(&config.evaluation, &session_id);
    evaluation.region = Some(config.remote.region.clone());
    if command.agent_id.is_some() {
        evaluation.agent_id = command.agent_id;
    }
    if let Some(program) = command.program {
        evaluation.program = program;
    }
    if !command.evaluators.is_empty() {
        evaluation.evaluators = command.evaluators;
    }
    let outcome = evaluation.run().await;
    write_stdout_line(outcome.stdout.trim_end())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    if outcome.succeeded() {
        return Ok(ExitCode::SUCCESS);
    }
    let status = if outcome.timed_out {
        "timed out".to_string()
    } else {
        outcome.exit_code.map_or_else(|| "no exit code".to_string(), |code| format!("exit {code}"))
    };
    write_stderr_line(&format!("evaluation failed ({status}): {}", outcome.stderr.trim_end()))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    Ok(ExitCode::FAILURE)
}

/// Sends every builtin prompt case under `session_id`.
///
/// Case failures are reported and do not stop the remaining cases.
async fn run_cases(client: &InvokeClient, session_id: &str) -> CliResult<()> {
    let cases = default_cases();
    for (index, case) in cases.iter().enumerate() {
        let request = InvocationRequest {
            prompt: Some(case.prompt.to_string()),
            user_id: None,
            session_id: Some(session_id.to_string()),
        };
        let line = match client.invoke(&request).await {
            Ok(reply) => format!("[{}/{}] {}: {}", index + 1, cases.len(), case.name, reply.text()),
            Err(err) => format!("[{}/{}] {}: failed: {err}", index + 1, cases.len(), case.name),
        };
        write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Config Command
// ============================================================================

/// Executes `config validate`.
fn command_config_validate(config_path: Option<&Path>) -> CliResult<ExitCode> {
    let _config = load_config(config_path)?;
    write_stdout_line("config ok").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a value as pretty JSON to stdout.
fn write_json_value(value: &impl Serialize) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("json output failed: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
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
