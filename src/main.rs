//! Purpose: `increase` CLI entry point: argument parsing, config, output helpers.
//! Role: Binary crate root; parses args, builds a `Client`, emits JSON on stdout.
//! Invariants: Objects are emitted from their raw wire text, never re-serialized models.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::ffi::OsString;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use increase::api::{
    AutoPager, Client, Decode, Environment, Error, ErrorKind, HasMetadata, Metadata, Page,
    to_exit_code,
};
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod command_dispatch;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse_from(std::env::args_os().collect::<Vec<OsString>>()) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Try `increase --help`."));
            }
        },
    };

    let config = ClientConfig {
        api_key: cli.api_key,
        sandbox: cli.sandbox,
        base_url: cli.base_url,
        timeout_ms: cli.timeout_ms,
        max_retries: cli.max_retries,
    };
    command_dispatch::dispatch_command(cli.command, &config).map_err(add_auth_hint)
}

#[derive(Parser)]
#[command(
    name = "increase",
    version,
    about = "Typed client for the Increase banking API",
    long_about = None,
    after_help = r#"EXAMPLES
  $ increase decode account --file account.json
  $ INCREASE_API_KEY=... increase --sandbox get account account_in71c4amph0vgo2qllky
  $ increase --sandbox list transaction --all

CONFIGURATION
  INCREASE_API_KEY       API key (or --api-key)
  INCREASE_ENVIRONMENT   production|sandbox (or --sandbox)
  INCREASE_BASE_URL      override the API origin (or --base-url)
  RUST_LOG               log filter for stderr diagnostics (default: warn)"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(long, global = true, help = "API key (default: $INCREASE_API_KEY)")]
    api_key: Option<String>,
    #[arg(
        long,
        global = true,
        conflicts_with = "base_url",
        help = "Use the sandbox environment"
    )]
    sandbox: bool,
    #[arg(
        long,
        global = true,
        value_hint = ValueHint::Url,
        help = "API origin, e.g. http://127.0.0.1:8080 for a local fake"
    )]
    base_url: Option<String>,
    #[arg(long, global = true, help = "Per-request timeout in milliseconds")]
    timeout_ms: Option<u64>,
    #[arg(long, global = true, help = "Retries for transient failures (default: 2)")]
    max_retries: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Decode a payload and report per-field metadata",
        long_about = r#"Decode a JSON object as the given resource without touching the network.

Reports each declared field as present, null or missing with its raw JSON,
plus any keys the resource does not declare."#
    )]
    Decode {
        #[arg(value_enum)]
        resource: Resource,
        #[arg(long, value_hint = ValueHint::FilePath, help = "Read from file (default: stdin)")]
        file: Option<PathBuf>,
    },
    #[command(about = "Retrieve one object by id")]
    Get {
        #[arg(value_enum)]
        resource: Resource,
        id: String,
    },
    #[command(about = "List objects as JSON lines")]
    List {
        #[arg(value_enum)]
        resource: Resource,
        #[arg(long, help = "Page size requested from the API")]
        limit: Option<u32>,
        #[arg(long, help = "Follow next_cursor until the list is exhausted")]
        all: bool,
    },
    #[command(about = "Generate shell completion scripts")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
    #[command(about = "Print version info")]
    Version,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Resource {
    Account,
    AccountNumber,
    AccountTransfer,
    AchTransfer,
    CardDispute,
    CheckDeposit,
    Transaction,
}

impl Resource {
    fn label(self) -> &'static str {
        match self {
            Resource::Account => "account",
            Resource::AccountNumber => "account_number",
            Resource::AccountTransfer => "account_transfer",
            Resource::AchTransfer => "ach_transfer",
            Resource::CardDispute => "card_dispute",
            Resource::CheckDeposit => "check_deposit",
            Resource::Transaction => "transaction",
        }
    }
}

struct ClientConfig {
    api_key: Option<String>,
    sandbox: bool,
    base_url: Option<String>,
    timeout_ms: Option<u64>,
    max_retries: Option<u32>,
}

impl ClientConfig {
    /// Flags win over `INCREASE_*` environment variables.
    fn build(&self) -> Result<Client, Error> {
        let mut client = Client::from_lookup(|name| match name {
            "INCREASE_API_KEY" => self
                .api_key
                .clone()
                .or_else(|| std::env::var(name).ok()),
            _ => std::env::var(name).ok(),
        })?;
        if self.sandbox {
            client = client.with_environment(Environment::Sandbox);
        }
        if let Some(base_url) = &self.base_url {
            client = client.with_base_url(base_url.clone())?;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            client = client.with_timeout(Duration::from_millis(timeout_ms));
        }
        if let Some(max_retries) = self.max_retries {
            client = client.with_max_retries(max_retries);
        }
        tracing::debug!(base_url = %client.base_url(), "client configured");
        Ok(client)
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(file: Option<&Path>) -> Result<String, Error> {
    match file {
        Some(path) => std::fs::read_to_string(path).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message(format!("failed to read {}", path.display()))
                .with_source(err)
        }),
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read stdin")
                    .with_source(err)
            })?;
            Ok(input)
        }
    }
}

fn metadata_report(resource: Resource, meta: &Metadata) -> Result<Value, Error> {
    let mut fields = Map::new();
    for (name, field) in meta.fields() {
        let mut entry = Map::new();
        entry.insert("status".to_string(), json!(field.status().as_str()));
        if let Some(raw) = field.raw() {
            entry.insert("raw".to_string(), raw_json(raw)?);
        }
        fields.insert(name.to_string(), Value::Object(entry));
    }
    let mut extras = Map::new();
    for (key, raw) in meta.extras() {
        extras.insert(key.to_string(), raw_json(raw)?);
    }
    Ok(json!({
        "resource": resource.label(),
        "fields": fields,
        "extras": extras,
    }))
}

fn raw_json(raw: &str) -> Result<Value, Error> {
    serde_json::from_str(raw).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("decoded raw value is not valid json")
            .with_source(err)
    })
}

fn emit_object<T: HasMetadata>(object: &T) -> Result<(), Error> {
    emit_json(raw_json(object.metadata().raw())?);
    Ok(())
}

fn emit_page<T: Decode + HasMetadata>(page: Page<T>) -> Result<RunOutcome, Error> {
    for item in page.items() {
        emit_line(raw_json(item.metadata().raw())?);
    }
    if let Some(cursor) = page.next_cursor() {
        tracing::info!(next_cursor = cursor, "more results available; pass --all to follow");
    }
    Ok(RunOutcome::ok())
}

fn emit_all<T: Decode + HasMetadata>(pager: AutoPager<T>) -> Result<RunOutcome, Error> {
    let mut count = 0usize;
    for item in pager {
        emit_line(raw_json(item?.metadata().raw())?);
        count += 1;
    }
    tracing::debug!(count, "listed every item");
    Ok(RunOutcome::ok())
}

fn emit_version_output() {
    if io::stdout().is_terminal() {
        println!("increase {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(json!({
            "name": "increase",
            "version": env!("CARGO_PKG_VERSION"),
        }));
    }
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_line(value: Value) {
    let json = serde_json::to_string(&value)
        .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err));
        return;
    }

    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn add_auth_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Authentication || err.hint().is_some() {
        return err;
    }
    err.with_hint("Check INCREASE_API_KEY; sandbox keys only work with --sandbox.")
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error",
        ErrorKind::Usage => "usage error",
        ErrorKind::Io => "i/o error",
        ErrorKind::Parse => "invalid json",
        ErrorKind::MissingField => "required field is missing",
        ErrorKind::TypeMismatch => "unexpected json type",
        ErrorKind::InvalidRequest => "invalid request",
        ErrorKind::Authentication => "authentication failed",
        ErrorKind::Permission => "permission denied",
        ErrorKind::NotFound => "not found",
        ErrorKind::Conflict => "conflict",
        ErrorKind::RateLimited => "rate limited",
        ErrorKind::Server => "server error",
    }
    .to_string()
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(field) = err.field() {
        inner.insert("field".to_string(), json!(field));
    }
    if let Some(expected) = err.expected() {
        inner.insert("expected".to_string(), json!(expected));
    }
    if let Some(actual) = err.actual() {
        inner.insert("actual".to_string(), json!(actual));
    }
    if let Some(status) = err.status() {
        inner.insert("status".to_string(), json!(status));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error) -> String {
    let mut lines = vec![format!("error: {}", error_message(err))];
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    if let Some(field) = err.field() {
        lines.push(format!("field: {field}"));
    }
    if let (Some(expected), Some(actual)) = (err.expected(), err.actual()) {
        lines.push(format!("expected: {expected}, found: {actual}"));
    }
    if let Some(status) = err.status() {
        lines.push(format!("status: {status}"));
    }
    if let Some(cause) = error_causes(err).first() {
        lines.push(format!("caused by: {cause}"));
    }
    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

#[cfg(test)]
mod tests {
    use super::{Cli, Resource, error_json, metadata_report};
    use clap::{CommandFactory, Parser};
    use increase::api::{Account, Error, ErrorKind};
    use increase::core::decode;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn sandbox_conflicts_with_base_url() {
        let parsed = Cli::try_parse_from([
            "increase",
            "--sandbox",
            "--base-url",
            "http://127.0.0.1:1",
            "version",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn error_json_carries_decode_context() {
        let err = Error::type_mismatch("integer", "string")
            .with_field("amount")
            .with_status(200);
        let value = error_json(&err);
        assert_eq!(value["error"]["kind"], "TypeMismatch");
        assert_eq!(value["error"]["field"], "amount");
        assert_eq!(value["error"]["expected"], "integer");
        assert_eq!(value["error"]["status"], 200);
        assert_eq!(Error::new(ErrorKind::Usage).kind(), ErrorKind::Usage);
    }

    #[test]
    fn report_lists_fields_and_extras() {
        let payload = r#"{"bank":"core_bank","closed_at":null,"created_at":"2020-01-31T23:59:59Z",
            "currency":"USD","id":"account_1","interest_accrued":"0.01","interest_rate":"0.055",
            "name":"Ops","program_id":"program_1","status":"open","type":"account","tier":"gold"}"#;
        let account: Account = decode::from_str(payload).expect("decode");
        let report = metadata_report(Resource::Account, &account.meta).expect("report");
        assert_eq!(report["resource"], "account");
        assert_eq!(report["fields"]["closed_at"]["status"], "null");
        assert_eq!(report["fields"]["entity_id"]["status"], "missing");
        assert_eq!(report["fields"]["name"]["raw"], "Ops");
        assert_eq!(report["extras"]["tier"], "gold");
    }
}
