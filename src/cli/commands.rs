//! Command handlers. Each builds one client, runs one operation and
//! renders the result.

use crate::api::client::{resolve_api_key, ApiClient, ClientContext};
use crate::api::operations::{ChannelType, ReverseWhois, SearchRequest, TaskSpec, WhoisQuery};
use crate::api::request::ApiResult;
use crate::cli::args::{
    ConfigCommands, ExportArgs, JsonOutputArgs, MonitoringCommands, ReverseWhoisArgs,
    SearchArgs, SearchPasswordArgs, TaskArgs, WhoisCommands,
};
use crate::config::Config;
use crate::export::writer::{self, ExportOutcome, OutputFormat};
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Everything a command needs besides its own arguments.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Option<u64>,
}

impl Context {
    /// Build a client from flags, environment and config file. Fails before
    /// any network activity when no API key is available.
    pub fn client(&self) -> Result<ApiClient> {
        let api_key = resolve_api_key([self.api_key.clone(), self.config.api.api_key.clone()])?;

        let base_url = self
            .base_url
            .clone()
            .unwrap_or_else(|| self.config.api.base_url.clone());
        let timeout = self
            .timeout
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.config.api.timeout());

        let context = ClientContext::new(api_key)?
            .with_base_url(base_url)
            .with_timeout(timeout);
        debug!(target: "cli", "client context: {:?}", context);

        Ok(ApiClient::new(context)?)
    }

    fn indent(&self) -> usize {
        self.config.output.json_indent
    }
}

// ============================================================================
// Output
// ============================================================================

/// Where a result goes and in which shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File { path: PathBuf, format: OutputFormat },
}

/// An explicit `--format` wins; otherwise a `.csv` target means CSV. A
/// format with no target writes to a timestamped file.
pub fn destination(output: Option<&Path>, format: Option<OutputFormat>) -> Destination {
    match (output, format) {
        (Some(path), format) => Destination::File {
            path: path.to_path_buf(),
            format: format.unwrap_or_else(|| OutputFormat::from_path(path)),
        },
        (None, Some(format)) => Destination::File {
            path: PathBuf::from(writer::default_filename(format)),
            format,
        },
        (None, None) => Destination::Stdout,
    }
}

fn emit(ctx: &Context, result: &ApiResult, destination: Destination) -> Result<()> {
    match destination {
        Destination::Stdout => writer::print_pretty(result, ctx.indent()),
        Destination::File { path, format } => {
            let outcome = writer::export(result, &path, format, ctx.indent())?;
            report(&outcome);
            Ok(())
        }
    }
}

fn emit_export(ctx: &Context, result: &ApiResult, export: &ExportArgs) -> Result<()> {
    emit(ctx, result, destination(export.output.as_deref(), export.format))
}

fn emit_json(ctx: &Context, result: &ApiResult, output: &JsonOutputArgs) -> Result<()> {
    let destination = match &output.output {
        Some(path) => Destination::File {
            path: path.clone(),
            format: OutputFormat::Json,
        },
        None => Destination::Stdout,
    };
    emit(ctx, result, destination)
}

fn report(outcome: &ExportOutcome) {
    match outcome {
        ExportOutcome::Json { path } => println!("Results saved to {}", path.display()),
        ExportOutcome::Csv { path, rows } => {
            println!("Results saved to {}", path.display());
            println!("Total entries exported: {}", rows);
        }
        ExportOutcome::NoEntries => println!("No entries found in results to export to CSV"),
    }
}

// ============================================================================
// Search
// ============================================================================

pub fn search(ctx: &Context, args: SearchArgs) -> Result<()> {
    let client = ctx.client()?;
    let request = SearchRequest::new(args.query)
        .page(args.page)
        .size(args.size)
        .wildcard(args.wildcard)
        .regex(args.regex)
        .de_dupe(args.dedupe);

    let result = client.search(request)?;
    emit_export(ctx, &result, &args.export)
}

pub fn search_password(ctx: &Context, args: SearchPasswordArgs) -> Result<()> {
    let client = ctx.client()?;
    let result = client.search_password(args.hash)?;
    emit_export(ctx, &result, &args.export)
}

// ============================================================================
// Monitoring
// ============================================================================

/// Parse comma-split channel names, dropping blanks.
pub fn parse_channels(raw: &[String]) -> Result<Vec<ChannelType>> {
    raw.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<ChannelType>().map_err(anyhow::Error::msg))
        .collect()
}

fn task_spec(task: TaskArgs) -> Result<TaskSpec> {
    let channels = parse_channels(&task.channels)?;
    Ok(TaskSpec::new(task.task_type, task.value).channels(channels))
}

pub fn monitoring(ctx: &Context, command: MonitoringCommands) -> Result<()> {
    let client = ctx.client()?;
    let stdout = JsonOutputArgs::default();

    let (result, output) = match command {
        MonitoringCommands::CreateTask(task) => {
            (client.monitoring_create_task(task_spec(task)?)?, stdout)
        }
        MonitoringCommands::UpdateTask { id, task } => {
            (client.monitoring_update_task(id, task_spec(task)?)?, stdout)
        }
        MonitoringCommands::SetStatus { id, state } => (
            client.monitoring_update_task_status(id, state.is_active())?,
            stdout,
        ),
        MonitoringCommands::DeleteTask { id } => (client.monitoring_delete_task(id)?, stdout),
        MonitoringCommands::GetTasks { page, output } => {
            (client.monitoring_get_tasks(page)?, output)
        }
        MonitoringCommands::GetTask { id, output } => (client.monitoring_get_task(id)?, output),
        MonitoringCommands::GetReports { page, output } => {
            (client.monitoring_get_reports(page)?, output)
        }
        MonitoringCommands::GetReport { id, output } => {
            (client.monitoring_get_report(id)?, output)
        }
        MonitoringCommands::GetChannels => (client.monitoring_get_channels()?, stdout),
        MonitoringCommands::UpdateChannel { channel, value } => {
            (client.monitoring_update_channel(channel, value)?, stdout)
        }
        MonitoringCommands::DeleteChannel { channel } => {
            (client.monitoring_delete_channel(channel)?, stdout)
        }
    };

    emit_json(ctx, &result, &output)
}

// ============================================================================
// WHOIS
// ============================================================================

fn reverse_criteria(args: ReverseWhoisArgs) -> (ReverseWhois, JsonOutputArgs) {
    let criteria = ReverseWhois {
        name: args.name,
        organization: args.organization,
        email: args.email,
        include: args.include,
        exclude: args.exclude,
    };
    (criteria, args.output)
}

pub fn whois(ctx: &Context, command: WhoisCommands) -> Result<()> {
    let (query, output) = match command {
        WhoisCommands::Lookup { domain, output } => (WhoisQuery::Lookup { domain }, output),
        WhoisCommands::History { domain, output } => (WhoisQuery::History { domain }, output),
        WhoisCommands::Reverse(args) => {
            let (criteria, output) = reverse_criteria(args);
            (WhoisQuery::Reverse(criteria), output)
        }
        WhoisCommands::Ip { ip, output } => (WhoisQuery::ReverseIp { ip }, output),
        WhoisCommands::Mx { mx, output } => (WhoisQuery::ReverseMx { mx }, output),
        WhoisCommands::Ns { ns, output } => (WhoisQuery::ReverseNs { ns }, output),
        WhoisCommands::Subdomain { domain, output } => {
            (WhoisQuery::SubdomainScan { domain }, output)
        }
    };

    let client = ctx.client()?;
    let result = client.whois(query)?;
    emit_json(ctx, &result, &output)
}

// ============================================================================
// Balance
// ============================================================================

pub fn balance(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    eprintln!("Note: the balance is read from a one-result search, which uses a query.");

    match client.probe_balance() {
        Some(balance) => println!("Account balance: {} credits", balance),
        None => println!("Account balance: unknown"),
    }
    Ok(())
}

// ============================================================================
// Config
// ============================================================================

/// Config commands load the file themselves; only `show` needs it to parse.
pub fn config(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let text = toml::to_string_pretty(&Config::load()?.masked())?;
            print!("{}", text);
        }
        ConfigCommands::Path => println!("{}", Config::get_config_path()?.display()),
        ConfigCommands::Init => {
            Config::init_wizard()?;
        }
    }
    Ok(())
}

pub fn generate_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error creating config directory {}", parent.display()))?;
    }
    std::fs::write(&path, Config::create_default_with_comments())
        .with_context(|| format!("Error writing config file {}", path.display()))?;

    println!("Configuration file created at: {:?}", path);
    println!("Edit this file to customize the DeHashed CLI.");
    Ok(())
}
