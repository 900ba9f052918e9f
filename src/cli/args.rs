//! Command-line argument definitions using clap.

use crate::api::client::API_KEY_ENV;
use crate::api::operations::{ChannelType, DEFAULT_PAGE, DEFAULT_SEARCH_SIZE};
use crate::export::writer::OutputFormat;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const EXAMPLES: &str = "\
Examples:
  # Search for email
  dehashed search \"email:user@example.com\"

  # Search with wildcard
  dehashed search \"username:admin*\" --wildcard

  # Save search results to CSV (format inferred from the extension)
  dehashed search \"domain:example.com\" --output results.csv

  # Search password hash (free)
  dehashed search-password 5f4dcc3b5aa765d61d8327deb882cf99

  # Create monitoring task
  dehashed monitoring create-task email monitor@example.com --channels email,webhook

  # Reverse WHOIS
  dehashed whois reverse --email admin@example.com

  # Check balance (runs a one-result search)
  dehashed balance";

/// DeHashed API command line interface
///
/// Breach search, password-hash lookup, monitoring and WHOIS against the
/// DeHashed API. The API key comes from --api-key, the DEHASHED_API_KEY
/// environment variable, or the config file, in that order.
#[derive(Parser, Debug)]
#[command(name = "dehashed")]
#[command(author, version, about, long_about = None)]
#[command(after_help = EXAMPLES, arg_required_else_help = true)]
pub struct Cli {
    /// DeHashed API key
    #[arg(short = 'k', long, env = API_KEY_ENV, hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Override the API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Write a commented default config file and exit
    #[arg(long)]
    pub generate_config: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Perform a search
    Search(SearchArgs),

    /// Search by password hash (free)
    SearchPassword(SearchPasswordArgs),

    /// Monitoring tasks, reports and notification channels
    #[command(subcommand)]
    Monitoring(MonitoringCommands),

    /// WHOIS lookups
    #[command(subcommand)]
    Whois(WhoisCommands),

    /// Check account balance (spends one search query)
    Balance,

    /// Inspect or create the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

// ============================================================================
// Output flags
// ============================================================================

/// Output target for commands that can export CSV.
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Save to file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (default: inferred from the file extension)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Output target for JSON-only commands.
#[derive(Args, Debug, Default)]
pub struct JsonOutputArgs {
    /// Save JSON to file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

// ============================================================================
// Search commands
// ============================================================================

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query (e.g., "email:user@example.com")
    pub query: String,

    /// Page number
    #[arg(long, default_value_t = DEFAULT_PAGE)]
    pub page: u32,

    /// Results per page
    #[arg(long, default_value_t = DEFAULT_SEARCH_SIZE)]
    pub size: u32,

    /// Enable wildcard matching
    #[arg(long)]
    pub wildcard: bool,

    /// Enable regex matching
    #[arg(long)]
    pub regex: bool,

    /// Remove duplicate entries
    #[arg(long)]
    pub dedupe: bool,

    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Args, Debug)]
pub struct SearchPasswordArgs {
    /// Password hash
    pub hash: String,

    #[command(flatten)]
    pub export: ExportArgs,
}

// ============================================================================
// Monitoring commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum MonitoringCommands {
    /// Create a monitoring task
    CreateTask(TaskArgs),

    /// Change a task's type, value and optionally channels
    UpdateTask {
        /// Task ID
        id: String,

        #[command(flatten)]
        task: TaskArgs,
    },

    /// Activate or deactivate a task
    SetStatus {
        /// Task ID
        id: String,

        #[arg(value_enum)]
        state: TaskState,
    },

    /// Delete a monitoring task
    DeleteTask {
        /// Task ID
        id: String,
    },

    /// List monitoring tasks
    GetTasks {
        /// Page number
        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: u32,

        #[command(flatten)]
        output: JsonOutputArgs,
    },

    /// Show one monitoring task
    GetTask {
        /// Task ID
        id: String,

        #[command(flatten)]
        output: JsonOutputArgs,
    },

    /// List monitoring reports
    GetReports {
        /// Page number
        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: u32,

        #[command(flatten)]
        output: JsonOutputArgs,
    },

    /// Show one monitoring report
    GetReport {
        /// Report ID
        id: String,

        #[command(flatten)]
        output: JsonOutputArgs,
    },

    /// List notification channels
    GetChannels,

    /// Set a notification channel's destination
    UpdateChannel {
        /// Channel type (email or webhook)
        channel: ChannelType,

        /// Email address or webhook URL
        value: String,
    },

    /// Remove a notification channel
    DeleteChannel {
        /// Channel type (email or webhook)
        channel: ChannelType,
    },
}

#[derive(Args, Debug)]
pub struct TaskArgs {
    /// Task type (email, username, phone, ip_address, address, name, vin, domain, password)
    #[arg(value_name = "TYPE")]
    pub task_type: String,

    /// Value to monitor
    pub value: String,

    /// Notification channels (comma-separated: email,webhook)
    #[arg(long, value_delimiter = ',')]
    pub channels: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    Active,
    Inactive,
}

impl TaskState {
    pub fn is_active(self) -> bool {
        self == TaskState::Active
    }
}

// ============================================================================
// WHOIS commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum WhoisCommands {
    /// WHOIS record for a domain
    Lookup {
        domain: String,
        #[command(flatten)]
        output: JsonOutputArgs,
    },

    /// Historical WHOIS records for a domain
    History {
        domain: String,
        #[command(flatten)]
        output: JsonOutputArgs,
    },

    /// Domains by registrant details
    Reverse(ReverseWhoisArgs),

    /// Domains hosted on an IP address
    Ip {
        ip: String,
        #[command(flatten)]
        output: JsonOutputArgs,
    },

    /// Domains using a mail server
    Mx {
        mx: String,
        #[command(flatten)]
        output: JsonOutputArgs,
    },

    /// Domains using a name server
    Ns {
        ns: String,
        #[command(flatten)]
        output: JsonOutputArgs,
    },

    /// Discover subdomains of a domain
    Subdomain {
        domain: String,
        #[command(flatten)]
        output: JsonOutputArgs,
    },
}

#[derive(Args, Debug, Default)]
pub struct ReverseWhoisArgs {
    /// Registrant name
    #[arg(long)]
    pub name: Option<String>,

    /// Registrant organization
    #[arg(long)]
    pub organization: Option<String>,

    /// Registrant email
    #[arg(long)]
    pub email: Option<String>,

    /// Terms results must contain (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Terms to exclude from results (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    #[command(flatten)]
    pub output: JsonOutputArgs,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration (API key masked)
    Show,

    /// Print the config file location
    Path,

    /// Interactively create or update the config file
    Init,
}
