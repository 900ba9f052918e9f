//! The fixed set of remote operations.
//!
//! Each operation is a typed argument struct (or variant) that knows its
//! endpoint and builds its own payload. Optional arguments are `Option`s or
//! possibly-empty lists, and are left out of the payload when absent.

use crate::api::client::ApiClient;
use crate::api::error::Result;
use crate::api::request::{ApiResult, Endpoint, LogicalRequest, PayloadBuilder};
use crate::api::transport::Transport;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_SEARCH_SIZE: u32 = 10_000;

/// Query used by [`ApiClient::probe_balance`].
pub const BALANCE_PROBE_QUERY: &str = "email:test@test.com";

/// General search. All fields are always sent; the optional ones carry their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub page: u32,
    pub size: u32,
    pub wildcard: bool,
    pub regex: bool,
    pub de_dupe: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: DEFAULT_PAGE,
            size: DEFAULT_SEARCH_SIZE,
            wildcard: false,
            regex: false,
            de_dupe: false,
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn wildcard(mut self, wildcard: bool) -> Self {
        self.wildcard = wildcard;
        self
    }

    pub fn regex(mut self, regex: bool) -> Self {
        self.regex = regex;
        self
    }

    pub fn de_dupe(mut self, de_dupe: bool) -> Self {
        self.de_dupe = de_dupe;
        self
    }
}

/// Destination kind for monitoring alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    Email,
    Webhook,
}

impl ChannelType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelType::Email => "email",
            ChannelType::Webhook => "webhook",
        }
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(ChannelType::Email),
            "webhook" => Ok(ChannelType::Webhook),
            other => Err(format!(
                "unknown channel type '{other}' (expected email or webhook)"
            )),
        }
    }
}

/// A standing watch on a value. `task_type` is one of the service's task
/// kinds (email, username, phone, ip_address, address, name, vin, domain,
/// password) and is passed through unchecked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub task_type: String,
    pub value: String,
    pub channels: Vec<ChannelType>,
}

impl TaskSpec {
    pub fn new(task_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            task_type: task_type.into(),
            value: value.into(),
            channels: Vec::new(),
        }
    }

    pub fn channels(mut self, channels: impl IntoIterator<Item = ChannelType>) -> Self {
        self.channels = channels.into_iter().collect();
        self
    }

    fn payload(&self) -> PayloadBuilder {
        PayloadBuilder::new()
            .field("type", self.task_type.as_str())
            .field("value", self.value.as_str())
            .optional_list("channels", self.channels.iter().map(|c| c.as_str()))
    }
}

/// Reverse WHOIS criteria. None of them is required; a query with no
/// criteria sends only `search_type`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseWhois {
    pub name: Option<String>,
    pub organization: Option<String>,
    pub email: Option<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// The WHOIS search variants, all served by `/whois/search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhoisQuery {
    Lookup { domain: String },
    History { domain: String },
    Reverse(ReverseWhois),
    ReverseIp { ip: String },
    ReverseMx { mx: String },
    ReverseNs { ns: String },
    SubdomainScan { domain: String },
}

impl WhoisQuery {
    pub fn search_type(&self) -> &'static str {
        match self {
            WhoisQuery::Lookup { .. } => "whois",
            WhoisQuery::History { .. } => "whois-history",
            WhoisQuery::Reverse(_) => "reverse-whois",
            WhoisQuery::ReverseIp { .. } => "reverse-ip",
            WhoisQuery::ReverseMx { .. } => "reverse-mx",
            WhoisQuery::ReverseNs { .. } => "reverse-ns",
            WhoisQuery::SubdomainScan { .. } => "subdomain-scan",
        }
    }

    fn payload(&self) -> PayloadBuilder {
        let builder = PayloadBuilder::new().field("search_type", self.search_type());
        match self {
            WhoisQuery::Lookup { domain }
            | WhoisQuery::History { domain }
            | WhoisQuery::SubdomainScan { domain } => builder.field("domain", domain.as_str()),
            // The service takes the IP/MX/NS target in the `domain` field.
            WhoisQuery::ReverseIp { ip: target }
            | WhoisQuery::ReverseMx { mx: target }
            | WhoisQuery::ReverseNs { ns: target } => builder.field("domain", target.as_str()),
            WhoisQuery::Reverse(criteria) => builder
                .optional_text("name", criteria.name.as_deref())
                .optional_text("organization", criteria.organization.as_deref())
                .optional_text("email", criteria.email.as_deref())
                .optional_list("include", &criteria.include)
                .optional_list("exclude", &criteria.exclude),
        }
    }
}

/// Every operation the client can perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Search(SearchRequest),
    SearchPassword { hash: String },
    CreateTask(TaskSpec),
    UpdateTask { id: String, spec: TaskSpec },
    UpdateTaskStatus { id: String, active: bool },
    DeleteTask { id: String },
    GetTasks { page: u32 },
    GetTask { id: String },
    GetReports { page: u32 },
    GetReport { id: String },
    GetChannels,
    UpdateChannel { channel: ChannelType, value: String },
    DeleteChannel { channel: ChannelType },
    Whois(WhoisQuery),
}

impl Operation {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Operation::Search(_) => Endpoint::Search,
            Operation::SearchPassword { .. } => Endpoint::SearchPassword,
            Operation::CreateTask(_) => Endpoint::CreateTask,
            Operation::UpdateTask { .. } | Operation::UpdateTaskStatus { .. } => {
                Endpoint::UpdateTask
            }
            Operation::DeleteTask { .. } => Endpoint::DeleteTask,
            Operation::GetTasks { .. } => Endpoint::GetTasks,
            Operation::GetTask { .. } => Endpoint::GetTask,
            Operation::GetReports { .. } => Endpoint::GetReports,
            Operation::GetReport { .. } => Endpoint::GetReport,
            Operation::GetChannels => Endpoint::GetChannels,
            Operation::UpdateChannel { .. } => Endpoint::UpdateChannel,
            Operation::DeleteChannel { .. } => Endpoint::DeleteChannel,
            Operation::Whois(_) => Endpoint::WhoisSearch,
        }
    }

    /// Build the request this operation sends. Pure; nothing is transmitted.
    pub fn to_request(&self) -> LogicalRequest {
        let payload = match self {
            Operation::Search(search) => PayloadBuilder::new()
                .field("query", search.query.as_str())
                .field("page", search.page)
                .field("size", search.size)
                .field("wildcard", search.wildcard)
                .field("regex", search.regex)
                .field("de_dupe", search.de_dupe),
            Operation::SearchPassword { hash } => {
                PayloadBuilder::new().field("hash", hash.as_str())
            }
            Operation::CreateTask(spec) => spec.payload(),
            Operation::UpdateTask { id, spec } => spec.payload().field("id", id.as_str()),
            Operation::UpdateTaskStatus { id, active } => PayloadBuilder::new()
                .field("id", id.as_str())
                .field("active", *active),
            Operation::DeleteTask { id }
            | Operation::GetTask { id }
            | Operation::GetReport { id } => PayloadBuilder::new().field("id", id.as_str()),
            Operation::GetTasks { page } | Operation::GetReports { page } => {
                PayloadBuilder::new().field("page", *page)
            }
            Operation::GetChannels => PayloadBuilder::new(),
            Operation::UpdateChannel { channel, value } => PayloadBuilder::new()
                .field("type", channel.as_str())
                .field("value", value.as_str()),
            Operation::DeleteChannel { channel } => {
                PayloadBuilder::new().field("channel", channel.as_str())
            }
            Operation::Whois(query) => query.payload(),
        };

        LogicalRequest::new(self.endpoint(), payload.build())
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn execute(&self, operation: &Operation) -> Result<ApiResult> {
        self.submit(&operation.to_request())
    }

    pub fn search(&self, request: SearchRequest) -> Result<ApiResult> {
        self.execute(&Operation::Search(request))
    }

    /// Look up records by password hash. Free of credits on the service side.
    pub fn search_password(&self, hash: impl Into<String>) -> Result<ApiResult> {
        self.execute(&Operation::SearchPassword { hash: hash.into() })
    }

    pub fn monitoring_create_task(&self, spec: TaskSpec) -> Result<ApiResult> {
        self.execute(&Operation::CreateTask(spec))
    }

    /// Replace a task's type and value. Leaving `spec.channels` empty keeps
    /// the task's current channels.
    pub fn monitoring_update_task(
        &self,
        id: impl Into<String>,
        spec: TaskSpec,
    ) -> Result<ApiResult> {
        self.execute(&Operation::UpdateTask {
            id: id.into(),
            spec,
        })
    }

    pub fn monitoring_update_task_status(
        &self,
        id: impl Into<String>,
        active: bool,
    ) -> Result<ApiResult> {
        self.execute(&Operation::UpdateTaskStatus {
            id: id.into(),
            active,
        })
    }

    pub fn monitoring_delete_task(&self, id: impl Into<String>) -> Result<ApiResult> {
        self.execute(&Operation::DeleteTask { id: id.into() })
    }

    pub fn monitoring_get_tasks(&self, page: u32) -> Result<ApiResult> {
        self.execute(&Operation::GetTasks { page })
    }

    pub fn monitoring_get_task(&self, id: impl Into<String>) -> Result<ApiResult> {
        self.execute(&Operation::GetTask { id: id.into() })
    }

    pub fn monitoring_get_reports(&self, page: u32) -> Result<ApiResult> {
        self.execute(&Operation::GetReports { page })
    }

    pub fn monitoring_get_report(&self, id: impl Into<String>) -> Result<ApiResult> {
        self.execute(&Operation::GetReport { id: id.into() })
    }

    pub fn monitoring_get_channels(&self) -> Result<ApiResult> {
        self.execute(&Operation::GetChannels)
    }

    pub fn monitoring_update_channel(
        &self,
        channel: ChannelType,
        value: impl Into<String>,
    ) -> Result<ApiResult> {
        self.execute(&Operation::UpdateChannel {
            channel,
            value: value.into(),
        })
    }

    pub fn monitoring_delete_channel(&self, channel: ChannelType) -> Result<ApiResult> {
        self.execute(&Operation::DeleteChannel { channel })
    }

    pub fn whois(&self, query: WhoisQuery) -> Result<ApiResult> {
        self.execute(&Operation::Whois(query))
    }

    pub fn whois_lookup(&self, domain: impl Into<String>) -> Result<ApiResult> {
        self.whois(WhoisQuery::Lookup {
            domain: domain.into(),
        })
    }

    pub fn whois_history(&self, domain: impl Into<String>) -> Result<ApiResult> {
        self.whois(WhoisQuery::History {
            domain: domain.into(),
        })
    }

    pub fn whois_reverse(&self, criteria: ReverseWhois) -> Result<ApiResult> {
        self.whois(WhoisQuery::Reverse(criteria))
    }

    pub fn whois_ip(&self, ip: impl Into<String>) -> Result<ApiResult> {
        self.whois(WhoisQuery::ReverseIp { ip: ip.into() })
    }

    pub fn whois_mx(&self, mx: impl Into<String>) -> Result<ApiResult> {
        self.whois(WhoisQuery::ReverseMx { mx: mx.into() })
    }

    pub fn whois_ns(&self, ns: impl Into<String>) -> Result<ApiResult> {
        self.whois(WhoisQuery::ReverseNs { ns: ns.into() })
    }

    pub fn whois_subdomain_scan(&self, domain: impl Into<String>) -> Result<ApiResult> {
        self.whois(WhoisQuery::SubdomainScan {
            domain: domain.into(),
        })
    }

    /// Read the account balance by running a one-result search.
    ///
    /// The service only reports the balance on search responses, so this
    /// performs a real search for [`BALANCE_PROBE_QUERY`] and spends one
    /// query of quota. Any failure yields `None` instead of an error.
    pub fn probe_balance(&self) -> Option<u64> {
        match self.search(SearchRequest::new(BALANCE_PROBE_QUERY).size(1)) {
            Ok(result) => result.balance(),
            Err(e) => {
                warn!(target: "api", "balance probe failed, balance unknown: {}", e);
                None
            }
        }
    }
}
