use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Remote operations exposed by the service. Each maps to a fixed path
/// appended to the configured base address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Search,
    SearchPassword,
    CreateTask,
    UpdateTask,
    DeleteTask,
    GetTasks,
    GetTask,
    GetReports,
    GetReport,
    GetChannels,
    UpdateChannel,
    DeleteChannel,
    WhoisSearch,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Search => "/search",
            Endpoint::SearchPassword => "/search-password",
            Endpoint::CreateTask => "/monitoring/create-task",
            Endpoint::UpdateTask => "/monitoring/update-task",
            Endpoint::DeleteTask => "/monitoring/delete-task",
            Endpoint::GetTasks => "/monitoring/get-tasks",
            Endpoint::GetTask => "/monitoring/get-task",
            Endpoint::GetReports => "/monitoring/get-reports",
            Endpoint::GetReport => "/monitoring/get-report",
            Endpoint::GetChannels => "/monitoring/get-channels",
            Endpoint::UpdateChannel => "/monitoring/update-channel",
            Endpoint::DeleteChannel => "/monitoring/delete-channel",
            Endpoint::WhoisSearch => "/whois/search",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// An endpoint plus the JSON object to send to it.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalRequest {
    pub endpoint: Endpoint,
    pub payload: Map<String, Value>,
}

impl LogicalRequest {
    pub fn new(endpoint: Endpoint, payload: Map<String, Value>) -> Self {
        Self { endpoint, payload }
    }

    /// Request with an empty `{}` body.
    pub fn empty(endpoint: Endpoint) -> Self {
        Self::new(endpoint, Map::new())
    }

    /// The request body. Always a JSON object, `{}` when there are no fields.
    pub fn body(&self) -> Value {
        Value::Object(self.payload.clone())
    }
}

/// Builds a payload field by field.
///
/// Optional fields go through `optional_text`/`optional_list`, which leave
/// the key out entirely when the value is absent or blank. Values that are
/// sent go out exactly as given. The service reads a present key as intent,
/// so `null`, `""` and `[]` are never emitted for them.
#[derive(Debug, Default)]
pub struct PayloadBuilder {
    fields: Map<String, Value>,
}

impl PayloadBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn optional_text(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(text) if !text.trim().is_empty() => self.field(key, text),
            _ => self,
        }
    }

    pub fn optional_list<I, S>(self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let items: Vec<Value> = values
            .into_iter()
            .filter_map(|v| {
                let v = v.as_ref();
                (!v.trim().is_empty()).then(|| Value::String(v.to_string()))
            })
            .collect();

        if items.is_empty() {
            self
        } else {
            self.field(key, Value::Array(items))
        }
    }

    pub fn build(self) -> Map<String, Value> {
        self.fields
    }
}

/// Parsed JSON body of a successful call.
///
/// Shape depends on the operation. Search-family results carry an `entries`
/// list and usually a numeric `balance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiResult(Value);

impl ApiResult {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The `entries` list, if the body is an object that has one.
    pub fn entries(&self) -> Option<&[Value]> {
        self.0.get("entries")?.as_array().map(Vec::as_slice)
    }

    pub fn balance(&self) -> Option<u64> {
        self.0.get("balance")?.as_u64()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for ApiResult {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
