//! Metal Cloud API client
//!
//! The API speaks JSON-RPC 2.0 over HTTPS. [`MetalCloudClient`] is the
//! capability set the commands depend on; [`ApiClient`] is the blocking
//! HTTP implementation used by the binary.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::core::config::Config;
use crate::core::model::{Infrastructure, Instance, InstanceArray, PowerOperation, Variable};

/// Errors that can occur while talking to the API
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("API endpoint is not configured (set {0} or add it to the config file)")]
    NotConfigured(&'static str),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Error object returned by the API, message passed through verbatim
    #[error("{message}")]
    Remote { code: i64, message: String },

    #[error("unexpected response to {method}: {message}")]
    Decode { method: String, message: String },
}

/// Remote operations used by the CLI commands
pub trait MetalCloudClient {
    fn instance_get(&self, instance_id: i64) -> Result<Instance, ClientError>;

    fn instance_array_get(&self, instance_array_id: i64) -> Result<InstanceArray, ClientError>;

    fn infrastructure_get(&self, infrastructure_id: i64) -> Result<Infrastructure, ClientError>;

    fn instance_server_power_set(
        &self,
        instance_id: i64,
        operation: PowerOperation,
    ) -> Result<(), ClientError>;

    /// Variables owned by the current user, keyed by name
    fn variables(&self, usage: Option<&str>) -> Result<BTreeMap<String, Variable>, ClientError>;
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// The API returns an empty JSON array instead of an empty object when a
/// user has no variables.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VariableSet {
    Map(BTreeMap<String, Variable>),
    List(Vec<Variable>),
}

impl VariableSet {
    fn into_map(self) -> BTreeMap<String, Variable> {
        match self {
            VariableSet::Map(map) => map,
            VariableSet::List(list) => list
                .into_iter()
                .map(|v| (v.variable_name.clone(), v))
                .collect(),
        }
    }
}

/// Blocking JSON-RPC client for the Metal Cloud API
pub struct ApiClient {
    http: reqwest::blocking::Client,
    endpoint: Option<String>,
    api_key: Option<String>,
    user_email: Option<String>,
    next_id: AtomicU64,
}

impl ApiClient {
    /// Create a client from the loaded configuration.
    ///
    /// A missing endpoint is not an error here; it is reported by the first
    /// call so that argument validation still runs first.
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs()))
            .user_agent(concat!("metalcloud-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            user_email: config.user_email.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    fn call<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> Result<T, ClientError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or(ClientError::NotConfigured("METALCLOUD_ENDPOINT"))?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = request_envelope(id, method, params);
        debug!(method, id, "calling API");

        let mut request = self.http.post(endpoint).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send()?;
        let status_error = response.error_for_status_ref().err();
        let body = response.text()?;

        // The API may report a JSON-RPC error with a non-2xx status; its
        // message wins over the HTTP status text.
        match (serde_json::from_str::<RpcResponse>(&body), status_error) {
            (Ok(rpc), None) => decode_response(method, rpc),
            (Ok(rpc), Some(_)) if rpc.error.is_some() => decode_response(method, rpc),
            (_, Some(err)) => Err(err.into()),
            (Err(e), None) => Err(ClientError::Decode {
                method: method.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

impl MetalCloudClient for ApiClient {
    fn instance_get(&self, instance_id: i64) -> Result<Instance, ClientError> {
        self.call("instance_get", vec![json!(instance_id)])
    }

    fn instance_array_get(&self, instance_array_id: i64) -> Result<InstanceArray, ClientError> {
        self.call("instance_array_get", vec![json!(instance_array_id)])
    }

    fn infrastructure_get(&self, infrastructure_id: i64) -> Result<Infrastructure, ClientError> {
        self.call("infrastructure_get", vec![json!(infrastructure_id)])
    }

    fn instance_server_power_set(
        &self,
        instance_id: i64,
        operation: PowerOperation,
    ) -> Result<(), ClientError> {
        let _: Value = self.call(
            "instance_server_power_set",
            vec![json!(instance_id), json!(operation.as_str())],
        )?;
        Ok(())
    }

    fn variables(&self, usage: Option<&str>) -> Result<BTreeMap<String, Variable>, ClientError> {
        let set: VariableSet = self.call("variables", vec![json!(self.user_email), json!(usage)])?;
        Ok(set.into_map())
    }
}

/// Build a JSON-RPC 2.0 request body
fn request_envelope(id: u64, method: &str, params: Vec<Value>) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    })
}

/// Turn a JSON-RPC response into the call's result
fn decode_response<T: DeserializeOwned>(method: &str, response: RpcResponse) -> Result<T, ClientError> {
    if let Some(err) = response.error {
        return Err(ClientError::Remote {
            code: err.code,
            message: err.message,
        });
    }

    let result = response.result.unwrap_or(Value::Null);
    serde_json::from_value(result).map_err(|e| ClientError::Decode {
        method: method.to_string(),
        message: e.to_string(),
    })
}
