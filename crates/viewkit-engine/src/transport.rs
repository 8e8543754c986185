//! The boundary to the HTTP layer.
//!
//! The engine decides whether a record is addressable and which key to send;
//! the [`Transport`] performs the request. Implementations own URL building,
//! authentication and retry policy.

use std::cell::RefCell;
use std::collections::VecDeque;

use serde_json::Value;
use viewkit_model::ResolvedKey;

use crate::error::TransportError;

/// Request/response access to one API.
///
/// Calls are awaited one at a time by their owning controller.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Fetch `resource` with the given query parameters.
    async fn get(
        &self,
        resource: &str,
        params: &[(String, String)],
    ) -> Result<Value, TransportError>;

    /// Create a record; returns the server's representation of it.
    async fn create(&self, resource: &str, body: &Value) -> Result<Value, TransportError>;

    /// Update the record addressed by `key`.
    async fn update(
        &self,
        resource: &str,
        key: &ResolvedKey,
        body: &Value,
    ) -> Result<Value, TransportError>;

    /// Delete the record addressed by `key`.
    async fn delete(&self, resource: &str, key: &ResolvedKey) -> Result<(), TransportError>;
}

/// One call observed by a [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Get {
        resource: String,
        params: Vec<(String, String)>,
    },
    Create {
        resource: String,
        body: Value,
    },
    Update {
        resource: String,
        key: ResolvedKey,
        body: Value,
    },
    Delete {
        resource: String,
        key: ResolvedKey,
    },
}

/// In-memory transport replaying queued responses and recording calls.
///
/// `get` pops the next queued response, or returns an empty array when the
/// queue is empty. Mutations echo their body, or fail if a failure is queued.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<Value, TransportError>>>,
    calls: RefCell<Vec<TransportCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome of the next call.
    pub fn push(&self, response: Result<Value, TransportError>) {
        self.responses.borrow_mut().push_back(response);
    }

    /// Queue a successful response payload.
    pub fn push_ok(&self, payload: Value) {
        self.push(Ok(payload));
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: TransportCall) {
        self.calls.borrow_mut().push(call);
    }

    fn next_or(&self, fallback: Value) -> Result<Value, TransportError> {
        self.responses.borrow_mut().pop_front().unwrap_or(Ok(fallback))
    }
}

impl Transport for ScriptedTransport {
    async fn get(
        &self,
        resource: &str,
        params: &[(String, String)],
    ) -> Result<Value, TransportError> {
        self.record(TransportCall::Get {
            resource: resource.to_string(),
            params: params.to_vec(),
        });
        self.next_or(Value::Array(Vec::new()))
    }

    async fn create(&self, resource: &str, body: &Value) -> Result<Value, TransportError> {
        self.record(TransportCall::Create {
            resource: resource.to_string(),
            body: body.clone(),
        });
        self.next_or(body.clone())
    }

    async fn update(
        &self,
        resource: &str,
        key: &ResolvedKey,
        body: &Value,
    ) -> Result<Value, TransportError> {
        self.record(TransportCall::Update {
            resource: resource.to_string(),
            key: key.clone(),
            body: body.clone(),
        });
        self.next_or(body.clone())
    }

    async fn delete(&self, resource: &str, key: &ResolvedKey) -> Result<(), TransportError> {
        self.record(TransportCall::Delete {
            resource: resource.to_string(),
            key: key.clone(),
        });
        self.next_or(Value::Null).map(|_| ())
    }
}
