//! Authorization request and decision types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Subject of an authorization request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestSubject {
    /// Subject name (e.g., "alice")
    pub name: String,

    /// Runtime roles held by the subject
    #[serde(default)]
    pub runtime_roles: Vec<String>,
}

impl RequestSubject {
    /// Create a subject with no runtime roles
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            runtime_roles: Vec::new(),
        }
    }

    /// Add a runtime role to the subject
    pub fn with_runtime_role(mut self, runtime_role: impl Into<String>) -> Self {
        self.runtime_roles.push(runtime_role.into());
        self
    }
}

/// Authorization request passed to rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    /// Who is asking
    pub subject: RequestSubject,

    /// Action being performed (a logical role name)
    pub action: String,

    /// Target resource, when the action has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    /// Additional context (time, origin, attributes)
    #[serde(default)]
    pub context: HashMap<String, serde_json::Value>,
}

impl AuthorizationRequest {
    /// Create a request for a subject and action
    pub fn new(subject: RequestSubject, action: impl Into<String>) -> Self {
        Self {
            subject,
            action: action.into(),
            resource: None,
            context: HashMap::new(),
        }
    }

    /// Set the target resource
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Add a context value
    pub fn with_context(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }
}

/// Outcome of rule evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationDecision {
    /// Unique decision id
    pub id: String,

    /// Whether the request is allowed
    pub allowed: bool,

    /// Once set, no further rules are consulted for the request
    pub immutable: bool,

    /// Rule that produced the decision
    pub rule: String,

    /// Reason for the decision
    pub reason: String,

    /// Decision timestamp (milliseconds since epoch)
    pub timestamp: u64,
}

impl AuthorizationDecision {
    fn new(allowed: bool, rule: impl Into<String>, reason: impl Into<String>) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0);

        Self {
            id: Uuid::new_v4().to_string(),
            allowed,
            immutable: false,
            rule: rule.into(),
            reason: reason.into(),
            timestamp,
        }
    }

    /// Create an allow decision
    pub fn allow(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(true, rule, reason)
    }

    /// Create a deny decision
    pub fn deny(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(false, rule, reason)
    }

    /// Mark the decision immutable
    pub fn as_immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    /// Whether the decision forecloses further rule evaluation
    pub fn is_immutable(&self) -> bool {
        self.immutable
    }
}
