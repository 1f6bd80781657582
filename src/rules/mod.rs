//! Authorization rule evaluation
//!
//! Rules implement [`AuthorizationRule`] and either produce a decision for a
//! request or abstain. Composition happens through
//! [`CompositeAuthorizationRule`], which combines an ordered list of member
//! rules under an explicit [`CombiningPolicy`].
//!
//! Rules never invoke each other directly. Nested evaluation goes through the
//! [`AuthorizationContext`], which also carries the resolver's output (the
//! granted logical roles) so leaf rules can consult it. Evaluation errors
//! propagate unmodified; a rule failure is never converted into a decision.

pub mod composite;
pub mod decision;

pub use composite::{CombiningPolicy, CompositeAuthorizationRule};
pub use decision::{AuthorizationDecision, AuthorizationRequest, RequestSubject};

use crate::error::Result;
use crate::types::LogicalRoleName;
use std::collections::HashSet;

/// A single authorization rule.
///
/// `Ok(None)` means the rule abstains; the request is outside its concern.
pub trait AuthorizationRule: Send + Sync {
    /// Stable rule name used in decisions and logs
    fn name(&self) -> &str;

    /// Evaluate the rule against a request
    fn authorize(
        &self,
        request: &AuthorizationRequest,
        context: &dyn AuthorizationContext,
    ) -> Result<Option<AuthorizationDecision>>;
}

/// Evaluation environment handed to every rule.
pub trait AuthorizationContext: Send + Sync {
    /// Evaluate a sub-rule against the request. Composites route their
    /// members through this so nesting works to arbitrary depth.
    fn authorize_rule(
        &self,
        request: &AuthorizationRequest,
        rule: &dyn AuthorizationRule,
    ) -> Result<Option<AuthorizationDecision>>;

    /// Logical roles the resolver granted the request's subject
    fn granted_logical_roles(&self) -> &HashSet<LogicalRoleName>;
}

/// Default evaluation context: direct dispatch over a resolved role set
pub struct EvaluationContext {
    granted: HashSet<LogicalRoleName>,
}

impl EvaluationContext {
    /// Create a context carrying the subject's granted logical roles
    pub fn new(granted: HashSet<LogicalRoleName>) -> Self {
        Self { granted }
    }
}

impl AuthorizationContext for EvaluationContext {
    fn authorize_rule(
        &self,
        request: &AuthorizationRequest,
        rule: &dyn AuthorizationRule,
    ) -> Result<Option<AuthorizationDecision>> {
        rule.authorize(request, self)
    }

    fn granted_logical_roles(&self) -> &HashSet<LogicalRoleName> {
        &self.granted
    }
}

/// Leaf rule allowing requests whose subject holds one logical role.
///
/// Abstains when the role is missing; denying is left to the surrounding
/// composite's policy.
pub struct LogicalRoleRule {
    name: String,
    required: LogicalRoleName,
}

impl LogicalRoleRule {
    /// Require the given logical role
    pub fn new(required: impl Into<String>) -> Self {
        let required = required.into();
        Self {
            name: format!("logical-role[{}]", required),
            required,
        }
    }
}

impl AuthorizationRule for LogicalRoleRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn authorize(
        &self,
        _request: &AuthorizationRequest,
        context: &dyn AuthorizationContext,
    ) -> Result<Option<AuthorizationDecision>> {
        if context.granted_logical_roles().contains(&self.required) {
            Ok(Some(AuthorizationDecision::allow(
                self.name(),
                format!("subject holds '{}'", self.required),
            )))
        } else {
            Ok(None)
        }
    }
}
