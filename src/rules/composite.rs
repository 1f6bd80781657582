//! Composite rule evaluation
//!
//! A composite asks its member rules for decisions in configured order and
//! folds them through an accumulating result builder. The builder's state
//! machine runs `PENDING -> DECIDED(mutable)* -> DECIDED(immutable)` or ends
//! in no decision when the member list is exhausted without any rule firing.
//! Once the builder reports immutability, remaining members are never
//! evaluated.

use super::{AuthorizationContext, AuthorizationDecision, AuthorizationRequest, AuthorizationRule};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// How a composite folds member decisions into one result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CombiningPolicy {
    /// The first decision of any kind is final.
    FirstDecisive,

    /// A deny is immediately final; otherwise the result is an allow when at
    /// least one member allowed, and no decision when every member abstained.
    DenyOverrides,

    /// A deny is immediately final; an allow stands only when every member
    /// produced one. Any abstention yields no decision.
    AllMustAllow,
}

/// Accumulates member decisions under one combining policy.
struct CompositeResultBuilder {
    policy: CombiningPolicy,
    member_count: usize,
    fed: usize,
    decision: Option<AuthorizationDecision>,
    immutable: bool,
}

impl CompositeResultBuilder {
    fn new(policy: CombiningPolicy, member_count: usize) -> Self {
        Self {
            policy,
            member_count,
            fed: 0,
            decision: None,
            immutable: false,
        }
    }

    fn with_decision(&mut self, decision: AuthorizationDecision) {
        self.fed += 1;
        // A decision flagged immutable forecloses evaluation under every
        // policy, whatever the aggregate so far
        let forecloses = decision.is_immutable();

        match self.policy {
            CombiningPolicy::FirstDecisive => {
                self.decision = Some(decision);
                self.immutable = true;
            }
            CombiningPolicy::DenyOverrides | CombiningPolicy::AllMustAllow => {
                if decision.allowed {
                    if self.decision.is_none() {
                        self.decision = Some(decision);
                    }
                } else {
                    self.decision = Some(decision);
                    self.immutable = true;
                }
            }
        }

        if forecloses {
            self.immutable = true;
        }
    }

    fn is_immutable(&self) -> bool {
        self.immutable
    }

    fn build(self) -> Option<AuthorizationDecision> {
        match self.policy {
            CombiningPolicy::FirstDecisive | CombiningPolicy::DenyOverrides => self.decision,
            CombiningPolicy::AllMustAllow => {
                let denied = self.decision.as_ref().is_some_and(|decision| !decision.allowed);
                // A deny stands, an immutable allow ended the census early,
                // and a unanimous allow needs every member to have fired
                if denied || self.immutable || self.fed == self.member_count {
                    self.decision
                } else {
                    None
                }
            }
        }
    }
}

/// Ordered list of member rules combined under one policy.
pub struct CompositeAuthorizationRule {
    name: String,
    policy: CombiningPolicy,
    rules: Vec<Arc<dyn AuthorizationRule>>,
}

impl CompositeAuthorizationRule {
    /// Create a composite over its member rules
    pub fn new(
        name: impl Into<String>,
        policy: CombiningPolicy,
        rules: Vec<Arc<dyn AuthorizationRule>>,
    ) -> Self {
        Self {
            name: name.into(),
            policy,
            rules,
        }
    }

    /// The member rules in evaluation order
    pub fn rules(&self) -> &[Arc<dyn AuthorizationRule>] {
        &self.rules
    }

    /// The configured combining policy
    pub fn policy(&self) -> CombiningPolicy {
        self.policy
    }
}

impl AuthorizationRule for CompositeAuthorizationRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn authorize(
        &self,
        request: &AuthorizationRequest,
        context: &dyn AuthorizationContext,
    ) -> Result<Option<AuthorizationDecision>> {
        let mut builder = CompositeResultBuilder::new(self.policy, self.rules.len());

        for rule in &self.rules {
            // The context dispatches members, nested composites included.
            // A member error propagates and discards the accumulation.
            if let Some(decision) = context.authorize_rule(request, rule.as_ref())? {
                builder.with_decision(decision);

                if builder.is_immutable() {
                    // The outcome can no longer change; skip remaining rules
                    debug!(rule = self.name.as_str(), "composite short-circuited");
                    break;
                }
            }
        }

        Ok(builder.build())
    }
}
