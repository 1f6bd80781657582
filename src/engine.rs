//! Authorization engine façade
//!
//! Ties binding resolution to rule evaluation behind the surface other
//! platform subsystems call:
//!
//! ```text
//! Request -> RoleBindingResolver -> EvaluationContext -> rule tree -> Decision
//!               |                                                        |
//!            [BindingCache / BindingStore]                          [tracing]
//! ```

use crate::error::Result;
use crate::resolver::{RoleBindingResolver, RoleBindingSnapshot};
use crate::rules::{
    AuthorizationContext, AuthorizationDecision, AuthorizationRequest, AuthorizationRule,
    EvaluationContext,
};
use crate::types::{LogicalRoleName, RuntimeRoleName, Tenant};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Main authorization surface of the platform
pub struct AuthorizationEngine {
    resolver: Arc<RoleBindingResolver>,
}

impl AuthorizationEngine {
    /// Create an engine over a binding resolver
    pub fn new(resolver: Arc<RoleBindingResolver>) -> Self {
        Self { resolver }
    }

    /// The underlying resolver
    pub fn resolver(&self) -> &Arc<RoleBindingResolver> {
        &self.resolver
    }

    /// Logical roles granted by the given runtime roles
    pub async fn resolve(
        &self,
        tenant: Option<&Tenant>,
        runtime_role_names: &[RuntimeRoleName],
    ) -> Result<HashSet<LogicalRoleName>> {
        self.resolver.resolve(tenant, runtime_role_names).await
    }

    /// Write one runtime role's binding
    pub async fn set_binding(
        &self,
        tenant: Option<&Tenant>,
        runtime_role_name: &str,
        logical_role_names: &[LogicalRoleName],
    ) -> Result<()> {
        self.resolver
            .set_binding(tenant, runtime_role_name, logical_role_names)
            .await
    }

    /// Full binding map for a tenant, immutable entries included
    pub async fn list_all_bindings(
        &self,
        tenant: Option<&Tenant>,
    ) -> Result<HashMap<RuntimeRoleName, Vec<LogicalRoleName>>> {
        self.resolver.list_all_bindings(tenant).await
    }

    /// Administrative snapshot of a tenant's bindings for one locale
    pub async fn binding_snapshot(
        &self,
        tenant: Option<&Tenant>,
        locale: &str,
    ) -> Result<RoleBindingSnapshot> {
        self.resolver.binding_snapshot(tenant, locale).await
    }

    /// Evaluate a rule tree against a request.
    ///
    /// The subject's runtime roles are resolved first; the resulting logical
    /// roles ride along in the evaluation context for any rule that wants
    /// them. `Ok(None)` means no rule produced a decision; the policy for
    /// that case belongs to the caller.
    pub async fn evaluate(
        &self,
        tenant: Option<&Tenant>,
        request: &AuthorizationRequest,
        rule: &dyn AuthorizationRule,
    ) -> Result<Option<AuthorizationDecision>> {
        debug!(
            subject = request.subject.name.as_str(),
            action = request.action.as_str(),
            "authorization request"
        );

        let granted = self
            .resolver
            .resolve(tenant, &request.subject.runtime_roles)
            .await?;
        let context = EvaluationContext::new(granted);
        let decision = context.authorize_rule(request, rule)?;

        match &decision {
            Some(decision) => info!(
                allowed = decision.allowed,
                rule = decision.rule.as_str(),
                "authorization decision"
            ),
            None => debug!("no rule produced a decision"),
        }
        Ok(decision)
    }
}
