//! Rule evaluation through the engine
//!
//! Exercises composite evaluation end-to-end: resolved logical roles feed the
//! evaluation context, composites short-circuit on immutable decisions, and
//! failures surface unmodified.

mod common;

use common::harness;
use quarry_authz::{
    AuthorizationContext, AuthorizationDecision, AuthorizationRequest, AuthorizationRule,
    AuthzError, CombiningPolicy, CompositeAuthorizationRule, LogicalRoleRule, RequestSubject,
    Result, Tenant,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Rule with a fixed outcome, recording whether it was consulted
struct StaticRule {
    name: String,
    outcome: Option<AuthorizationDecision>,
    invoked: AtomicBool,
}

impl StaticRule {
    fn new(name: &str, outcome: Option<AuthorizationDecision>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            outcome,
            invoked: AtomicBool::new(false),
        })
    }
}

impl AuthorizationRule for StaticRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn authorize(
        &self,
        _request: &AuthorizationRequest,
        _context: &dyn AuthorizationContext,
    ) -> Result<Option<AuthorizationDecision>> {
        self.invoked.store(true, Ordering::SeqCst);
        Ok(self.outcome.clone())
    }
}

fn publish_request() -> AuthorizationRequest {
    AuthorizationRequest::new(
        RequestSubject::new("alice").with_runtime_role("Report Author"),
        "PublishAction",
    )
    .with_resource("/reports/q3.prpt")
}

#[tokio::test]
async fn test_resolved_roles_reach_leaf_rules() {
    let harness = harness();
    let t1 = Tenant::new("t1");

    // Bootstrap grants Report Author the PublishAction logical role
    let rule = CompositeAuthorizationRule::new(
        "publish-policy",
        CombiningPolicy::DenyOverrides,
        vec![Arc::new(LogicalRoleRule::new("PublishAction"))],
    );

    let decision = harness
        .engine
        .evaluate(Some(&t1), &publish_request(), &rule)
        .await
        .unwrap()
        .unwrap();
    assert!(decision.allowed);
}

#[tokio::test]
async fn test_subject_without_binding_gets_no_decision() {
    let harness = harness();
    let t1 = Tenant::new("t1");

    let request = AuthorizationRequest::new(
        RequestSubject::new("mallory").with_runtime_role("Contractor"),
        "PublishAction",
    );
    let rule = CompositeAuthorizationRule::new(
        "publish-policy",
        CombiningPolicy::DenyOverrides,
        vec![Arc::new(LogicalRoleRule::new("PublishAction"))],
    );

    let decision = harness
        .engine
        .evaluate(Some(&t1), &request, &rule)
        .await
        .unwrap();
    assert!(decision.is_none(), "abstention is not a deny");
}

#[tokio::test]
async fn test_immutable_deny_short_circuits_through_engine() {
    let harness = harness();
    let t1 = Tenant::new("t1");

    let quota = StaticRule::new(
        "quota",
        Some(AuthorizationDecision::deny("quota", "quota exceeded").as_immutable()),
    );
    let fallback = StaticRule::new(
        "fallback",
        Some(AuthorizationDecision::allow("fallback", "granted")),
    );
    let rule = CompositeAuthorizationRule::new(
        "publish-policy",
        CombiningPolicy::DenyOverrides,
        vec![
            Arc::new(LogicalRoleRule::new("PublishAction")),
            quota.clone(),
            fallback.clone(),
        ],
    );

    let decision = harness
        .engine
        .evaluate(Some(&t1), &publish_request(), &rule)
        .await
        .unwrap()
        .unwrap();

    assert!(!decision.allowed);
    assert_eq!(decision.rule, "quota");
    assert!(!fallback.invoked.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_nested_composites_through_engine() {
    let harness = harness();
    let t1 = Tenant::new("t1");

    let inner = Arc::new(CompositeAuthorizationRule::new(
        "inner",
        CombiningPolicy::AllMustAllow,
        vec![
            Arc::new(LogicalRoleRule::new("PublishAction")) as Arc<dyn AuthorizationRule>,
            StaticRule::new("audit", Some(AuthorizationDecision::allow("audit", "recorded"))),
        ],
    ));
    let outer = CompositeAuthorizationRule::new(
        "outer",
        CombiningPolicy::FirstDecisive,
        vec![inner],
    );

    let decision = harness
        .engine
        .evaluate(Some(&t1), &publish_request(), &outer)
        .await
        .unwrap()
        .unwrap();
    assert!(decision.allowed);
}

#[tokio::test]
async fn test_rule_errors_surface_from_evaluate() {
    let harness = harness();
    let t1 = Tenant::new("t1");

    struct FailingRule;

    impl AuthorizationRule for FailingRule {
        fn name(&self) -> &str {
            "failing"
        }

        fn authorize(
            &self,
            _request: &AuthorizationRequest,
            _context: &dyn AuthorizationContext,
        ) -> Result<Option<AuthorizationDecision>> {
            Err(AuthzError::Evaluation("directory unavailable".to_string()))
        }
    }

    let rule = CompositeAuthorizationRule::new(
        "publish-policy",
        CombiningPolicy::DenyOverrides,
        vec![Arc::new(FailingRule)],
    );

    let result = harness
        .engine
        .evaluate(Some(&t1), &publish_request(), &rule)
        .await;
    assert!(matches!(result, Err(AuthzError::Evaluation(_))));
}
