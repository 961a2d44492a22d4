//! Gateway request/response envelope types.
//!
//! The serialized shape is consumed by the calling gateway and must match
//! it bit-for-bit: `principalId` plus a fixed-version policy document with
//! a single `execute-api:Invoke` statement binding the effect to the
//! invoked resource.

use serde::{Deserialize, Serialize};

/// Policy document version understood by the gateway.
pub const POLICY_VERSION: &str = "2012-10-17";

/// The action every emitted statement authorizes or denies.
pub const INVOKE_ACTION: &str = "execute-api:Invoke";

/// Inbound invocation from the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerRequest {
    /// The raw authorization credential (a Cookie header value).
    #[serde(default)]
    pub authorization_token: String,

    /// ARN-like identifier of the invoked resource, passed through
    /// unchanged into the decision.
    pub method_arn: String,
}

/// Terminal authorization effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// One policy statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    #[serde(rename = "Action")]
    pub action: String,

    #[serde(rename = "Effect")]
    pub effect: Effect,

    #[serde(rename = "Resource")]
    pub resource: String,
}

/// The policy document wrapping the statements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version")]
    pub version: String,

    #[serde(rename = "Statement")]
    pub statement: Vec<Statement>,
}

/// Outbound decision handed back to the gateway.
///
/// Constructed once per invocation and immediately emitted; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    /// Identity the request acts on behalf of; empty on Deny.
    pub principal_id: String,

    pub policy_document: PolicyDocument,
}

impl AuthorizerResponse {
    fn with_effect(principal: String, effect: Effect, resource: &str) -> Self {
        Self {
            principal_id: principal,
            policy_document: PolicyDocument {
                version: POLICY_VERSION.to_string(),
                statement: vec![Statement {
                    action: INVOKE_ACTION.to_string(),
                    effect,
                    resource: resource.to_string(),
                }],
            },
        }
    }

    /// Allow decision on behalf of `principal`.
    pub fn allow(principal: String, resource: &str) -> Self {
        Self::with_effect(principal, Effect::Allow, resource)
    }

    /// Deny decision; the principal is always empty.
    pub fn deny(resource: &str) -> Self {
        Self::with_effect(String::new(), Effect::Deny, resource)
    }

    /// The effect of the (single) statement.
    pub fn effect(&self) -> Option<Effect> {
        self.policy_document
            .statement
            .first()
            .map(|statement| statement.effect)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_allow_serializes_to_gateway_shape() {
        let response = AuthorizerResponse::allow(
            "Jon Doe <someone@guardian.co.uk>".to_string(),
            "arn:aws:execute-api:eu-west-1:123:api/GET/thing",
        );

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "principalId": "Jon Doe <someone@guardian.co.uk>",
                "policyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Action": "execute-api:Invoke",
                        "Effect": "Allow",
                        "Resource": "arn:aws:execute-api:eu-west-1:123:api/GET/thing"
                    }]
                }
            })
        );
    }

    #[test]
    fn test_deny_has_empty_principal() {
        let response = AuthorizerResponse::deny("arn:thing");

        assert_eq!(response.principal_id, "");
        assert_eq!(response.effect(), Some(Effect::Deny));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["policyDocument"]["Statement"][0]["Effect"], "Deny");
    }

    #[test]
    fn test_request_deserializes_from_gateway_event() {
        let event = json!({
            "authorizationToken": "gutoolsAuth-assym=abc.def",
            "methodArn": "arn:thing"
        });

        let request: AuthorizerRequest = serde_json::from_value(event).unwrap();
        assert_eq!(request.authorization_token, "gutoolsAuth-assym=abc.def");
        assert_eq!(request.method_arn, "arn:thing");
    }

    #[test]
    fn test_request_tolerates_missing_token() {
        let event = json!({ "methodArn": "arn:thing" });

        let request: AuthorizerRequest = serde_json::from_value(event).unwrap();
        assert_eq!(request.authorization_token, "");
    }
}
