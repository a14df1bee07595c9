//! Per-stack function that publishes the custom Secrets Manager metrics
//!
//! Secrets Manager does not emit "days since last change/rotation" metrics by
//! itself. One scheduled function per stack describes every monitored secret
//! and puts the metrics. The function, its role and its policy exist once per
//! stack; each monitored secret adds an hourly rule and an invoke permission.

use super::metrics::SECRETS_MANAGER_NAMESPACE;
use crate::error::Result;
use crate::resources::{rate_expression, Secret};
use crate::stack::{token, CfnResource, Construct, PendingResource, StaticResource, Stack};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const PUBLISHER_ID: &str = "SecretsManagerMetricsPublisher";
const PUBLISH_RATE: Duration = Duration::from_secs(3600);

/// Holds no reference to its stack; the stack owns the cached instance.
pub struct SecretsManagerMetricsPublisher {
    function_logical_id: String,
    secret_arns: Arc<Mutex<Vec<Value>>>,
}

impl SecretsManagerMetricsPublisher {
    /// Returns the stack's publisher, creating it on first use
    pub fn get_instance(scope: &Construct) -> Result<Arc<Self>> {
        let stack = scope.stack();
        if stack.has_singleton(PUBLISHER_ID) {
            debug!(stack = %stack.name(), addr = %stack.addr(), "Reusing metrics publisher");
        }
        stack.singleton(PUBLISHER_ID, Self::create)
    }

    /// Forgets the stack's cached publisher. Its resources stay in the stack.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn reset_instance(stack: &Stack) -> bool {
        stack.clear_singleton(PUBLISHER_ID)
    }

    pub fn has_instance(stack: &Stack) -> bool {
        stack.has_singleton(PUBLISHER_ID)
    }

    fn create(stack: &Stack) -> Result<Self> {
        let node = stack.root().add_child(PUBLISHER_ID)?;
        let role = node.child("Role")?;
        let policy = node.child("Policy")?;
        let function = node.child("Lambda")?;
        let role_id = role.logical_id();
        let function_logical_id = function.logical_id();
        let secret_arns = Arc::new(Mutex::new(Vec::new()));

        let batch = vec![
            PendingResource::new(
                role,
                Arc::new(StaticResource::new(
                    "AWS::IAM::Role",
                    json!({
                        "AssumeRolePolicyDocument": {
                            "Statement": [{
                                "Action": "sts:AssumeRole",
                                "Effect": "Allow",
                                "Principal": { "Service": "lambda.amazonaws.com" }
                            }],
                            "Version": "2012-10-17"
                        },
                        "ManagedPolicyArns": [{
                            "Fn::Join": ["", [
                                "arn:",
                                { "Ref": "AWS::Partition" },
                                ":iam::aws:policy/service-role/AWSLambdaBasicExecutionRole"
                            ]]
                        }]
                    }),
                )),
            ),
            PendingResource::new(
                policy.clone(),
                Arc::new(PublisherPolicy {
                    policy_name: policy.logical_id(),
                    role_logical_id: role_id.clone(),
                    secret_arns: Arc::clone(&secret_arns),
                }),
            ),
            PendingResource::new(
                function,
                Arc::new(StaticResource::new(
                    "AWS::Lambda::Function",
                    json!({
                        "Code": {
                            "S3Bucket": { "Fn::Sub": "cdk-assets-${AWS::AccountId}-${AWS::Region}" },
                            "S3Key": "secrets-manager-metrics-publisher.zip"
                        },
                        "Description": "Publishes Secrets Manager secret age metrics",
                        "Environment": { "Variables": { "METRIC_NAMESPACE": SECRETS_MANAGER_NAMESPACE } },
                        "Handler": "index.handler",
                        "MemorySize": 128,
                        "Role": token::get_att(&role_id, "Arn"),
                        "Runtime": "nodejs18.x",
                        "Timeout": 60
                    }),
                )),
            ),
        ];
        stack.add_resources(batch)?;
        info!(stack = %stack.name(), addr = %stack.addr(), "Created metrics publisher");

        Ok(Self {
            function_logical_id,
            secret_arns,
        })
    }

    /// Schedule rule and invoke permission for one secret, not yet attached
    pub(crate) fn prepare_secret(&self, secret: &Secret) -> Result<Vec<PendingResource>> {
        let node = secret.node().stack().root().child(PUBLISHER_ID)?;
        let base = secret.node().logical_id();
        let rule = node.child(&format!("{}Rule", base))?;
        let permission = node.child(&format!("{}Permission", base))?;
        let rule_id = rule.logical_id();
        let function_arn = token::get_att(&self.function_logical_id, "Arn");

        Ok(vec![
            PendingResource::new(
                rule,
                Arc::new(StaticResource::new(
                    "AWS::Events::Rule",
                    json!({
                        "ScheduleExpression": rate_expression(PUBLISH_RATE)?,
                        "State": "ENABLED",
                        "Targets": [{
                            "Arn": function_arn.clone(),
                            "Id": "Target0",
                            "Input": token::stringify(&json!({ "secretId": secret.secret_arn() }))?
                        }]
                    }),
                )),
            ),
            PendingResource::new(
                permission,
                Arc::new(StaticResource::new(
                    "AWS::Lambda::Permission",
                    json!({
                        "Action": "lambda:InvokeFunction",
                        "FunctionName": function_arn,
                        "Principal": "events.amazonaws.com",
                        "SourceArn": token::get_att(&rule_id, "Arn")
                    }),
                )),
            ),
        ])
    }

    /// Grants the function access to a secret whose rule has been attached
    pub(crate) fn track_secret(&self, secret: &Secret) {
        self.secret_arns.lock().push(secret.secret_arn());
        debug!(secret = %secret.node().path(), "Secret registered with metrics publisher");
    }

    pub fn secret_count(&self) -> usize {
        self.secret_arns.lock().len()
    }
}

struct PublisherPolicy {
    policy_name: String,
    role_logical_id: String,
    secret_arns: Arc<Mutex<Vec<Value>>>,
}

impl CfnResource for PublisherPolicy {
    fn resource_type(&self) -> &str {
        "AWS::IAM::Policy"
    }

    fn properties(&self) -> Result<Value> {
        let mut statements = vec![json!({
            "Action": "cloudwatch:PutMetricData",
            "Condition": { "StringEquals": { "cloudwatch:namespace": SECRETS_MANAGER_NAMESPACE } },
            "Effect": "Allow",
            "Resource": "*"
        })];

        let arns = self.secret_arns.lock();
        if !arns.is_empty() {
            statements.push(json!({
                "Action": "secretsmanager:DescribeSecret",
                "Effect": "Allow",
                "Resource": *arns
            }));
        }

        Ok(json!({
            "PolicyDocument": { "Statement": statements, "Version": "2012-10-17" },
            "PolicyName": self.policy_name,
            "Roles": [token::reference(&self.role_logical_id)]
        }))
    }
}
