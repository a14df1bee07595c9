use super::rate_expression;
use crate::error::{MonitoringError, Result};
use crate::stack::{token, Construct, PendingResource, StaticResource};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const MAX_CANARY_NAME_LENGTH: usize = 21;

#[derive(Debug, Clone)]
pub struct CanaryProps {
    /// Physical name; derived from the construct path when absent
    pub canary_name: Option<String>,
    pub schedule_rate: Duration,
    /// Entry point, must end with `.handler`
    pub handler: String,
    pub inline_code: String,
    pub runtime_version: String,
}

impl Default for CanaryProps {
    fn default() -> Self {
        Self {
            canary_name: None,
            schedule_rate: Duration::from_secs(300),
            handler: "index.handler".to_string(),
            inline_code: "/* nothing */".to_string(),
            runtime_version: "syn-nodejs-2.0".to_string(),
        }
    }
}

/// A CloudWatch Synthetics canary with its artifact bucket and execution role
#[derive(Debug, Clone)]
pub struct Canary {
    node: Construct,
    canary_name: String,
}

impl Canary {
    pub fn new(scope: &Construct, id: &str, props: CanaryProps) -> Result<Self> {
        if !props.handler.ends_with(".handler") {
            return Err(MonitoringError::ConfigError(format!(
                "canary handler must end with '.handler', got '{}'",
                props.handler
            )));
        }

        let node = scope.add_child(id)?;
        let canary_name = match props.canary_name {
            Some(name) => {
                validate_canary_name(&name)?;
                name
            }
            None => generated_name(&node),
        };
        let schedule = rate_expression(props.schedule_rate)?;

        let bucket = node.child("ArtifactsBucket")?;
        let role = node.child("ServiceRole")?;
        let resource = node.child("Resource")?;
        let bucket_id = bucket.logical_id();
        let role_id = role.logical_id();

        let batch = vec![
            PendingResource::new(
                bucket,
                Arc::new(StaticResource::new(
                    "AWS::S3::Bucket",
                    json!({
                        "BucketEncryption": {
                            "ServerSideEncryptionConfiguration": [
                                { "ServerSideEncryptionByDefault": { "SSEAlgorithm": "aws:kms" } }
                            ]
                        }
                    }),
                )),
            ),
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
                        "ManagedPolicyArns": [
                            "arn:aws:iam::aws:policy/CloudWatchSyntheticsFullAccess"
                        ]
                    }),
                )),
            ),
            PendingResource::new(
                resource,
                Arc::new(StaticResource::new(
                    "AWS::Synthetics::Canary",
                    json!({
                        "ArtifactS3Location": {
                            "Fn::Join": ["", ["s3://", token::reference(&bucket_id)]]
                        },
                        "Code": { "Handler": props.handler, "Script": props.inline_code },
                        "ExecutionRoleArn": token::get_att(&role_id, "Arn"),
                        "Name": canary_name,
                        "RuntimeVersion": props.runtime_version,
                        "Schedule": { "DurationInSeconds": "0", "Expression": schedule },
                        "StartCanaryAfterCreation": true
                    }),
                )),
            ),
        ];
        node.stack().add_resources(batch)?;
        debug!(canary = %canary_name, path = %node.path(), "Created canary");

        Ok(Self { node, canary_name })
    }

    pub fn node(&self) -> &Construct {
        &self.node
    }

    pub fn canary_name(&self) -> &str {
        &self.canary_name
    }
}

fn generated_name(node: &Construct) -> String {
    node.logical_id()
        .to_lowercase()
        .chars()
        .take(MAX_CANARY_NAME_LENGTH)
        .collect()
}

fn validate_canary_name(name: &str) -> Result<()> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if name.is_empty() || name.len() > MAX_CANARY_NAME_LENGTH || !valid_chars {
        return Err(MonitoringError::ConfigError(format!(
            "canary name must be 1-{} characters of lowercase letters, digits, '-' or '_', got '{}'",
            MAX_CANARY_NAME_LENGTH, name
        )));
    }
    Ok(())
}
