use crate::error::Result;
use crate::stack::{token, Construct, StaticResource};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct SecretProps {
    /// Physical name; generated from the construct path when absent
    pub secret_name: Option<String>,
    pub description: Option<String>,
}

/// A Secrets Manager secret owned by the stack
#[derive(Debug, Clone)]
pub struct Secret {
    node: Construct,
    logical_id: String,
    secret_name: Option<String>,
}

impl Secret {
    pub fn new(scope: &Construct, id: &str) -> Result<Self> {
        Self::with_props(scope, id, SecretProps::default())
    }

    pub fn with_props(scope: &Construct, id: &str, props: SecretProps) -> Result<Self> {
        let node = scope.add_child(id)?;
        let resource = node.child("Resource")?;
        let logical_id = resource.logical_id();

        let mut properties = Map::new();
        if let Some(description) = &props.description {
            properties.insert("Description".to_string(), json!(description));
        }
        properties.insert("GenerateSecretString".to_string(), json!({}));
        if let Some(name) = &props.secret_name {
            properties.insert("Name".to_string(), json!(name));
        }

        node.stack().add_resource(
            resource,
            Arc::new(StaticResource::new(
                "AWS::SecretsManager::Secret",
                Value::Object(properties),
            )),
        )?;
        debug!(secret = %node.path(), logical_id = %logical_id, "Created secret");

        Ok(Self {
            node,
            logical_id,
            secret_name: props.secret_name,
        })
    }

    pub fn node(&self) -> &Construct {
        &self.node
    }

    /// `Ref` of a secret resolves to its ARN
    pub fn secret_arn(&self) -> Value {
        token::reference(&self.logical_id)
    }

    /// Name of the secret as used by the `SecretName` metric dimension.
    ///
    /// Generated names are parsed out of the ARN
    /// (`arn:aws:secretsmanager:region:account:secret:NAME-SUFFIX`); this is only
    /// correct when the stack enables the owned-secret-name feature flag.
    pub fn secret_name(&self) -> Value {
        match &self.secret_name {
            Some(name) => json!(name),
            None => json!({
                "Fn::Select": [0, { "Fn::Split": ["-", {
                    "Fn::Select": [6, { "Fn::Split": [":", self.secret_arn()] }]
                }] }]
            }),
        }
    }

    /// Readable name for alarm names and dashboard titles
    pub fn display_name(&self) -> &str {
        self.secret_name.as_deref().unwrap_or_else(|| self.node.id())
    }
}
