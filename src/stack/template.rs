use super::Stack;
use crate::error::Result;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// A resource that renders into the `Resources` section of a template.
///
/// Properties are produced at synthesis time, so resources that keep
/// accumulating state during construction (dashboards, publisher policies)
/// render their final shape.
pub trait CfnResource: Send + Sync {
    /// CloudFormation resource type, e.g. `AWS::CloudWatch::Alarm`
    fn resource_type(&self) -> &str;

    /// Rendered `Properties` object
    fn properties(&self) -> Result<Value>;
}

/// A resource whose properties are fixed when it is created
#[derive(Debug, Clone)]
pub struct StaticResource {
    resource_type: String,
    properties: Value,
}

impl StaticResource {
    pub fn new(resource_type: impl Into<String>, properties: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties,
        }
    }
}

impl CfnResource for StaticResource {
    fn resource_type(&self) -> &str {
        &self.resource_type
    }

    fn properties(&self) -> Result<Value> {
        Ok(self.properties.clone())
    }
}

/// Synthesized template of a single stack
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    resources: BTreeMap<String, Value>,
}

impl Template {
    /// Renders every resource registered with the stack
    pub fn from_stack(stack: &Stack) -> Result<Self> {
        let mut resources = BTreeMap::new();
        for (logical_id, resource) in stack.registered_resources() {
            let mut body = Map::new();
            body.insert(
                "Type".to_string(),
                Value::String(resource.resource_type().to_string()),
            );
            body.insert("Properties".to_string(), resource.properties()?);
            resources.insert(logical_id, Value::Object(body));
        }
        Ok(Self { resources })
    }

    pub fn resources(&self) -> &BTreeMap<String, Value> {
        &self.resources
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Value> {
        self.resources.get(logical_id)
    }

    /// Number of resources of the given type
    pub fn resource_count_is(&self, resource_type: &str) -> usize {
        self.resources
            .values()
            .filter(|r| r["Type"] == resource_type)
            .count()
    }

    /// All resources of the given type, keyed by logical id
    pub fn find_resources(&self, resource_type: &str) -> BTreeMap<String, Value> {
        self.resources
            .iter()
            .filter(|(_, r)| r["Type"] == resource_type)
            .map(|(id, r)| (id.clone(), r.clone()))
            .collect()
    }

    pub fn to_json(&self) -> Value {
        json!({ "Resources": self.resources })
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_json())?)
    }
}
