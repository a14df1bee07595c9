//! Minimal deployable-unit model: apps, stacks, construct paths and templates
//!
//! Resources are committed to a stack in batches. A batch is checked for
//! construct-id collisions as a whole before anything is attached, so a failed
//! construction never leaves part of its output behind.

mod template;
pub mod token;

pub use template::{CfnResource, StaticResource, Template};

use crate::error::{MonitoringError, Result};
use parking_lot::Mutex;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Context key of the flag that makes owned secret names resolvable from the secret ARN
pub const SECRETS_MANAGER_PARSE_OWNED_SECRET_NAME: &str =
    "@aws-cdk/aws-secretsmanager:parseOwnedSecretName";

const DEFAULT_STACK_NAME: &str = "Default";
const HIDDEN_PATH_COMPONENTS: [&str; 2] = ["Default", "Resource"];

static NEXT_STACK_SERIAL: AtomicU64 = AtomicU64::new(0);

/// Container for stacks that share a context
#[derive(Clone, Default)]
pub struct App {
    inner: Arc<AppInner>,
}

#[derive(Default)]
struct AppInner {
    context: Mutex<BTreeMap<String, Value>>,
    stack_names: Mutex<BTreeSet<String>>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a context value inherited by every stack of the app
    pub fn set_context(&self, key: impl Into<String>, value: Value) {
        self.inner.context.lock().insert(key.into(), value);
    }

    /// Adds a stack to the app. Stack names are unique within an app.
    pub fn stack(&self, name: &str) -> Result<Stack> {
        validate_id(name)?;
        if !self.inner.stack_names.lock().insert(name.to_string()) {
            return Err(MonitoringError::DuplicateConstruct {
                id: name.to_string(),
                path: "App".to_string(),
            });
        }
        Ok(Stack::create(name, Some(self.clone())))
    }

    fn context_value(&self, key: &str) -> Option<Value> {
        self.inner.context.lock().get(key).cloned()
    }
}

/// A single deployable unit
#[derive(Clone)]
pub struct Stack {
    inner: Arc<StackInner>,
}

struct StackInner {
    name: String,
    addr: String,
    app: Option<App>,
    context: Mutex<BTreeMap<String, Value>>,
    nodes: Mutex<BTreeSet<String>>,
    resources: Mutex<BTreeMap<String, Arc<dyn CfnResource>>>,
    singletons: Mutex<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl Stack {
    /// Creates a standalone stack named `Default`
    pub fn new() -> Self {
        Self::create(DEFAULT_STACK_NAME, None)
    }

    /// Creates a standalone stack with the given name
    pub fn named(name: &str) -> Result<Self> {
        validate_id(name)?;
        Ok(Self::create(name, None))
    }

    fn create(name: &str, app: Option<App>) -> Self {
        let serial = NEXT_STACK_SERIAL.fetch_add(1, Ordering::Relaxed);
        let addr = format!("c8{}", &hex_digest(&format!("{}/{}", serial, name))[..40]);
        debug!(stack = %name, addr = %addr, "Created stack");
        Self {
            inner: Arc::new(StackInner {
                name: name.to_string(),
                addr,
                app,
                context: Mutex::new(BTreeMap::new()),
                nodes: Mutex::new(BTreeSet::new()),
                resources: Mutex::new(BTreeMap::new()),
                singletons: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Address unique to this stack instance, even across stacks with equal names
    pub fn addr(&self) -> &str {
        &self.inner.addr
    }

    /// Root construct of the stack
    pub fn root(&self) -> Construct {
        Construct {
            stack: self.clone(),
            path: Vec::new(),
        }
    }

    pub fn set_context(&self, key: impl Into<String>, value: Value) {
        self.inner.context.lock().insert(key.into(), value);
    }

    /// Looks up a context value on the stack, falling back to the app
    pub fn try_get_context(&self, key: &str) -> Option<Value> {
        let local = self.inner.context.lock().get(key).cloned();
        local.or_else(|| self.inner.app.as_ref().and_then(|app| app.context_value(key)))
    }

    /// True when the flag is set to `true` (or the string `"true"`)
    pub fn feature_flag_enabled(&self, flag: &str) -> bool {
        match self.try_get_context(flag) {
            Some(Value::Bool(enabled)) => enabled,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// Commits resources to the stack, all or nothing
    pub fn add_resources(&self, batch: Vec<PendingResource>) -> Result<()> {
        let mut nodes = self.inner.nodes.lock();

        let mut seen = BTreeSet::new();
        for pending in &batch {
            let path = pending.construct.path();
            if nodes.contains(&path) || !seen.insert(path) {
                return Err(pending.construct.duplicate_error());
            }
        }

        let mut resources = self.inner.resources.lock();
        for pending in batch {
            let logical_id = pending.construct.logical_id();
            trace!(
                stack = %self.name(),
                logical_id = %logical_id,
                resource_type = %pending.resource.resource_type(),
                "Adding resource"
            );
            nodes.insert(pending.construct.path());
            resources.insert(logical_id, pending.resource);
        }
        Ok(())
    }

    /// Commits a single resource to the stack
    pub fn add_resource(&self, construct: Construct, resource: Arc<dyn CfnResource>) -> Result<()> {
        self.add_resources(vec![PendingResource::new(construct, resource)])
    }

    /// Returns the stack-wide instance stored under `key`, creating it on first use.
    ///
    /// The slot lives as long as the stack, whichever thread asks for it.
    /// Instances must not hold the stack itself.
    pub fn singleton<T, F>(&self, key: &str, create: F) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
        F: FnOnce(&Stack) -> Result<T>,
    {
        let mut singletons = self.inner.singletons.lock();
        let instance = match singletons.get(key) {
            Some(existing) => Arc::clone(existing),
            None => {
                let created: Arc<dyn Any + Send + Sync> = Arc::new(create(self)?);
                singletons.insert(key.to_string(), Arc::clone(&created));
                debug!(stack = %self.name(), key = %key, "Created stack singleton");
                created
            }
        };
        instance.downcast::<T>().map_err(|_| {
            MonitoringError::ConfigError(format!(
                "stack singleton '{}' holds a different type",
                key
            ))
        })
    }

    /// Drops the instance stored under `key`; its resources stay in the stack
    #[cfg(any(test, feature = "test-utils"))]
    pub fn clear_singleton(&self, key: &str) -> bool {
        self.inner.singletons.lock().remove(key).is_some()
    }

    pub fn has_singleton(&self, key: &str) -> bool {
        self.inner.singletons.lock().contains_key(key)
    }

    /// Renders the stack's template
    pub fn synthesize(&self) -> Result<Template> {
        Template::from_stack(self)
    }

    fn claim(&self, construct: &Construct) -> Result<()> {
        if !self.inner.nodes.lock().insert(construct.path()) {
            return Err(construct.duplicate_error());
        }
        Ok(())
    }

    fn registered_resources(&self) -> Vec<(String, Arc<dyn CfnResource>)> {
        self.inner
            .resources
            .lock()
            .iter()
            .map(|(id, r)| (id.clone(), Arc::clone(r)))
            .collect()
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Stack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stack")
            .field("name", &self.inner.name)
            .field("addr", &self.inner.addr)
            .finish()
    }
}

/// A node in a stack's construct tree, identified by its path
#[derive(Debug, Clone)]
pub struct Construct {
    stack: Stack,
    path: Vec<String>,
}

impl Construct {
    /// Path of a child, without claiming it in the tree
    pub fn child(&self, id: &str) -> Result<Construct> {
        validate_id(id)?;
        let mut path = self.path.clone();
        path.push(id.to_string());
        Ok(Construct {
            stack: self.stack.clone(),
            path,
        })
    }

    /// Creates a child and claims its id, failing if it already exists
    pub fn add_child(&self, id: &str) -> Result<Construct> {
        let child = self.child(id)?;
        self.stack.claim(&child)?;
        Ok(child)
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Last path component, or the stack name for the root
    pub fn id(&self) -> &str {
        self.path
            .last()
            .map(String::as_str)
            .unwrap_or_else(|| self.stack.name())
    }

    /// Full path including the stack name
    pub fn path(&self) -> String {
        std::iter::once(self.stack.name())
            .chain(self.path.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Deterministic logical id derived from the path inside the stack
    pub fn logical_id(&self) -> String {
        if self.path.len() == 1 {
            return sanitize(&self.path[0]);
        }

        let human: String = self
            .path
            .iter()
            .filter(|c| !HIDDEN_PATH_COMPONENTS.contains(&c.as_str()))
            .map(|c| sanitize(c))
            .collect();
        let hash = hex_digest(&self.path.join("/"));
        format!("{}{}", human, hash[..8].to_uppercase())
    }

    fn duplicate_error(&self) -> MonitoringError {
        let parent = match self.path.split_last() {
            Some((_, parent)) => std::iter::once(self.stack.name())
                .chain(parent.iter().map(String::as_str))
                .collect::<Vec<_>>()
                .join("/"),
            None => self.stack.name().to_string(),
        };
        MonitoringError::DuplicateConstruct {
            id: self.id().to_string(),
            path: parent,
        }
    }
}

/// A resource waiting to be committed together with the rest of its batch
pub struct PendingResource {
    pub construct: Construct,
    pub resource: Arc<dyn CfnResource>,
}

impl PendingResource {
    pub fn new(construct: Construct, resource: Arc<dyn CfnResource>) -> Self {
        Self {
            construct,
            resource,
        }
    }
}

fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() || id.contains('/') {
        return Err(MonitoringError::InvalidConstructId(id.to_string()));
    }
    Ok(())
}

fn sanitize(component: &str) -> String {
    component.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

fn hex_digest(input: &str) -> String {
    format!("{:x}", Sha256::digest(input.as_bytes()))
}
