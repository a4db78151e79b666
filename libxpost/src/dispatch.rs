//! Multi-platform dispatch and result aggregation
//!
//! A [`Dispatcher`] fans one post out to several platforms concurrently and
//! folds every per-platform outcome into a single [`DispatchReport`]. A
//! failure on one platform never stops the others: each target produces
//! exactly one [`PlatformResult`], in the order the targets were resolved.
//!
//! Retries live inside the platform clients. The dispatcher itself never
//! retries and never deduplicates creates.

use std::collections::{BTreeMap, HashMap};

use futures::future::join_all;
use tracing::{info, warn};

use crate::error::{ErrorCode, PlatformError, Result, XpostError};
use crate::events::{Event, EventBus};
use crate::platforms::Platform;
use crate::registry::PlatformRegistry;
use crate::types::{DispatchReport, ListOptions, PlatformPost, PlatformResult, Post};

/// What to do on every target platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Create,
    /// Replace existing posts; `ids` maps platform key to remote id
    Update { ids: HashMap<String, String> },
    /// Remove existing posts; `ids` maps platform key to remote id
    Delete { ids: HashMap<String, String> },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update { .. } => "update",
            Operation::Delete { .. } => "delete",
        }
    }

    /// Resolve the work for `key`, or the reason it cannot run
    fn step_for(&self, key: &str) -> std::result::Result<Step<'_>, String> {
        match self {
            Operation::Create => Ok(Step::Create),
            Operation::Update { ids } => self.id_in(ids, key).map(Step::Update),
            Operation::Delete { ids } => self.id_in(ids, key).map(Step::Delete),
        }
    }

    fn id_in<'a>(
        &self,
        ids: &'a HashMap<String, String>,
        key: &str,
    ) -> std::result::Result<&'a str, String> {
        ids.get(key)
            .map(String::as_str)
            .ok_or_else(|| format!("No {} post id supplied for {}", key, self.name()))
    }
}

/// An operation bound to one platform's remote id
#[derive(Debug, Clone, Copy)]
enum Step<'a> {
    Create,
    Update(&'a str),
    Delete(&'a str),
}

/// Authenticate, then run one operation on one platform
async fn perform(platform: &dyn Platform, post: &Post, step: Step<'_>) -> Result<PlatformResult> {
    let key = platform.key();
    if !platform.authenticate().await? {
        return Err(PlatformError::Authentication(format!(
            "{} rejected the configured credentials",
            platform.name()
        ))
        .into());
    }

    match step {
        Step::Create => {
            let created = platform.create_post(post).await?;
            Ok(PlatformResult::posted(key, created))
        }
        Step::Update(id) => {
            let updated = platform.update_post(id, post).await?;
            Ok(PlatformResult::posted(key, updated))
        }
        Step::Delete(id) => {
            if !platform.delete_post(id).await? {
                return Err(PlatformError::remote(
                    ErrorCode::Unknown,
                    format!("{} did not confirm deletion of post {}", platform.name(), id),
                )
                .into());
            }
            Ok(PlatformResult::deleted(key, id))
        }
    }
}

/// Fans posts out across a [`PlatformRegistry`]
pub struct Dispatcher {
    registry: PlatformRegistry,
    event_bus: Option<EventBus>,
}

impl Dispatcher {
    /// Create a new dispatcher over `registry`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use libxpost::config::Config;
    /// use libxpost::dispatch::{Dispatcher, Operation};
    /// use libxpost::registry::PlatformRegistry;
    /// use libxpost::types::Post;
    ///
    /// # async fn example() -> libxpost::error::Result<()> {
    /// let config = Config::load()?;
    /// let dispatcher = Dispatcher::new(PlatformRegistry::from_config(&config)?);
    ///
    /// let post = Post::new("Hello", "# Hello\n\nFirst post").published();
    /// let report = dispatcher.dispatch(&post, None, &Operation::Create).await;
    ///
    /// for result in report.results() {
    ///     match result.error() {
    ///         None => println!("✓ {}", result.platform),
    ///         Some(error) => eprintln!("✗ {}: {}", result.platform, error),
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(registry: PlatformRegistry) -> Self {
        Self {
            registry,
            event_bus: None,
        }
    }

    /// Publish progress events on `event_bus`
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    fn emit(&self, event: Event) {
        if let Some(bus) = &self.event_bus {
            bus.emit(event);
        }
    }

    /// Explicit keys in caller order without duplicates, or the whole registry
    fn resolve_targets(&self, platforms: Option<&[String]>) -> Vec<String> {
        match platforms {
            Some(keys) => {
                let mut targets: Vec<String> = Vec::with_capacity(keys.len());
                for key in keys {
                    if !targets.contains(key) {
                        targets.push(key.clone());
                    }
                }
                targets
            }
            None => self.registry.keys(),
        }
    }

    /// Run `operation` on every target and aggregate the outcomes
    ///
    /// Always returns a report, even when every target fails. Unknown keys
    /// become failed results without any client call.
    pub async fn dispatch(
        &self,
        post: &Post,
        platforms: Option<&[String]>,
        operation: &Operation,
    ) -> DispatchReport {
        let targets = self.resolve_targets(platforms);
        info!(
            "Dispatching {} to {} platform(s): {}",
            operation.name(),
            targets.len(),
            targets.join(", ")
        );
        self.emit(Event::DispatchStarted {
            operation: operation.name().to_string(),
            platforms: targets.clone(),
        });

        let futures = targets
            .iter()
            .map(|key| self.run_target(key, post, operation));
        let report = DispatchReport::from_results(join_all(futures).await);

        info!(
            "{} finished: {}/{} succeeded",
            operation.name(),
            report.successful(),
            report.total()
        );
        self.emit(Event::DispatchCompleted {
            total: report.total(),
            successful: report.successful(),
            failed: report.failed(),
        });
        report
    }

    async fn run_target(&self, key: &str, post: &Post, operation: &Operation) -> PlatformResult {
        let result = match self.registry.get(key) {
            None => PlatformResult::failed(key, XpostError::UnknownPlatform(key.to_string()).to_string()),
            Some(platform) => match operation.step_for(key) {
                Err(reason) => PlatformResult::failed(key, reason),
                Ok(step) => self.run_operation(platform.as_ref(), post, step).await,
            },
        };

        match result.error() {
            None => info!("{} on {} succeeded", operation.name(), key),
            Some(error) => warn!("{} on {} failed: {}", operation.name(), key, error),
        }
        self.emit(Event::PlatformCompleted {
            platform: key.to_string(),
            success: result.success(),
            error: result.error().map(str::to_string),
        });
        result
    }

    async fn run_operation(
        &self,
        platform: &dyn Platform,
        post: &Post,
        step: Step<'_>,
    ) -> PlatformResult {
        perform(platform, post, step)
            .await
            .unwrap_or_else(|e| PlatformResult::failed(platform.key(), e.to_string()))
    }

    fn platform(&self, key: &str) -> Result<&dyn Platform> {
        self.registry
            .get(key)
            .map(|p| p.as_ref())
            .ok_or_else(|| XpostError::UnknownPlatform(key.to_string()))
    }

    /// Create on a single platform, propagating its error
    pub async fn create_on(&self, key: &str, post: &Post) -> Result<PlatformPost> {
        self.platform(key)?.create_post(post).await
    }

    /// Update on a single platform, propagating its error
    pub async fn update_on(&self, key: &str, platform_id: &str, post: &Post) -> Result<PlatformPost> {
        self.platform(key)?.update_post(platform_id, post).await
    }

    /// Delete on a single platform, propagating its error
    pub async fn delete_on(&self, key: &str, platform_id: &str) -> Result<bool> {
        self.platform(key)?.delete_post(platform_id).await
    }

    pub async fn get_on(&self, key: &str, platform_id: &str) -> Result<PlatformPost> {
        self.platform(key)?.get_post(platform_id).await
    }

    pub async fn list_on(&self, key: &str, options: &ListOptions) -> Result<Vec<PlatformPost>> {
        self.platform(key)?.list_posts(options).await
    }

    /// Check every registered platform's credentials
    ///
    /// Failures are logged and reported as `false`.
    pub async fn authenticate_all(&self) -> BTreeMap<String, bool> {
        let keys = self.registry.keys();
        let checks = keys.iter().map(|key| async move {
            let ok = match self.platform(key) {
                Ok(platform) => match platform.authenticate().await {
                    Ok(ok) => ok,
                    Err(e) => {
                        warn!("Authentication check for {} failed: {}", key, e);
                        false
                    }
                },
                Err(_) => false,
            };
            (key.clone(), ok)
        });

        join_all(checks).await.into_iter().collect()
    }
}
