//! Group Registry
//!
//! Name -> group lookup so independently initialised parts of a program,
//! including the HTTP transport, can reach the same namespace.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::{info, warn};

use crate::cache::ByteView;
use crate::error::{CacheError, Result};
use crate::group::{Getter, Group};

// == Registry ==
#[derive(Default)]
pub struct Registry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry for programs that do not want to pass one around.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    // == New Group ==
    /// Creates a single-node group and registers it.
    pub fn new_group(
        &self,
        name: impl Into<String>,
        cache_bytes: u64,
        getter: impl Getter + 'static,
    ) -> Arc<Group> {
        self.register(Group::new(name, cache_bytes, getter))
    }

    // == Register ==
    /// Registers a group under its name.
    ///
    /// An existing group with the same name is replaced; callers still
    /// holding the old `Arc` keep using the old group.
    pub fn register(&self, group: Group) -> Arc<Group> {
        let group = Arc::new(group);
        let previous = self
            .groups
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(group.name().to_string(), Arc::clone(&group));

        if previous.is_some() {
            warn!(group = group.name(), "group registered twice, replacing");
        } else {
            info!(group = group.name(), "group registered");
        }
        group
    }

    // == Get Group ==
    /// Returns the group registered under `name`.
    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Registered group names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    // == Serve ==
    /// Answers a read from another node: looks up the group and gets `key`.
    pub async fn serve(&self, group: &str, key: &str) -> Result<ByteView> {
        let target = self
            .get_group(group)
            .ok_or_else(|| CacheError::NoSuchGroup(group.to_string()))?;
        target.get(key).await
    }
}
