use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::debug;

use crate::backends::alb::model::BackendGroup;

/// Outcome of a backend group lookup.
#[derive(Debug)]
pub enum BackendGroupLookup {
    Found(BackendGroup),
    NotFound,
    Failed(crate::Error),
}

#[async_trait]
pub trait BackendGroupFinder: Send + Sync {
    async fn find_backend_group(&self, name: &str) -> BackendGroupLookup;
}

/// Finder over a fixed set of backend groups keyed by name.
#[derive(Clone, Debug, Default)]
pub struct InMemoryBackendGroupFinder {
    backend_groups: BTreeMap<String, BackendGroup>,
}

impl FromIterator<BackendGroup> for InMemoryBackendGroupFinder {
    fn from_iter<T: IntoIterator<Item = BackendGroup>>(iter: T) -> Self {
        Self {
            backend_groups: iter.into_iter().map(|backend_group| (backend_group.name.clone(), backend_group)).collect(),
        }
    }
}

#[async_trait]
impl BackendGroupFinder for InMemoryBackendGroupFinder {
    async fn find_backend_group(&self, name: &str) -> BackendGroupLookup {
        match self.backend_groups.get(name) {
            Some(backend_group) => BackendGroupLookup::Found(backend_group.clone()),
            None => {
                debug!("Backend group {name} not found among {} known groups", self.backend_groups.len());
                BackendGroupLookup::NotFound
            }
        }
    }
}
