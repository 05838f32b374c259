use std::collections::{hash_map::Entry, HashMap};

use itertools::Itertools;
use tracing::debug;

use super::model::{Route, RouteSpecifier};
use crate::common::{HostAndPath, OptionsConflict, VirtualHostOptions};

/// All routes collected for one host during a build session.
#[derive(Clone, Debug)]
pub struct VirtualHost {
    host: String,
    order: usize,
    options: VirtualHostOptions,
    occurrences: HashMap<HostAndPath, usize>,
    routes: Vec<Route>,
}

impl VirtualHost {
    fn new(host: &str, order: usize, options: VirtualHostOptions) -> Self {
        Self {
            host: host.to_owned(),
            order,
            options,
            occurrences: HashMap::new(),
            routes: vec![],
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Position of the first contact with this host, fixes where it is emitted.
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn options(&self) -> &VirtualHostOptions {
        &self.options
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// How many routes were already appended for exactly this host, path and path type.
    pub fn occurrences(&self, hp: &HostAndPath) -> usize {
        self.occurrences.get(hp).copied().unwrap_or_default()
    }

    pub fn push_route(&mut self, hp: &HostAndPath, name: String, route: RouteSpecifier) {
        self.routes.push(Route::new(name, route));
        *self.occurrences.entry(hp.clone()).or_default() += 1;
    }
}

#[derive(Clone, Debug, Default)]
pub struct VirtualHosts {
    hosts: HashMap<String, VirtualHost>,
}

impl VirtualHosts {
    /// Returns the virtual host for `host`, creating it with a copy of `options` on first sight.
    ///
    /// An existing host gets `options` merged into what it already has. The merged result is
    /// only stored once the merge succeeded, a conflict leaves the host as it was.
    pub fn attach(&mut self, host: &str, options: &VirtualHostOptions) -> Result<&mut VirtualHost, OptionsConflict> {
        let next_order = self.hosts.len();
        match self.hosts.entry(host.to_owned()) {
            Entry::Occupied(entry) => {
                let virtual_host = entry.into_mut();
                virtual_host.options = virtual_host.options.merge(options)?;
                Ok(virtual_host)
            }
            Entry::Vacant(entry) => {
                debug!("New virtual host {host} with order {next_order}");
                Ok(entry.insert(VirtualHost::new(host, next_order, options.clone())))
            }
        }
    }

    pub fn get(&self, host: &str) -> Option<&VirtualHost> {
        self.hosts.get(host)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Virtual hosts in first contact order.
    pub fn iter(&self) -> impl Iterator<Item = &VirtualHost> {
        self.hosts.values().sorted_by_key(|virtual_host| virtual_host.order)
    }
}
