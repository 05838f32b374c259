use std::collections::BTreeMap;

use itertools::Itertools;
use sha2::{Digest, Sha256};
use typed_builder::TypedBuilder;

use crate::common::{PathType, ResourceKey};

pub const MAX_NAME_LENGTH: usize = 63;
pub const CLUSTER_ID_LABEL: &str = "k8s-cluster-id";

/// Naming policy for every object the router builder emits or looks up.
pub trait Namer: Send + Sync {
    fn virtual_host_for_id(&self, tag: &str, id: usize) -> String;
    fn router(&self, tag: &str) -> String;
    fn router_tls(&self, tag: &str) -> String;
    /// Name of the first route with this exact host, path and path type.
    fn route_for_path(&self, tag: &str, host: &str, path: &str, path_type: PathType) -> String;
    /// Name of the `index`-th repetition of the same host, path and path type, `index >= 1`.
    fn route_for_path2(&self, tag: &str, host: &str, path: &str, path_type: PathType, index: usize) -> String;
    fn new_backend_group(&self, service: &ResourceKey) -> String;
    fn backend_group_for_cr(&self, namespace: &str, resource_name: &str) -> String;
}

pub trait Labels: Send + Sync {
    fn default_labels(&self) -> BTreeMap<String, String>;
}

/// Default names: lower case `[a-z0-9-]`, at most 63 characters, with a digest of the source values
/// so that different inputs collapsing to the same readable part still get different names.
#[derive(Clone, Copy, Debug, Default)]
pub struct Names;

impl Namer for Names {
    fn virtual_host_for_id(&self, tag: &str, id: usize) -> String {
        fit(sanitize(&format!("vh-{tag}-{id}")))
    }

    fn router(&self, tag: &str) -> String {
        fit(sanitize(&format!("ingress-router-{tag}")))
    }

    fn router_tls(&self, tag: &str) -> String {
        fit(sanitize(&format!("ingress-router-tls-{tag}")))
    }

    fn route_for_path(&self, tag: &str, host: &str, path: &str, path_type: PathType) -> String {
        let readable = sanitize(&format!("route-{tag}-{host}"));
        fit(format!("{readable}-{}", digest(&[tag, host, path, path_type.as_str()])))
    }

    fn route_for_path2(&self, tag: &str, host: &str, path: &str, path_type: PathType, index: usize) -> String {
        let readable = sanitize(&format!("route-{tag}-{host}"));
        fit(format!("{readable}-{}-{index}", digest(&[tag, host, path, path_type.as_str()])))
    }

    fn new_backend_group(&self, service: &ResourceKey) -> String {
        let readable = sanitize(&format!("bg-{}-{}", service.namespace, service.name));
        fit(format!("{readable}-{}", digest(&[&service.namespace, &service.name])))
    }

    fn backend_group_for_cr(&self, namespace: &str, resource_name: &str) -> String {
        let readable = sanitize(&format!("bg-cr-{namespace}-{resource_name}"));
        fit(format!("{readable}-{}", digest(&[namespace, resource_name])))
    }
}

#[derive(Clone, Debug, Default, TypedBuilder)]
pub struct ClusterLabels {
    #[builder(setter(into))]
    cluster_id: String,
}

impl Labels for ClusterLabels {
    fn default_labels(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        if !self.cluster_id.is_empty() {
            labels.insert(CLUSTER_ID_LABEL.to_owned(), self.cluster_id.clone());
        }
        labels
    }
}

fn digest(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(&hasher.finalize()[..4])
}

fn sanitize(raw: &str) -> String {
    let replaced: String = raw.chars().map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' }).collect();
    replaced.split('-').filter(|part| !part.is_empty()).join("-")
}

fn fit(name: String) -> String {
    if name.len() <= MAX_NAME_LENGTH {
        return name;
    }
    let suffix = digest(&[&name]);
    let head = name[..MAX_NAME_LENGTH - suffix.len() - 1].trim_end_matches('-');
    format!("{head}-{suffix}")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    pub fn test_names_are_valid() {
        let names = Names;
        let long_host = "a".repeat(40) + ".example.com";
        let all = vec![
            names.router("My_Tag"),
            names.router_tls("my-tag"),
            names.virtual_host_for_id("my-tag", 7),
            names.route_for_path("my-tag", &long_host, "/api/v1", PathType::Prefix),
            names.route_for_path2("my-tag", &long_host, "/api/v1", PathType::Prefix, 3),
            names.new_backend_group(&ResourceKey::namespaced("echo", "apps")),
            names.backend_group_for_cr("apps", "my-backend-group"),
        ];
        for name in all {
            assert!(name.len() <= MAX_NAME_LENGTH, "{name}");
            assert!(name.starts_with(|c: char| c.is_ascii_lowercase()), "{name}");
            assert!(!name.ends_with('-'), "{name}");
            assert!(name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'), "{name}");
        }
        assert_eq!(names.router("My_Tag"), "ingress-router-my-tag");
        assert_eq!(names.virtual_host_for_id("my-tag", 7), "vh-my-tag-7");
    }

    #[test]
    pub fn test_route_names_are_distinct() {
        let names = Names;
        let first = names.route_for_path("tag", "a.com", "/x", PathType::Exact);
        assert_eq!(first, names.route_for_path("tag", "a.com", "/x", PathType::Exact));
        assert_ne!(first, names.route_for_path("tag", "a.com", "/x", PathType::Prefix));
        assert_ne!(first, names.route_for_path("tag", "a.com", "/x.y", PathType::Exact));
        assert_ne!(first, names.route_for_path2("tag", "a.com", "/x", PathType::Exact, 1));
        assert_ne!(
            names.route_for_path2("tag", "a.com", "/x", PathType::Exact, 1),
            names.route_for_path2("tag", "a.com", "/x", PathType::Exact, 2)
        );
    }

    #[test]
    pub fn test_backend_group_names() {
        let names = Names;
        assert_ne!(
            names.new_backend_group(&ResourceKey::namespaced("c", "a-b")),
            names.new_backend_group(&ResourceKey::namespaced("b-c", "a"))
        );
        assert_ne!(names.new_backend_group(&ResourceKey::namespaced("echo", "apps")), names.backend_group_for_cr("apps", "echo"));
    }

    #[test]
    pub fn test_cluster_labels() {
        assert!(ClusterLabels::default().default_labels().is_empty());
        let labels = ClusterLabels::builder().cluster_id("c1").build().default_labels();
        assert_eq!(labels.get(CLUSTER_ID_LABEL), Some(&"c1".to_owned()));
    }
}
