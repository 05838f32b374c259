use std::fmt::Display;

use k8s_openapi::api::networking::v1::HTTPIngressPath;
use serde::{Deserialize, Serialize};

/// Kind of path match requested for a routing intent.
///
/// `Exact`, `Prefix` and `ImplementationSpecific` mirror the Kubernetes Ingress path types,
/// `Regex` is produced upstream when an ingress opts into regular expression paths.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum PathType {
    Exact,
    #[default]
    Prefix,
    ImplementationSpecific,
    Regex,
}

impl PathType {
    pub fn as_str(self) -> &'static str {
        match self {
            PathType::Exact => "Exact",
            PathType::Prefix => "Prefix",
            PathType::ImplementationSpecific => "ImplementationSpecific",
            PathType::Regex => "Regex",
        }
    }
}

impl Display for PathType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for PathType {
    fn from(value: &str) -> Self {
        match value {
            "Exact" => PathType::Exact,
            "Prefix" => PathType::Prefix,
            "Regex" => PathType::Regex,
            _ => PathType::ImplementationSpecific,
        }
    }
}

/// A single routing intent. Used as a map key, equality is structural.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct HostAndPath {
    pub host: String,
    pub path: String,
    pub path_type: PathType,
}

impl HostAndPath {
    pub fn new(host: &str, path: &str, path_type: PathType) -> Self {
        Self {
            host: host.to_owned(),
            path: path.to_owned(),
            path_type,
        }
    }

    pub fn is_match_all(&self) -> bool {
        self.path.is_empty()
    }
}

impl Display for HostAndPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{} ({})", self.host, self.path, self.path_type)
    }
}

impl From<(&str, &HTTPIngressPath)> for HostAndPath {
    fn from((host, ingress_path): (&str, &HTTPIngressPath)) -> Self {
        Self {
            host: host.to_owned(),
            path: ingress_path.path.clone().unwrap_or_default(),
            path_type: PathType::from(ingress_path.path_type.as_str()),
        }
    }
}
