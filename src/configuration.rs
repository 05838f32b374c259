use itertools::Itertools;
use k8s_openapi::api::networking::v1::{HTTPIngressPath, Ingress};
use serde::Deserialize;
use thiserror::Error;
use typed_builder::TypedBuilder;

use crate::{
    backends::alb::model::{BackendGroup, DirectResponseAction, Payload, RedirectAction, RedirectPath, RedirectResponseCode},
    common::{HostAndPath, PathType, ResourceKey, RouteOptions, VirtualHostOptions, DEFAULT_NAMESPACE_NAME},
    services::Namer,
    Result,
};

/// One router build session: the backend groups the control plane already has and the ingress
/// contributions to replay, in order.
#[derive(Debug, TypedBuilder, Deserialize)]
pub struct Configuration {
    #[builder(setter(into))]
    pub tag: String,
    #[serde(default)]
    #[builder(default, setter(into))]
    pub folder_id: String,
    #[serde(default)]
    #[builder(default)]
    pub tls: bool,
    #[serde(default)]
    #[builder(default, setter(into))]
    pub cluster_id: String,
    #[serde(default)]
    #[builder(default)]
    pub backend_groups: Vec<BackendGroupDeclaration>,
    #[serde(default)]
    #[builder(default)]
    pub ingresses: Vec<IngressContribution>,
}

/// A backend group already provisioned for a service or a custom resource.
#[derive(Clone, Debug, TypedBuilder, Deserialize)]
pub struct BackendGroupDeclaration {
    #[builder(setter(into))]
    pub id: String,
    #[serde(default = "default_namespace")]
    #[builder(default = default_namespace(), setter(into))]
    pub namespace: String,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    pub service: Option<String>,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    pub resource: Option<String>,
}

#[derive(Clone, Debug, TypedBuilder, Deserialize)]
pub struct IngressContribution {
    #[serde(default = "default_namespace")]
    #[builder(default = default_namespace(), setter(into))]
    pub namespace: String,
    #[serde(default)]
    #[builder(default)]
    pub virtual_host_options: VirtualHostOptions,
    #[serde(default)]
    #[builder(default)]
    pub route_options: RouteOptions,
    #[serde(default)]
    #[builder(default)]
    pub rules: Vec<IngressRule>,
    /// A Kubernetes ingress whose paths are added after `rules`. Its namespace, when set, takes
    /// precedence over `namespace`.
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub manifest: Option<Ingress>,
}

/// A host and path with exactly one of the targets set.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct IngressRule {
    pub host: String,
    pub path: String,
    pub path_type: PathType,
    pub service: Option<String>,
    pub resource: Option<String>,
    pub redirect_to_https: bool,
    pub redirect: Option<RedirectRule>,
    pub direct_response: Option<DirectResponseRule>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RedirectRule {
    pub replace_scheme: String,
    pub replace_host: String,
    pub replace_port: Option<u16>,
    pub replace_path: Option<String>,
    pub replace_prefix: Option<String>,
    pub remove_query: bool,
    pub response_code: RedirectResponseCode,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DirectResponseRule {
    pub status: u16,
    pub body: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum RuleTarget<'a> {
    Service(&'a str),
    Resource(&'a str),
    RedirectToHttps,
    Redirect(RedirectAction),
    DirectResponse(DirectResponseAction),
}

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("tag must be not empty")]
    Tag,
    #[error("rule {host}{path} must have exactly one target")]
    RuleTarget { host: String, path: String },
    #[error("backend group {id} must reference exactly one of service or resource")]
    BackendGroupTarget { id: String },
    #[error("redirect for {host}{path} can't replace both path and prefix")]
    RedirectPath { host: String, path: String },
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE_NAME.to_owned()
}

impl Configuration {
    pub fn validate(&self) -> Result<()> {
        if self.tag.is_empty() {
            return Err(ConfigurationError::Tag.into());
        }
        for backend_group in &self.backend_groups {
            backend_group.validate()?;
        }
        for rule in self.ingresses.iter().flat_map(IngressContribution::ingress_rules) {
            rule.target()?;
        }
        Ok(())
    }
}

impl BackendGroupDeclaration {
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        match (&self.service, &self.resource) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            _ => Err(ConfigurationError::BackendGroupTarget { id: self.id.clone() }),
        }
    }

    /// The backend group as the control plane knows it, named the way the builder looks it up.
    pub fn to_backend_group(&self, names: &dyn Namer) -> std::result::Result<BackendGroup, ConfigurationError> {
        let name = match (&self.service, &self.resource) {
            (Some(service), None) => names.new_backend_group(&ResourceKey::namespaced(service, &self.namespace)),
            (None, Some(resource)) => names.backend_group_for_cr(&self.namespace, resource),
            _ => return Err(ConfigurationError::BackendGroupTarget { id: self.id.clone() }),
        };
        Ok(BackendGroup { id: self.id.clone(), name })
    }
}

impl IngressContribution {
    pub fn namespace(&self) -> &str {
        self.manifest.as_ref().and_then(|manifest| manifest.metadata.namespace.as_deref()).unwrap_or(&self.namespace)
    }

    /// Explicit rules followed by one rule per path of the manifest.
    pub fn ingress_rules(&self) -> Vec<IngressRule> {
        let manifest_rules = self
            .manifest
            .iter()
            .filter_map(|manifest| manifest.spec.as_ref())
            .flat_map(|spec| spec.rules.iter().flatten())
            .flat_map(|rule| {
                let host = rule.host.as_deref().unwrap_or_default();
                rule.http.iter().flat_map(move |http| http.paths.iter().map(move |path| IngressRule::from((host, path))))
            });
        self.rules.iter().cloned().chain(manifest_rules).collect()
    }
}

impl IngressRule {
    pub fn target(&self) -> std::result::Result<RuleTarget<'_>, ConfigurationError> {
        let redirect = self.redirect.as_ref().map(|redirect| self.redirect_action(redirect)).transpose()?;
        let targets = [
            self.service.as_deref().map(RuleTarget::Service),
            self.resource.as_deref().map(RuleTarget::Resource),
            self.redirect_to_https.then_some(RuleTarget::RedirectToHttps),
            redirect.map(RuleTarget::Redirect),
            self.direct_response.as_ref().map(|direct_response| {
                RuleTarget::DirectResponse(DirectResponseAction {
                    status: direct_response.status,
                    body: direct_response.body.clone().map(|text| Payload { text }),
                })
            }),
        ];
        targets.into_iter().flatten().exactly_one().map_err(|_| ConfigurationError::RuleTarget {
            host: self.host.clone(),
            path: self.path.clone(),
        })
    }

    /// Ingresses that opt into regular expressions get their implementation specific paths
    /// matched as regexes.
    pub fn host_and_path(&self, route_options: &RouteOptions) -> HostAndPath {
        let path_type = if route_options.use_regex && self.path_type == PathType::ImplementationSpecific {
            PathType::Regex
        } else {
            self.path_type
        };
        HostAndPath::new(&self.host, &self.path, path_type)
    }

    fn redirect_action(&self, redirect: &RedirectRule) -> std::result::Result<RedirectAction, ConfigurationError> {
        let path = match (&redirect.replace_path, &redirect.replace_prefix) {
            (None, None) => None,
            (Some(path), None) => Some(RedirectPath::ReplacePath(path.clone())),
            (None, Some(prefix)) => Some(RedirectPath::ReplacePrefix(prefix.clone())),
            (Some(_), Some(_)) => {
                return Err(ConfigurationError::RedirectPath {
                    host: self.host.clone(),
                    path: self.path.clone(),
                })
            }
        };
        Ok(RedirectAction {
            replace_scheme: redirect.replace_scheme.clone(),
            replace_host: redirect.replace_host.clone(),
            replace_port: redirect.replace_port,
            path,
            remove_query: redirect.remove_query,
            response_code: redirect.response_code,
        })
    }
}

impl From<(&str, &HTTPIngressPath)> for IngressRule {
    fn from((host, ingress_path): (&str, &HTTPIngressPath)) -> Self {
        let HostAndPath { host, path, path_type } = HostAndPath::from((host, ingress_path));
        Self {
            host,
            path,
            path_type,
            service: ingress_path.backend.service.as_ref().map(|service| service.name.clone()),
            resource: ingress_path.backend.resource.as_ref().map(|resource| resource.name.clone()),
            ..Default::default()
        }
    }
}
