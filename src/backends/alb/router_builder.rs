use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};
use typed_builder::TypedBuilder;

use super::{
    model::{BackendGroup, DirectResponseAction, GrpcRoute, HttpAction, HttpRoute, HttpRouter, RedirectAction, RouteSpecifier, VirtualHost as RouterVirtualHost},
    route_converters,
    virtual_hosts::VirtualHosts,
};
use crate::{
    common::{BackendType, HostAndPath, OptionsConflict, ResourceKey, RouteOptions, VirtualHostOptions, DEFAULT_NAMESPACE_NAME},
    services::{BackendGroupFinder, BackendGroupLookup, Labels, Namer},
};

pub const BACKEND_GROUP_RESOURCE_TYPE: &str = "BackendGroup";

#[derive(Error, Debug)]
pub enum RouterBuilderError {
    #[error("{resource_type} {name} is not ready")]
    ResourceNotReady { resource_type: &'static str, name: String },
    #[error("error finding backend group: {0}")]
    LookupFailure(#[source] crate::Error),
    #[error("error building virtual host: {0}")]
    OptionConflict(#[from] OptionsConflict),
}

impl RouterBuilderError {
    /// The caller is expected to retry once the referenced resource is provisioned.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, RouterBuilderError::ResourceNotReady { .. })
    }
}

/// Collects routes for one router build session.
///
/// `configure` sets the options used by the following `add_*` calls. Every add call attaches one
/// route to the virtual host of its host, creating the host on first sight and merging the
/// configured virtual host options into it otherwise. `build` emits the router with virtual hosts
/// in first contact order.
#[derive(TypedBuilder)]
pub struct HttpRouterBuilder {
    #[builder(setter(into))]
    tag: String,
    #[builder(default, setter(into))]
    folder_id: String,
    #[builder(default)]
    is_tls: bool,
    #[builder(default)]
    first_virtual_host_id: usize,
    names: Arc<dyn Namer>,
    labels: Arc<dyn Labels>,
    backend_group_finder: Arc<dyn BackendGroupFinder>,
    #[builder(default, setter(skip))]
    virtual_host_options: VirtualHostOptions,
    #[builder(default, setter(skip))]
    route_options: RouteOptions,
    #[builder(default = DEFAULT_NAMESPACE_NAME.to_owned(), setter(skip))]
    namespace: String,
    #[builder(default, setter(skip))]
    virtual_hosts: VirtualHosts,
}

impl HttpRouterBuilder {
    pub fn configure(&mut self, virtual_host_options: VirtualHostOptions, route_options: RouteOptions, namespace: &str) {
        self.virtual_host_options = virtual_host_options;
        self.route_options = route_options;
        namespace.clone_into(&mut self.namespace);
    }

    pub fn virtual_hosts(&self) -> &VirtualHosts {
        &self.virtual_hosts
    }

    pub async fn add_route(&mut self, hp: &HostAndPath, service_name: &str) -> Result<(), RouterBuilderError> {
        let backend_group_name = self.names.new_backend_group(&ResourceKey::namespaced(service_name, &self.namespace));
        let backend_group = self.resolve_backend_group(backend_group_name).await?;
        let route = self.forward_route(hp, &backend_group);
        self.append_route(hp, route)
    }

    pub async fn add_route_to_resource(&mut self, hp: &HostAndPath, resource_name: &str) -> Result<(), RouterBuilderError> {
        let backend_group_name = self.names.backend_group_for_cr(&self.namespace, resource_name);
        let backend_group = self.resolve_backend_group(backend_group_name).await?;
        let route = self.forward_route(hp, &backend_group);
        self.append_route(hp, route)
    }

    pub fn add_direct_response(&mut self, hp: &HostAndPath, direct_response: DirectResponseAction) -> Result<(), RouterBuilderError> {
        let route = HttpRoute::for_action(hp, HttpAction::DirectResponse(direct_response), &self.route_options.allowed_methods);
        self.append_route(hp, route.into())
    }

    pub fn add_redirect(&mut self, hp: &HostAndPath, redirect: RedirectAction) -> Result<(), RouterBuilderError> {
        let route = HttpRoute::for_action(hp, HttpAction::Redirect(redirect), &self.route_options.allowed_methods);
        self.append_route(hp, route.into())
    }

    pub fn add_redirect_to_https(&mut self, hp: &HostAndPath) -> Result<(), RouterBuilderError> {
        self.add_redirect(hp, RedirectAction::to_https())
    }

    pub fn build(&self) -> HttpRouter {
        let virtual_hosts: Vec<_> = self
            .virtual_hosts
            .iter()
            .enumerate()
            .map(|(i, virtual_host)| RouterVirtualHost {
                name: self.names.virtual_host_for_id(&self.tag, self.first_virtual_host_id + i),
                authority: vec![virtual_host.host().to_owned()],
                routes: virtual_host.routes().to_vec(),
                route_options: route_converters::route_options(virtual_host.options()),
            })
            .collect();

        let name = if self.is_tls { self.names.router_tls(&self.tag) } else { self.names.router(&self.tag) };
        info!("Built router {name} with {} virtual hosts", virtual_hosts.len());

        HttpRouter {
            folder_id: self.folder_id.clone(),
            name,
            description: format!("router for k8s ingress with tag: {}", self.tag),
            labels: self.labels.default_labels(),
            virtual_hosts,
        }
    }

    async fn resolve_backend_group(&self, name: String) -> Result<BackendGroup, RouterBuilderError> {
        match self.backend_group_finder.find_backend_group(&name).await {
            BackendGroupLookup::Found(backend_group) => Ok(backend_group),
            BackendGroupLookup::NotFound => {
                warn!("Backend group {name} is not ready yet");
                Err(RouterBuilderError::ResourceNotReady {
                    resource_type: BACKEND_GROUP_RESOURCE_TYPE,
                    name,
                })
            }
            BackendGroupLookup::Failed(e) => {
                warn!("Backend group {name} lookup failed {e:?}");
                Err(RouterBuilderError::LookupFailure(e))
            }
        }
    }

    fn forward_route(&self, hp: &HostAndPath, backend_group: &BackendGroup) -> RouteSpecifier {
        match self.route_options.backend_type {
            BackendType::Grpc => GrpcRoute::forward(hp, &self.route_options, backend_group).into(),
            BackendType::Http => HttpRoute::forward(hp, &self.route_options, backend_group).into(),
        }
    }

    fn append_route(&mut self, hp: &HostAndPath, route: RouteSpecifier) -> Result<(), RouterBuilderError> {
        let virtual_host = self.virtual_hosts.attach(&hp.host, &self.virtual_host_options).inspect_err(|e| warn!("Can't add route for {hp}: {e}"))?;
        let name = route_name(self.names.as_ref(), &self.tag, hp, virtual_host.occurrences(hp));
        debug!("Adding route {name} for {hp}");
        virtual_host.push_route(hp, name, route);
        Ok(())
    }
}

/// The first route for a host, path and path type keeps the index free name older routers were
/// created with.
fn route_name(names: &dyn Namer, tag: &str, hp: &HostAndPath, occurrences: usize) -> String {
    if occurrences == 0 {
        names.route_for_path(tag, &hp.host, &hp.path, hp.path_type)
    } else {
        names.route_for_path2(tag, &hp.host, &hp.path, hp.path_type, occurrences)
    }
}
