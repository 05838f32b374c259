use std::sync::Arc;

use tracing::info;

pub mod backends;
pub mod common;
pub mod configuration;
pub mod services;
#[cfg(test)]
mod test;

use backends::alb::{model::HttpRouter, HttpRouterBuilder, RouterBuilderError};
use common::HostAndPath;
use configuration::{Configuration, RuleTarget};
use services::{ClusterLabels, InMemoryBackendGroupFinder, Names};

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;

/// Replays every ingress contribution of `configuration` through a fresh builder and returns the
/// resulting router.
pub async fn build_router(configuration: &Configuration) -> Result<HttpRouter> {
    configuration.validate()?;

    let names = Arc::new(Names);
    let backend_group_finder = configuration
        .backend_groups
        .iter()
        .map(|declaration| declaration.to_backend_group(names.as_ref()))
        .collect::<std::result::Result<InMemoryBackendGroupFinder, _>>()?;
    let mut builder = HttpRouterBuilder::builder()
        .tag(configuration.tag.clone())
        .folder_id(configuration.folder_id.clone())
        .is_tls(configuration.tls)
        .names(names)
        .labels(Arc::new(ClusterLabels::builder().cluster_id(configuration.cluster_id.clone()).build()))
        .backend_group_finder(Arc::new(backend_group_finder))
        .build();

    for ingress in &configuration.ingresses {
        let rules = ingress.ingress_rules();
        info!("Adding {} rules from namespace {}", rules.len(), ingress.namespace());
        builder.configure(ingress.virtual_host_options.clone(), ingress.route_options.clone(), ingress.namespace());
        for rule in &rules {
            let hp = rule.host_and_path(&ingress.route_options);
            add_rule(&mut builder, &hp, rule.target()?).await?;
        }
    }

    Ok(builder.build())
}

async fn add_rule(builder: &mut HttpRouterBuilder, hp: &HostAndPath, target: RuleTarget<'_>) -> std::result::Result<(), RouterBuilderError> {
    match target {
        RuleTarget::Service(service_name) => builder.add_route(hp, service_name).await,
        RuleTarget::Resource(resource_name) => builder.add_route_to_resource(hp, resource_name).await,
        RuleTarget::RedirectToHttps => builder.add_redirect_to_https(hp),
        RuleTarget::Redirect(redirect) => builder.add_redirect(hp, redirect),
        RuleTarget::DirectResponse(direct_response) => builder.add_direct_response(hp, direct_response),
    }
}
