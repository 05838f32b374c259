use super::match_for_path;
use crate::{
    backends::alb::model::{BackendGroup, HttpAction, HttpRoute, HttpRouteAction, HttpRouteMatch},
    common::{HostAndPath, RouteOptions},
};

impl HttpRoute {
    pub fn forward(hp: &HostAndPath, options: &RouteOptions, backend_group: &BackendGroup) -> Self {
        let action = HttpAction::Route(HttpRouteAction {
            backend_group_id: backend_group.id.clone(),
            timeout: options.timeout,
            idle_timeout: options.idle_timeout,
            prefix_rewrite: options.prefix_rewrite.clone(),
            upgrade_types: options.upgrade_types.clone(),
        });
        Self::for_action(hp, action, &options.allowed_methods)
    }

    pub fn for_action(hp: &HostAndPath, action: HttpAction, methods: &[String]) -> Self {
        HttpRoute {
            r#match: HttpRouteMatch {
                http_method: methods.to_vec(),
                path: match_for_path(hp),
            },
            action,
        }
    }
}
