use super::match_for_path;
use crate::{
    backends::alb::model::{BackendGroup, GrpcAction, GrpcRoute, GrpcRouteAction, GrpcRouteMatch},
    common::{HostAndPath, RouteOptions},
};

impl GrpcRoute {
    /// The path is matched against the fully qualified method name, the timeout becomes the
    /// maximum deadline a client may ask for.
    pub fn forward(hp: &HostAndPath, options: &RouteOptions, backend_group: &BackendGroup) -> Self {
        GrpcRoute {
            r#match: GrpcRouteMatch { fqmn: match_for_path(hp) },
            action: GrpcAction::Route(GrpcRouteAction {
                backend_group_id: backend_group.id.clone(),
                max_timeout: options.timeout,
                idle_timeout: options.idle_timeout,
            }),
        }
    }
}
