pub mod model;
mod route_converters;
mod router_builder;
mod virtual_hosts;

pub use route_converters::{match_for_path, route_options};
pub use router_builder::{HttpRouterBuilder, RouterBuilderError, BACKEND_GROUP_RESOURCE_TYPE};
pub use virtual_hosts::{VirtualHost, VirtualHosts};
