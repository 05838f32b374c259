pub mod duration;
mod host_and_path;
mod options;
mod resource_key;

pub use host_and_path::{HostAndPath, PathType};
pub use options::{BackendType, ModifyResponseOptions, OptionsConflict, RouteOptions, VirtualHostOptions};
pub use resource_key::{ResourceKey, DEFAULT_NAMESPACE_NAME};
