mod backend_group_finder;
mod names;

pub use backend_group_finder::{BackendGroupFinder, BackendGroupLookup, InMemoryBackendGroupFinder};
pub use names::{ClusterLabels, Labels, Namer, Names, CLUSTER_ID_LABEL, MAX_NAME_LENGTH};
