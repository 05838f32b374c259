use super::model::{HeaderModification, HeaderOperation, RouteOptions, StringMatch};
use crate::common::{HostAndPath, ModifyResponseOptions, PathType, VirtualHostOptions};

mod grpc;
mod http;

/// Empty path matches everything and yields no matcher at all.
pub fn match_for_path(hp: &HostAndPath) -> Option<StringMatch> {
    if hp.is_match_all() {
        return None;
    }

    let path = hp.path.clone();
    Some(match hp.path_type {
        PathType::Regex => StringMatch::RegexMatch(path),
        PathType::Prefix => StringMatch::PrefixMatch(path),
        PathType::Exact | PathType::ImplementationSpecific => StringMatch::ExactMatch(path),
    })
}

fn modify_response_headers(modify_response: &ModifyResponseOptions) -> Vec<HeaderModification> {
    let modification = |name: &String, operation| HeaderModification { name: name.clone(), operation };

    let mut headers = Vec::with_capacity(modify_response.len());
    headers.extend(modify_response.remove.iter().map(|(name, remove)| modification(name, HeaderOperation::Remove(*remove))));
    headers.extend(modify_response.replace.iter().map(|(name, value)| modification(name, HeaderOperation::Replace(value.clone()))));
    headers.extend(modify_response.rename.iter().map(|(name, value)| modification(name, HeaderOperation::Rename(value.clone()))));
    headers.extend(modify_response.append.iter().map(|(name, value)| modification(name, HeaderOperation::Append(value.clone()))));
    headers
}

/// Virtual host level route options, `None` when there is nothing to set.
pub fn route_options(options: &VirtualHostOptions) -> Option<RouteOptions> {
    let modify_response_headers = modify_response_headers(&options.modify_response);
    let security_profile_id = options.security_profile_id().unwrap_or_default();
    if modify_response_headers.is_empty() && security_profile_id.is_empty() {
        return None;
    }

    Some(RouteOptions {
        modify_response_headers,
        security_profile_id: security_profile_id.to_owned(),
    })
}
