//! Router configuration as consumed by the load balancer control plane.
//!
//! Field names follow the control plane's JSON representation. Optional sub-messages that are
//! unset are skipped rather than written as empty objects.

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};

use crate::common::duration;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendGroup {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRouter {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub folder_id: String,
    pub name: String,
    pub description: String,
    pub labels: BTreeMap<String, String>,
    pub virtual_hosts: Vec<VirtualHost>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualHost {
    pub name: String,
    pub authority: Vec<String>,
    pub routes: Vec<Route>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_options: Option<RouteOptions>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOptions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub modify_response_headers: Vec<HeaderModification>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub security_profile_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HeaderModification {
    pub name: String,
    #[serde(flatten)]
    pub operation: HeaderOperation,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HeaderOperation {
    Append(String),
    Replace(String),
    Remove(bool),
    Rename(String),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Route {
    pub name: String,
    #[serde(flatten)]
    pub route: RouteSpecifier,
}

/// Protocol specific part of a route. Exactly one of the two is set on every route.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteSpecifier {
    Http(HttpRoute),
    Grpc(GrpcRoute),
}

impl Route {
    pub fn new(name: String, route: RouteSpecifier) -> Self {
        Self { name, route }
    }

    pub fn http(&self) -> Option<&HttpRoute> {
        match &self.route {
            RouteSpecifier::Http(http_route) => Some(http_route),
            RouteSpecifier::Grpc(_) => None,
        }
    }

    pub fn grpc(&self) -> Option<&GrpcRoute> {
        match &self.route {
            RouteSpecifier::Grpc(grpc_route) => Some(grpc_route),
            RouteSpecifier::Http(_) => None,
        }
    }
}

impl From<HttpRoute> for RouteSpecifier {
    fn from(route: HttpRoute) -> Self {
        RouteSpecifier::Http(route)
    }
}

impl From<GrpcRoute> for RouteSpecifier {
    fn from(route: GrpcRoute) -> Self {
        RouteSpecifier::Grpc(route)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StringMatch {
    ExactMatch(String),
    PrefixMatch(String),
    RegexMatch(String),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HttpRoute {
    pub r#match: HttpRouteMatch,
    #[serde(flatten)]
    pub action: HttpAction,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRouteMatch {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub http_method: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<StringMatch>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HttpAction {
    Route(HttpRouteAction),
    Redirect(RedirectAction),
    DirectResponse(DirectResponseAction),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRouteAction {
    pub backend_group_id: String,
    #[serde(with = "duration", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
    #[serde(with = "duration", skip_serializing_if = "Option::is_none")]
    pub idle_timeout: Option<Duration>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub prefix_rewrite: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub upgrade_types: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedirectResponseCode {
    #[default]
    MovedPermanently,
    Found,
    SeeOther,
    TemporaryRedirect,
    PermanentRedirect,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RedirectPath {
    ReplacePath(String),
    ReplacePrefix(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectAction {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub replace_scheme: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub replace_host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace_port: Option<u16>,
    #[serde(flatten)]
    pub path: Option<RedirectPath>,
    pub remove_query: bool,
    pub response_code: RedirectResponseCode,
}

impl RedirectAction {
    pub fn to_https() -> Self {
        Self {
            replace_scheme: "https".to_owned(),
            replace_port: Some(443),
            remove_query: false,
            response_code: RedirectResponseCode::MovedPermanently,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectResponseAction {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Payload>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GrpcRoute {
    pub r#match: GrpcRouteMatch,
    #[serde(flatten)]
    pub action: GrpcAction,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GrpcRouteMatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fqmn: Option<StringMatch>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GrpcAction {
    Route(GrpcRouteAction),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrpcRouteAction {
    pub backend_group_id: String,
    #[serde(with = "duration", skip_serializing_if = "Option::is_none")]
    pub max_timeout: Option<Duration>,
    #[serde(with = "duration", skip_serializing_if = "Option::is_none")]
    pub idle_timeout: Option<Duration>,
}
