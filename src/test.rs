use crate::{
    backends::alb::model::{DirectResponseAction, HttpAction, Payload, RedirectAction, RedirectResponseCode, StringMatch},
    build_router,
    common::{HostAndPath, PathType},
    configuration::{BackendGroupDeclaration, Configuration, IngressContribution, IngressRule, RuleTarget},
    services::{Namer, Names},
};

const SESSION: &str = r"
tag: shop
folder_id: folder-1
cluster_id: cluster-1
backend_groups:
- id: bg-web
  namespace: shop
  service: web
- id: bg-api
  namespace: api
  resource: api-backends
ingresses:
- namespace: shop
  virtual_host_options:
    modify_response:
      append:
        X-Frame-Options: DENY
  route_options:
    timeout: 30s
  rules:
  - host: shop.example.com
    path: /
    path_type: Prefix
    service: web
  - host: old.example.com
    redirect_to_https: true
- namespace: api
  virtual_host_options:
    security_profile_id: sp-1
    modify_response:
      remove:
        Server: true
  route_options:
    use_regex: true
  rules:
  - host: api.example.com
    path: /v[0-9]+/.*
    path_type: ImplementationSpecific
    resource: api-backends
  - host: shop.example.com
    path: /maintenance
    path_type: Exact
    direct_response:
      status: 503
      body: down for maintenance
  - host: shop.example.com
    path: /legacy
    path_type: Exact
    redirect:
      replace_host: legacy.example.com
      replace_path: /
      response_code: FOUND
";

#[tokio::test]
async fn test_build_router_from_session_file() {
    let configuration: Configuration = serde_yaml::from_str(SESSION).unwrap();
    let router = build_router(&configuration).await.unwrap();

    assert_eq!(router.name, Names.router("shop"));
    assert_eq!(router.folder_id, "folder-1");
    let authorities: Vec<_> = router.virtual_hosts.iter().flat_map(|vh| vh.authority.clone()).collect();
    assert_eq!(authorities, vec!["shop.example.com".to_owned(), "old.example.com".to_owned(), "api.example.com".to_owned()]);

    let shop = &router.virtual_hosts[0];
    assert_eq!(shop.routes.len(), 3);
    let shop_options = shop.route_options.as_ref().unwrap();
    assert_eq!(shop_options.modify_response_headers.len(), 2);
    assert_eq!(shop_options.security_profile_id, "sp-1");

    let api = &router.virtual_hosts[2];
    let api_route = api.routes[0].http().unwrap();
    assert_eq!(api_route.r#match.path, Some(StringMatch::RegexMatch("/v[0-9]+/.*".to_owned())));
    assert_eq!(api.routes[0].name, Names.route_for_path("shop", "api.example.com", "/v[0-9]+/.*", PathType::Regex));

    let legacy = shop.routes[2].http().unwrap();
    let HttpAction::Redirect(redirect) = &legacy.action else {
        panic!("expected redirect, got {:?}", legacy.action);
    };
    assert_eq!(redirect.replace_host, "legacy.example.com");
    assert_eq!(redirect.path, Some(crate::backends::alb::model::RedirectPath::ReplacePath("/".to_owned())));
    assert_eq!(redirect.response_code, RedirectResponseCode::Found);

    let maintenance = shop.routes[1].http().unwrap();
    assert_eq!(
        maintenance.action,
        HttpAction::DirectResponse(DirectResponseAction {
            status: 503,
            body: Some(Payload {
                text: "down for maintenance".to_owned()
            }),
        })
    );

    let old = router.virtual_hosts[1].routes[0].http().unwrap();
    assert_eq!(old.action, HttpAction::Redirect(RedirectAction::to_https()));
    assert_eq!(router.virtual_hosts[1].route_options.as_ref().map(|o| o.modify_response_headers.len()), Some(1));
}

#[tokio::test]
async fn test_build_router_reports_missing_backend_group() {
    let configuration = Configuration::builder()
        .tag("shop")
        .ingresses(vec![IngressContribution::builder()
            .rules(vec![IngressRule {
                host: "a.com".to_owned(),
                service: Some("missing".to_owned()),
                ..Default::default()
            }])
            .build()])
        .build();
    let err = build_router(&configuration).await.unwrap_err();
    assert!(err.to_string().contains("is not ready"), "{err}");
}

#[tokio::test]
async fn test_build_router_reports_conflicts() {
    let yaml = r"
tag: shop
ingresses:
- virtual_host_options:
    security_profile_id: sp-1
  rules:
  - host: a.com
    redirect_to_https: true
- virtual_host_options:
    security_profile_id: sp-2
  rules:
  - host: a.com
    redirect_to_https: true
";
    let configuration: Configuration = serde_yaml::from_str(yaml).unwrap();
    let err = build_router(&configuration).await.unwrap_err();
    assert!(err.to_string().contains("conflict with vh security profiles: sp-1 and sp-2"), "{err}");
}

#[test]
fn test_configuration_validation() {
    assert!(Configuration::builder().tag("").build().validate().is_err());
    assert!(Configuration::builder().tag("t").build().validate().is_ok());

    let no_target = IngressRule {
        host: "a.com".to_owned(),
        ..Default::default()
    };
    assert!(no_target.target().is_err());

    let two_targets = IngressRule {
        host: "a.com".to_owned(),
        service: Some("web".to_owned()),
        redirect_to_https: true,
        ..Default::default()
    };
    assert!(two_targets.target().is_err());
    let configuration = Configuration::builder()
        .tag("t")
        .ingresses(vec![IngressContribution::builder().rules(vec![two_targets]).build()])
        .build();
    assert!(configuration.validate().is_err());

    let resource = IngressRule {
        resource: Some("bg".to_owned()),
        ..Default::default()
    };
    assert_eq!(resource.target().unwrap(), RuleTarget::Resource("bg"));

    let both = BackendGroupDeclaration::builder().id("bg").service("web").resource("web").build();
    assert!(both.validate().is_err());
    let configuration = Configuration::builder().tag("t").backend_groups(vec![both]).build();
    assert!(configuration.validate().is_err());
}

#[test]
fn test_backend_group_declaration_names() {
    let service = BackendGroupDeclaration::builder().id("bg-1").namespace("shop").service("web").build();
    let backend_group = service.to_backend_group(&Names).unwrap();
    assert_eq!(backend_group.id, "bg-1");
    assert_eq!(backend_group.name, Names.new_backend_group(&crate::common::ResourceKey::namespaced("web", "shop")));

    let resource = BackendGroupDeclaration::builder().id("bg-2").resource("api").build();
    assert_eq!(resource.to_backend_group(&Names).unwrap().name, Names.backend_group_for_cr("default", "api"));
}

#[test]
fn test_regex_opt_in_only_changes_implementation_specific_paths() {
    let mut rule = IngressRule {
        host: "a.com".to_owned(),
        path: "/x".to_owned(),
        path_type: PathType::ImplementationSpecific,
        ..Default::default()
    };
    let mut route_options = crate::common::RouteOptions::default();
    assert_eq!(rule.host_and_path(&route_options).path_type, PathType::ImplementationSpecific);
    route_options.use_regex = true;
    assert_eq!(rule.host_and_path(&route_options).path_type, PathType::Regex);
    rule.path_type = PathType::Prefix;
    assert_eq!(rule.host_and_path(&route_options).path_type, PathType::Prefix);
}

#[test]
fn test_redirect_can_replace_either_path_or_prefix() {
    let yaml = r"
host: a.com
path: /old
redirect:
  replace_path: /new
  replace_prefix: /new
";
    let rule: IngressRule = serde_yaml::from_str(yaml).unwrap();
    let err = rule.target().unwrap_err();
    assert!(err.to_string().contains("can't replace both path and prefix"), "{err}");

    let rule: IngressRule = serde_yaml::from_str("redirect:\n  replace_prefix: /new\n").unwrap();
    let RuleTarget::Redirect(redirect) = rule.target().unwrap() else {
        panic!("expected redirect target");
    };
    assert_eq!(redirect.path, Some(crate::backends::alb::model::RedirectPath::ReplacePrefix("/new".to_owned())));
    assert_eq!(redirect.response_code, RedirectResponseCode::MovedPermanently);
}

const MANIFEST_SESSION: &str = r"
tag: shop
backend_groups:
- id: bg-web
  namespace: store
  service: web
- id: bg-cr
  namespace: store
  resource: static-backends
ingresses:
- namespace: ignored
  rules:
  - host: shop.example.com
    redirect_to_https: true
    path: /http
    path_type: Exact
  manifest:
    apiVersion: networking.k8s.io/v1
    kind: Ingress
    metadata:
      name: shop
      namespace: store
    spec:
      rules:
      - host: shop.example.com
        http:
          paths:
          - path: /
            pathType: Prefix
            backend:
              service:
                name: web
                port:
                  number: 80
          - path: /static
            pathType: Exact
            backend:
              resource:
                apiGroup: alb.example.com
                kind: HttpBackendGroup
                name: static-backends
";

#[tokio::test]
async fn test_build_router_from_ingress_manifest() {
    let configuration: Configuration = serde_yaml::from_str(MANIFEST_SESSION).unwrap();
    let ingress = &configuration.ingresses[0];
    assert_eq!(ingress.namespace(), "store");

    let rules = ingress.ingress_rules();
    assert_eq!(rules.len(), 3);
    assert!(rules[0].redirect_to_https);
    assert_eq!(rules[1].host_and_path(&ingress.route_options), HostAndPath::new("shop.example.com", "/", PathType::Prefix));
    assert_eq!(rules[1].target().unwrap(), RuleTarget::Service("web"));
    assert_eq!(rules[2].target().unwrap(), RuleTarget::Resource("static-backends"));

    let router = build_router(&configuration).await.unwrap();
    assert_eq!(router.virtual_hosts.len(), 1);
    let routes = &router.virtual_hosts[0].routes;
    assert_eq!(routes.len(), 3);
    let backend_group_ids: Vec<_> = routes
        .iter()
        .filter_map(|route| match &route.http()?.action {
            HttpAction::Route(action) => Some(action.backend_group_id.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(backend_group_ids, vec!["bg-web".to_owned(), "bg-cr".to_owned()]);
}

#[test]
fn test_manifest_namespace_falls_back_to_contribution_namespace() {
    let yaml = r"
namespace: shop
manifest:
  apiVersion: networking.k8s.io/v1
  kind: Ingress
  metadata:
    name: shop
  spec:
    rules:
    - host: a.com
";
    let ingress: IngressContribution = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(ingress.namespace(), "shop");
    assert!(ingress.ingress_rules().is_empty());
}
