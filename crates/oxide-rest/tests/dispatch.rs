//! Tests for request resolution across services.

mod common;
use common::*;

use oxide_rest::mime::{APPLICATION_JSON, APPLICATION_XML, TEXT_PLAIN};
use oxide_rest::{ConfigError, DispatchError};

fn users() -> oxide_rest::Service {
    let mut ws = service("/users");
    ws.route(
        ws.get("/{id}")
            .consumes([APPLICATION_JSON])
            .operation("findUserJson")
            .to(ok_handler),
    )
    .unwrap();
    ws.route(
        ws.get("/{id}")
            .consumes([APPLICATION_XML])
            .operation("findUserXml")
            .to(ok_handler),
    )
    .unwrap();
    ws
}

#[test]
fn content_type_picks_matching_route() {
    let router = router([users()]);
    let resolved = router
        .resolve("GET", "/users/42", Some(APPLICATION_XML), None)
        .unwrap();
    assert_eq!(resolved.route().operation(), "findUserXml");
    let params: Vec<_> = resolved.params().iter().collect();
    assert_eq!(params, vec![("id", "42")]);
}

#[test]
fn content_type_with_parameters_still_matches() {
    let router = router([users()]);
    let resolved = router
        .resolve("GET", "/users/42", Some("application/xml; charset=utf-8"), None)
        .unwrap();
    assert_eq!(resolved.route().operation(), "findUserXml");
}

#[test]
fn unsupported_content_type() {
    let router = router([users()]);
    let err = router
        .resolve("GET", "/users/42", Some(TEXT_PLAIN), None)
        .unwrap_err();
    assert_eq!(
        err,
        DispatchError::UnsupportedMediaType {
            content_type: TEXT_PLAIN.to_string()
        }
    );
    assert_eq!(err.status_code(), 415);
}

#[test]
fn unknown_path() {
    let router = router([users()]);
    let err = resolve_err(&router, "GET", "/unknown");
    assert!(matches!(err, DispatchError::NoMatchingRoute { .. }));
    assert_eq!(err.status_code(), 404);
}

#[test]
fn unregistered_method_reports_allowed_set() {
    let router = router([users()]);
    let err = resolve_err(&router, "DELETE", "/users/42");
    let allowed = err.allowed_methods().unwrap();
    assert_eq!(allowed.len(), 1);
    assert!(allowed.contains("GET"));
}

#[test]
fn allowed_set_spans_services() {
    let mut other = service("/");
    other
        .route(other.put("/users/{name}").to(ok_handler))
        .unwrap();
    let router = router([users(), other]);

    let err = resolve_err(&router, "PATCH", "/users/7");
    let allowed: Vec<_> = err.allowed_methods().unwrap().iter().collect();
    assert_eq!(allowed, vec!["GET", "PUT"]);
}

#[test]
fn methods_are_case_sensitive() {
    let router = router([users()]);
    let err = resolve_err(&router, "get", "/users/42");
    assert!(matches!(err, DispatchError::MethodNotAllowed { .. }));
}

#[test]
fn registration_order_breaks_ties_deterministically() {
    let router = router([users()]);
    for _ in 0..10 {
        assert_eq!(
            resolve(&router, "GET", "/users/42").route().operation(),
            "findUserJson"
        );
    }
}

#[test]
fn service_order_breaks_ties() {
    let mut first = service("/api");
    first
        .route(first.get("/items").operation("first").to(ok_handler))
        .unwrap();
    let mut second = service("/api");
    second
        .route(second.get("/items").operation("second").to(ok_handler))
        .unwrap();

    let router = router([first, second]);
    assert_eq!(
        resolve(&router, "GET", "/api/items").route().operation(),
        "first"
    );
}

#[test]
fn accept_filters_candidates() {
    let mut ws = service("/reports");
    ws.route(
        ws.get("/{id}")
            .produces([APPLICATION_JSON])
            .operation("json")
            .to(ok_handler),
    )
    .unwrap();
    ws.route(
        ws.get("/{id}")
            .produces(["text/csv"])
            .operation("csv")
            .to(ok_handler),
    )
    .unwrap();
    let router = router([ws]);

    let resolved = router
        .resolve("GET", "/reports/1", None, Some("text/csv"))
        .unwrap();
    assert_eq!(resolved.route().operation(), "csv");

    let resolved = router
        .resolve("GET", "/reports/1", None, Some("text/*, application/json;q=0.1"))
        .unwrap();
    assert_eq!(resolved.route().operation(), "json");

    let err = router
        .resolve("GET", "/reports/1", None, Some("image/png"))
        .unwrap_err();
    assert_eq!(err.status_code(), 406);
}

#[test]
fn content_type_is_checked_before_accept() {
    let mut ws = service("/upload");
    ws.route(
        ws.post("")
            .consumes([APPLICATION_JSON])
            .produces([APPLICATION_JSON])
            .to(ok_handler),
    )
    .unwrap();
    let router = router([ws]);

    let err = router
        .resolve("POST", "/upload", Some(TEXT_PLAIN), Some("image/png"))
        .unwrap_err();
    assert!(matches!(err, DispatchError::UnsupportedMediaType { .. }));
}

#[test]
fn negotiation_only_considers_method_matches() {
    let mut ws = service("/things");
    ws.route(ws.get("").consumes([APPLICATION_JSON]).to(ok_handler))
        .unwrap();
    ws.route(ws.post("").consumes([APPLICATION_XML]).to(ok_handler))
        .unwrap();
    let router = router([ws]);

    let err = router
        .resolve("GET", "/things", Some(APPLICATION_XML), None)
        .unwrap_err();
    assert!(matches!(err, DispatchError::UnsupportedMediaType { .. }));
}

#[test]
fn blank_headers_are_ignored() {
    let router = router([users()]);
    assert!(router
        .resolve("GET", "/users/42", Some(""), Some("  "))
        .is_ok());
}

#[test]
fn route_without_consumes_accepts_any_content_type() {
    let mut ws = service("/open");
    ws.route(ws.post("").to(ok_handler)).unwrap();
    let router = router([ws]);
    assert!(router
        .resolve("POST", "/open", Some("application/octet-stream"), None)
        .is_ok());
}

#[test]
fn constrained_and_literal_routes_coexist() {
    let mut ws = service("/users");
    ws.route(ws.get("/me").operation("me").to(ok_handler)).unwrap();
    ws.route(ws.get("/{id:[0-9]+}").operation("byId").to(ok_handler))
        .unwrap();
    let router = router([ws]);

    assert_eq!(resolve(&router, "GET", "/users/me").route().operation(), "me");
    assert_eq!(
        resolve(&router, "GET", "/users/12").route().operation(),
        "byId"
    );
    assert!(matches!(
        resolve_err(&router, "GET", "/users/bob"),
        DispatchError::NoMatchingRoute { .. }
    ));
}

#[test]
fn root_parameters_are_extracted() {
    let mut ws = service("/orgs/{org}");
    ws.route(ws.get("/repos/{repo}").to(ok_handler)).unwrap();
    let router = router([ws]);

    let resolved = resolve(&router, "GET", "/orgs/rust-lang/repos/cargo");
    assert_eq!(resolved.params().get("org"), Some("rust-lang"));
    assert_eq!(resolved.params().get("repo"), Some("cargo"));
}

#[test]
fn wildcard_route_captures_remainder() {
    let mut ws = service("/static");
    ws.route(ws.get("/{*file}").to(ok_handler)).unwrap();
    let router = router([ws]);

    let resolved = resolve(&router, "GET", "/static/css/app/site.css");
    assert_eq!(resolved.params().get("file"), Some("css/app/site.css"));
}

#[test]
fn every_registered_route_is_reachable() {
    let mut api = service("/a");
    let other = service("/b");
    api.route(other.get("/x").operation("borrowed").to(ok_handler))
        .unwrap();
    let err = api.path("/elsewhere").unwrap_err();
    assert!(matches!(err, ConfigError::RootAfterRoutes { .. }));
    let router = router([api]);

    assert_eq!(
        resolve(&router, "GET", "/a/x").route().operation(),
        "borrowed"
    );
    assert!(matches!(
        resolve_err(&router, "GET", "/b/x"),
        DispatchError::NoMatchingRoute { .. }
    ));
}

#[test]
fn refused_media_type_is_not_acceptable() {
    let mut ws = service("/data");
    ws.route(ws.get("").produces([APPLICATION_JSON]).to(ok_handler))
        .unwrap();
    let router = router([ws]);

    let err = router
        .resolve("GET", "/data", None, Some("application/json;q=0, */*"))
        .unwrap_err();
    assert_eq!(err.status_code(), 406);
}

#[test]
fn router_stays_usable_after_errors() {
    let router = router([users()]);
    let _ = resolve_err(&router, "GET", "/nope");
    let _ = resolve_err(&router, "DELETE", "/users/1");
    assert!(router.resolve("GET", "/users/1", None, None).is_ok());
}

#[test]
fn concurrent_resolution() {
    let router = router([users()]);
    std::thread::scope(|scope| {
        for i in 0..4 {
            let router = &router;
            scope.spawn(move || {
                let path = format!("/users/{i}");
                let resolved = resolve(router, "GET", &path);
                assert_eq!(resolved.params().get("id"), Some(i.to_string().as_str()));
            });
        }
    });
}
