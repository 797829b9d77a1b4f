//! End-to-end tests: raw HTTP against `AppService` on a real `may_minihttp` server.

use chainroute::context::{ContextSettings, ResolutionContext};
use chainroute::dispatcher::DispatchFilter;
use chainroute::server::{AppService, HttpServer, ServerHandle};
use std::net::{SocketAddr, TcpListener};
use std::path::PathBuf;
use std::sync::Arc;

mod common;
use common::handlers::{registry, NAMESPACE};
use common::http::{get, header, parse_response, send_request};
use common::test_server::setup_may_runtime;

fn start_service(mount_prefix: &str) -> (ServerHandle, SocketAddr) {
    setup_may_runtime();
    let context =
        ResolutionContext::new(ContextSettings::new(NAMESPACE), Arc::new(registry())).unwrap();
    let filter = Arc::new(DispatchFilter::new(Arc::new(context)));
    let service = AppService::new(
        filter,
        Some(PathBuf::from("tests/staticdata/static")),
        Some(PathBuf::from("tests/staticdata/dynamic")),
    )
    .with_mount_prefix(mount_prefix);

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let handle = HttpServer(service).start(addr).unwrap();
    handle.wait_ready().unwrap();
    (handle, addr)
}

#[test]
fn test_root_redirects_to_index() {
    let (handle, addr) = start_service("");
    let resp = get(&addr, "/");
    handle.stop();
    let (status, headers, _) = parse_response(&resp);
    assert_eq!(status, 302);
    assert_eq!(header(&headers, "location"), Some("/index"));
}

#[test]
fn test_handler_chain_over_http() {
    let (handle, addr) = start_service("");
    let resp = get(&addr, "/sub1/sub2/someTest?who=ferris");
    handle.stop();
    let (status, headers, body) = parse_response(&resp);
    assert_eq!(status, 200);
    assert_eq!(header(&headers, "content-type"), Some("text/plain; charset=utf-8"));
    assert_eq!(body, "some test for ferris");
}

#[test]
fn test_form_body_params() {
    let (handle, addr) = start_service("");
    let form = "who=form%20user";
    let resp = send_request(
        &addr,
        &format!(
            "POST /sub1/sub2/someTest HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{form}",
            form.len()
        ),
    );
    handle.stop();
    let (status, _, body) = parse_response(&resp);
    assert_eq!(status, 200);
    assert_eq!(body, "some test for form user");
}

#[test]
fn test_static_asset_served() {
    let (handle, addr) = start_service("");
    let text = get(&addr, "/static/hello.txt");
    let css = get(&addr, "/static/css/site.css");
    handle.stop();

    let (status, headers, body) = parse_response(&text);
    assert_eq!(status, 200);
    assert_eq!(header(&headers, "content-type"), Some("text/plain; charset=utf-8"));
    assert_eq!(body, "Hello\n");

    let (status, headers, _) = parse_response(&css);
    assert_eq!(status, 200);
    assert_eq!(header(&headers, "content-type"), Some("text/css"));
}

#[test]
fn test_static_traversal_blocked() {
    let (handle, addr) = start_service("");
    let resp = get(&addr, "/static/../Cargo.toml");
    handle.stop();
    let (status, _, _) = parse_response(&resp);
    assert_eq!(status, 404);
}

#[test]
fn test_unknown_handler_is_404() {
    let (handle, addr) = start_service("");
    let resp = get(&addr, "/does/not/exist");
    handle.stop();
    let (status, headers, body) = parse_response(&resp);
    assert_eq!(status, 404);
    assert_eq!(header(&headers, "content-type"), Some("application/json"));
    assert!(body.contains("Not Found"));
}

#[test]
fn test_redirect_to_handler() {
    let (handle, addr) = start_service("");
    let resp = get(&addr, "/user/login");
    handle.stop();
    let (status, headers, _) = parse_response(&resp);
    assert_eq!(status, 302);
    assert_eq!(header(&headers, "location"), Some("/index?msg=welcome%20back"));
}

#[test]
fn test_view_rendered_with_attributes() {
    let (handle, addr) = start_service("");
    let hello = get(&addr, "/hello?name=Rust");
    let show = get(&addr, "/user/show?user=ann&tags=a&tags=b");
    handle.stop();

    let (status, headers, body) = parse_response(&hello);
    assert_eq!(status, 200);
    assert_eq!(header(&headers, "content-type"), Some("text/html; charset=utf-8"));
    assert_eq!(body, "<h1>Hello Rust!</h1>");

    let (status, _, body) = parse_response(&show);
    assert_eq!(status, 200);
    assert_eq!(body, "<p>ann #a #b</p>");
}

#[test]
fn test_failures_are_500() {
    let (handle, addr) = start_service("");
    let explode = get(&addr, "/explode");
    let broken = get(&addr, "/broken");
    let missing_view = get(&addr, "/missingView");
    handle.stop();

    for resp in [&explode, &broken, &missing_view] {
        let (status, _, body) = parse_response(resp);
        assert_eq!(status, 500);
        assert!(body.contains("Internal Server Error"));
        assert!(!body.contains("partial"));
        assert!(!body.contains("boom"));
    }
}

#[test]
fn test_mounted_below_prefix() {
    let (handle, addr) = start_service("/shop");
    let root = get(&addr, "/shop");
    let index = get(&addr, "/shop/index");
    let login = get(&addr, "/shop/user/login");
    let asset = get(&addr, "/shop/static/hello.txt");
    let sibling = get(&addr, "/shopping/index");
    handle.stop();

    let (status, _, _) = parse_response(&sibling);
    assert_eq!(status, 404);

    let (status, headers, _) = parse_response(&root);
    assert_eq!(status, 302);
    assert_eq!(header(&headers, "location"), Some("/shop/index"));

    let (status, _, body) = parse_response(&index);
    assert_eq!(status, 200);
    assert_eq!(body, "index");

    let (_, headers, _) = parse_response(&login);
    assert_eq!(header(&headers, "location"), Some("/shop/index?msg=welcome%20back"));

    let (status, _, body) = parse_response(&asset);
    assert_eq!(status, 200);
    assert_eq!(body, "Hello\n");
}
