mod common;

use std::fs;
use std::path::Path;

use sluice::http::HttpMethod;
use sluice::{
    Captures, Error, Handler, HandlerContext, Reply, Result, Server, ServerConfig, Verb, factory,
};

use common::{request, send_raw, spawn};

const STATIC_CONTENT: &str = "THIS IS A STATIC FILE.\r\n";

struct Page;

impl Handler for Page {
    fn verbs(&self) -> &'static [Verb] {
        &[HttpMethod::Get, HttpMethod::Post]
    }

    fn get(&mut self, ctx: &mut HandlerContext<'_>, args: &Captures) -> Result<Reply> {
        let number: u32 = args.get_or(0, "0").parse().map_err(|_| Error::handler("bad number"))?;
        ctx.set_header("content-type", "text/html");
        Ok(format!("<b>PAGE {number}</b>").into())
    }

    fn post(&mut self, _ctx: &mut HandlerContext<'_>, _args: &Captures) -> Result<Reply> {
        Err(Error::handler("uninitialized"))
    }
}

struct Listing;

impl Handler for Listing {
    fn verbs(&self) -> &'static [Verb] {
        &[HttpMethod::Get]
    }

    fn get(&mut self, ctx: &mut HandlerContext<'_>, _args: &Captures) -> Result<Reply> {
        let title = ctx.argument_or("title", "Items").to_string();
        let items = ctx.query().all("item").to_vec();
        let rows: Vec<[(&str, &str); 1]> = items.iter().map(|i| [("name", i.as_str())]).collect();
        let body = ctx.render_list("row.htm", &rows)?;
        Ok(ctx.render("list.htm", &[("title", title.as_str()), ("rows", body.as_str())])?.into())
    }
}

struct Moved;

impl Handler for Moved {
    fn verbs(&self) -> &'static [Verb] {
        &[HttpMethod::Get]
    }

    fn get(&mut self, ctx: &mut HandlerContext<'_>, _args: &Captures) -> Result<Reply> {
        Ok(ctx.redirect("/page/1"))
    }
}

struct Login;

impl Handler for Login {
    fn verbs(&self) -> &'static [Verb] {
        &[HttpMethod::Get]
    }

    fn get(&mut self, ctx: &mut HandlerContext<'_>, _args: &Captures) -> Result<Reply> {
        let next = ctx.argument_or("next", "/").to_string();
        Ok(ctx.redirect(&next))
    }
}

struct Status;

impl Handler for Status {
    fn verbs(&self) -> &'static [Verb] {
        &[HttpMethod::Get]
    }

    fn get(&mut self, _ctx: &mut HandlerContext<'_>, _args: &Captures) -> Result<Reply> {
        Ok(Reply::json(serde_json::json!({ "ok": true, "routes": 5 })))
    }
}

fn views(dir: &Path) {
    fs::write(dir.join("list.htm"), "<h1>$title</h1><ul>$rows</ul>").unwrap();
    fs::write(dir.join("row.htm"), "<li>${name}</li>").unwrap();
}

fn start(root: &Path) -> std::net::SocketAddr {
    let static_dir = root.join("static");
    let view_dir = root.join("views");
    fs::create_dir_all(static_dir.join("sub")).unwrap();
    fs::create_dir_all(&view_dir).unwrap();
    fs::write(static_dir.join("file.txt"), STATIC_CONTENT).unwrap();
    views(&view_dir);

    let config = ServerConfig {
        static_path: static_dir,
        view_path: view_dir,
        debug: true,
        chunk_size: 7,
        ..ServerConfig::default()
    };
    let mut server = Server::new(config);
    server
        .add_handlers([
            (r"/page/(\d+)?", factory(|| Page)),
            ("/list", factory(|| Listing)),
            ("/moved", factory(|| Moved)),
            ("/login", factory(|| Login)),
            ("/status", factory(|| Status)),
        ])
        .unwrap()
        .enable_static(None, None)
        .unwrap();
    spawn(server)
}

#[test]
fn page_200() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(dir.path());

    let res = request(addr, "GET", "/page/5");
    assert_eq!(res.status, 200);
    assert_eq!(res.status_line, "HTTP/1.1 200 OK");
    assert_eq!(res.text(), "<b>PAGE 5</b>");
    assert_eq!(res.header("content-length"), Some("13"));
}

#[test]
fn unknown_path_404() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(dir.path());

    let res = request(addr, "GET", "/pages/arent/here");
    assert_eq!(res.status, 404);
    assert_eq!(res.status_line, "HTTP/1.1 404 Not Found");
}

#[test]
fn raising_handler_500_then_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(dir.path());

    let res = request(addr, "POST", "/page/10");
    assert_eq!(res.status, 500);
    assert_eq!(res.status_line, "HTTP/1.1 500 Server error");
    assert!(res.text().contains("uninitialized"));

    assert_eq!(request(addr, "GET", "/page/10").status, 200);
}

#[test]
fn static_200_streams_exact_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(dir.path());

    let res = request(addr, "GET", "/static/file.txt");
    assert_eq!(res.status, 200);
    assert_eq!(res.body, STATIC_CONTENT.as_bytes());
    assert_eq!(res.header("content-length"), Some(STATIC_CONTENT.len().to_string().as_str()));
    assert_eq!(res.header("content-type"), Some("text/plain"));
}

#[test]
fn static_missing_and_forbidden() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(dir.path());

    assert_eq!(request(addr, "GET", "/static/nope.txt").status, 404);
    assert_eq!(request(addr, "GET", "/static/sub").status, 403);
    assert_eq!(request(addr, "GET", "/static/../views/list.htm").status, 404);
    assert_eq!(request(addr, "GET", "/static/%2e%2e/views/list.htm").status, 404);
}

#[test]
fn json_reply() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(dir.path());

    let res = request(addr, "GET", "/status");
    assert_eq!(res.status, 200);
    assert_eq!(res.header("content-type"), Some("application/json"));
    let value: serde_json::Value = serde_json::from_slice(&res.body).unwrap();
    assert_eq!(value, serde_json::json!({ "ok": true, "routes": 5 }));
}

#[test]
fn redirect_sets_location() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(dir.path());

    let res = request(addr, "GET", "/moved");
    assert_eq!(res.status_line, "HTTP/1.1 302 Redirect");
    assert_eq!(res.header("location"), Some("/page/1"));
    assert!(res.body.is_empty());
}

#[test]
fn redirect_target_cannot_inject_headers() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(dir.path());

    let res = request(addr, "GET", "/login?next=/x%0d%0aSet-Cookie:%20admin=1");
    assert_eq!(res.status, 302);
    assert_eq!(res.header("location"), Some("/xSet-Cookie: admin=1"));
    assert_eq!(res.header("set-cookie"), None);
}

#[test]
fn render_and_render_list() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(dir.path());

    let res = request(addr, "GET", "/list?title=Fruit&item=apple&item=pear");
    assert_eq!(res.status, 200);
    assert_eq!(res.text(), "<h1>Fruit</h1><ul><li>apple</li><li>pear</li></ul>");
}

#[test]
fn views_are_not_reread_after_first_render() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(dir.path());

    let first = request(addr, "GET", "/list?item=a");
    fs::write(dir.path().join("views/row.htm"), "CHANGED").unwrap();
    let second = request(addr, "GET", "/list?item=a");
    assert_eq!(first.text(), second.text());
}

#[test]
fn head_omits_body() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(dir.path());

    // Page has no HEAD method, so this is a routing miss.
    let res = request(addr, "HEAD", "/page/5");
    assert_eq!(res.status, 404);
    assert!(res.body.is_empty());
}

#[test]
fn malformed_request_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(dir.path());

    let res = send_raw(addr, b"NONSENSE\r\n\r\n");
    assert_eq!(res.status, 400);

    let res = send_raw(addr, b"GET / HTTP/1.1\r\n\r\n");
    assert_eq!(res.status, 400);
}
