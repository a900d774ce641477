use std::env;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Component, Path, PathBuf};
use std::process::{Command, ExitCode};
use std::time::Duration;

use log::LevelFilter;
use serde::Serialize;
use titik_fiksi::{ContentSource, DirSource, SiteConfig};
use titik_fiksi_render_web::{render_document, render_page, PageContext, PageOutput, Route};

const DEFAULT_ROOT: &str = ".";
const DEFAULT_PORT: u16 = 42818;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Args {
    root: String,
    config_path: Option<String>,
    port: u16,
    open_browser: bool,
    render_target: Option<String>,
}

#[derive(Debug)]
struct HttpRequest {
    method: String,
    path: String,
}

#[derive(Debug, PartialEq, Eq)]
struct HttpResponse {
    status: &'static str,
    content_type: &'static str,
    location: Option<String>,
    body: Vec<u8>,
}

impl HttpResponse {
    fn ok(content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status: "200 OK",
            content_type,
            location: None,
            body,
        }
    }

    fn redirect(location: String) -> Self {
        Self {
            status: "302 Found",
            content_type: "text/plain",
            location: Some(location),
            body: Vec::new(),
        }
    }

    fn not_found() -> Self {
        Self {
            status: "404 Not Found",
            content_type: "application/json",
            location: None,
            body: br#"{"error":"not_found"}"#.to_vec(),
        }
    }
}

#[derive(Serialize)]
struct PagePayload<'a> {
    route: Route,
    output: &'a PageOutput,
}

fn main() -> ExitCode {
    if let Err(err) = init_logging() {
        eprintln!("warning: {}", err);
    }

    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("{}", help_text());
            ExitCode::FAILURE
        }
    }
}

fn init_logging() -> Result<(), log::SetLoggerError> {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .try_init()
}

fn run(args: Vec<String>) -> Result<(), String> {
    let cli = parse_args(args)?;
    let config = match &cli.config_path {
        Some(path) => SiteConfig::from_json_file(path)?,
        None => SiteConfig::default(),
    };
    let source = DirSource::new(&cli.root);

    if let Some(target) = &cli.render_target {
        let ctx = PageContext::from_target(target);
        let out = render_page(&ctx, &source, &config);
        print!("{}", render_document(ctx.route, &out));
        return Ok(());
    }

    run_server(&source, &config, cli.port, cli.open_browser)
}

fn run_server(
    source: &DirSource,
    config: &SiteConfig,
    port: u16,
    open_browser: bool,
) -> Result<(), String> {
    let listener = TcpListener::bind(("127.0.0.1", port)).map_err(|e| e.to_string())?;
    let addr = listener.local_addr().map_err(|e| e.to_string())?;
    let url = format!("http://{}:{}/", addr.ip(), addr.port());

    println!("serving {} at {}", source.root().display(), url);

    if open_browser {
        try_open_browser(&url);
    }

    for incoming in listener.incoming() {
        let mut stream = match incoming {
            Ok(stream) => stream,
            Err(err) => {
                eprintln!("accept error: {}", err);
                continue;
            }
        };
        if let Err(err) = stream.set_read_timeout(Some(Duration::from_secs(15))) {
            eprintln!("set timeout failed: {}", err);
        }
        if let Err(err) = handle_connection(&mut stream, source, config) {
            eprintln!("request error: {}", err);
        }
    }

    Ok(())
}

fn try_open_browser(url: &str) {
    let mut opened = false;

    if let Ok(status) = Command::new("open").arg(url).status() {
        if status.success() {
            opened = true;
        }
    }

    if !opened {
        let _ = Command::new("xdg-open").arg(url).status();
    }
}

fn handle_connection(
    stream: &mut TcpStream,
    source: &DirSource,
    config: &SiteConfig,
) -> Result<(), String> {
    let req = read_http_request(stream)?;
    let response = respond(&req, source, config)?;
    log::info!("{} {} -> {}", req.method, req.path, response.status);
    write_http_response(stream, &response)
}

fn respond(
    req: &HttpRequest,
    source: &DirSource,
    config: &SiteConfig,
) -> Result<HttpResponse, String> {
    if req.method != "GET" {
        return Ok(HttpResponse::not_found());
    }
    let path = req.path.split('?').next().unwrap_or(&req.path);

    if path == "/api/page" {
        let target = query_value(&req.path, "target").unwrap_or_else(|| "/".to_string());
        let ctx = PageContext::from_target(&target);
        let out = render_page(&ctx, source, config);
        let payload = PagePayload {
            route: ctx.route,
            output: &out,
        };
        let body = serde_json::to_vec(&payload).map_err(|e| e.to_string())?;
        return Ok(HttpResponse::ok("application/json", body));
    }

    if path.ends_with('/') || path.ends_with(".html") {
        return Ok(render_route(&req.path, source, config));
    }

    Ok(serve_static(source.root(), path))
}

fn render_route(target: &str, source: &dyn ContentSource, config: &SiteConfig) -> HttpResponse {
    let ctx = PageContext::from_target(target);
    let out = render_page(&ctx, source, config);
    if let Some(location) = out.redirect {
        return HttpResponse::redirect(location);
    }
    HttpResponse::ok(
        "text/html; charset=utf-8",
        render_document(ctx.route, &out).into_bytes(),
    )
}

fn serve_static(root: &Path, path: &str) -> HttpResponse {
    let Some(full) = static_path(root, path) else {
        return HttpResponse::not_found();
    };
    let Some(content_type) = mime_from_path(path) else {
        return HttpResponse::not_found();
    };
    match std::fs::read(&full) {
        Ok(body) => HttpResponse::ok(content_type, body),
        Err(_) => HttpResponse::not_found(),
    }
}

fn static_path(root: &Path, path: &str) -> Option<PathBuf> {
    let relative = path.trim_start_matches('/');
    if relative.is_empty() {
        return None;
    }
    let safe = Path::new(relative)
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    safe.then(|| root.join(relative))
}

fn query_value(target: &str, key: &str) -> Option<String> {
    let (_, query) = target.split_once('?')?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

fn read_http_request(stream: &mut TcpStream) -> Result<HttpRequest, String> {
    let mut buf = Vec::with_capacity(4096);
    let mut chunk = [0u8; 1024];
    let mut header_end = None;

    while header_end.is_none() {
        let n = stream.read(&mut chunk).map_err(|e| e.to_string())?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(idx) = find_header_end(&buf) {
            header_end = Some(idx);
            break;
        }
        if buf.len() > 64 * 1024 {
            return Err("request header too large".to_string());
        }
    }

    let header_end = header_end.ok_or_else(|| "incomplete http request".to_string())?;
    parse_request_head(&buf[..header_end])
}

fn parse_request_head(head: &[u8]) -> Result<HttpRequest, String> {
    let text = String::from_utf8_lossy(head);
    let request_line = text
        .split("\r\n")
        .next()
        .ok_or_else(|| "missing request line".to_string())?;

    let mut parts = request_line.split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| "missing method".to_string())?
        .to_string();
    let path = parts
        .next()
        .ok_or_else(|| "missing path".to_string())?
        .to_string();
    Ok(HttpRequest { method, path })
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn write_http_response(stream: &mut TcpStream, response: &HttpResponse) -> Result<(), String> {
    let location = response
        .location
        .as_ref()
        .map(|l| format!("Location: {}\r\n", l))
        .unwrap_or_default();
    let header = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n{}Cache-Control: no-store\r\nConnection: close\r\n\r\n",
        response.status,
        response.content_type,
        response.body.len(),
        location
    );
    stream
        .write_all(header.as_bytes())
        .map_err(|e| e.to_string())?;
    stream.write_all(&response.body).map_err(|e| e.to_string())
}

fn mime_from_path(path: &str) -> Option<&'static str> {
    let ext = extension_of(path)?;
    match ext.as_str() {
        "json" => Some("application/json"),
        "css" => Some("text/css; charset=utf-8"),
        "js" => Some("text/javascript; charset=utf-8"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "ico" => Some("image/x-icon"),
        "woff2" => Some("font/woff2"),
        "woff" => Some("font/woff"),
        _ => None,
    }
}

fn extension_of(path: &str) -> Option<String> {
    let no_query = path.split_once('?').map_or(path, |(base, _)| base);
    let name = no_query.rsplit('/').next().unwrap_or(no_query);
    let ext = name.rsplit_once('.')?.1;
    Some(ext.to_ascii_lowercase())
}

fn parse_args(args: Vec<String>) -> Result<Args, String> {
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h") {
        return Err("help requested".to_string());
    }

    let mut cfg = Args {
        root: DEFAULT_ROOT.to_string(),
        config_path: None,
        port: DEFAULT_PORT,
        open_browser: false,
        render_target: None,
    };

    let mut i = 1usize;
    while i < args.len() {
        match args[i].as_str() {
            "--root" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--root requires a value".to_string())?;
                cfg.root = v.clone();
                i += 2;
            }
            "--config" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--config requires a value".to_string())?;
                cfg.config_path = Some(v.clone());
                i += 2;
            }
            "--port" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--port requires a value".to_string())?;
                cfg.port = v
                    .parse::<u16>()
                    .map_err(|_| format!("invalid --port value '{}'", v))?;
                i += 2;
            }
            "--open" => {
                cfg.open_browser = true;
                i += 1;
            }
            "--render" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--render requires a value".to_string())?;
                cfg.render_target = Some(v.clone());
                i += 2;
            }
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }

    if cfg.root.trim().is_empty() {
        return Err("--root must not be empty".to_string());
    }
    Ok(cfg)
}

fn help_text() -> &'static str {
    r#"site-preview - local preview server for a titik-fiksi content tree

USAGE:
  cargo run -p titik-fiksi-render-web --bin site-preview -- [options]

MODES:
  default: serve rendered pages and static assets from --root
  --render <target>: print one rendered page and exit

OPTIONS:
  --root <dir>        site root holding content/ and assets/ (default: .)
  --config <file>     JSON site config (paths, chapter strategy, probe limits)
  --port <n>          server port (default: 42818)
  --open              open browser automatically
  --render <target>   page target, e.g. "chapter.html?novel=senja&chapter=02"

ENDPOINTS:
  GET /<page>.html?...          rendered page; unknown pages redirect to index.html
  GET /api/page?target=<url>    page bindings as JSON
  GET /<file>                   static file under --root
"#
}
