//! Static file serving module
//!
//! The [`Responder`] answers every request of the application server: it serves
//! files found under the root directory, answers misses with the SPA root
//! document (or 404), and decorates every response it produces.

use crate::config::Config;
use crate::handler::resolve::{self, FileTarget};
use crate::handler::router::RequestContext;
use crate::http::{self, cache, headers, mime};
use crate::logger::{self, Outcome};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, SERVER};
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serves a single-page application build directory
#[derive(Clone)]
pub struct Responder {
    root: PathBuf,
    canonical_root: PathBuf,
    index_file: String,
    spa_fallback: bool,
    server_name: Option<HeaderValue>,
    decorate: headers::Decorator,
}

impl Responder {
    pub fn new(
        root: impl Into<PathBuf>,
        index_file: impl Into<String>,
        spa_fallback: bool,
    ) -> Self {
        let root = root.into();
        let canonical_root = root.canonicalize().unwrap_or_else(|e| {
            logger::log_warning(&format!(
                "Cannot canonicalize root directory '{}': {e}",
                root.display()
            ));
            root.clone()
        });

        Self {
            root,
            canonical_root,
            index_file: index_file.into(),
            spa_fallback,
            server_name: None,
            decorate: headers::decorate,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.site.root_dir,
            &config.site.index_file,
            config.site.spa_fallback,
        )
        .with_server_name(&config.http.server_name)
    }

    /// Set the `Server` header value; invalid values are dropped with a warning
    #[must_use]
    pub fn with_server_name(mut self, name: &str) -> Self {
        self.server_name = match HeaderValue::from_str(name) {
            Ok(v) => Some(v),
            Err(e) => {
                logger::log_warning(&format!("Ignoring invalid server name '{name}': {e}"));
                None
            }
        };
        self
    }

    /// Replace the header decorator applied to every response
    #[must_use]
    pub const fn with_decorator(mut self, decorate: headers::Decorator) -> Self {
        self.decorate = decorate;
        self
    }

    /// Resolve a request path against this responder's root
    pub fn resolve(&self, request_path: &str) -> FileTarget {
        resolve::resolve(&self.root, &self.index_file, request_path)
    }

    /// Answer GET (and HEAD, without a body)
    pub async fn handle_get(&self, ctx: &RequestContext) -> Response<Full<Bytes>> {
        let mut response = match self.resolve(&ctx.path) {
            FileTarget::Within(path) => match self.existing_file(&path).await {
                Some(modified) => Self::serve_file(ctx, &path, modified).await,
                None => self.serve_miss(ctx).await,
            },
            FileTarget::Outside => {
                logger::log_warning(&format!(
                    "Path outside root directory refused: {}",
                    ctx.path
                ));
                self.serve_miss(ctx).await
            }
        };
        self.finish(&mut response, &ctx.path);
        response
    }

    /// Answer a CORS preflight: empty 200 whether or not the path exists
    pub fn handle_options(&self, ctx: &RequestContext) -> Response<Full<Bytes>> {
        let mut response = http::build_options_response();
        response.extensions_mut().insert(Outcome::Preflight);
        self.finish(&mut response, &ctx.path);
        response
    }

    /// Answer any method other than GET, HEAD and OPTIONS
    pub fn method_not_allowed(&self, ctx: &RequestContext) -> Response<Full<Bytes>> {
        let mut response = http::build_405_response();
        response.extensions_mut().insert(Outcome::Rejected);
        self.finish(&mut response, &ctx.path);
        response
    }

    /// Apply the header decorator and the `Server` header
    pub fn finish(&self, response: &mut Response<Full<Bytes>>, request_path: &str) {
        let map = response.headers_mut();
        (self.decorate)(map, resolve::strip_query(request_path));
        if let Some(name) = &self.server_name {
            map.insert(SERVER, name.clone());
        }
    }

    /// Modification time of a regular file under the root, `None` if there is no such file
    async fn existing_file(&self, path: &Path) -> Option<std::time::SystemTime> {
        let metadata = fs::metadata(path).await.ok()?;
        if !metadata.is_file() {
            return None;
        }

        // Symlinks may point anywhere; only follow those that stay under the root
        let canonical = fs::canonicalize(path).await.ok()?;
        if !canonical.starts_with(&self.canonical_root) {
            logger::log_warning(&format!(
                "Symlink escaping root directory refused: {} -> {}",
                path.display(),
                canonical.display()
            ));
            return None;
        }

        Some(metadata.modified().unwrap_or_else(|_| std::time::SystemTime::now()))
    }

    async fn serve_file(
        ctx: &RequestContext,
        path: &Path,
        modified: std::time::SystemTime,
    ) -> Response<Full<Bytes>> {
        let last_modified = cache::format_http_date(modified);
        if cache::check_not_modified(ctx.if_modified_since.as_deref(), modified) {
            return tagged(http::build_304_response(&last_modified), Outcome::NotModified);
        }

        match fs::read(path).await {
            Ok(content) => tagged(
                http::build_file_response(
                    Bytes::from(content),
                    mime::for_path(path),
                    Some(&last_modified),
                    ctx.is_head,
                ),
                Outcome::File,
            ),
            Err(e) => {
                logger::log_error(&format!("Failed to read file '{}': {e}", path.display()));
                tagged(http::build_500_response(), Outcome::Failed)
            }
        }
    }

    /// No file for this path: root document or 404
    async fn serve_miss(&self, ctx: &RequestContext) -> Response<Full<Bytes>> {
        if !self.spa_fallback {
            return tagged(http::build_404_response(), Outcome::NotFound);
        }

        let index_path = self.root.join(&self.index_file);
        match fs::read(&index_path).await {
            Ok(content) => {
                let mut response =
                    http::build_fallback_response(Bytes::from(content), ctx.is_head);
                headers::add_no_cache(response.headers_mut());
                tagged(response, Outcome::Fallback)
            }
            Err(e) => {
                logger::log_error(&format!(
                    "Failed to read root document '{}': {e}",
                    index_path.display()
                ));
                tagged(http::build_500_response(), Outcome::Failed)
            }
        }
    }
}

/// Record how the request was answered, for the access log
fn tagged(mut response: Response<Full<Bytes>>, outcome: Outcome) -> Response<Full<Bytes>> {
    response.extensions_mut().insert(outcome);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::header::HeaderMap;
    use std::fs as std_fs;
    use tempfile::TempDir;

    const INDEX: &[u8] = b"<html>A</html>";
    const MAIN_JS: &[u8] = b"console.log('main');";
    const LOGO: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        std_fs::write(dir.path().join("index.html"), INDEX).unwrap();
        std_fs::write(dir.path().join("main.js"), MAIN_JS).unwrap();
        std_fs::write(dir.path().join("logo.png"), LOGO).unwrap();
        std_fs::create_dir(dir.path().join("assets")).unwrap();
        std_fs::write(dir.path().join("assets/app.css"), "body{}").unwrap();
        dir
    }

    fn get(path: &str) -> RequestContext {
        RequestContext::new(path)
    }

    async fn body_of(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    fn has_no_cache(resp: &Response<Full<Bytes>>) -> bool {
        resp.headers().get("cache-control").is_some_and(|v| v == headers::NO_CACHE)
            && resp.headers().get("pragma").is_some_and(|v| v == "no-cache")
            && resp.headers().get("expires").is_some_and(|v| v == "0")
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let dir = site();
        let responder = Responder::new(dir.path(), "index.html", true);

        let resp = responder.handle_get(&get("/")).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "text/html");
        assert!(has_no_cache(&resp));
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert_eq!(body_of(resp).await, INDEX);
    }

    #[tokio::test]
    async fn test_existing_js_file() {
        let dir = site();
        let responder = Responder::new(dir.path(), "index.html", true);

        let resp = responder.handle_get(&get("/main.js")).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "application/javascript");
        assert!(resp.headers().contains_key("last-modified"));
        assert!(has_no_cache(&resp));
        assert_eq!(body_of(resp).await, MAIN_JS);
    }

    #[tokio::test]
    async fn test_existing_png_is_cacheable() {
        let dir = site();
        let responder = Responder::new(dir.path(), "index.html", true);

        let resp = responder.handle_get(&get("/logo.png")).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.extensions().get::<Outcome>(), Some(&Outcome::File));
        assert_eq!(resp.headers()["content-type"], "image/png");
        assert!(resp.headers().get("cache-control").is_none());
        assert!(resp.headers().get("pragma").is_none());
        assert!(resp.headers().get("expires").is_none());
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert_eq!(body_of(resp).await, LOGO);
    }

    #[tokio::test]
    async fn test_nested_file_and_query_ignored() {
        let dir = site();
        let responder = Responder::new(dir.path(), "index.html", true);

        let resp = responder.handle_get(&get("/assets/app.css?v=42")).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "text/css");
        assert_eq!(body_of(resp).await, "body{}");
    }

    #[tokio::test]
    async fn test_spa_route_falls_back_to_index() {
        let dir = site();
        let responder = Responder::new(dir.path(), "index.html", true);

        let resp = responder.handle_get(&get("/some/spa/route")).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.extensions().get::<Outcome>(), Some(&Outcome::Fallback));
        assert_eq!(resp.headers()["content-type"], "text/html");
        assert!(has_no_cache(&resp));
        assert!(resp.headers().get("last-modified").is_none());
        assert_eq!(body_of(resp).await, INDEX);
    }

    #[tokio::test]
    async fn test_directory_falls_back() {
        let dir = site();
        let responder = Responder::new(dir.path(), "index.html", true);

        let resp = responder.handle_get(&get("/assets")).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(body_of(resp).await, INDEX);
    }

    #[tokio::test]
    async fn test_fallback_reads_index_fresh() {
        let dir = site();
        let responder = Responder::new(dir.path(), "index.html", true);

        std_fs::write(dir.path().join("index.html"), "<html>B</html>").unwrap();
        let resp = responder.handle_get(&get("/deep/link")).await;
        assert_eq!(body_of(resp).await, "<html>B</html>");
    }

    #[tokio::test]
    async fn test_missing_without_fallback_is_404() {
        let dir = site();
        let responder = Responder::new(dir.path(), "index.html", false);

        let resp = responder.handle_get(&get("/missing")).await;
        assert_eq!(resp.status(), 404);
        assert_eq!(resp.extensions().get::<Outcome>(), Some(&Outcome::NotFound));
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert_eq!(body_of(resp).await, "404 Not Found");

        // Existing files are unaffected by the flag
        let resp = responder.handle_get(&get("/logo.png")).await;
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn test_traversal_never_leaves_root() {
        let outer = TempDir::new().unwrap();
        let root = outer.path().join("web");
        std_fs::create_dir(&root).unwrap();
        std_fs::write(root.join("index.html"), INDEX).unwrap();
        std_fs::write(outer.path().join("secret.txt"), "top secret").unwrap();

        let responder = Responder::new(&root, "index.html", true);
        for path in ["/../secret.txt", "/%2e%2e/secret.txt", "/a/../../secret.txt"] {
            let resp = responder.handle_get(&get(path)).await;
            assert_eq!(resp.status(), 200, "{path}");
            assert_eq!(body_of(resp).await, INDEX, "{path}");
        }

        let strict = Responder::new(&root, "index.html", false);
        let resp = strict.handle_get(&get("/../secret.txt")).await;
        assert_eq!(resp.status(), 404);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escaping_root_refused() {
        let outer = TempDir::new().unwrap();
        let root = outer.path().join("web");
        std_fs::create_dir(&root).unwrap();
        std_fs::write(root.join("index.html"), INDEX).unwrap();
        std_fs::write(outer.path().join("secret.txt"), "top secret").unwrap();
        std::os::unix::fs::symlink(outer.path().join("secret.txt"), root.join("leak.txt"))
            .unwrap();

        let responder = Responder::new(&root, "index.html", false);
        let resp = responder.handle_get(&get("/leak.txt")).await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_head_has_headers_without_body() {
        let dir = site();
        let responder = Responder::new(dir.path(), "index.html", true);

        let mut ctx = get("/main.js");
        ctx.is_head = true;
        let resp = responder.handle_get(&ctx).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()["content-length"],
            MAIN_JS.len().to_string().as_str()
        );
        assert!(body_of(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_if_modified_since_returns_304() {
        let dir = site();
        let responder = Responder::new(dir.path(), "index.html", true);

        let resp = responder.handle_get(&get("/logo.png")).await;
        let last_modified = resp.headers()["last-modified"].to_str().unwrap().to_string();

        let mut ctx = get("/logo.png");
        ctx.if_modified_since = Some(last_modified);
        let resp = responder.handle_get(&ctx).await;
        assert_eq!(resp.status(), 304);
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert!(body_of(resp).await.is_empty());

        // Fallback documents are always sent in full
        let mut ctx = get("/spa/route");
        ctx.if_modified_since = Some("Fri, 01 Jan 2100 00:00:00 GMT".to_string());
        let resp = responder.handle_get(&ctx).await;
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn test_read_failure_is_500() {
        let dir = site();
        let gone = dir.path().join("gone.js");

        let modified = std::time::SystemTime::now();
        let resp = Responder::serve_file(&get("/gone.js"), &gone, modified).await;
        assert_eq!(resp.status(), 500);
        assert_eq!(resp.extensions().get::<Outcome>(), Some(&Outcome::Failed));
        assert_eq!(body_of(resp).await, "500 Internal Server Error");
    }

    #[tokio::test]
    async fn test_index_removed_after_startup_is_500() {
        let dir = site();
        let responder = Responder::new(dir.path(), "index.html", true);
        std_fs::remove_file(dir.path().join("index.html")).unwrap();

        let resp = responder.handle_get(&get("/missing")).await;
        assert_eq!(resp.status(), 500);
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert_eq!(resp.headers()["access-control-allow-methods"], "GET, POST, OPTIONS");

        // Existing files are still served
        let resp = responder.handle_get(&get("/main.js")).await;
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn test_options_any_path() {
        let dir = site();
        let responder = Responder::new(dir.path(), "index.html", false);

        for path in ["/anything", "/", "/logo.png"] {
            let resp = responder.handle_options(&get(path));
            assert_eq!(resp.status(), 200);
            assert_eq!(resp.headers()["access-control-allow-origin"], "*");
            assert_eq!(resp.headers()["access-control-allow-methods"], "GET, POST, OPTIONS");
            assert!(body_of(resp).await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_method_not_allowed_decorated() {
        let dir = site();
        let responder = Responder::new(dir.path(), "index.html", true);

        let resp = responder.method_not_allowed(&get("/index.html"));
        assert_eq!(resp.status(), 405);
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert!(has_no_cache(&resp));
    }

    #[tokio::test]
    async fn test_server_name_and_custom_decorator() {
        fn only_origin(headers: &mut HeaderMap, _path: &str) {
            headers.insert(
                "access-control-allow-origin",
                HeaderValue::from_static("https://app.example"),
            );
        }

        let dir = site();
        let responder = Responder::new(dir.path(), "index.html", true)
            .with_server_name("spa-server/test")
            .with_decorator(only_origin);

        let resp = responder.handle_get(&get("/logo.png")).await;
        assert_eq!(resp.headers()["server"], "spa-server/test");
        assert_eq!(resp.headers()["access-control-allow-origin"], "https://app.example");
        assert!(resp.headers().get("access-control-allow-methods").is_none());
    }
}
