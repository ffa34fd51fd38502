//! Serving files from disk, optionally gzip-compressed.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, error, info, trace};

use crate::config::ConfigBlock;
use crate::parser::HttpRequest;
use crate::server::{Error, HandlerFuture, HttpResponse, RequestHandler, StatusCode};

/// Content type for a file name, by extension.
pub fn mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "htm" | "html" | "php" => "text/html",
        "css" => "text/css",
        "txt" => "text/plain",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "swf" => "application/x-shockwave-flash",
        "flv" => "video/x-flv",
        "png" => "image/png",
        "jpe" | "jpeg" | "jpg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "ico" => "image/vnd.microsoft.icon",
        "tiff" | "tif" => "image/tiff",
        "svg" | "svgz" => "image/svg+xml",
        "zip" => "application/zip",
        _ => "text/plain",
    }
}

/// Serves files under the `root` given in its config block.
///
/// When `root` names a file, that file is served for every target. A
/// handler without a `root` answers every request with a 500.
#[derive(Debug)]
pub struct StaticHandler {
    prefix: String,
    root: Option<PathBuf>,
}

impl StaticHandler {
    pub fn new(prefix: impl Into<String>, config: &ConfigBlock) -> Self {
        let prefix = prefix.into();
        let root = config.find_str("root").map(PathBuf::from);
        if root.is_none() {
            error!("StaticHandler for {prefix}: missing root directive");
        }
        Self { prefix, root }
    }

    /// Map a request path onto the filesystem, or `None` when it must not
    /// be served.
    fn resolve(&self, root: &Path, path: &str) -> Option<PathBuf> {
        let relative = path.strip_prefix(self.prefix.as_str()).unwrap_or(path);
        let relative = Path::new(relative.trim_start_matches('/'));

        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }
        Some(root.join(relative))
    }

    async fn serve(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        let Some(root) = &self.root else {
            return Ok(HttpResponse::internal_error());
        };

        let path = request.path().trim_end_matches('/');
        trace!("StaticHandler for {}: target is {path}", self.prefix);

        let root_meta = match tokio::fs::metadata(root).await {
            Ok(meta) => meta,
            Err(_) => {
                info!("StaticHandler serving on non-existent path {}", root.display());
                return Ok(HttpResponse::not_found());
            }
        };

        let file = if root_meta.is_dir() {
            let Some(file) = self.resolve(root, path) else {
                debug!("StaticHandler refusing {path}");
                return Ok(HttpResponse::not_found());
            };
            match tokio::fs::metadata(&file).await {
                Ok(meta) if meta.is_file() => file,
                _ => {
                    debug!("StaticHandler could not find {}", file.display());
                    return Ok(HttpResponse::not_found());
                }
            }
        } else {
            root.clone()
        };

        let body = tokio::fs::read(&file).await?;
        Ok(HttpResponse::new(StatusCode::OK)
            .with_content_type(mime_type(&file))
            .with_body_bytes(body))
    }
}

impl RequestHandler for StaticHandler {
    fn name(&self) -> &'static str {
        "StaticHandler"
    }

    fn handle<'a>(&'a self, request: &'a HttpRequest) -> HandlerFuture<'a> {
        Box::pin(self.serve(request))
    }
}

/// Gzip `data` at the best compression level.
pub fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 64), Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}

/// [`StaticHandler`] that gzips successful responses for clients that
/// accept it.
#[derive(Debug)]
pub struct CompressedFileHandler {
    files: StaticHandler,
}

impl CompressedFileHandler {
    pub fn new(prefix: impl Into<String>, config: &ConfigBlock) -> Self {
        Self {
            files: StaticHandler::new(prefix, config),
        }
    }
}

impl RequestHandler for CompressedFileHandler {
    fn name(&self) -> &'static str {
        "CompressedFileHandler"
    }

    fn handle<'a>(&'a self, request: &'a HttpRequest) -> HandlerFuture<'a> {
        Box::pin(async move {
            let response = self.files.serve(request).await?;

            let accepts_gzip = request
                .get_header("Accept-Encoding")
                .is_some_and(|encodings| encodings.contains("gzip"));
            if !accepts_gzip || response.status != StatusCode::OK {
                return Ok(response);
            }

            let original = response.body.len();
            let compressed = gzip(&response.body)?;
            info!(
                "metrics: compressedHandler reduced body size (bytes): {}",
                original as i64 - compressed.len() as i64
            );
            Ok(response
                .with_header("Content-Encoding", "gzip")
                .with_body_bytes(compressed))
        })
    }
}
