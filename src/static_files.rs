//! Static asset and template backend.
//!
//! A [`StaticFiles`] instance serves one directory. The HTTP service keeps two:
//! one for the static asset path (raw bytes) and one for the dynamic asset
//! path (templates rendered with `minijinja` when a [`View`](crate::resolutions::View)
//! forwards to them).

use minijinja::Environment;
use serde_json::Value as JsonValue;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self { base_dir: base.into() }
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Map a URL path below this directory; `None` for anything that would escape it.
    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone();
        for comp in Path::new(url_path.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }

    fn content_type(path: &Path) -> &'static str {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "html" | "htm" => "text/html; charset=utf-8",
            "css" => "text/css",
            "js" => "application/javascript",
            "json" => "application/json",
            "txt" => "text/plain; charset=utf-8",
            "svg" => "image/svg+xml",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "ico" => "image/x-icon",
            "woff2" => "font/woff2",
            _ => "application/octet-stream",
        }
    }

    fn existing_file(&self, url_path: &str) -> io::Result<PathBuf> {
        let path = self
            .map_path(url_path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "invalid path"))?;
        if !path.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        }
        Ok(path)
    }

    /// Raw bytes and content type of the file at `url_path`.
    pub fn load(&self, url_path: &str) -> io::Result<(Vec<u8>, &'static str)> {
        let path = self.existing_file(url_path)?;
        let bytes = fs::read(&path)?;
        Ok((bytes, Self::content_type(&path)))
    }

    /// Render the template at `url_path` with `ctx` as its context.
    pub fn render(&self, url_path: &str, ctx: &JsonValue) -> io::Result<(Vec<u8>, &'static str)> {
        let path = self.existing_file(url_path)?;
        let source = fs::read_to_string(&path)?;
        let mut env = Environment::new();
        env.add_template("view", &source).map_err(io::Error::other)?;
        let rendered = env
            .get_template("view")
            .and_then(|tmpl| tmpl.render(ctx))
            .map_err(io::Error::other)?;
        Ok((rendered.into_bytes(), Self::content_type(&path)))
    }
}
