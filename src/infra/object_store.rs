use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::app::ports::ObjectStorePort;
use crate::error::StorageError;

/// Objects laid out on disk as `<root>/<container>/<key>`.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, container: &str, key: &str) -> Result<PathBuf, StorageError> {
        for part in [container, key] {
            let escapes = Path::new(part)
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if part.is_empty() || escapes {
                return Err(StorageError::InvalidKey(format!("{}/{}", container, key)));
            }
        }
        Ok(self.root.join(container).join(key))
    }
}

#[async_trait]
impl ObjectStorePort for FsObjectStore {
    async fn fetch(&self, container: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.object_path(container, key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound {
                container: container.to_string(),
                key: key.to_string(),
            }),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

// Bytes that would end or restructure a single path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// S3-compatible endpoint read with path-style URLs: `<base_url>/<container>/<key>`.
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpObjectStore {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Path-style URL with the container and every key segment percent-encoded.
    pub fn object_url(&self, container: &str, key: &str) -> String {
        let mut url = format!("{}/{}", self.base_url, utf8_percent_encode(container, PATH_SEGMENT));
        for segment in key.trim_start_matches('/').split('/') {
            url.push('/');
            url.extend(utf8_percent_encode(segment, PATH_SEGMENT));
        }
        url
    }
}

#[async_trait]
impl ObjectStorePort for HttpObjectStore {
    async fn fetch(&self, container: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let mut request = self.client.get(self.object_url(container, key));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let resp = request
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound {
                container: container.to_string(),
                key: key.to_string(),
            });
        }
        if !status.is_success() {
            return Err(StorageError::Status {
                status: status.as_u16(),
                container: container.to_string(),
                key: key.to_string(),
            });
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::test_support::spawn_router;
    use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode, Uri};
    use axum::Router;
    use tempfile::tempdir;

    #[tokio::test]
    async fn reads_object_under_container_directory() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("uploads/daily")).unwrap();
        std::fs::write(dir.path().join("uploads/daily/users.csv"), b"identifier\n").unwrap();

        let store = FsObjectStore::new(dir.path());
        let bytes = store.fetch("uploads", "daily/users.csv").await.unwrap();
        assert_eq!(bytes, b"identifier\n");
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let dir = tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());
        let err = store.fetch("uploads", "nope.csv").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
        assert_eq!(err.to_string(), "object uploads/nope.csv not found");
    }

    #[tokio::test]
    async fn keys_cannot_escape_the_root() {
        let dir = tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());
        for (container, key) in [("uploads", "../secret.csv"), ("..", "x.csv"), ("uploads", "/etc/passwd")] {
            let err = store.fetch(container, key).await.unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey(_)), "{container}/{key}");
        }
    }

    #[test]
    fn builds_path_style_urls() {
        let store = HttpObjectStore::new("http://localhost:9000/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(
            store.object_url("uploads", "daily/users.csv"),
            "http://localhost:9000/uploads/daily/users.csv"
        );
    }

    #[test]
    fn reserved_key_characters_stay_inside_the_path() {
        let store = HttpObjectStore::new("http://localhost:9000", None, Duration::from_secs(1)).unwrap();
        let cases = [
            ("reports/q1#final.csv", "/uploads/reports/q1%23final.csv"),
            ("a?b.csv", "/uploads/a%3Fb.csv"),
            ("100%41.csv", "/uploads/100%2541.csv"),
            ("daily/good users.csv", "/uploads/daily/good%20users.csv"),
        ];
        for (key, path) in cases {
            let url = reqwest::Url::parse(&store.object_url("uploads", key)).unwrap();
            assert_eq!(url.path(), path, "{key}");
            assert_eq!(url.query(), None, "{key}");
            assert_eq!(url.fragment(), None, "{key}");
        }
    }

    async fn serve_object(uri: Uri, headers: HeaderMap) -> (StatusCode, &'static str) {
        match uri.path() {
            "/uploads/daily/users.csv" => (StatusCode::OK, "identifier\nab12\n"),
            "/uploads/reports/q1%23final.csv" => (StatusCode::OK, "quarterly\n"),
            "/uploads/private.csv" => match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
                Some("Bearer s3cret") => (StatusCode::OK, "private\n"),
                _ => (StatusCode::FORBIDDEN, ""),
            },
            _ => (StatusCode::NOT_FOUND, ""),
        }
    }

    fn http_store(token: Option<&str>) -> HttpObjectStore {
        let base_url = spawn_router(Router::new().fallback(serve_object));
        HttpObjectStore::new(&base_url, token.map(str::to_string), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn http_fetch_returns_object_body() {
        let store = http_store(None);
        assert_eq!(store.fetch("uploads", "daily/users.csv").await.unwrap(), b"identifier\nab12\n");
        assert_eq!(store.fetch("uploads", "reports/q1#final.csv").await.unwrap(), b"quarterly\n");
    }

    #[tokio::test]
    async fn http_404_is_not_found() {
        let store = http_store(None);
        let err = store.fetch("uploads", "reports/q1").await.unwrap_err();
        assert!(
            matches!(&err, StorageError::NotFound { container, key } if container == "uploads" && key == "reports/q1"),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn http_error_status_is_reported_with_code() {
        let store = http_store(None);
        let err = store.fetch("uploads", "private.csv").await.unwrap_err();
        assert!(matches!(err, StorageError::Status { status: 403, .. }), "{err:?}");
        assert_eq!(err.to_string(), "storage returned status 403 for uploads/private.csv");
    }

    #[tokio::test]
    async fn http_token_is_sent_as_bearer_auth() {
        let store = http_store(Some("s3cret"));
        assert_eq!(store.fetch("uploads", "private.csv").await.unwrap(), b"private\n");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let store = HttpObjectStore::new("http://127.0.0.1:1", None, Duration::from_secs(2)).unwrap();
        let err = store.fetch("uploads", "users.csv").await.unwrap_err();
        assert!(matches!(err, StorageError::Transport(_)), "{err:?}");
    }
}
