//! Engine endpoint construction
//!
//! The engine serves its REST API and its session streams from the same
//! host. [`EngineUrl`] holds the HTTP base and derives everything else from
//! it: API paths, the container attach stream, and the image build stream.

use url::Url;

use crate::error::ConfigError;

/// Parameters of an image build, carried as query parameters on the build
/// stream URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Build context directory
    pub context: String,
    /// Name of the Dockerfile inside the context
    pub dockerfile: String,
    /// `name:tag` for the resulting image
    pub tag: String,
    /// Suppress build output and only report the image id
    pub quiet: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            context: ".".to_string(),
            dockerfile: "Dockerfile".to_string(),
            tag: String::new(),
            quiet: false,
        }
    }
}

/// Base URL of a jocker engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineUrl {
    base: Url,
}

impl EngineUrl {
    /// Parse an engine host.
    ///
    /// Accepts `http://` and `https://` URLs, `tcp://host:port` (treated as
    /// plain HTTP), and bare `host:port`.
    pub fn parse(host: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidHost {
            host: host.to_string(),
            reason: reason.to_string(),
        };

        let normalized = if let Some(rest) = host.strip_prefix("tcp://") {
            format!("http://{}", rest)
        } else if host.starts_with("unix://") {
            return Err(invalid("unix sockets are not supported"));
        } else if host.contains("://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        };

        let mut base = Url::parse(&normalized).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http, https or tcp"));
        }
        if base.cannot_be_a_base() || base.host_str().is_none() {
            return Err(invalid("missing host"));
        }

        // Joined paths must extend the base path, not replace its last segment
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);

        Ok(Self { base })
    }

    /// HTTP base URL
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// URL of a REST API path made of `segments`; each segment is
    /// percent-encoded on its own
    pub fn api<I>(&self, segments: I) -> Url
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Stream URI attaching to a container's console
    pub fn container_attach(&self, container: &str) -> Url {
        Self::websocket(self.api(["containers", container, "attach"]))
    }

    /// Stream URI that starts an image build and streams its log
    pub fn image_build(&self, options: &BuildOptions) -> Url {
        let mut url = Self::websocket(self.api(["images", "build"]));
        // Keys in sorted order, matching the engine's reference client
        url.query_pairs_mut()
            .append_pair("context", &options.context)
            .append_pair("dockerfile", &options.dockerfile)
            .append_pair("quiet", if options.quiet { "true" } else { "false" })
            .append_pair("tag", &options.tag);
        url
    }

    /// Swap an HTTP URL onto the matching WebSocket scheme
    fn websocket(mut url: Url) -> Url {
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        // http/https -> ws/wss is always permitted between special schemes
        let _ = url.set_scheme(scheme);
        url
    }
}

impl std::fmt::Display for EngineUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.base)
    }
}
