//! Elasticsearch store configuration.

use jstore_core::{StoreError, StoreOption, StoreResult};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Longest index name the cluster accepts, in bytes.
const MAX_INDEX_NAME_BYTES: usize = 255;

/// Maps `(project, document_type, match_all)` to an index name.
///
/// With `match_all == false` the result is the one index receiving writes.
/// With `match_all == true` it must cover every index holding the collection,
/// typically a wildcard pattern such as `logs-hitchhikers-person-*`.
pub type IndexNaming = dyn Fn(&str, &str, bool) -> String + Send + Sync;

/// When writes become visible to searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Leave refreshing to the cluster's refresh interval.
    #[default]
    None,
    /// Block each write until a refresh has made it searchable.
    WaitFor,
    /// Force a refresh after each write.
    Immediate,
}

impl RefreshPolicy {
    /// Returns the `refresh` query parameter for writes, if any.
    pub const fn as_param(self) -> Option<&'static str> {
        match self {
            RefreshPolicy::None => None,
            RefreshPolicy::WaitFor => Some("wait_for"),
            RefreshPolicy::Immediate => Some("true"),
        }
    }
}

impl fmt::Display for RefreshPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param().unwrap_or("false"))
    }
}

impl FromStr for RefreshPolicy {
    type Err = StoreError;

    fn from_str(s: &str) -> StoreResult<Self> {
        match s {
            "false" | "none" => Ok(RefreshPolicy::None),
            "wait_for" => Ok(RefreshPolicy::WaitFor),
            "true" | "immediate" => Ok(RefreshPolicy::Immediate),
            other => Err(StoreError::invalid_config(format!(
                "unknown refresh policy '{other}'"
            ))),
        }
    }
}

/// Configuration for an [`crate::ElasticStore`].
#[derive(Clone)]
pub struct ElasticConfig {
    /// Cluster base URL, e.g. `http://localhost:9200`.
    pub base_url: Url,

    /// Prepended to every index name.
    pub index_prefix: String,

    /// Write visibility.
    pub refresh: RefreshPolicy,

    /// Request timeout.
    pub timeout: Duration,

    /// Sub-field holding the exact value of dynamically mapped strings.
    pub keyword_suffix: String,

    /// Upper bound on the `size` of one search.
    pub max_result_window: usize,

    /// Custom index naming. `None` uses the escaped default scheme.
    pub index_naming: Option<Arc<IndexNaming>>,
}

impl fmt::Debug for ElasticConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElasticConfig")
            .field("base_url", &self.base_url.as_str())
            .field("index_prefix", &self.index_prefix)
            .field("refresh", &self.refresh)
            .field("timeout", &self.timeout)
            .field("keyword_suffix", &self.keyword_suffix)
            .field("max_result_window", &self.max_result_window)
            .field("index_naming", &self.index_naming.as_ref().map(|_| "custom"))
            .finish()
    }
}

impl ElasticConfig {
    /// Creates a configuration with default settings for `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            index_prefix: String::new(),
            refresh: RefreshPolicy::None,
            timeout: Duration::from_secs(30),
            keyword_suffix: ".keyword".to_string(),
            max_result_window: 10_000,
            index_naming: None,
        }
    }

    /// Sets the index name prefix.
    #[must_use]
    pub fn index_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.index_prefix = prefix.into();
        self
    }

    /// Sets the refresh policy.
    #[must_use]
    pub const fn refresh(mut self, refresh: RefreshPolicy) -> Self {
        self.refresh = refresh;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the keyword sub-field suffix.
    #[must_use]
    pub fn keyword_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.keyword_suffix = suffix.into();
        self
    }

    /// Sets the largest search size requested from the cluster.
    #[must_use]
    pub const fn max_result_window(mut self, window: usize) -> Self {
        self.max_result_window = window;
        self
    }

    /// Replaces the default index naming, e.g. for time-based indices.
    ///
    /// The prefix is not applied to custom names.
    ///
    /// ```
    /// use jstore_elastic::ElasticConfig;
    /// use url::Url;
    ///
    /// let config = ElasticConfig::new(Url::parse("http://localhost:9200").unwrap())
    ///     .index_naming(|project, document_type, match_all| {
    ///         let day = if match_all { "*" } else { "2042.06.01" };
    ///         format!("logs-{project}-{document_type}-{day}")
    ///     });
    /// assert_eq!(config.index_name("ship", "log").unwrap(), "logs-ship-log-2042.06.01");
    /// assert_eq!(config.search_index_name("ship", "log").unwrap(), "logs-ship-log-*");
    /// ```
    #[must_use]
    pub fn index_naming<F>(mut self, naming: F) -> Self
    where
        F: Fn(&str, &str, bool) -> String + Send + Sync + 'static,
    {
        self.index_naming = Some(Arc::new(naming));
        self
    }

    /// Returns the index receiving writes for one project's documents of one type.
    ///
    /// The default scheme is `{prefix}{project}-{document_type}` with both
    /// parts escaped: lowercase ASCII letters and digits are kept, every other
    /// byte becomes two hex digits followed by `_` (`"Hitchhikers"` becomes
    /// `"48_itchhikers"`, `"a-b"` becomes `"a2d_b"`). Escaped parts never
    /// contain `-`, so distinct collections never share an index.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] for an empty project or document
    /// type, or a name the cluster would not accept.
    pub fn index_name(&self, project: &str, document_type: &str) -> StoreResult<String> {
        self.resolve_index(project, document_type, false)
    }

    /// Returns the index name or pattern searches and reads cover.
    ///
    /// Equal to [`ElasticConfig::index_name`] unless a custom naming is set.
    ///
    /// # Errors
    ///
    /// See [`ElasticConfig::index_name`].
    pub fn search_index_name(&self, project: &str, document_type: &str) -> StoreResult<String> {
        self.resolve_index(project, document_type, true)
    }

    fn resolve_index(
        &self,
        project: &str,
        document_type: &str,
        match_all: bool,
    ) -> StoreResult<String> {
        if project.is_empty() || document_type.is_empty() {
            return Err(StoreError::invalid_config(
                "project and document type must not be empty",
            ));
        }
        let name = match &self.index_naming {
            Some(naming) => naming(project, document_type, match_all),
            None => format!(
                "{}{}-{}",
                self.index_prefix.to_lowercase(),
                escape_index_part(project),
                escape_index_part(document_type)
            ),
        };

        if name.is_empty() || name.starts_with(['-', '_', '+']) {
            return Err(StoreError::invalid_config(format!(
                "'{name}' is not a valid index name"
            )));
        }
        if name.len() > MAX_INDEX_NAME_BYTES {
            return Err(StoreError::invalid_config(format!(
                "index name for {project}/{document_type} exceeds {MAX_INDEX_NAME_BYTES} bytes"
            )));
        }
        Ok(name)
    }

    /// Builds a configuration from a provider's connection source and options.
    ///
    /// The connection source is the cluster base URL. Options map as follows:
    ///
    /// | Option | Setting |
    /// |--------|---------|
    /// | `SyncUpdates` | `refresh = wait_for` |
    /// | `Timeout(d)` | `timeout = d` |
    /// | `Param { "index_prefix", v }` | `index_prefix = v` |
    /// | `Param { "keyword_suffix", v }` | `keyword_suffix = v` |
    /// | `Param { "refresh", v }` | `refresh = v` (`false`, `wait_for`, `true`) |
    /// | `Param { "max_result_window", n }` | `max_result_window = n` |
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] for an empty or unparsable
    /// source, an unknown `Param` key, or an invalid `Param` value.
    pub fn from_source(connection_source: &str, options: &[StoreOption]) -> StoreResult<Self> {
        if connection_source.trim().is_empty() {
            return Err(StoreError::invalid_config(
                "elastic store needs a base url as connection source",
            ));
        }
        let base_url = Url::parse(connection_source).map_err(|e| {
            StoreError::invalid_config(format!("invalid base url '{connection_source}': {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::invalid_config(format!(
                "'{connection_source}' cannot be used as a base url"
            )));
        }

        let mut config = Self::new(base_url);
        for option in options {
            config = match option {
                StoreOption::SyncUpdates => config.refresh(RefreshPolicy::WaitFor),
                StoreOption::Timeout(timeout) => config.timeout(*timeout),
                StoreOption::Param { key, value } => match key.as_str() {
                    "index_prefix" => config.index_prefix(value.as_str()),
                    "keyword_suffix" => config.keyword_suffix(value.as_str()),
                    "refresh" => config.refresh(value.parse()?),
                    "max_result_window" => {
                        let window = value.parse().map_err(|_| {
                            StoreError::invalid_config(format!(
                                "max_result_window must be a number, got '{value}'"
                            ))
                        })?;
                        config.max_result_window(window)
                    }
                    other => {
                        return Err(StoreError::invalid_config(format!(
                            "unknown elastic store parameter '{other}'"
                        )));
                    }
                },
                _ => config,
            };
        }
        Ok(config)
    }
}

/// Keeps `[a-z0-9]` and writes every other byte as two hex digits and `_`.
///
/// Decoding right to left is unambiguous, since `_` only ever closes an
/// escape.
fn escape_index_part(part: &str) -> String {
    let mut escaped = String::with_capacity(part.len());
    for byte in part.bytes() {
        match byte {
            b'a'..=b'z' | b'0'..=b'9' => escaped.push(char::from(byte)),
            _ => escaped.push_str(&format!("{byte:02x}_")),
        }
    }
    escaped
}
