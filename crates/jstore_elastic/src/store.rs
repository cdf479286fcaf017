//! The Elasticsearch store.

use crate::config::ElasticConfig;
use crate::query::{compile_query, SortField};
use crate::response::{
    FieldMapping, FieldMappingReply, GetReply, HealthReply, SearchReply, WriteReply,
};
use crate::transport::{Method, Request, Response, Transport};
use jstore_core::query::{self, effective_sort};
use jstore_core::{
    Document, Entity, EntityId, QueryOption, Store, StoreError, StoreResult, Version,
};
use serde_json::Value;
use tracing::{debug, info, trace, warn};

#[cfg(feature = "http")]
use crate::transport::HttpTransport;
#[cfg(feature = "http")]
use jstore_core::StoreOption;

/// Concurrency metadata of a stored document.
#[derive(Debug, Clone, Copy)]
struct DocumentState {
    version: Version,
    seq_no: u64,
    primary_term: u64,
}

/// A [`Store`] backed by an Elasticsearch cluster.
///
/// Each `(project, document_type)` pair lives in its own index (see
/// [`ElasticConfig::index_name`]), or in a family of indices when a custom
/// [`ElasticConfig::index_naming`] is set: writes then go to the current
/// index while searches and reads cover the whole pattern. The cluster's
/// per-document `_version` is the entity version, so a new document is at
/// version 1 and every write adds one.
///
/// A version-checked write reads the document first and then writes with
/// `if_seq_no`/`if_primary_term`. A writer that slips in between makes the
/// cluster answer 409, which surfaces as
/// [`StoreError::OptimisticLocking`].
///
/// Searches only see writes once the index has refreshed; use
/// [`crate::RefreshPolicy::WaitFor`] (or [`jstore_core::StoreOption::SyncUpdates`])
/// when a write must be searchable as soon as it returns. With the default
/// index naming [`Store::get`] reads the document directly and always sees
/// the latest write.
///
/// Filters run in the cluster, which skips documents where a compared
/// property is missing or holds another type. The memory store fails such
/// queries with [`StoreError::MissingProperty`] or
/// [`StoreError::PropertyType`] instead.
#[derive(Debug)]
pub struct ElasticStore<T> {
    config: ElasticConfig,
    transport: T,
}

#[cfg(feature = "http")]
impl ElasticStore<HttpTransport> {
    /// Creates a store talking HTTP to `config.base_url`.
    ///
    /// No request is sent; use [`Store::health_check`] to check the cluster.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if the HTTP client cannot be
    /// built.
    pub fn connect(config: ElasticConfig) -> StoreResult<Self> {
        let transport = HttpTransport::new(config.base_url.clone(), config.timeout)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Creates a store from a provider's connection source and options.
    ///
    /// # Errors
    ///
    /// See [`ElasticConfig::from_source`] and [`ElasticStore::connect`].
    pub fn from_source(connection_source: &str, options: &[StoreOption]) -> StoreResult<Self> {
        Self::connect(ElasticConfig::from_source(connection_source, options)?)
    }
}

impl<T: Transport> ElasticStore<T> {
    /// Creates a store sending its requests through `transport`.
    pub fn with_transport(config: ElasticConfig, transport: T) -> Self {
        info!(
            base_url = %config.base_url,
            index_prefix = %config.index_prefix,
            refresh = %config.refresh,
            "elastic store ready"
        );
        Self { config, transport }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ElasticConfig {
        &self.config
    }

    /// Returns the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn send(&self, request: Request) -> StoreResult<Response> {
        trace!(%request, query = ?request.query, "sending request");
        let response = self.transport.send(&request)?;
        trace!(%request, status = response.status, "received response");
        Ok(response)
    }

    fn document_request(&self, method: Method, index: &str, id: &str) -> Request {
        Request::new(method, [index, "_doc", id])
    }

    fn write_request(&self, method: Method, index: &str, id: &str) -> Request {
        let request = self.document_request(method, index, id);
        match self.config.refresh.as_param() {
            Some(refresh) => request.with_query("refresh", refresh),
            None => request,
        }
    }

    /// Reads a document's concurrency metadata. `None` if it does not exist.
    fn lookup(&self, index: &str, id: &str) -> StoreResult<Option<DocumentState>> {
        let response = self.send(self.document_request(Method::Get, index, id))?;
        if response.status == 404 {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(failure(&response));
        }

        let reply: GetReply = response.json()?;
        if !reply.found {
            return Ok(None);
        }
        match (reply.version, reply.seq_no, reply.primary_term) {
            (Some(version), Some(seq_no), Some(primary_term)) => Ok(Some(DocumentState {
                version: Version::At(version),
                seq_no,
                primary_term,
            })),
            _ => Err(StoreError::backend(
                response.status,
                "document lookup without version metadata",
            )),
        }
    }

    /// Runs the optimistic check for a write of `id`.
    ///
    /// Unversioned writes skip the lookup and return `None`.
    fn check_version(&self, id: &EntityId, index: &str) -> StoreResult<Option<DocumentState>> {
        if id.version.is_unversioned() {
            return Ok(None);
        }
        let state = self.lookup(index, &id.id)?;
        if let Some(state) = state {
            if !id.version.matches(state.version) {
                warn!(
                    entity = %id,
                    actual = %state.version,
                    "optimistic locking rejected write"
                );
                return Err(StoreError::optimistic_locking(id, state.version));
            }
        }
        Ok(state)
    }

    /// Builds the error for a write the cluster rejected with 409.
    fn conflict(&self, id: &EntityId, index: &str) -> StoreError {
        let actual = match self.lookup(index, &id.id) {
            Ok(Some(state)) => state.version,
            Ok(None) => Version::Unversioned,
            Err(err) => {
                warn!(entity = %id, error = %err, "re-reading conflicting document failed");
                Version::Unversioned
            }
        };
        warn!(entity = %id, actual = %actual, "concurrent write detected");
        StoreError::optimistic_locking(id, actual)
    }

    /// Decides whether a sort on `property` must use the keyword sub-field.
    fn sort_field(&self, index: &str, property: &str) -> StoreResult<SortField> {
        let response = self.send(Request::new(
            Method::Get,
            [index, "_mapping", "field", property],
        ))?;
        if !response.is_success() {
            return Err(failure(&response));
        }

        let reply: FieldMappingReply = response.json()?;
        let is_text = reply
            .values()
            .filter_map(|index| index.mappings.get(property))
            .any(FieldMapping::is_text);
        Ok(if is_text {
            SortField::Keyword
        } else {
            SortField::Plain
        })
    }

    /// Runs a search body of the caller's own against a collection.
    ///
    /// The body is sent as is to `POST /{index}/_search`, where the index is
    /// [`ElasticConfig::search_index_name`]. Hits become entities of the
    /// collection; ask for `"version": true` to get their versions.
    ///
    /// # Errors
    ///
    /// Same mapping as [`Store::find_n`]: [`StoreError::NotFound`] for a
    /// missing index, [`StoreError::UnsupportedQuery`] for a body the cluster
    /// cannot parse.
    pub fn search_in(
        &self,
        project: &str,
        document_type: &str,
        body: &Value,
    ) -> StoreResult<Vec<Entity>> {
        let index = self.config.search_index_name(project, document_type)?;
        trace!(index = %index, query = %body, "custom search");
        self.search(project, document_type, &index, body)
    }

    fn search(
        &self,
        project: &str,
        document_type: &str,
        index: &str,
        body: &Value,
    ) -> StoreResult<Vec<Entity>> {
        let response = self.send(
            Request::new(Method::Post, [index, "_search"]).with_body(body.to_string()),
        )?;
        if response.status == 400 && is_query_rejection(&response) {
            return Err(StoreError::unsupported(response.error_reason()));
        }
        if !response.is_success() {
            return Err(failure(&response));
        }

        let reply: SearchReply = response.json()?;
        Ok(reply
            .hits
            .hits
            .into_iter()
            .map(|hit| {
                let version = hit.version.map_or(Version::Unversioned, Version::At);
                let id = EntityId::with_version(project, document_type, hit.id, version);
                Entity::new(id, hit.source.get())
            })
            .collect())
    }
}

/// Returns true if a 400 reply means the cluster could not run the query.
fn is_query_rejection(response: &Response) -> bool {
    matches!(
        response.error_type().as_deref(),
        Some(
            "parsing_exception"
                | "x_content_parse_exception"
                | "query_shard_exception"
                | "search_phase_execution_exception"
                | "illegal_argument_exception"
        )
    )
}

/// Maps an unsuccessful response to a store error.
fn failure(response: &Response) -> StoreError {
    if response.status == 404 {
        return StoreError::NotFound;
    }
    let reason = match response.error_type() {
        Some(kind) => format!("{kind}: {}", response.error_reason()),
        None => response.error_reason(),
    };
    StoreError::backend(response.status, reason)
}

impl<T: Transport> Store for ElasticStore<T> {
    fn save(&self, id: &EntityId, json: &str) -> StoreResult<EntityId> {
        Document::parse(json)?;
        let index = self.config.index_name(&id.project, &id.document_type)?;
        let state = self.check_version(id, &index)?;

        let mut request = self
            .write_request(Method::Put, &index, &id.id)
            .with_body(json);
        if !id.version.is_unversioned() {
            request = match state {
                Some(state) => request
                    .with_query("if_seq_no", state.seq_no.to_string())
                    .with_query("if_primary_term", state.primary_term.to_string()),
                None => request.with_query("op_type", "create"),
            };
        }

        let response = self.send(request)?;
        if response.status == 409 {
            return Err(self.conflict(id, &index));
        }
        if !response.is_success() {
            return Err(failure(&response));
        }

        let reply: WriteReply = response.json()?;
        let saved = id.at(Version::At(reply.version));
        debug!(entity = %saved, index = %index, "saved document");
        Ok(saved)
    }

    fn delete(&self, id: &EntityId) -> StoreResult<()> {
        let index = self.config.index_name(&id.project, &id.document_type)?;
        let state = self.check_version(id, &index)?;
        if !id.version.is_unversioned() && state.is_none() {
            debug!(entity = %id, "delete of absent document");
            return Ok(());
        }

        let mut request = self.write_request(Method::Delete, &index, &id.id);
        if let Some(state) = state {
            request = request
                .with_query("if_seq_no", state.seq_no.to_string())
                .with_query("if_primary_term", state.primary_term.to_string());
        }

        let response = self.send(request)?;
        match response.status {
            404 => {
                debug!(entity = %id, "delete of absent document");
                Ok(())
            }
            409 => Err(self.conflict(id, &index)),
            _ if response.is_success() => {
                debug!(entity = %id, index = %index, "deleted document");
                Ok(())
            }
            _ => Err(failure(&response)),
        }
    }

    fn find_n(
        &self,
        project: &str,
        document_type: &str,
        max_results: usize,
        options: &[QueryOption],
    ) -> StoreResult<Vec<Entity>> {
        let index = self.config.search_index_name(project, document_type)?;
        let sort_field = match effective_sort(options) {
            Some(order) => self.sort_field(&index, &order.property)?,
            None => SortField::Plain,
        };
        let size = max_results.min(self.config.max_result_window);
        let body = compile_query(options, size, &self.config.keyword_suffix, sort_field)?;
        trace!(index = %index, query = %body, "compiled search");

        let entities = self.search(project, document_type, &index, &body)?;
        debug!(
            project,
            document_type,
            max_results,
            found = entities.len(),
            "find completed"
        );
        Ok(entities)
    }

    fn health_check(&self) -> StoreResult<()> {
        let response = self.send(Request::new(Method::Get, ["_cluster", "health"]))?;
        if !response.is_success() {
            return Err(failure(&response));
        }
        let reply: HealthReply = response.json()?;
        if reply.status == "red" {
            return Err(StoreError::backend(response.status, "cluster health is red"));
        }
        debug!(status = %reply.status, "cluster health checked");
        Ok(())
    }

    fn get(&self, id: &EntityId) -> StoreResult<Entity> {
        let index = self.config.index_name(&id.project, &id.document_type)?;
        if index != self.config.search_index_name(&id.project, &id.document_type)? {
            // Older writes may live in other indices of the pattern.
            return self.find(
                &id.project,
                &id.document_type,
                &[query::id(id.id.as_str())],
            );
        }

        let response = self.send(self.document_request(Method::Get, &index, &id.id))?;
        if !response.is_success() {
            return Err(failure(&response));
        }

        let reply: GetReply = response.json()?;
        match (reply.found, reply.version, reply.source) {
            (true, Some(version), Some(source)) => Ok(Entity::new(
                id.at(Version::At(version)),
                source.get(),
            )),
            _ => Err(StoreError::NotFound),
        }
    }
}
