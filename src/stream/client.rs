use std::{collections::HashMap, sync::{Arc, PoisonError, RwLock}};

use serde_json::Value;
use tracing::debug;

use crate::{error::{StatsError, StatsResult, TransportError}, params::SolrParams};

/// Connection to the search service.
pub trait SearchClient: Send + Sync {
    /// Issues one request against `collection` and returns the decoded body.
    fn request(&self, params: &SolrParams, collection: &str) -> Result<Value, TransportError>;

    /// Releases the connection. Called only by the owner of the client.
    fn close(&self) {}
}

/// Builds clients for a resolved service address.
pub trait ClientConnector: Send + Sync {
    fn connect(&self, address: &str) -> StatsResult<Box<dyn SearchClient>>;
}

/// Client plus who is responsible for releasing it.
pub enum ClientHandle {
    /// Lives in a shared [`ClientCache`]; the cache closes it.
    Borrowed(Arc<dyn SearchClient>),
    /// Private to one stream; closed on release.
    Owned(Box<dyn SearchClient>),
}

impl ClientHandle {
    pub fn client(&self) -> &dyn SearchClient {
        match self {
            ClientHandle::Borrowed(c) => c.as_ref(),
            ClientHandle::Owned(c) => c.as_ref(),
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, ClientHandle::Owned(_))
    }

    pub fn release(self) {
        if let ClientHandle::Owned(client) = self {
            client.close();
        }
    }
}

impl std::fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientHandle::Borrowed(_) => f.write_str("ClientHandle::Borrowed"),
            ClientHandle::Owned(_) => f.write_str("ClientHandle::Owned"),
        }
    }
}

/// Clients shared across many streams, keyed by address.
///
/// Lookup-or-create; entries are never evicted by streams. Whoever owns the
/// cache decides when to call [`ClientCache::close`].
pub struct ClientCache {
    connector: Arc<dyn ClientConnector>,
    clients: RwLock<HashMap<String, Arc<dyn SearchClient>>>,
}

impl ClientCache {
    pub fn new(connector: Arc<dyn ClientConnector>) -> Self {
        Self { connector, clients: RwLock::new(HashMap::new()) }
    }

    pub fn get_client(&self, address: &str) -> StatsResult<Arc<dyn SearchClient>> {
        if let Some(client) = self.clients.read().unwrap_or_else(PoisonError::into_inner).get(address) {
            return Ok(Arc::clone(client));
        }

        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = clients.get(address) {
            return Ok(Arc::clone(client));
        }
        debug!(%address, "creating cached client");
        let client: Arc<dyn SearchClient> = Arc::from(self.connector.connect(address)?);
        clients.insert(address.to_string(), Arc::clone(&client));
        Ok(client)
    }

    pub fn len(&self) -> usize {
        self.clients.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn close(&self) {
        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        for (_, client) in clients.drain() {
            client.close();
        }
    }
}

/// Blocking HTTP client talking to `{base_url}/{collection}/select`.
pub struct HttpSearchClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl HttpSearchClient {
    pub fn new(base_url: &str) -> StatsResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| StatsError::Transport(Box::new(e)))?;
        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), http })
    }

    pub fn select_url(&self, collection: &str) -> String {
        format!("{}/{}/select", self.base_url, collection)
    }
}

impl SearchClient for HttpSearchClient {
    fn request(&self, params: &SolrParams, collection: &str) -> Result<Value, TransportError> {
        let mut params = params.clone();
        if !params.contains("wt") {
            params.set("wt", "json");
        }
        let body = self
            .http
            .get(self.select_url(collection))
            .query(&params.to_pairs())
            .send()?
            .error_for_status()?
            .json::<Value>()?;
        Ok(body)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HttpConnector;

impl ClientConnector for HttpConnector {
    fn connect(&self, address: &str) -> StatsResult<Box<dyn SearchClient>> {
        Ok(Box::new(HttpSearchClient::new(address)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Noop {
        closed: Arc<AtomicUsize>,
    }

    impl SearchClient for Noop {
        fn request(&self, _: &SolrParams, _: &str) -> Result<Value, TransportError> {
            Ok(Value::Null)
        }
        fn close(&self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct CountingConnector {
        connects: AtomicUsize,
        closed: Arc<AtomicUsize>,
    }

    impl ClientConnector for CountingConnector {
        fn connect(&self, _: &str) -> StatsResult<Box<dyn SearchClient>> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(Noop { closed: Arc::clone(&self.closed) }))
        }
    }

    #[test]
    fn cache_reuses_client_per_address() {
        let connector = Arc::new(CountingConnector::default());
        let cache = ClientCache::new(connector.clone());
        let a = cache.get_client("http://a").unwrap();
        let b = cache.get_client("http://a").unwrap();
        let _c = cache.get_client("http://c").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(connector.connects.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn cache_close_releases_every_client() {
        let connector = Arc::new(CountingConnector::default());
        let cache = ClientCache::new(connector.clone());
        cache.get_client("http://a").unwrap();
        cache.get_client("http://b").unwrap();
        cache.close();
        assert!(cache.is_empty());
        assert_eq!(connector.closed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn only_owned_handles_close_on_release() {
        let closed = Arc::new(AtomicUsize::new(0));
        let borrowed = ClientHandle::Borrowed(Arc::new(Noop { closed: Arc::clone(&closed) }));
        assert!(!borrowed.is_owned());
        borrowed.release();
        assert_eq!(closed.load(Ordering::SeqCst), 0);

        let owned = ClientHandle::Owned(Box::new(Noop { closed: Arc::clone(&closed) }));
        assert!(owned.is_owned());
        owned.release();
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn http_client_builds_select_url() {
        let c = HttpSearchClient::new("http://localhost:8983/solr/").unwrap();
        assert_eq!(c.select_url("orders"), "http://localhost:8983/solr/orders/select");
    }
}
