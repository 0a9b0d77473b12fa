use std::{fs, path::Path};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{StatsError, StatsResult},
    params::SolrParams,
    stream::{EndpointResolver, MetricSpec, StatsStream},
};

/// Declarative description of one stats stream.
///
/// - `collection` is the target collection.
/// - `zk_host` is the service address; when absent it is resolved by name.
/// - `params` are passed to the service unchanged.
/// - `metrics` are identifiers such as `sum(price)` or `count(*)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    pub collection: String,
    #[serde(default, rename = "zkHost", alias = "zk_host", skip_serializing_if = "Option::is_none")]
    pub zk_host: Option<String>,
    #[serde(default)]
    pub params: IndexMap<String, String>,
    #[serde(default)]
    pub metrics: Vec<String>,
}

impl StatsConfig {
    pub fn from_json_str(text: &str) -> StatsResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> StatsResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading stats config");
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn parsed_metrics(&self) -> StatsResult<Vec<MetricSpec>> {
        self.metrics.iter().map(|m| MetricSpec::parse(m)).collect()
    }

    /// Validates the config and binds it to a stream.
    pub fn into_stream(self, resolver: &dyn EndpointResolver) -> StatsResult<StatsStream> {
        if self.collection.trim().is_empty() {
            return Err(StatsError::MissingParameter("collection".into()));
        }
        let zk_host = match self.zk_host.as_deref().map(str::trim).filter(|h| !h.is_empty()) {
            Some(host) => host.to_string(),
            None => resolver.resolve_endpoint(&self.collection).ok_or_else(|| {
                StatsError::MissingParameter(format!("zkHost for collection '{}'", self.collection))
            })?,
        };
        let metrics = self.parsed_metrics()?;
        let params: SolrParams = self.params.iter().map(|(k, v)| (k.as_str(), v.trim())).collect();
        StatsStream::new(&zk_host, &self.collection, params, metrics)
    }
}
