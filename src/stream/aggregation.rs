use std::collections::BTreeMap;

use indexmap::IndexSet;

use crate::{params::SolrParams, stream::metric::MetricSpec};

/// Per-field statistics to request plus the independent row-count flag.
///
/// Fields are kept sorted by name so the emitted `stats.field` parameters
/// are reproducible; statistics keep first-request order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationRequest {
    fields: BTreeMap<String, IndexSet<&'static str>>,
    count_requested: bool,
}

impl AggregationRequest {
    pub fn from_metrics(metrics: &[MetricSpec]) -> Self {
        let mut request = Self::default();
        for metric in metrics {
            match metric.function.wire_name() {
                None => request.count_requested = true,
                Some(_) if metric.is_wildcard() => {}
                Some(stat) => {
                    request.fields.entry(metric.column.clone()).or_default().insert(stat);
                }
            }
        }
        request
    }

    pub fn count_requested(&self) -> bool {
        self.count_requested
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &IndexSet<&'static str>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && !self.count_requested
    }

    /// One local-params directive per field, e.g. `{!sum=true mean=true }price`.
    pub fn stats_field_directives(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|(field, stats)| {
                let mut buf = String::from("{!");
                for stat in stats {
                    buf.push_str(stat);
                    buf.push_str("=true ");
                }
                buf.push('}');
                buf.push_str(field);
                buf
            })
            .collect()
    }

    pub fn apply(&self, params: &mut SolrParams) {
        for directive in self.stats_field_directives() {
            params.add("stats.field", directive);
        }
    }
}
