use tracing::debug;

use crate::{error::{StatsError, StatsResult}, params::SolrParams, planner::rel_node::RelNode};

/// Flat query shape accumulated from a push-down chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryDescriptor {
    pub select_fields: Vec<String>,
    pub where_clause: Vec<String>,
    pub limit: Option<u64>,
    pub order: Vec<String>,
    pub collection: Option<String>,
}

impl QueryDescriptor {
    /// Wire parameters for the compiled query. `q` is only present when the
    /// plan filters something.
    pub fn to_params(&self) -> SolrParams {
        let mut params = SolrParams::new();
        if !self.where_clause.is_empty() {
            params.set("q", self.where_clause.join(" AND "));
        }
        if !self.select_fields.is_empty() {
            params.set("fl", self.select_fields.join(","));
        }
        if !self.order.is_empty() {
            params.set("sort", self.order.join(","));
        }
        if let Some(limit) = self.limit {
            params.set("rows", limit.to_string());
        }
        params
    }
}

/// Shared accumulator threaded through a `RelNode` tree.
#[derive(Debug, Default)]
pub struct Implementor {
    descriptor: QueryDescriptor,
}

impl Implementor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walks `root` (leaf first) and returns the populated descriptor.
    pub fn compile(root: &RelNode) -> StatsResult<QueryDescriptor> {
        let mut implementor = Self::new();
        root.implement(&mut implementor)?;
        debug!(descriptor = ?implementor.descriptor, "compiled push-down chain");
        Ok(implementor.descriptor)
    }

    pub fn add(&mut self, fields: Vec<String>, predicates: Vec<String>) {
        self.descriptor.select_fields.extend(fields);
        self.descriptor.where_clause.extend(predicates);
    }

    pub fn add_order(&mut self, order: Vec<String>) {
        self.descriptor.order.extend(order);
    }

    pub fn set_limit(&mut self, limit: u64) {
        self.descriptor.limit = Some(limit);
    }

    pub fn set_collection(&mut self, collection: &str) {
        self.descriptor.collection = Some(collection.to_string());
    }

    pub fn visit_child(&mut self, ordinal: usize, input: &RelNode) -> StatsResult<()> {
        if ordinal != 0 {
            return Err(StatsError::MalformedPlan { node: input.name(), inputs: ordinal + 1 });
        }
        input.implement(self)
    }

    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }
}
