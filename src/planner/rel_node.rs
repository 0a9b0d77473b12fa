use crate::{error::{StatsError, StatsResult}, planner::{implementor::Implementor, predicate::Predicate}};

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub field: String,
    pub ascending: bool,
}

impl SortKey {
    pub fn asc(field: &str) -> Self { Self { field: field.to_string(), ascending: true } }
    pub fn desc(field: &str) -> Self { Self { field: field.to_string(), ascending: false } }

    pub fn to_order_clause(&self) -> String {
        format!("{} {}", self.field, if self.ascending { "asc" } else { "desc" })
    }
}

/// Relational operation pushed down to the search service.
///
/// Non-leaf nodes carry their inputs as a list so that malformed trees can
/// be represented and rejected; a push-down chain is linear, so at most one
/// input is accepted when compiling.
#[derive(Debug, Clone, PartialEq)]
pub enum RelNode {
    Scan {
        collection: String,
    },

    /// Projection in output order.
    Project {
        inputs: Vec<RelNode>,
        fields: Vec<String>,
    },

    Filter {
        inputs: Vec<RelNode>,
        predicates: Vec<Predicate>,
    },

    Sort {
        inputs: Vec<RelNode>,
        keys: Vec<SortKey>,
    },

    Limit {
        inputs: Vec<RelNode>,
        fetch: u64,
    },
}

impl RelNode {
    pub fn scan(collection: &str) -> Self {
        RelNode::Scan { collection: collection.to_string() }
    }

    pub fn project(self, fields: &[&str]) -> Self {
        RelNode::Project {
            inputs: vec![self],
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn filter(self, predicates: Vec<Predicate>) -> Self {
        RelNode::Filter { inputs: vec![self], predicates }
    }

    pub fn sort(self, keys: Vec<SortKey>) -> Self {
        RelNode::Sort { inputs: vec![self], keys }
    }

    pub fn limit(self, fetch: u64) -> Self {
        RelNode::Limit { inputs: vec![self], fetch }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RelNode::Scan { .. } => "Scan",
            RelNode::Project { .. } => "Project",
            RelNode::Filter { .. } => "Filter",
            RelNode::Sort { .. } => "Sort",
            RelNode::Limit { .. } => "Limit",
        }
    }

    pub fn inputs(&self) -> &[RelNode] {
        match self {
            RelNode::Scan { .. } => &[],
            RelNode::Project { inputs, .. }
            | RelNode::Filter { inputs, .. }
            | RelNode::Sort { inputs, .. }
            | RelNode::Limit { inputs, .. } => inputs,
        }
    }

    /// Visits the single input first, then adds this node's own contribution.
    pub fn implement(&self, implementor: &mut Implementor) -> StatsResult<()> {
        match self.inputs() {
            [] => {}
            [input] => implementor.visit_child(0, input)?,
            many => return Err(StatsError::MalformedPlan { node: self.name(), inputs: many.len() }),
        }

        match self {
            RelNode::Scan { collection } => implementor.set_collection(collection),
            RelNode::Project { fields, .. } => implementor.add(fields.clone(), Vec::new()),
            RelNode::Filter { predicates, .. } => {
                let clauses = predicates.iter().map(Predicate::to_query_clause).collect();
                implementor.add(Vec::new(), clauses);
            }
            RelNode::Sort { keys, .. } => {
                implementor.add_order(keys.iter().map(SortKey::to_order_clause).collect());
            }
            RelNode::Limit { fetch, .. } => implementor.set_limit(*fetch),
        }
        Ok(())
    }
}
