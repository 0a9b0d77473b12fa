//! Statistics streams over a Solr-style search service.
//!
//! A push-down chain ([`planner::RelNode`]) and a list of aggregate metrics
//! are compiled into request parameters, sent as one `stats=true&rows=0`
//! request, and the nested response is decoded into a single flat
//! [`stream::Tuple`] followed by an EOF tuple.

pub mod error;
pub use error::{StatsError, StatsResult, TransportError};

pub mod params;
pub use params::SolrParams;

pub mod planner;
pub use planner::{Implementor, QueryDescriptor, RelNode};

pub mod stream;
pub use stream::{
    AggregationRequest, ClientCache, MetricSpec, StatsStream, StreamContext, StreamExpression,
    StreamFactory, Tuple, TupleStream,
};

pub mod config;
pub use config::StatsConfig;
