use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::{StatsError, StatsResult},
    params::SolrParams,
    planner::{Implementor, RelNode, SortKey},
    stream::{
        aggregation::AggregationRequest,
        client::{ClientCache, ClientConnector, ClientHandle, HttpConnector},
        decoder::ResponseDecoder,
        explanation::{Explanation, ExpressionType},
        expression::{EndpointResolver, StreamExpression, StreamExpressionParameter, StreamFactory},
        metric::MetricSpec,
        tuple::Tuple,
    },
};

const ZK_HOST: &str = "zkHost";
const MATCH_ALL: &str = "*:*";

/// ANDs the caller's query with the plan's predicates. Match-all parts drop
/// out; `*:*` is only sent when neither side restricts anything.
fn merge_query(caller: Option<&str>, plan: Option<&str>) -> String {
    let parts: Vec<&str> = [caller, plan]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|q| !q.is_empty() && *q != MATCH_ALL)
        .collect();
    match parts.as_slice() {
        [] => MATCH_ALL.to_string(),
        [only] => only.to_string(),
        many => many.iter().map(|q| format!("({})", q)).collect::<Vec<_>>().join(" AND "),
    }
}

/// Shared resources handed to streams by whoever runs them.
#[derive(Clone, Default)]
pub struct StreamContext {
    pub client_cache: Option<Arc<ClientCache>>,
}

impl StreamContext {
    pub fn with_client_cache(cache: Arc<ClientCache>) -> Self {
        Self { client_cache: Some(cache) }
    }
}

pub trait TupleStream {
    fn set_stream_context(&mut self, context: &StreamContext);
    fn open(&mut self) -> StatsResult<()>;
    fn read(&mut self) -> StatsResult<Tuple>;
    fn close(&mut self) -> StatsResult<()>;
    fn children(&self) -> Vec<&dyn TupleStream>;

    /// Order of emitted tuples, if any.
    fn stream_sort(&self) -> Option<Vec<SortKey>> { None }

    fn cost(&self) -> usize { 0 }
}

#[derive(Debug, Clone, PartialEq)]
enum StreamState {
    NotOpened,
    Ready(Tuple),
    Exhausted,
    Failed,
}

/// Single-shot stream: one statistics request, one tuple, then EOF.
pub struct StatsStream {
    node_id: Uuid,
    zk_host: String,
    collection: String,
    params: SolrParams,
    metrics: Vec<MetricSpec>,
    plan: Option<RelNode>,
    connector: Arc<dyn ClientConnector>,
    cache: Option<Arc<ClientCache>>,
    client: Option<ClientHandle>,
    state: StreamState,
}

impl StatsStream {
    pub fn new(zk_host: &str, collection: &str, params: SolrParams, metrics: Vec<MetricSpec>) -> StatsResult<Self> {
        if collection.trim().is_empty() {
            return Err(StatsError::MissingParameter("collection".into()));
        }
        if zk_host.trim().is_empty() {
            return Err(StatsError::MissingParameter(format!("{} for collection '{}'", ZK_HOST, collection)));
        }
        Ok(Self {
            node_id: Uuid::new_v4(),
            zk_host: zk_host.to_string(),
            collection: collection.to_string(),
            params,
            metrics,
            plan: None,
            connector: Arc::new(HttpConnector),
            cache: None,
            client: None,
            state: StreamState::NotOpened,
        })
    }

    /// Binds `stats(collection, name=value..., [zkHost=...], metric...)`.
    pub fn from_expression(expression: &StreamExpression, factory: &StreamFactory) -> StatsResult<Self> {
        let collection = factory.value_operand(expression, 0);
        let named = factory.named_operands(expression);
        let metric_expressions = factory.metric_operands(expression);

        if expression.parameters.len() != 1 + named.len() + metric_expressions.len() {
            return Err(StatsError::invalid_expression(expression, "unknown operands found"));
        }

        let collection = collection.ok_or_else(|| {
            StatsError::MissingParameter(format!("collection name expected as first operand in {}", expression))
        })?;

        if named.is_empty() {
            return Err(StatsError::invalid_expression(
                expression,
                "at least one named parameter expected. eg. 'q=*:*'",
            ));
        }

        let mut params = SolrParams::new();
        for (name, value) in named.iter().filter(|(name, _)| *name != ZK_HOST) {
            params.set(name, value.to_string().trim());
        }

        let zk_host = match factory.named_operand(expression, ZK_HOST) {
            Some(StreamExpressionParameter::Value(v)) => Some(v.clone()),
            Some(_) => None,
            None => factory.resolve_endpoint(collection),
        }
        .ok_or_else(|| StatsError::MissingParameter(format!("{} for collection '{}'", ZK_HOST, collection)))?;

        let metrics = metric_expressions
            .into_iter()
            .map(|e| factory.construct_metric(e))
            .collect::<StatsResult<Vec<_>>>()?;

        Self::new(&zk_host, collection, params, metrics)
    }

    /// Push-down chain compiled into the request on open.
    pub fn with_plan(mut self, plan: RelNode) -> Self {
        self.plan = Some(plan);
        self
    }

    /// Connector used when no shared cache is supplied.
    pub fn with_connector(mut self, connector: Arc<dyn ClientConnector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn node_id(&self) -> Uuid { self.node_id }
    pub fn zk_host(&self) -> &str { &self.zk_host }
    pub fn collection(&self) -> &str { &self.collection }
    pub fn params(&self) -> &SolrParams { &self.params }
    pub fn metrics(&self) -> &[MetricSpec] { &self.metrics }

    pub fn is_failed(&self) -> bool {
        self.state == StreamState::Failed
    }

    /// Everything sent to the service: caller params, compiled plan,
    /// one `stats.field` per field, then the forced `stats` and `rows`.
    pub fn request_params(&self) -> StatsResult<(SolrParams, AggregationRequest)> {
        let mut params = self.params.clone();
        if let Some(plan) = &self.plan {
            let descriptor = Implementor::compile(plan)?;
            if let Some(scanned) = descriptor.collection.as_deref() {
                if scanned != self.collection {
                    return Err(StatsError::CollectionMismatch {
                        plan: scanned.to_string(),
                        stream: self.collection.clone(),
                    });
                }
            }
            let mut compiled = descriptor.to_params();
            let plan_query = compiled.remove("q").and_then(|q| q.into_iter().next());
            let query = merge_query(params.get("q"), plan_query.as_deref());
            params.set_all(&compiled);
            params.set("q", query);
        }

        let aggregation = AggregationRequest::from_metrics(&self.metrics);
        aggregation.apply(&mut params);
        params.set("stats", "true");
        params.set("rows", "0");
        Ok((params, aggregation))
    }

    fn acquire_client(&self) -> StatsResult<ClientHandle> {
        match &self.cache {
            Some(cache) => cache.get_client(&self.zk_host).map(ClientHandle::Borrowed),
            None => self.connector.connect(&self.zk_host).map(ClientHandle::Owned),
        }
    }

    fn execute(&mut self) -> StatsResult<Tuple> {
        let (params, aggregation) = self.request_params()?;
        debug!(collection = %self.collection, ?params, "stats request");

        let handle = self.acquire_client()?;
        let client = self.client.insert(handle);

        let response = client
            .client()
            .request(&params, &self.collection)
            .map_err(StatsError::Transport)?;

        ResponseDecoder::decode(&response, aggregation.count_requested())
    }

    pub fn to_expression(&self, factory: &StreamFactory) -> StreamExpression {
        let mut expression = StreamExpression::new(factory.stats_function_name()).with_value(&self.collection);
        for (name, values) in self.params.iter() {
            expression.add_parameter(StreamExpressionParameter::named(name, &values.join(",")));
        }
        expression.add_parameter(StreamExpressionParameter::named(ZK_HOST, &self.zk_host));
        for metric in &self.metrics {
            expression.add_parameter(StreamExpressionParameter::Expression(metric.to_expression()));
        }
        expression
    }

    pub fn to_explanation(&self, factory: &StreamFactory) -> Explanation {
        let mut explanation = Explanation::new(self.node_id.to_string(), ExpressionType::StreamSource);
        explanation.function_name = factory.stats_function_name().to_string();
        explanation.implementing_class = std::any::type_name::<Self>().to_string();
        explanation.expression = self.to_expression(factory).to_string();

        let mut child = Explanation::new(format!("{}-datastore", self.node_id), ExpressionType::Datastore);
        child.function_name = "solr (worker ? of ?)".to_string();
        child.implementing_class = "Solr/Lucene".to_string();
        child.expression = self
            .params
            .iter()
            .map(|(name, values)| format!("{}=[{}]", name, values.join(", ")))
            .collect::<Vec<_>>()
            .join(",");
        explanation.add_child(child);

        explanation
    }
}

impl TupleStream for StatsStream {
    fn set_stream_context(&mut self, context: &StreamContext) {
        self.cache = context.client_cache.clone();
    }

    fn open(&mut self) -> StatsResult<()> {
        if self.state != StreamState::NotOpened {
            return Err(StatsError::InvalidState("stream already opened"));
        }
        info!(collection = %self.collection, zk_host = %self.zk_host, "opening stats stream");

        match self.execute() {
            Ok(tuple) => {
                self.state = StreamState::Ready(tuple);
                Ok(())
            }
            Err(e) => {
                warn!(collection = %self.collection, error = %e, "stats stream failed to open");
                self.state = StreamState::Failed;
                Err(e)
            }
        }
    }

    fn read(&mut self) -> StatsResult<Tuple> {
        match std::mem::replace(&mut self.state, StreamState::Exhausted) {
            StreamState::Ready(tuple) => Ok(tuple),
            StreamState::Exhausted => Ok(Tuple::eof()),
            StreamState::NotOpened => {
                self.state = StreamState::NotOpened;
                Err(StatsError::InvalidState("read before open"))
            }
            StreamState::Failed => {
                self.state = StreamState::Failed;
                Err(StatsError::InvalidState("stream failed to open"))
            }
        }
    }

    fn close(&mut self) -> StatsResult<()> {
        if let Some(handle) = self.client.take() {
            debug!(owned = handle.is_owned(), "releasing client");
            handle.release();
        }
        Ok(())
    }

    fn children(&self) -> Vec<&dyn TupleStream> {
        Vec::new()
    }
}
