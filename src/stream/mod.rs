pub mod tuple;
pub use tuple::*;

pub mod metric;
pub use metric::*;

pub mod aggregation;
pub use aggregation::*;

pub mod expression;
pub use expression::*;

pub mod explanation;
pub use explanation::*;

pub mod decoder;
pub use decoder::*;

pub mod client;
pub use client::*;

pub mod stats_stream;
pub use stats_stream::*;
