pub mod literal;
pub use literal::*;

pub mod predicate;
pub use predicate::*;

pub mod rel_node;
pub use rel_node::*;

pub mod implementor;
pub use implementor::*;
