//! Resource-index side of the comparison, queried with SPARQL tuples.

pub mod query;
pub mod response;
pub mod source;
