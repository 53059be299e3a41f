pub mod auth;
pub mod catalog;
pub mod error;
pub mod http;
pub mod solr;
pub mod source;
pub mod trigger;
