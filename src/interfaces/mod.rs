//! Adapters between the aggregator and the outside world: the HTTP query
//! endpoint, the terminal poller and JSON record fixtures.

pub mod http;
pub mod json;
pub mod poller;
