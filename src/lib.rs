pub mod cli;
pub mod config;
pub mod grammar;
pub mod indexer;
pub mod model;
pub mod normalize;
pub mod query;
pub mod rpc;
pub mod source;
pub mod util;
pub mod worker;

pub use query::LaravelIndex;
