pub mod archive;
pub mod error;
pub mod fetch;
pub mod fields;
pub mod filter;
pub mod geo;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod project;
pub mod quays;
pub mod stats;
pub mod tree;
