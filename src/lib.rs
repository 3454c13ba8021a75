pub mod chunker;
pub mod cli;
pub mod config;
pub mod engine;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod policy;
pub mod postprocess;
pub mod probe;
pub mod report;
pub mod util;
