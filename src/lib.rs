pub mod config;
pub mod detect;
pub mod extract;
pub mod harness;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod segment;
pub mod validate;
