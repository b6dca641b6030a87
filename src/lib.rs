pub mod arena;
pub mod compiler;
pub mod engine;
pub mod logging;
pub mod parser;
