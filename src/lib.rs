pub mod case;
pub mod catalog;
pub mod convert;
pub mod engine;
pub mod error;
pub mod graph;
pub mod parse;
pub mod server;
pub mod solve;
pub mod stats;
pub mod store;

pub use case::CaseData;
pub use engine::GridEngine;
pub use error::EngineError;
pub use graph::GraphModel;
pub use solve::{PowerFlowSolver, SolveReport};
