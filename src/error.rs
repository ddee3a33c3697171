use std::error::Error;
use std::fmt;
use std::io;

/// Everything that can go wrong between a case file arriving and a solve
/// report leaving.
#[derive(Debug)]
pub enum EngineError {
    /// A case section was present but unreadable, or a table references a
    /// bus that does not exist.
    MalformedCase(String),
    /// A link endpoint names a node that is not in the graph.
    DanglingReference(String),
    /// A requested case is not in the catalog.
    UnknownCase(String),
    /// No power-flow solver has been wired into the engine.
    SolverUnavailable,
    /// The external solver returned an error of its own.
    SolverFailed(String),
    Io(io::Error),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::MalformedCase(msg) => write!(f, "malformed case: {}", msg),
            EngineError::DanglingReference(msg) => write!(f, "dangling reference: {}", msg),
            EngineError::UnknownCase(name) => write!(f, "unknown case '{}'", name),
            EngineError::SolverUnavailable => write!(f, "no power-flow solver is configured"),
            EngineError::SolverFailed(msg) => write!(f, "solver failed: {}", msg),
            EngineError::Io(e) => write!(f, "i/o error: {}", e),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EngineError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for EngineError {
    fn from(e: io::Error) -> Self {
        EngineError::Io(e)
    }
}
