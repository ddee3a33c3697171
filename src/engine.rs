use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};

use crate::catalog::{attach_layout, builtin_case, default_network};
use crate::convert::{case_to_graph, graph_to_case};
use crate::error::EngineError;
use crate::graph::GraphModel;
use crate::parse::parse_case_str;
use crate::solve::{PowerFlowSolver, SolveReport, interpret_solution};
use crate::store;

/// Stateless façade over the conversion pipeline. Every call takes a value
/// snapshot of its input and returns a fresh one; nothing is shared or
/// mutated across requests.
pub struct GridEngine {
    data_dir: PathBuf,
    solver: Option<Arc<dyn PowerFlowSolver>>,
}

impl GridEngine {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            solver: None,
        }
    }

    /// Wires in the external power-flow solver.
    pub fn with_solver(mut self, solver: Arc<dyn PowerFlowSolver>) -> Self {
        self.solver = Some(solver);
        self
    }

    /// Default view: built-in case30, then a local case30.m, then the last
    /// saved snapshot, then the demo network.
    pub fn default_graph(&self) -> GraphModel {
        let providers: Vec<Box<dyn Fn() -> Option<GraphModel> + '_>> = vec![
            Box::new(|| builtin_case("case30").ok().map(|c| case_to_graph(&c))),
            Box::new(|| self.case_from_file("case30")),
            Box::new(|| store::load_graph_snapshot(&self.data_dir)),
        ];
        self.first_of(providers, "default grid")
    }

    /// Loads a named case: catalog built-in, then a local `<name>.m` file,
    /// then the demo network. The chain always produces a graph.
    pub fn load_case(&self, name: &str) -> GraphModel {
        let providers: Vec<Box<dyn Fn() -> Option<GraphModel> + '_>> = vec![
            Box::new(move || builtin_case(name).ok().map(|c| case_to_graph(&c))),
            Box::new(move || self.case_from_file(name)),
        ];
        self.first_of(providers, name)
    }

    /// Converts the graph, hands it to the external solver, and interprets
    /// the result. Non-convergence is a normal report, not an error.
    pub fn solve(&self, graph: &GraphModel) -> Result<SolveReport, EngineError> {
        let solver = self.solver.as_ref().ok_or(EngineError::SolverUnavailable)?;
        let case = graph_to_case(graph)?;
        info!("running power flow on {}", case);
        let (solved, converged) = solver.run(&case)?;
        Ok(interpret_solution(graph, &solved, converged))
    }

    pub fn save_graph(&self, graph: &GraphModel) -> Result<(), EngineError> {
        store::save_graph(&self.data_dir, graph)
    }

    fn first_of(
        &self,
        providers: Vec<Box<dyn Fn() -> Option<GraphModel> + '_>>,
        what: &str,
    ) -> GraphModel {
        for provider in providers {
            if let Some(graph) = provider() {
                return graph;
            }
        }
        info!("no source resolved for {}; serving the demo network", what);
        default_network()
    }

    fn case_from_file(&self, name: &str) -> Option<GraphModel> {
        let text = store::read_case_file(&self.data_dir, name)?;
        match parse_case_str(&text) {
            Ok(mut case) => {
                attach_layout(name, &mut case);
                Some(case_to_graph(&case))
            }
            Err(e) => {
                warn!("could not parse local {}.m: {}", name, e);
                None
            }
        }
    }
}
