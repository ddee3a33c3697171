use log::{info, warn};
use serde::Serialize;

use crate::case::CaseData;
use crate::error::EngineError;
use crate::graph::{Link, Node, NodeKind, bus_number, GraphModel};
use crate::stats::{NetworkStats, aggregate};

/// Seam for the external Newton-Raphson solver. Implementations receive a
/// solver-ready case and return the solved case plus a convergence flag;
/// this crate never implements the algorithm itself.
pub trait PowerFlowSolver: Send + Sync {
    fn run(&self, case: &CaseData) -> Result<(CaseData, bool), EngineError>;
}

/// Outcome of a solve as the frontend consumes it. Non-convergence keeps
/// the pre-solve nodes and links untouched.
#[derive(Debug, Clone, Serialize)]
pub struct SolveReport {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub converged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<NetworkStats>,
}

/// Writes solver output back onto a copy of the pre-solve graph.
///
/// Voltages and angles come from the solved bus rows by node index.
/// Slack/generator nodes take the solved generator output matched by bus
/// id; load nodes keep their input power, since fixed demand is not a
/// solver result.
pub fn interpret_solution(graph: &GraphModel, solved: &CaseData, converged: bool) -> SolveReport {
    let mut nodes = graph.nodes.clone();
    let mut links = graph.links.clone();

    if !converged {
        warn!("power flow did not converge; returning pre-solve state");
        return SolveReport {
            nodes,
            links,
            converged: false,
            error: Some(
                "power flow did not converge; check the network data or solver settings"
                    .to_string(),
            ),
            stats: None,
        };
    }

    for (i, node) in nodes.iter_mut().enumerate() {
        if let Some(bus) = solved.bus.get(i) {
            node.voltage = bus.vm;
            node.angle = bus.va;
        }
        if matches!(node.kind, NodeKind::Slack | NodeKind::Generator) {
            if let Some(id) = bus_number(&node.id) {
                if let Some(generator) = solved.gens.iter().find(|g| g.bus_id == id) {
                    node.active_power = generator.pg;
                    node.reactive_power = generator.qg;
                }
            }
        }
    }

    for link in links.iter_mut() {
        apply_branch_flow(link, solved);
    }

    info!("power flow converged; {} nodes updated", nodes.len());
    let stats = aggregate(solved, graph);
    SolveReport {
        nodes,
        links,
        converged: true,
        error: None,
        stats: Some(stats),
    }
}

/// Matches a link against the solved branch table in either orientation and
/// records per-terminal flow and loss. Anything unmatched, or matched
/// without the extended flow columns, is zeroed rather than left stale.
fn apply_branch_flow(link: &mut Link, solved: &CaseData) {
    let (Some(source), Some(target)) = (
        bus_number(link.source.id()),
        bus_number(link.target.id()),
    ) else {
        clear_flow(link);
        return;
    };

    for branch in &solved.branch {
        let forward = branch.from_bus == source && branch.to_bus == target;
        let reversed = branch.from_bus == target && branch.to_bus == source;
        if !forward && !reversed {
            continue;
        }

        match &branch.flows {
            Some(flows) => {
                link.active_power = flows.p_from;
                link.reactive_power = flows.q_from;
                if forward {
                    link.from_active = Some(flows.p_from);
                    link.from_reactive = Some(flows.q_from);
                    link.to_active = Some(-flows.p_to);
                    link.to_reactive = Some(-flows.q_to);
                } else {
                    // Reversed match: the solved "to" terminal is this
                    // link's source side.
                    link.from_active = Some(-flows.p_to);
                    link.from_reactive = Some(-flows.q_to);
                    link.to_active = Some(-flows.p_from);
                    link.to_reactive = Some(-flows.q_from);
                }
                link.loss_active = Some(flows.p_from + flows.p_to);
                link.loss_reactive = Some(flows.q_from + flows.q_to);
            }
            None => clear_flow(link),
        }
        return;
    }

    clear_flow(link);
}

fn clear_flow(link: &mut Link) {
    link.active_power = 0.0;
    link.reactive_power = 0.0;
    link.from_active = None;
    link.from_reactive = None;
    link.to_active = None;
    link.to_reactive = None;
    link.loss_active = None;
    link.loss_reactive = None;
}
