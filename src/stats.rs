use serde::{Deserialize, Serialize};

use crate::case::CaseData;
use crate::graph::GraphModel;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoltageStats {
    pub max: f64,
    pub min: f64,
    pub avg: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LossStats {
    #[serde(rename = "P")]
    pub active: f64,
    #[serde(rename = "Q")]
    pub reactive: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyStats {
    pub total_branches: usize,
    pub total_buses: usize,
    pub network_density: f64,
    pub average_connectivity: f64,
}

/// Aggregate figures for the dashboard, computed after a converged solve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub voltage: VoltageStats,
    pub losses: LossStats,
    pub generation: GenerationStats,
    pub topology: TopologyStats,
}

fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// Computes network statistics from a solved case and the graph it was
/// built from. Missing extended columns degrade the affected fields to 0;
/// this function never fails a solve.
pub fn aggregate(solved: &CaseData, graph: &GraphModel) -> NetworkStats {
    let mut stats = NetworkStats::default();

    if !solved.bus.is_empty() {
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;
        let mut sum = 0.0;
        for bus in &solved.bus {
            max = max.max(bus.vm);
            min = min.min(bus.vm);
            sum += bus.vm;
        }
        stats.voltage = VoltageStats {
            max: round_to(max, 4),
            min: round_to(min, 4),
            avg: round_to(sum / solved.bus.len() as f64, 4),
        };
    }

    // The dashboard totals the QF and PT branch columns here; kept as-is
    // for output compatibility with existing consumers.
    let mut active = 0.0;
    let mut reactive = 0.0;
    let mut have_flows = false;
    for branch in &solved.branch {
        if let Some(flows) = &branch.flows {
            have_flows = true;
            active += flows.q_from;
            reactive += flows.p_to;
        }
    }
    if have_flows {
        stats.losses = LossStats {
            active: round_to(active, 2),
            reactive: round_to(reactive, 2),
        };
    }

    stats.generation.total = round_to(solved.gens.iter().map(|g| g.pg).sum(), 2);

    let buses = graph.nodes.len();
    let branches = graph.links.len();
    stats.topology.total_branches = branches;
    stats.topology.total_buses = buses;
    if buses > 1 {
        let pairs = buses as f64 * (buses as f64 - 1.0) / 2.0;
        stats.topology.network_density = round_to(branches as f64 / pairs, 3);
    }
    if buses > 0 {
        stats.topology.average_connectivity = round_to(2.0 * branches as f64 / buses as f64, 2);
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{BranchRow, BusRow, GenRow};
    use crate::graph::{GraphModel, Link, Node, NodeKind};

    fn node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            kind: NodeKind::Load,
            x: 0.0,
            y: 0.0,
            voltage: 1.0,
            angle: 0.0,
            active_power: 0.0,
            reactive_power: 0.0,
        }
    }

    fn four_bus_graph() -> GraphModel {
        GraphModel {
            nodes: vec![node("bus1"), node("bus2"), node("bus3"), node("bus4")],
            links: vec![
                Link::new("bus1", "bus2", 0.02, 0.06),
                Link::new("bus1", "bus3", 0.03, 0.08),
                Link::new("bus2", "bus4", 0.01, 0.03),
                Link::new("bus3", "bus4", 0.02, 0.05),
            ],
        }
    }

    #[test]
    fn density_and_connectivity_formulas() {
        let solved = CaseData::new(100.0);
        let stats = aggregate(&solved, &four_bus_graph());
        assert_eq!(stats.topology.total_buses, 4);
        assert_eq!(stats.topology.total_branches, 4);
        assert_eq!(stats.topology.network_density, 0.667);
        assert_eq!(stats.topology.average_connectivity, 2.0);
    }

    #[test]
    fn single_bus_degrades_topology_ratios_to_zero() {
        let graph = GraphModel {
            nodes: vec![node("bus1")],
            links: vec![],
        };
        let stats = aggregate(&CaseData::new(100.0), &graph);
        assert_eq!(stats.topology.network_density, 0.0);
        assert_eq!(stats.topology.average_connectivity, 0.0);
    }

    #[test]
    fn voltage_spread_is_rounded_to_four_places() {
        let mut solved = CaseData::new(100.0);
        for (id, vm) in [(1, 1.05321), (2, 0.98761), (3, 1.0)] {
            solved.bus.push(BusRow::from_row(&[
                id as f64, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, vm,
            ]));
        }
        let stats = aggregate(&solved, &GraphModel::default());
        assert_eq!(stats.voltage.max, 1.0532);
        assert_eq!(stats.voltage.min, 0.9876);
        assert_eq!(stats.voltage.avg, 1.0136);
    }

    #[test]
    fn losses_degrade_to_zero_without_flow_columns() {
        let mut solved = CaseData::new(100.0);
        solved.bus.push(BusRow::from_row(&[1.0, 3.0]));
        solved.bus.push(BusRow::from_row(&[2.0, 1.0]));
        solved
            .branch
            .push(BranchRow::from_row(&[1.0, 2.0, 0.02, 0.06]));
        let stats = aggregate(&solved, &GraphModel::default());
        assert_eq!(stats.losses, LossStats::default());
    }

    #[test]
    fn loss_proxy_sums_the_reported_columns() {
        let mut solved = CaseData::new(100.0);
        solved.bus.push(BusRow::from_row(&[1.0, 3.0]));
        solved.bus.push(BusRow::from_row(&[2.0, 1.0]));
        let mut row = vec![
            1.0, 2.0, 0.02, 0.06, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, -360.0, 360.0,
        ];
        row.extend([45.0, 12.5, -44.0, -11.25]);
        solved.branch.push(BranchRow::from_row(&row));
        let stats = aggregate(&solved, &GraphModel::default());
        assert_eq!(stats.losses.active, 12.5);
        assert_eq!(stats.losses.reactive, -44.0);
    }

    #[test]
    fn generation_totals_solved_gen_output() {
        let mut solved = CaseData::new(100.0);
        solved.bus.push(BusRow::from_row(&[1.0, 3.0]));
        solved.gens.push(GenRow::from_row(&[1.0, 72.345]));
        solved.gens.push(GenRow::from_row(&[1.0, 163.0]));
        let stats = aggregate(&solved, &GraphModel::default());
        assert_eq!(stats.generation.total, 235.35);
    }
}
