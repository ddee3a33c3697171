use std::collections::HashMap;

use log::debug;

use crate::case::{BranchRow, BusRow, BusType, CaseData, GenRow};
use crate::error::EngineError;
use crate::graph::{GraphModel, Link, Node, NodeKind};

/// Builds the visualization graph from case tables. Bus row order defines
/// node order; branch rows map 1:1 onto links.
pub fn case_to_graph(case: &CaseData) -> GraphModel {
    let mut nodes = Vec::with_capacity(case.bus.len());

    for (i, bus) in case.bus.iter().enumerate() {
        let kind = match bus.bus_type {
            BusType::Slack => NodeKind::Slack,
            BusType::Pv => NodeKind::Generator,
            BusType::Pq => NodeKind::Load,
        };

        // Layout hint by bus id, else a deterministic horizontal strip so
        // omitted layouts stay reproducible.
        let (x, y) = case
            .coords
            .get(&bus.bus_id)
            .copied()
            .unwrap_or((100.0 + i as f64 * 100.0, 150.0));

        // A bus with a generator reports net injection: the first matching
        // gen row minus any co-located positive demand. A pure load bus
        // reports the negative of its demand.
        let (active_power, reactive_power) =
            match case.gens.iter().find(|g| g.bus_id == bus.bus_id) {
                Some(generator) => {
                    let mut p = generator.pg;
                    let mut q = generator.qg;
                    if bus.pd > 0.0 {
                        p -= bus.pd;
                    }
                    if bus.qd > 0.0 {
                        q -= bus.qd;
                    }
                    (p, q)
                }
                None => (-bus.pd, -bus.qd),
            };

        nodes.push(Node {
            id: format!("bus{}", bus.bus_id),
            kind,
            x,
            y,
            voltage: bus.vm,
            angle: bus.va.to_degrees(),
            active_power,
            reactive_power,
        });
    }

    let links = case
        .branch
        .iter()
        .map(|branch| {
            Link::new(
                &format!("bus{}", branch.from_bus),
                &format!("bus{}", branch.to_bus),
                branch.resistance,
                branch.reactance,
            )
        })
        .collect();

    debug!("converted case to graph: {} nodes", nodes.len());
    GraphModel { nodes, links }
}

/// Builds a solver-ready case from the graph, reassigning dense 1-based bus
/// numbers by node order. Existing id suffixes are discarded, so a
/// graph-case-graph round trip preserves topology and values but not the
/// original numbering.
pub fn graph_to_case(graph: &GraphModel) -> Result<CaseData, EngineError> {
    let mut case = CaseData::new(100.0);

    let mut index: HashMap<&str, usize> = HashMap::new();
    for (i, node) in graph.nodes.iter().enumerate() {
        index.insert(node.id.as_str(), i);
    }

    for (i, node) in graph.nodes.iter().enumerate() {
        let bus_id = i + 1;
        let bus_type = match node.kind {
            NodeKind::Slack => BusType::Slack,
            NodeKind::Generator => BusType::Pv,
            NodeKind::Load => BusType::Pq,
        };

        // Demand is clamped non-negative: a load node reporting positive
        // injection contributes zero demand, not negative demand.
        let (pd, qd) = if node.kind == NodeKind::Load {
            ((-node.active_power).max(0.0), (-node.reactive_power).max(0.0))
        } else {
            (0.0, 0.0)
        };

        case.bus.push(BusRow {
            bus_id,
            bus_type,
            pd,
            qd,
            gs: 0.0,
            bs: 0.0,
            area: 1.0,
            vm: node.voltage,
            va: node.angle.to_radians(),
            base_kv: 345.0,
            zone: 1.0,
            vmax: 1.1,
            vmin: 0.9,
        });

        if matches!(node.kind, NodeKind::Slack | NodeKind::Generator) {
            case.gens.push(GenRow {
                bus_id,
                pg: node.active_power.max(0.0),
                qg: node.reactive_power.max(0.0),
                qmax: 300.0,
                qmin: -300.0,
                vg: node.voltage,
                mbase: 100.0,
                in_service: true,
                pmax: 250.0,
                pmin: 10.0,
            });
        }
    }

    for link in &graph.links {
        let from_bus = resolve(&index, link.source.id())?;
        let to_bus = resolve(&index, link.target.id())?;
        case.branch.push(BranchRow {
            from_bus,
            to_bus,
            resistance: link.resistance,
            reactance: link.reactance,
            charging: 0.0,
            rate_a: 0.0,
            rate_b: 0.0,
            rate_c: 0.0,
            tap_ratio: 0.0,
            phase_shift: 0.0,
            in_service: true,
            ang_min: -360.0,
            ang_max: 360.0,
            flows: None,
        });
    }

    debug!("converted graph to case: {}", case);
    Ok(case)
}

fn resolve(index: &HashMap<&str, usize>, id: &str) -> Result<usize, EngineError> {
    index
        .get(id)
        .map(|i| i + 1)
        .ok_or_else(|| EngineError::DanglingReference(format!("link endpoint '{}' is not a node", id)))
}
