use std::collections::HashMap;

use log::info;

use crate::case::CaseData;
use crate::error::EngineError;
use crate::graph::{GraphModel, Link, Node, NodeKind};
use crate::parse::parse_case_str;

static CASE9_M: &str = include_str!("../cases/case9.m");
static CASE14_M: &str = include_str!("../cases/case14.m");
static CASE30_M: &str = include_str!("../cases/case30.m");

/// Pre-supplied table data for the built-in cases, with a layout attached.
/// Unknown names are a lookup failure.
pub fn builtin_case(name: &str) -> Result<CaseData, EngineError> {
    let text = match name {
        "case9" => CASE9_M,
        "case14" => CASE14_M,
        "case30" => CASE30_M,
        _ => return Err(EngineError::UnknownCase(name.to_string())),
    };
    let mut case = parse_case_str(text)?;
    attach_layout(name, &mut case);
    info!("loaded built-in {}: {}", name, case);
    Ok(case)
}

/// Fills in diagram coordinates for a case that carries none: the
/// hand-authored table where one exists for the name, otherwise the
/// synthetic grid. Cases with their own `bus_coords` are left alone.
pub fn attach_layout(name: &str, case: &mut CaseData) {
    if case.coords.is_empty() {
        case.coords = match layout_table(name) {
            Some(table) => table,
            None => synthetic_layout(case),
        };
    }
}

/// Hand-authored diagram layouts for the small and medium cases.
fn layout_table(name: &str) -> Option<HashMap<usize, (f64, f64)>> {
    let points: &[(usize, f64, f64)] = match name {
        "case9" => &[
            (1, 100.0, 150.0),
            (2, 200.0, 100.0),
            (3, 300.0, 150.0),
            (4, 400.0, 200.0),
            (5, 500.0, 250.0),
            (6, 600.0, 200.0),
            (7, 700.0, 150.0),
            (8, 800.0, 100.0),
            (9, 900.0, 150.0),
        ],
        "case14" => &[
            (1, 100.0, 150.0),
            (2, 150.0, 120.0),
            (3, 200.0, 100.0),
            (4, 250.0, 80.0),
            (5, 300.0, 60.0),
            (6, 350.0, 80.0),
            (7, 400.0, 100.0),
            (8, 450.0, 120.0),
            (9, 500.0, 150.0),
            (10, 100.0, 200.0),
            (11, 150.0, 220.0),
            (12, 200.0, 240.0),
            (13, 250.0, 260.0),
            (14, 300.0, 280.0),
        ],
        "case30" => &[
            (1, 100.0, 150.0),
            (2, 150.0, 120.0),
            (3, 200.0, 100.0),
            (4, 250.0, 80.0),
            (5, 300.0, 60.0),
            (6, 350.0, 80.0),
            (7, 400.0, 100.0),
            (8, 450.0, 120.0),
            (9, 500.0, 150.0),
            (10, 100.0, 200.0),
            (11, 150.0, 220.0),
            (12, 200.0, 240.0),
            (13, 250.0, 260.0),
            (14, 300.0, 280.0),
            (15, 350.0, 260.0),
            (16, 400.0, 240.0),
            (17, 450.0, 220.0),
            (18, 500.0, 200.0),
            (19, 550.0, 150.0),
            (20, 600.0, 120.0),
            (21, 650.0, 100.0),
            (22, 700.0, 80.0),
            (23, 750.0, 60.0),
            (24, 800.0, 80.0),
            (25, 850.0, 100.0),
            (26, 900.0, 120.0),
            (27, 950.0, 150.0),
            (28, 1000.0, 200.0),
            (29, 1050.0, 250.0),
            (30, 1100.0, 300.0),
        ],
        _ => return None,
    };
    Some(points.iter().map(|&(id, x, y)| (id, (x, y))).collect())
}

/// Ten-wide grid layout for cases without a hand-authored table.
pub fn synthetic_layout(case: &CaseData) -> HashMap<usize, (f64, f64)> {
    case.bus
        .iter()
        .enumerate()
        .map(|(i, bus)| {
            let x = 100.0 + (i % 10) as f64 * 100.0;
            let y = 100.0 + (i / 10) as f64 * 100.0;
            (bus.bus_id, (x, y))
        })
        .collect()
}

/// The fixed 4-node illustrative network served when nothing else resolves.
pub fn default_network() -> GraphModel {
    let node = |id: &str, kind, x, y, p, q| Node {
        id: id.to_string(),
        kind,
        x,
        y,
        voltage: 1.0,
        angle: 0.0,
        active_power: p,
        reactive_power: q,
    };
    GraphModel {
        nodes: vec![
            node("bus1", NodeKind::Slack, 100.0, 150.0, 0.0, 0.0),
            node("bus2", NodeKind::Load, 200.0, 100.0, -80.0, -30.0),
            node("bus3", NodeKind::Load, 300.0, 150.0, -60.0, -20.0),
            node("bus4", NodeKind::Generator, 200.0, 200.0, 150.0, 75.0),
        ],
        links: vec![
            Link::new("bus1", "bus2", 0.02, 0.06),
            Link::new("bus1", "bus3", 0.03, 0.08),
            Link::new("bus2", "bus4", 0.01, 0.03),
            Link::new("bus3", "bus4", 0.02, 0.05),
        ],
    }
}
