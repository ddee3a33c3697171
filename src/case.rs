use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BusType {
    Slack, // slack, swing, reference bus
    Pv,    // generator bus
    Pq,    // load bus
}

impl BusType {
    /// MATPOWER numeric bus type code. Codes other than 3/2 fold to PQ.
    pub fn from_code(code: f64) -> Self {
        match code as i64 {
            3 => BusType::Slack,
            2 => BusType::Pv,
            _ => BusType::Pq,
        }
    }

    pub fn code(&self) -> f64 {
        match self {
            BusType::Slack => 3.0,
            BusType::Pv => 2.0,
            BusType::Pq => 1.0,
        }
    }
}

impl fmt::Display for BusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusType::Slack => write!(f, "REF"),
            BusType::Pv => write!(f, "P-V"),
            BusType::Pq => write!(f, "P-Q"),
        }
    }
}

fn col(row: &[f64], i: usize, default: f64) -> f64 {
    row.get(i).copied().unwrap_or(default)
}

/// One row of the MATPOWER bus matrix:
/// [bus_i, type, Pd, Qd, Gs, Bs, area, Vm, Va, baseKV, zone, Vmax, Vmin].
///
/// Short rows are padded with the silent defaults the visualizer expects
/// (Vm 1.0, Va 0.0, demand 0.0) instead of being rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusRow {
    pub bus_id: usize,
    pub bus_type: BusType,
    pub pd: f64,
    pub qd: f64,
    pub gs: f64,
    pub bs: f64,
    pub area: f64,
    pub vm: f64,
    pub va: f64, // radians on input; solver output is copied through verbatim
    pub base_kv: f64,
    pub zone: f64,
    pub vmax: f64,
    pub vmin: f64,
}

impl BusRow {
    pub fn from_row(row: &[f64]) -> Self {
        Self {
            bus_id: col(row, 0, 0.0) as usize,
            bus_type: BusType::from_code(col(row, 1, 1.0)),
            pd: col(row, 2, 0.0),
            qd: col(row, 3, 0.0),
            gs: col(row, 4, 0.0),
            bs: col(row, 5, 0.0),
            area: col(row, 6, 1.0),
            vm: col(row, 7, 1.0),
            va: col(row, 8, 0.0),
            base_kv: col(row, 9, 0.0),
            zone: col(row, 10, 1.0),
            vmax: col(row, 11, 0.0),
            vmin: col(row, 12, 0.0),
        }
    }

    pub fn to_row(&self) -> Vec<f64> {
        vec![
            self.bus_id as f64,
            self.bus_type.code(),
            self.pd,
            self.qd,
            self.gs,
            self.bs,
            self.area,
            self.vm,
            self.va,
            self.base_kv,
            self.zone,
            self.vmax,
            self.vmin,
        ]
    }
}

/// One row of the MATPOWER gen matrix:
/// [bus_i, Pg, Qg, Qmax, Qmin, Vg, mBase, status, Pmax, Pmin].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenRow {
    pub bus_id: usize,
    pub pg: f64,
    pub qg: f64,
    pub qmax: f64,
    pub qmin: f64,
    pub vg: f64,
    pub mbase: f64,
    pub in_service: bool,
    pub pmax: f64,
    pub pmin: f64,
}

impl GenRow {
    pub fn from_row(row: &[f64]) -> Self {
        Self {
            bus_id: col(row, 0, 0.0) as usize,
            pg: col(row, 1, 0.0),
            qg: col(row, 2, 0.0),
            qmax: col(row, 3, 0.0),
            qmin: col(row, 4, 0.0),
            vg: col(row, 5, 1.0),
            mbase: col(row, 6, 100.0),
            in_service: col(row, 7, 1.0) != 0.0,
            pmax: col(row, 8, 0.0),
            pmin: col(row, 9, 0.0),
        }
    }

    pub fn to_row(&self) -> Vec<f64> {
        vec![
            self.bus_id as f64,
            self.pg,
            self.qg,
            self.qmax,
            self.qmin,
            self.vg,
            self.mbase,
            if self.in_service { 1.0 } else { 0.0 },
            self.pmax,
            self.pmin,
        ]
    }
}

/// Per-terminal line flow, present only when the solver returned the
/// extended branch columns (PF, QF, PT, QT at indices 13-16).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BranchFlows {
    pub p_from: f64,
    pub q_from: f64,
    pub p_to: f64,
    pub q_to: f64,
}

/// One row of the MATPOWER branch matrix:
/// [fbus, tbus, r, x, b, rateA, rateB, rateC, ratio, angle, status,
///  angmin, angmax] plus the optional solved-flow columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchRow {
    pub from_bus: usize,
    pub to_bus: usize,
    pub resistance: f64,
    pub reactance: f64,
    pub charging: f64,
    pub rate_a: f64,
    pub rate_b: f64,
    pub rate_c: f64,
    pub tap_ratio: f64,
    pub phase_shift: f64,
    pub in_service: bool,
    pub ang_min: f64,
    pub ang_max: f64,
    pub flows: Option<BranchFlows>,
}

impl BranchRow {
    pub fn from_row(row: &[f64]) -> Self {
        let flows = if row.len() >= 17 {
            Some(BranchFlows {
                p_from: row[13],
                q_from: row[14],
                p_to: row[15],
                q_to: row[16],
            })
        } else {
            None
        };
        Self {
            from_bus: col(row, 0, 0.0) as usize,
            to_bus: col(row, 1, 0.0) as usize,
            resistance: col(row, 2, 0.0),
            reactance: col(row, 3, 0.0),
            charging: col(row, 4, 0.0),
            rate_a: col(row, 5, 0.0),
            rate_b: col(row, 6, 0.0),
            rate_c: col(row, 7, 0.0),
            tap_ratio: col(row, 8, 0.0),
            phase_shift: col(row, 9, 0.0),
            in_service: col(row, 10, 1.0) != 0.0,
            ang_min: col(row, 11, 0.0),
            ang_max: col(row, 12, 0.0),
            flows,
        }
    }

    pub fn to_row(&self) -> Vec<f64> {
        vec![
            self.from_bus as f64,
            self.to_bus as f64,
            self.resistance,
            self.reactance,
            self.charging,
            self.rate_a,
            self.rate_b,
            self.rate_c,
            self.tap_ratio,
            self.phase_shift,
            if self.in_service { 1.0 } else { 0.0 },
            self.ang_min,
            self.ang_max,
        ]
    }
}

/// Solver-facing case tables plus the optional layout hints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseData {
    pub base_mva: f64,
    pub bus: Vec<BusRow>,
    pub gens: Vec<GenRow>,
    pub branch: Vec<BranchRow>,
    pub coords: HashMap<usize, (f64, f64)>,
}

impl CaseData {
    pub fn new(base_mva: f64) -> Self {
        Self {
            base_mva,
            bus: Vec::new(),
            gens: Vec::new(),
            branch: Vec::new(),
            coords: HashMap::new(),
        }
    }

    /// Every generator and branch must reference a bus that exists.
    pub fn validate(&self) -> Result<(), EngineError> {
        let ids: HashSet<usize> = self.bus.iter().map(|b| b.bus_id).collect();
        for generator in &self.gens {
            if !ids.contains(&generator.bus_id) {
                return Err(EngineError::MalformedCase(format!(
                    "generator references unknown bus {}",
                    generator.bus_id
                )));
            }
        }
        for branch in &self.branch {
            if !ids.contains(&branch.from_bus) || !ids.contains(&branch.to_bus) {
                return Err(EngineError::MalformedCase(format!(
                    "branch {} -> {} references an unknown bus",
                    branch.from_bus, branch.to_bus
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for CaseData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Case: {} MVA base, {} buses, {} generators, {} branches",
            self.base_mva,
            self.bus.len(),
            self.gens.len(),
            self.branch.len(),
        )
    }
}
