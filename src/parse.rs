use log::info;

use crate::case::{BranchRow, BusRow, CaseData, GenRow};
use crate::error::EngineError;

/// Parses a MATPOWER-style case description into typed tables.
///
/// Absent sections yield empty tables; a section that is present but
/// unreadable is a malformed case. The custom `mpc.bus_coords` section
/// carries layout hints for the diagram editor.
pub fn parse_case_str(text: &str) -> Result<CaseData, EngineError> {
    let body = function_body(text);

    let mut case = CaseData::new(base_mva(&body)?);

    if let Some(section) = matrix_section(&body, "mpc.bus") {
        for row in parse_rows(section, "bus")? {
            case.bus.push(BusRow::from_row(&row));
        }
    }
    if let Some(section) = matrix_section(&body, "mpc.gen") {
        for row in parse_rows(section, "gen")? {
            case.gens.push(GenRow::from_row(&row));
        }
    }
    if let Some(section) = matrix_section(&body, "mpc.branch") {
        for row in parse_rows(section, "branch")? {
            case.branch.push(BranchRow::from_row(&row));
        }
    }
    if let Some(section) = matrix_section(&body, "mpc.bus_coords") {
        for row in parse_rows(section, "bus_coords")? {
            if row.len() >= 3 {
                case.coords.insert(row[0] as usize, (row[1], row[2]));
            }
        }
    }

    case.validate()?;

    info!(
        "parsed case: {} buses, {} generators, {} branches, {} layout hints",
        case.bus.len(),
        case.gens.len(),
        case.branch.len(),
        case.coords.len(),
    );

    Ok(case)
}

/// Strips a `function mpc = …` wrapper down to the function body, stopping
/// at a bare `end`. Plain section listings pass through untouched.
fn function_body(text: &str) -> String {
    if !text.contains("function mpc =") {
        return text.to_string();
    }
    let mut body = Vec::new();
    let mut inside = false;
    for line in text.lines() {
        if line.contains("function mpc =") {
            inside = true;
            continue;
        }
        if inside && line.trim().starts_with("end") {
            break;
        }
        if inside {
            body.push(line);
        }
    }
    body.join("\n")
}

/// Finds `label` at a word boundary, so `mpc.bus` never matches inside
/// `mpc.bus_coords`.
fn find_label(text: &str, label: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(pos) = text[from..].find(label) {
        let at = from + pos;
        match text[at + label.len()..].chars().next() {
            Some(c) if c.is_alphanumeric() || c == '_' => from = at + label.len(),
            _ => return Some(at),
        }
    }
    None
}

/// Extracts the body of `label = [ … ];`. Returns None when the section is
/// absent or not shaped like a bracketed assignment.
fn matrix_section<'a>(text: &'a str, label: &'a str) -> Option<&'a str> {
    let at = find_label(text, label)?;
    let rest = &text[at + label.len()..];
    let open = rest.find('[')?;
    if !rest[..open].chars().all(|c| c == '=' || c.is_whitespace()) {
        return None;
    }
    let body = &rest[open + 1..];
    let close = body.find("];")?;
    Some(&body[..close])
}

/// Scalar `mpc.baseMVA = <n>;` declaration; defaults to 100 when absent.
fn base_mva(text: &str) -> Result<f64, EngineError> {
    let Some(at) = find_label(text, "mpc.baseMVA") else {
        return Ok(100.0);
    };
    let rest = &text[at + "mpc.baseMVA".len()..];
    let eq = rest
        .find('=')
        .ok_or_else(|| EngineError::MalformedCase("baseMVA declaration has no value".into()))?;
    let value = &rest[eq + 1..];
    let end = value.find([';', '\n']).unwrap_or(value.len());
    value[..end]
        .trim()
        .parse()
        .map_err(|_| EngineError::MalformedCase("unreadable baseMVA value".into()))
}

/// Splits a section body into numeric rows, skipping blank and `%` comment
/// lines.
fn parse_rows(body: &str, label: &str) -> Result<Vec<Vec<f64>>, EngineError> {
    let mut rows = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        let line = line.trim_end_matches(';').trim_end();
        let mut row = Vec::new();
        for token in line.split_whitespace() {
            let value: f64 = token.parse().map_err(|_| {
                EngineError::MalformedCase(format!("bad value '{}' in {} section", token, label))
            })?;
            row.push(value);
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::BusType;

    const SAMPLE: &str = "\
function mpc = sample
mpc.baseMVA = 100;

% bus_i type Pd Qd Gs Bs area Vm Va baseKV zone Vmax Vmin
mpc.bus = [
    1 3 0  0  0 0 1 1.0 0 345 1 1.1 0.9
    2 1 80 30 0 0 1 1.0 0 345 1 1.1 0.9

    3 2 0  0  0 0 1 1.0 0 345 1 1.1 0.9
];

mpc.gen = [
    3 150 75 300 -300 1.0 100 1 250 10
];

mpc.branch = [
    1 2 0.02 0.06 0 0 0 0 0 0 1 -360 360
    2 3 0.01 0.03 0 0 0 0 0 0 1 -360 360
];

mpc.bus_coords = [
    1 100 150
    2 200 100
];
end
";

    #[test]
    fn parses_wrapped_sample() {
        let case = parse_case_str(SAMPLE).unwrap();
        assert_eq!(case.base_mva, 100.0);
        assert_eq!(case.bus.len(), 3);
        assert_eq!(case.gens.len(), 1);
        assert_eq!(case.branch.len(), 2);
        assert_eq!(case.bus[0].bus_type, BusType::Slack);
        assert_eq!(case.bus[1].pd, 80.0);
        assert_eq!(case.coords.get(&2), Some(&(200.0, 100.0)));
        assert_eq!(case.coords.get(&3), None);
    }

    #[test]
    fn parsing_is_idempotent() {
        let a = parse_case_str(SAMPLE).unwrap();
        let b = parse_case_str(SAMPLE).unwrap();
        assert_eq!(a.bus.len(), b.bus.len());
        assert_eq!(a.branch.len(), b.branch.len());
        assert_eq!(a.bus[2].to_row(), b.bus[2].to_row());
        assert_eq!(a.coords, b.coords);
    }

    #[test]
    fn base_mva_defaults_when_absent() {
        let case = parse_case_str("mpc.bus = [\n1 3\n];").unwrap();
        assert_eq!(case.base_mva, 100.0);
        assert_eq!(case.bus.len(), 1);
    }

    #[test]
    fn absent_sections_yield_empty_tables() {
        let case = parse_case_str("mpc.baseMVA = 50;").unwrap();
        assert_eq!(case.base_mva, 50.0);
        assert!(case.bus.is_empty());
        assert!(case.gens.is_empty());
        assert!(case.branch.is_empty());
    }

    #[test]
    fn unreadable_section_is_malformed() {
        let text = "mpc.bus = [\n1 three 0 0\n];";
        assert!(matches!(
            parse_case_str(text),
            Err(EngineError::MalformedCase(_))
        ));
    }

    #[test]
    fn dangling_branch_reference_is_malformed() {
        let text = "mpc.bus = [\n1 3\n];\nmpc.branch = [\n1 9 0.01 0.05\n];";
        assert!(parse_case_str(text).is_err());
    }

    #[test]
    fn bus_label_does_not_swallow_bus_coords() {
        let text = "mpc.bus_coords = [\n1 100 150\n];";
        let case = parse_case_str(text).unwrap();
        assert!(case.bus.is_empty());
        assert_eq!(case.coords.get(&1), Some(&(100.0, 150.0)));
    }
}
