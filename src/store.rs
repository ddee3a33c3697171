use std::fs;
use std::io;
use std::path::Path;

use log::{info, warn};

use crate::error::EngineError;
use crate::graph::GraphModel;

pub const SNAPSHOT_FILE: &str = "grid_data.json";

/// Writes the graph as a pretty-printed JSON snapshot under the data
/// directory, creating it if needed.
pub fn save_graph(data_dir: &Path, graph: &GraphModel) -> Result<(), EngineError> {
    fs::create_dir_all(data_dir)?;
    let path = data_dir.join(SNAPSHOT_FILE);
    let json = serde_json::to_string_pretty(graph).map_err(io::Error::other)?;
    fs::write(&path, json)?;
    info!("saved grid snapshot to {}", path.display());
    Ok(())
}

/// Reads back the last saved snapshot. Absent or unreadable snapshots are
/// not an error; the caller falls through to the next provider.
pub fn load_graph_snapshot(data_dir: &Path) -> Option<GraphModel> {
    let path = data_dir.join(SNAPSHOT_FILE);
    let text = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&text) {
        Ok(graph) => {
            info!("loaded grid snapshot from {}", path.display());
            Some(graph)
        }
        Err(e) => {
            warn!("could not read snapshot {}: {}", path.display(), e);
            None
        }
    }
}

/// Reads `<name>.m` from the data directory, if present.
pub fn read_case_file(data_dir: &Path, name: &str) -> Option<String> {
    fs::read_to_string(data_dir.join(format!("{}.m", name))).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_network;
    use std::path::PathBuf;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gridview-store-{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn snapshot_round_trips() {
        let dir = scratch_dir("snapshot");
        let graph = default_network();
        save_graph(&dir, &graph).unwrap();
        let restored = load_graph_snapshot(&dir).unwrap();
        assert_eq!(restored.nodes.len(), 4);
        assert_eq!(restored.nodes[1].active_power, -80.0);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_snapshot_is_none() {
        let dir = scratch_dir("missing");
        assert!(load_graph_snapshot(&dir).is_none());
        assert!(read_case_file(&dir, "case9").is_none());
    }
}
