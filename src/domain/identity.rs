// Stable chart identities (legend index and color) per station
use serde::Serialize;
use std::collections::HashMap;

pub const DEFAULT_PALETTE: [&str; 5] = ["#3f51b5", "#e91e63", "#009688", "#ff9800", "#607d8b"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesIdentity {
    pub index: usize,
    pub color: String,
}

/// Hands out identities in first-seen order and never reassigns them, so a
/// station keeps its line color across redraws of the same group.
#[derive(Debug, Clone)]
pub struct SeriesIdentityCache {
    palette: Vec<String>,
    assigned: HashMap<String, usize>,
}

impl SeriesIdentityCache {
    pub fn new(palette: Vec<String>) -> Self {
        let palette = if palette.is_empty() {
            DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
        } else {
            palette
        };
        Self {
            palette,
            assigned: HashMap::new(),
        }
    }

    pub fn resolve(&mut self, station_id: &str) -> SeriesIdentity {
        let next = self.assigned.len();
        let index = *self.assigned.entry(station_id.to_string()).or_insert(next);
        SeriesIdentity {
            index,
            color: self.palette[index % self.palette.len()].clone(),
        }
    }
}

impl Default for SeriesIdentityCache {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
