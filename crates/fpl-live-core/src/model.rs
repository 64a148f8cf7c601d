// Upstream data model: the bootstrap reference snapshot and per-gameweek
// live stats, deserialized from the FPL API's JSON.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single player (`element` in the upstream feed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: u32,
    pub first_name: String,
    pub second_name: String,
    pub web_name: String,
    /// Team id.
    pub team: u32,
    /// Position-type id.
    pub element_type: u32,
    /// Price in tenths of a million.
    #[serde(default)]
    pub now_cost: u32,
    #[serde(default)]
    pub total_points: i32,
    #[serde(default)]
    pub photo: String,
}

impl Element {
    /// `"first second"`, the name used for display and exact matching.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.second_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
}

/// Position type, e.g. `{ id: 3, singular_name_short: "MID" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementType {
    pub id: u32,
    pub singular_name_short: String,
}

/// A gameweek.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u32,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub is_next: bool,
}

/// The `bootstrap-static/` reference snapshot. Fields the dashboard does not
/// use are ignored during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bootstrap {
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub element_types: Vec<ElementType>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Bootstrap {
    pub fn element(&self, id: u32) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn team_name(&self, team_id: u32) -> Option<&str> {
        self.teams
            .iter()
            .find(|t| t.id == team_id)
            .map(|t| t.name.as_str())
    }

    pub fn position_label(&self, element_type: u32) -> Option<&str> {
        self.element_types
            .iter()
            .find(|t| t.id == element_type)
            .map(|t| t.singular_name_short.as_str())
    }

    /// The gameweek flagged as current, if any. Drives periodic polling.
    pub fn current_event(&self) -> Option<u32> {
        self.events.iter().find(|e| e.is_current).map(|e| e.id)
    }

    /// The gameweek used for the first live fetch: current, else next,
    /// else the first listed.
    pub fn initial_event(&self) -> Option<u32> {
        self.current_event()
            .or_else(|| self.events.iter().find(|e| e.is_next).map(|e| e.id))
            .or_else(|| self.events.first().map(|e| e.id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementStats {
    #[serde(default)]
    pub total_points: i32,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub goals_scored: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub bonus: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveElement {
    pub id: u32,
    #[serde(default)]
    pub stats: ElementStats,
}

/// Raw `event/<id>/live/` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LivePayload {
    #[serde(default)]
    pub elements: Vec<LiveElement>,
}

/// Live stats for one gameweek, indexed by element id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveStats {
    pub event_id: u32,
    stats: HashMap<u32, ElementStats>,
}

impl LiveStats {
    pub fn new(event_id: u32, payload: LivePayload) -> Self {
        let stats = payload
            .elements
            .into_iter()
            .map(|el| (el.id, el.stats))
            .collect();
        LiveStats { event_id, stats }
    }

    pub fn get(&self, element_id: u32) -> Option<&ElementStats> {
        self.stats.get(&element_id)
    }

    /// Gameweek points for an element; zero when the element has no entry.
    pub fn points(&self, element_id: u32) -> i32 {
        self.get(element_id).map_or(0, |s| s.total_points)
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
