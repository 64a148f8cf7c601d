// Shared library for the fpl-live relay and dashboard: configuration, the
// upstream data model, selection persistence, and the pure derivations the
// dashboard renders.

pub mod compare;
pub mod config;
pub mod derive;
pub mod model;
pub mod search;
pub mod selection;
pub mod source;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::model::{Bootstrap, Element, ElementStats, ElementType, Event, Team};

    pub const PHOTO_BASE: &str =
        "https://resources.premierleague.com/premierleague/photos/players/110x140/";

    pub fn element(
        id: u32,
        first: &str,
        second: &str,
        web: &str,
        team: u32,
        element_type: u32,
    ) -> Element {
        Element {
            id,
            first_name: first.to_string(),
            second_name: second.to_string(),
            web_name: web.to_string(),
            team,
            element_type,
            now_cost: 50,
            total_points: 0,
            photo: format!("{id}.jpg"),
        }
    }

    pub fn element_stats(total_points: i32) -> ElementStats {
        ElementStats {
            total_points,
            ..ElementStats::default()
        }
    }

    /// Rice (Arsenal, MID, 6.5m, 120 pts) and Sarr (Spurs, MID, 5.3m, 88 pts).
    pub fn sample_bootstrap() -> Bootstrap {
        let mut rice = element(5, "Declan", "Rice", "Rice", 1, 3);
        rice.now_cost = 65;
        rice.total_points = 120;
        rice.photo = "219847.jpg".into();
        let mut sarr = element(9, "Pape Matar", "Sarr", "Sarr", 18, 3);
        sarr.now_cost = 53;
        sarr.total_points = 88;

        Bootstrap {
            elements: vec![rice, sarr],
            teams: vec![
                Team { id: 1, name: "Arsenal".into() },
                Team { id: 18, name: "Spurs".into() },
            ],
            element_types: vec![ElementType {
                id: 3,
                singular_name_short: "MID".into(),
            }],
            events: vec![Event {
                id: 1,
                is_current: true,
                is_next: false,
            }],
        }
    }
}
