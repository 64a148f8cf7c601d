// Display records: joins reference data, live stats, and the selection into
// what a comparison card shows.

use serde::Serialize;

use crate::model::{Bootstrap, LiveStats};
use crate::selection::Selection;

/// One card's worth of data for a selected player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRecord {
    pub id: u32,
    pub display: String,
    pub team: Option<String>,
    /// Price in millions.
    pub cost: f64,
    pub season_points: i32,
    pub gameweek_points: i32,
    pub photo_url: String,
    pub position: Option<String>,
}

/// Build records for the set, resolvable slots in slot order. Unset slots
/// and ids missing from `bootstrap` are dropped.
pub fn derive_records(
    bootstrap: &Bootstrap,
    live: Option<&LiveStats>,
    selection: &Selection,
    photo_base_url: &str,
) -> Vec<DisplayRecord> {
    selection
        .iter()
        .flatten()
        .filter_map(|&id| bootstrap.element(id))
        .map(|el| DisplayRecord {
            id: el.id,
            display: el.full_name(),
            team: bootstrap.team_name(el.team).map(str::to_string),
            cost: f64::from(el.now_cost) / 10.0,
            season_points: el.total_points,
            gameweek_points: live.map_or(0, |l| l.points(el.id)),
            photo_url: format!("{photo_base_url}{}", el.photo),
            position: bootstrap.position_label(el.element_type).map(str::to_string),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LiveElement, LivePayload};
    use crate::test_support::{element_stats, sample_bootstrap, PHOTO_BASE};

    fn live(points: &[(u32, i32)]) -> LiveStats {
        LiveStats::new(
            1,
            LivePayload {
                elements: points
                    .iter()
                    .map(|&(id, p)| LiveElement {
                        id,
                        stats: element_stats(p),
                    })
                    .collect(),
            },
        )
    }

    #[test]
    fn joins_team_position_cost_and_photo() {
        let bs = sample_bootstrap();
        let records = derive_records(&bs, Some(&live(&[(5, 7)])), &[Some(5), None], PHOTO_BASE);

        assert_eq!(records.len(), 1);
        let rice = &records[0];
        assert_eq!(rice.display, "Declan Rice");
        assert_eq!(rice.team.as_deref(), Some("Arsenal"));
        assert_eq!(rice.position.as_deref(), Some("MID"));
        assert!((rice.cost - 6.5).abs() < f64::EPSILON);
        assert_eq!(rice.season_points, 120);
        assert_eq!(rice.gameweek_points, 7);
        assert_eq!(rice.photo_url, format!("{PHOTO_BASE}219847.jpg"));
    }

    #[test]
    fn preserves_slot_order() {
        let bs = sample_bootstrap();
        let records = derive_records(&bs, None, &[Some(9), Some(5)], PHOTO_BASE);
        let ids: Vec<u32> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![9, 5]);
    }

    #[test]
    fn absent_live_entry_is_zero() {
        let bs = sample_bootstrap();
        let records = derive_records(&bs, Some(&live(&[(1, 12)])), &[Some(5), Some(9)], PHOTO_BASE);
        assert!(records.iter().all(|r| r.gameweek_points == 0));

        let records = derive_records(&bs, None, &[Some(5), None], PHOTO_BASE);
        assert_eq!(records[0].gameweek_points, 0);
    }

    #[test]
    fn unknown_and_unset_slots_are_dropped() {
        let bs = sample_bootstrap();
        assert!(derive_records(&bs, None, &[None, None], PHOTO_BASE).is_empty());
        let records = derive_records(&bs, None, &[Some(404), Some(9)], PHOTO_BASE);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 9);
    }

    #[test]
    fn missing_joins_yield_none() {
        let mut bs = sample_bootstrap();
        bs.teams.clear();
        bs.element_types.clear();
        let records = derive_records(&bs, None, &[Some(5), None], PHOTO_BASE);
        assert_eq!(records[0].team, None);
        assert_eq!(records[0].position, None);
    }

    #[test]
    fn derivation_is_idempotent() {
        let bs = sample_bootstrap();
        let stats = live(&[(5, 3), (9, 11)]);
        let first = derive_records(&bs, Some(&stats), &[Some(5), Some(9)], PHOTO_BASE);
        let second = derive_records(&bs, Some(&stats), &[Some(5), Some(9)], PHOTO_BASE);
        assert_eq!(first, second);
    }
}
