use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AgeGroup, MatrixKey, Race, RaceMatrixEntry, SkateCategory};

/// Sparse table of (race, age group, category) cells that are open for entry.
///
/// A cell is either present, carrying its enabled flag and per-player race
/// cap, or absent. Every entry must reference a live race and age group;
/// the cascade helpers keep it that way when either is removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RaceMatrix {
    entries: Vec<RaceMatrixEntry>,
}

impl RaceMatrix {
    pub fn new(entries: Vec<RaceMatrixEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[RaceMatrixEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<RaceMatrixEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, key: &MatrixKey) -> Option<&RaceMatrixEntry> {
        self.entries.iter().find(|e| e.matches(key))
    }

    pub fn contains(&self, key: &MatrixKey) -> bool {
        self.entry(key).is_some()
    }

    pub fn is_enabled(&self, key: &MatrixKey) -> bool {
        self.entry(key).is_some_and(|e| e.is_enabled)
    }

    /// Cap for an enabled cell, `None` when the cell is absent or disabled.
    pub fn cap_for(&self, key: &MatrixKey) -> Option<u32> {
        self.entry(key)
            .filter(|e| e.is_enabled)
            .map(|e| e.max_races_per_player)
    }

    /// Adds the cell with default settings when absent, removes it when
    /// present. Returns whether the cell is present afterwards.
    pub fn toggle(&mut self, race_id: Uuid, age_group_id: Uuid, category: SkateCategory) -> bool {
        let key = MatrixKey::new(race_id, age_group_id, category);

        match self.entries.iter().position(|e| e.matches(&key)) {
            Some(idx) => {
                self.entries.remove(idx);
                false
            }
            None => {
                self.entries.push(RaceMatrixEntry::new(key));
                true
            }
        }
    }

    /// Rewrites the cap of one cell. Absent cells are left alone and the
    /// value is stored as given.
    pub fn update_max_races(
        &mut self,
        race_id: Uuid,
        age_group_id: Uuid,
        category: SkateCategory,
        value: u32,
    ) -> bool {
        let key = MatrixKey::new(race_id, age_group_id, category);

        match self.entries.iter_mut().find(|e| e.matches(&key)) {
            Some(entry) => {
                entry.max_races_per_player = value;
                true
            }
            None => false,
        }
    }

    /// Applies one cap to every listed race of an age group/category row.
    /// Returns how many cells were rewritten.
    pub fn update_row_max_races(
        &mut self,
        race_ids: &[Uuid],
        age_group_id: Uuid,
        category: SkateCategory,
        value: u32,
    ) -> usize {
        race_ids
            .iter()
            .filter(|race_id| self.update_max_races(**race_id, age_group_id, category, value))
            .count()
    }

    pub fn set_enabled(
        &mut self,
        race_id: Uuid,
        age_group_id: Uuid,
        category: SkateCategory,
        enabled: bool,
    ) -> bool {
        let key = MatrixKey::new(race_id, age_group_id, category);

        match self.entries.iter_mut().find(|e| e.matches(&key)) {
            Some(entry) => {
                entry.is_enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Drops every cell of a removed race. Returns how many were dropped.
    pub fn remove_race(&mut self, race_id: Uuid) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.race_id != race_id);
        before - self.entries.len()
    }

    /// Drops every cell of a removed age group. Returns how many were dropped.
    pub fn remove_age_group(&mut self, age_group_id: Uuid) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.age_group_id != age_group_id);
        before - self.entries.len()
    }

    /// Cells whose race or age group no longer exists.
    pub fn dangling_entries(&self, races: &[Race], age_groups: &[AgeGroup]) -> Vec<&RaceMatrixEntry> {
        let race_ids: HashSet<Uuid> = races.iter().map(|r| r.id).collect();
        let age_group_ids: HashSet<Uuid> = age_groups.iter().map(|g| g.id).collect();

        self.entries
            .iter()
            .filter(|e| !race_ids.contains(&e.race_id) || !age_group_ids.contains(&e.age_group_id))
            .collect()
    }

    /// Removes dangling cells. Returns how many were removed.
    pub fn prune_orphans(&mut self, races: &[Race], age_groups: &[AgeGroup]) -> usize {
        let race_ids: HashSet<Uuid> = races.iter().map(|r| r.id).collect();
        let age_group_ids: HashSet<Uuid> = age_groups.iter().map(|g| g.id).collect();

        let before = self.entries.len();
        self.entries
            .retain(|e| race_ids.contains(&e.race_id) && age_group_ids.contains(&e.age_group_id));
        let removed = before - self.entries.len();

        if removed > 0 {
            tracing::warn!("Pruned {} race matrix entries with dangling references", removed);
        }

        removed
    }
}

impl From<Vec<RaceMatrixEntry>> for RaceMatrix {
    fn from(entries: Vec<RaceMatrixEntry>) -> Self {
        Self::new(entries)
    }
}

/// Removes a race and every matrix cell that points at it.
pub fn remove_race(races: &mut Vec<Race>, matrix: &mut RaceMatrix, race_id: Uuid) -> usize {
    races.retain(|r| r.id != race_id);
    matrix.remove_race(race_id)
}

/// Removes an age group and every matrix cell that points at it.
pub fn remove_age_group(
    age_groups: &mut Vec<AgeGroup>,
    matrix: &mut RaceMatrix,
    age_group_id: Uuid,
) -> usize {
    age_groups.retain(|g| g.id != age_group_id);
    matrix.remove_age_group(age_group_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DEFAULT_MAX_RACES_PER_PLAYER, GenderEligibility};

    fn race(name: &str) -> Race {
        Race {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            gender_eligibility: GenderEligibility::Mixed,
        }
    }

    fn age_group(name: &str, start: i32, end: i32) -> AgeGroup {
        AgeGroup {
            id: Uuid::new_v4(),
            name: name.to_string(),
            start_age: start,
            end_age: end,
        }
    }

    #[test]
    fn test_toggle_inserts_with_defaults() {
        let mut matrix = RaceMatrix::default();
        let (r, g) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(matrix.toggle(r, g, SkateCategory::Inline));

        let entry = matrix
            .entry(&MatrixKey::new(r, g, SkateCategory::Inline))
            .unwrap();
        assert!(entry.is_enabled);
        assert_eq!(entry.max_races_per_player, DEFAULT_MAX_RACES_PER_PLAYER);
    }

    #[test]
    fn test_toggle_twice_restores_membership() {
        let (r, g) = (Uuid::new_v4(), Uuid::new_v4());
        let mut matrix = RaceMatrix::default();
        matrix.toggle(Uuid::new_v4(), g, SkateCategory::Quad);
        let original = matrix.clone();

        matrix.toggle(r, g, SkateCategory::Quad);
        assert_eq!(matrix.len(), 2);
        matrix.toggle(r, g, SkateCategory::Quad);
        assert_eq!(matrix, original);

        // Toggling an existing cell off and on again resets its cap.
        let existing = original.entries()[0].key();
        matrix.update_max_races(existing.race_id, g, SkateCategory::Quad, 4);
        matrix.toggle(existing.race_id, g, SkateCategory::Quad);
        matrix.toggle(existing.race_id, g, SkateCategory::Quad);
        assert_eq!(matrix.cap_for(&existing), Some(DEFAULT_MAX_RACES_PER_PLAYER));
    }

    #[test]
    fn test_update_max_races_targets_single_cell() {
        let (r1, r2, g) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut matrix = RaceMatrix::default();
        matrix.toggle(r1, g, SkateCategory::Fancy);
        matrix.toggle(r2, g, SkateCategory::Fancy);

        assert!(matrix.update_max_races(r1, g, SkateCategory::Fancy, 3));
        assert!(!matrix.update_max_races(r1, g, SkateCategory::Quad, 3));

        assert_eq!(matrix.cap_for(&MatrixKey::new(r1, g, SkateCategory::Fancy)), Some(3));
        assert_eq!(matrix.cap_for(&MatrixKey::new(r2, g, SkateCategory::Fancy)), Some(1));
    }

    #[test]
    fn test_update_max_races_stores_out_of_range_values() {
        let (r, g) = (Uuid::new_v4(), Uuid::new_v4());
        let mut matrix = RaceMatrix::default();
        matrix.toggle(r, g, SkateCategory::Fancy);

        assert!(matrix.update_max_races(r, g, SkateCategory::Fancy, 25));
        assert_eq!(matrix.cap_for(&MatrixKey::new(r, g, SkateCategory::Fancy)), Some(25));
    }

    #[test]
    fn test_update_row_max_races() {
        let (r1, r2, r3, g) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut matrix = RaceMatrix::default();
        matrix.toggle(r1, g, SkateCategory::Quad);
        matrix.toggle(r2, g, SkateCategory::Quad);

        let updated = matrix.update_row_max_races(&[r1, r2, r3], g, SkateCategory::Quad, 2);

        assert_eq!(updated, 2);
        assert!(matrix.entries().iter().all(|e| e.max_races_per_player == 2));
        assert!(!matrix.contains(&MatrixKey::new(r3, g, SkateCategory::Quad)));
    }

    #[test]
    fn test_disabled_cell_has_no_cap() {
        let (r, g) = (Uuid::new_v4(), Uuid::new_v4());
        let key = MatrixKey::new(r, g, SkateCategory::Beginner);
        let mut matrix = RaceMatrix::default();
        matrix.toggle(r, g, SkateCategory::Beginner);

        assert!(matrix.set_enabled(r, g, SkateCategory::Beginner, false));
        assert!(matrix.contains(&key));
        assert!(!matrix.is_enabled(&key));
        assert_eq!(matrix.cap_for(&key), None);
    }

    #[test]
    fn test_remove_race_cascades() {
        let mut races = vec![race("100m Sprint"), race("Artistic")];
        let groups = vec![age_group("U8", 6, 8), age_group("U10", 9, 10)];
        let mut matrix = RaceMatrix::default();
        for r in &races {
            for g in &groups {
                for category in [SkateCategory::Quad, SkateCategory::Inline] {
                    matrix.toggle(r.id, g.id, category);
                }
            }
        }

        let sprint_id = races[0].id;
        let before = matrix.len();
        let referencing = matrix.entries().iter().filter(|e| e.race_id == sprint_id).count();

        let removed = remove_race(&mut races, &mut matrix, sprint_id);

        assert_eq!(removed, referencing);
        assert_eq!(matrix.len(), before - referencing);
        assert_eq!(races.len(), 1);
        assert!(matrix.dangling_entries(&races, &groups).is_empty());
    }

    #[test]
    fn test_remove_age_group_cascades() {
        let races = vec![race("Relay")];
        let mut groups = vec![age_group("U8", 6, 8), age_group("U10", 9, 10)];
        let mut matrix = RaceMatrix::default();
        for g in &groups {
            matrix.toggle(races[0].id, g.id, SkateCategory::Quad);
        }

        let removed_id = groups[0].id;
        let removed = remove_age_group(&mut groups, &mut matrix, removed_id);

        assert_eq!(removed, 1);
        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix.entries()[0].age_group_id, groups[0].id);
    }

    #[test]
    fn test_prune_orphans() {
        let races = vec![race("Relay")];
        let groups = vec![age_group("U8", 6, 8)];
        let mut matrix = RaceMatrix::default();
        matrix.toggle(races[0].id, groups[0].id, SkateCategory::Quad);
        matrix.toggle(Uuid::new_v4(), groups[0].id, SkateCategory::Quad);
        matrix.toggle(races[0].id, Uuid::new_v4(), SkateCategory::Quad);

        assert_eq!(matrix.dangling_entries(&races, &groups).len(), 2);
        assert_eq!(matrix.prune_orphans(&races, &groups), 2);
        assert_eq!(matrix.len(), 1);
    }
}
