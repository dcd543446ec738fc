/*
 * The single mutable state of a visitor session, and the Decision & Arrangement
 * store operations on it.
 *
 * `phase` and `current_index` are written only by the navigation module (they
 * are visible inside `core` but read-only elsewhere). Decisions and the
 * arrangement are owned here: decisions are recorded per visited artwork, the
 * arrangement is materialized from them on entering the Arrangement phase and
 * afterwards changed only by `reorder` and `remove_from_arrangement`.
 */
use super::models::Catalog;
use super::persistence::SessionSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    #[serde(alias = "Orientation")]
    Orientation,
    #[serde(alias = "Framing")]
    Framing,
    #[serde(alias = "Artwork")]
    Artwork,
    #[serde(alias = "Arrangement")]
    Arrangement,
    #[serde(alias = "Export")]
    Export,
}

impl Phase {
    pub fn has_current_work(self) -> bool {
        matches!(self, Phase::Framing | Phase::Artwork)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrangementError {
    // `reorder` was handed something other than a permutation of the current order.
    NotAPermutation {
        current: Vec<String>,
        proposed: Vec<String>,
    },
}

impl std::fmt::Display for ArrangementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArrangementError::NotAPermutation { current, proposed } => write!(
                f,
                "Proposed arrangement {proposed:?} is not a permutation of {current:?}"
            ),
        }
    }
}

impl std::error::Error for ArrangementError {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub(in crate::core) phase: Phase,
    pub(in crate::core) current_index: usize,
    decisions: BTreeMap<String, bool>,
    arrangement_order: Vec<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[cfg(test)]
    pub fn decisions(&self) -> &BTreeMap<String, bool> {
        &self.decisions
    }

    /// `None` means the visitor never decided on this work.
    pub fn decision(&self, id: &str) -> Option<bool> {
        self.decisions.get(id).copied()
    }

    pub fn is_included(&self, id: &str) -> bool {
        self.decision(id) == Some(true)
    }

    pub fn arrangement_order(&self) -> &[String] {
        &self.arrangement_order
    }

    /*
     * Records the visitor's include/exclude choice for one artwork.
     * The arrangement is deliberately left alone; it is only rebuilt from the
     * decisions when the Arrangement phase is entered from the last artwork.
     */
    pub fn set_decision(&mut self, id: &str, included: bool) {
        log::trace!("SessionState: decision for '{id}' set to {included}");
        self.decisions.insert(id.to_string(), included);
    }

    /*
     * Drops a work from the arrangement and marks it excluded in one step, so a
     * later pass through the artworks does not bring it back unless the visitor
     * includes it again. Returns false (and changes nothing) if the id was not
     * in the arrangement.
     */
    pub fn remove_from_arrangement(&mut self, id: &str) -> bool {
        let Some(position) = self.arrangement_order.iter().position(|x| x == id) else {
            log::debug!("SessionState: '{id}' not in arrangement, nothing to remove");
            return false;
        };
        self.arrangement_order.remove(position);
        self.decisions.insert(id.to_string(), false);
        true
    }

    /// Replaces the arrangement wholesale. `new_order` must contain exactly the
    /// ids of the current arrangement; anything else is rejected untouched.
    pub fn reorder(&mut self, new_order: Vec<String>) -> Result<(), ArrangementError> {
        if !is_permutation_of(&self.arrangement_order, &new_order) {
            log::error!(
                "SessionState: Rejected reorder {:?} of {:?}",
                new_order,
                self.arrangement_order
            );
            return Err(ArrangementError::NotAPermutation {
                current: self.arrangement_order.clone(),
                proposed: new_order,
            });
        }
        self.arrangement_order = new_order;
        Ok(())
    }

    // Catalog-order filter of the works the visitor explicitly included.
    pub(in crate::core) fn materialize_arrangement(&mut self, catalog: &Catalog) {
        self.arrangement_order = catalog
            .works()
            .iter()
            .filter(|w| self.is_included(&w.id))
            .map(|w| w.id.clone())
            .collect();
    }

    /*
     * Installs restored collections. Ids the catalog does not know and repeated
     * ids are dropped so the arrangement invariants hold whatever was stored.
     */
    pub(in crate::core) fn restore_collections(
        &mut self,
        decisions: BTreeMap<String, bool>,
        arrangement_order: Vec<String>,
        catalog: &Catalog,
    ) {
        let mut seen = HashSet::new();
        let sanitized: Vec<String> = arrangement_order
            .into_iter()
            .filter(|id| catalog.contains(id) && seen.insert(id.clone()))
            .collect();
        self.decisions = decisions;
        self.arrangement_order = sanitized;
    }

    pub(in crate::core) fn reset(&mut self) {
        *self = SessionState::default();
    }

    pub fn to_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            current_work_index: self.current_index,
            decisions: self.decisions.clone(),
            arrangement_order: self.arrangement_order.clone(),
        }
    }
}

fn is_permutation_of(current: &[String], proposed: &[String]) -> bool {
    if current.len() != proposed.len() {
        return false;
    }
    let mut a: Vec<&String> = current.iter().collect();
    let mut b: Vec<&String> = proposed.iter().collect();
    a.sort();
    b.sort();
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::test_support::catalog_of;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_materialize_filters_included_in_catalog_order() {
        let catalog = catalog_of(3);
        let mut state = SessionState::new();
        state.set_decision("W3", true);
        state.set_decision("W2", false);
        state.set_decision("W1", true);

        state.materialize_arrangement(&catalog);

        assert_eq!(state.arrangement_order(), ids(&["W1", "W3"]).as_slice());
    }

    #[test]
    fn test_undecided_is_not_excluded_but_not_included_either() {
        let catalog = catalog_of(2);
        let mut state = SessionState::new();
        state.set_decision("W2", true);
        state.materialize_arrangement(&catalog);
        assert_eq!(state.decision("W1"), None);
        assert_eq!(state.arrangement_order(), ids(&["W2"]).as_slice());
    }

    #[test]
    fn test_set_decision_does_not_touch_arrangement() {
        let catalog = catalog_of(2);
        let mut state = SessionState::new();
        state.set_decision("W1", true);
        state.materialize_arrangement(&catalog);

        state.set_decision("W2", true);
        state.set_decision("W1", false);

        assert_eq!(state.arrangement_order(), ids(&["W1"]).as_slice());
    }

    #[test]
    fn test_remove_from_arrangement_marks_excluded() {
        let catalog = catalog_of(3);
        let mut state = SessionState::new();
        state.set_decision("W1", true);
        state.set_decision("W3", true);
        state.materialize_arrangement(&catalog);

        assert!(state.remove_from_arrangement("W3"));
        assert_eq!(state.arrangement_order(), ids(&["W1"]).as_slice());
        assert_eq!(state.decision("W3"), Some(false));

        // Idempotent.
        let before = state.clone();
        assert!(!state.remove_from_arrangement("W3"));
        assert_eq!(state, before);
    }

    #[test]
    fn test_reorder_accepts_permutation() {
        let catalog = catalog_of(3);
        let mut state = SessionState::new();
        for id in ["W1", "W2", "W3"] {
            state.set_decision(id, true);
        }
        state.materialize_arrangement(&catalog);

        state.reorder(ids(&["W3", "W1", "W2"])).unwrap();
        assert_eq!(state.arrangement_order(), ids(&["W3", "W1", "W2"]).as_slice());
    }

    #[test]
    fn test_reorder_rejects_non_permutations() {
        let catalog = catalog_of(3);
        let mut state = SessionState::new();
        state.set_decision("W1", true);
        state.set_decision("W2", true);
        state.materialize_arrangement(&catalog);
        let before = state.clone();

        for bad in [
            ids(&["W1"]),
            ids(&["W1", "W1"]),
            ids(&["W1", "W3"]),
            ids(&["W1", "W2", "W3"]),
        ] {
            let result = state.reorder(bad);
            assert!(matches!(
                result,
                Err(ArrangementError::NotAPermutation { .. })
            ));
            assert_eq!(state, before);
        }
    }

    #[test]
    fn test_restore_collections_drops_unknown_and_duplicate_ids() {
        let catalog = catalog_of(2);
        let mut state = SessionState::new();
        state.restore_collections(
            BTreeMap::from([("W1".to_string(), true)]),
            ids(&["W2", "ghost", "W2", "W1"]),
            &catalog,
        );
        assert_eq!(state.arrangement_order(), ids(&["W2", "W1"]).as_slice());
        assert!(state.is_included("W1"));
    }

    #[test]
    fn test_phase_serde_names() {
        assert_eq!(serde_json::to_string(&Phase::Artwork).unwrap(), "\"artwork\"");
        let parsed: Phase = serde_json::from_str("\"Arrangement\"").unwrap();
        assert_eq!(parsed, Phase::Arrangement);
    }
}
