// ── Reconciliation ──
//
// Computes the minimal change set between two snapshots. Identity is the
// tower id; two towers with the same id are unchanged only if every field
// matches.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::model::{FleetSnapshot, FleetSummary, TowerId};

/// Per-id classification of `next` against `prev`.
///
/// `inserted`, `updated` and `unchanged` follow `next` order; `removed`
/// follows `prev` order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FleetDiff {
    pub inserted: Vec<TowerId>,
    pub removed: Vec<TowerId>,
    pub updated: Vec<TowerId>,
    pub unchanged: Vec<TowerId>,
}

impl FleetDiff {
    pub fn has_changes(&self) -> bool {
        !(self.inserted.is_empty() && self.removed.is_empty() && self.updated.is_empty())
    }

    /// Ids from `next` whose rows need redrawing, in display order.
    pub fn changed(&self) -> impl Iterator<Item = TowerId> + '_ {
        self.inserted.iter().chain(self.updated.iter()).copied()
    }
}

pub fn diff(prev: &FleetSnapshot, next: &FleetSnapshot) -> FleetDiff {
    let mut out = FleetDiff::default();

    for tower in next {
        match prev.get(tower.id) {
            None => out.inserted.push(tower.id),
            Some(old) if old == tower => out.unchanged.push(tower.id),
            Some(_) => out.updated.push(tower.id),
        }
    }

    out.removed = prev.ids().filter(|id| !next.contains(*id)).collect();
    out
}

/// One applied snapshot together with what changed and its summary.
#[derive(Debug, Clone)]
pub struct FleetUpdate {
    pub diff: FleetDiff,
    pub snapshot: Arc<FleetSnapshot>,
    pub summary: FleetSummary,
}

// ── FleetView ───────────────────────────────────────────────────────

/// Last reconciled snapshot. Readers never block the writer.
#[derive(Debug, Default)]
pub struct FleetView {
    current: ArcSwap<FleetSnapshot>,
}

impl FleetView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot and report the difference.
    pub fn apply(&self, next: FleetSnapshot) -> FleetUpdate {
        let next = Arc::new(next);
        let prev = self.current.swap(Arc::clone(&next));
        FleetUpdate {
            diff: diff(&prev, &next),
            summary: FleetSummary::of(&next),
            snapshot: next,
        }
    }

    pub fn current(&self) -> Arc<FleetSnapshot> {
        self.current.load_full()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Tower;
    use crate::model::tower_fixture as tower;
    use pretty_assertions::assert_eq;

    fn snap(towers: Vec<Tower>) -> FleetSnapshot {
        FleetSnapshot::from_towers(towers).unwrap()
    }

    fn ids(raw: &[u32]) -> Vec<TowerId> {
        raw.iter().copied().map(TowerId).collect()
    }

    #[test]
    fn identical_snapshots_are_unchanged() {
        let a = snap(vec![tower(1, 10), tower(2, 20)]);
        let d = diff(&a, &a.clone());
        assert_eq!(d.unchanged, ids(&[1, 2]));
        assert!(!d.has_changes());
    }

    #[test]
    fn single_field_change_is_updated() {
        let prev = snap(vec![tower(1, 10), tower(2, 20), tower(3, 30)]);
        let mut moved = tower(2, 20);
        moved.pump_on = true;
        let next = snap(vec![tower(1, 10), moved, tower(3, 30)]);

        let d = diff(&prev, &next);
        assert_eq!(d.updated, ids(&[2]));
        assert_eq!(d.unchanged, ids(&[1, 3]));
        assert!(d.inserted.is_empty() && d.removed.is_empty());
    }

    #[test]
    fn inserted_and_removed_keep_their_orders() {
        let prev = snap(vec![tower(4, 40), tower(1, 10), tower(2, 20)]);
        let next = snap(vec![tower(5, 50), tower(1, 11), tower(6, 60)]);

        let d = diff(&prev, &next);
        assert_eq!(d.inserted, ids(&[5, 6]));
        assert_eq!(d.removed, ids(&[4, 2]));
        assert_eq!(d.updated, ids(&[1]));
        assert_eq!(d.changed().collect::<Vec<_>>(), ids(&[5, 6, 1]));
    }

    #[test]
    fn view_reports_first_apply_as_inserted() {
        let view = FleetView::new();
        assert!(view.current().is_empty());

        let first = view.apply(snap(vec![tower(1, 10)]));
        assert_eq!(first.diff.inserted, ids(&[1]));
        assert_eq!(first.summary.total, 1);

        let second = view.apply(snap(vec![tower(1, 10)]));
        assert!(!second.diff.has_changes());
        assert_eq!(view.current().len(), 1);
    }

    #[test]
    fn emptying_the_fleet_removes_everything() {
        let view = FleetView::new();
        view.apply(snap(vec![tower(1, 10), tower(2, 20)]));
        let update = view.apply(FleetSnapshot::default());
        assert_eq!(update.diff.removed, ids(&[1, 2]));
        assert!(update.diff.has_changes());
    }
}
