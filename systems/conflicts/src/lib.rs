#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure conflict detector checking a candidate placement against occupants.
//!
//! Two plantings conflict when their growing windows share at least one day
//! and their cells lie within the combined footprint buffer, measured with
//! Chebyshev distance. Conflicts are warnings: callers decide whether to
//! override them.

use chrono::NaiveDate;
use garden_planner_core::{CellCoord, Conflict, DateWindow, Occupant};

/// Placement being considered, prior to commit.
#[derive(Clone, Copy, Debug)]
pub struct Candidate<'a> {
    /// Cells the candidate would occupy.
    pub cells: &'a [CellCoord],
    /// Planting date of the candidate.
    pub planted: NaiveDate,
    /// Days until the candidate frees its cells.
    pub days_to_maturity: u32,
    /// Cells either side of each candidate cell the mature plant reaches.
    pub footprint_radius: u32,
}

impl Candidate<'_> {
    /// Window during which the candidate would hold its cells.
    #[must_use]
    pub fn window(&self) -> DateWindow {
        DateWindow::growing(self.planted, self.days_to_maturity)
            .unwrap_or_else(|| DateWindow::new(self.planted, NaiveDate::MAX))
    }
}

/// Conflict detector that reuses its ordering buffer between calls.
#[derive(Debug, Default)]
pub struct ConflictDetector {
    order: Vec<usize>,
}

impl ConflictDetector {
    /// Creates a detector with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects one conflict per overlapping occupant, ordered by placement.
    ///
    /// The output buffer is cleared before populating it.
    pub fn detect(
        &mut self,
        candidate: &Candidate<'_>,
        occupants: &[Occupant],
        out: &mut Vec<Conflict>,
    ) {
        out.clear();
        if candidate.cells.is_empty() || occupants.is_empty() {
            return;
        }

        self.order.clear();
        self.order.extend(0..occupants.len());
        self.order
            .sort_by_key(|index| (occupants[*index].placement, occupants[*index].cell));

        let window = candidate.window();
        let mut last_placement = None;

        for &index in &self.order {
            let occupant = &occupants[index];
            if last_placement == Some(occupant.placement) {
                continue;
            }

            let Some(overlap) = window.intersection(&occupant.window()) else {
                continue;
            };

            let buffer = candidate
                .footprint_radius
                .saturating_add(occupant.footprint_radius);
            let Some((candidate_cell, distance)) = nearest_cell(candidate.cells, occupant.cell)
            else {
                continue;
            };

            if distance > buffer {
                continue;
            }

            last_placement = Some(occupant.placement);
            out.push(Conflict {
                placement: occupant.placement,
                occupied_cell: occupant.cell,
                candidate_cell,
                distance,
                overlap,
            });
        }

        if !out.is_empty() {
            tracing::debug!(conflicts = out.len(), "candidate overlaps existing plantings");
        }
    }
}

/// Convenience wrapper that allocates a fresh detector and output buffer.
#[must_use]
pub fn detect_conflicts(candidate: &Candidate<'_>, occupants: &[Occupant]) -> Vec<Conflict> {
    let mut out = Vec::new();
    ConflictDetector::new().detect(candidate, occupants, &mut out);
    out
}

/// Candidate cell closest to `target`; ties keep the earliest cell.
fn nearest_cell(cells: &[CellCoord], target: CellCoord) -> Option<(CellCoord, u32)> {
    let mut best: Option<(CellCoord, u32)> = None;
    for cell in cells {
        let distance = cell.chebyshev_distance(target);
        match best {
            Some((_, current)) if current <= distance => {}
            _ => best = Some((*cell, distance)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_cell_prefers_earliest_on_ties() {
        let cells = [CellCoord::new(0, 0), CellCoord::new(2, 0)];
        assert_eq!(
            nearest_cell(&cells, CellCoord::new(1, 0)),
            Some((CellCoord::new(0, 0), 1))
        );
        assert_eq!(nearest_cell(&[], CellCoord::new(1, 0)), None);
    }
}
