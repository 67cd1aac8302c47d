//! Removal of the intentionally enclosed center block from anomaly regions.

use roboyard_core::Board;
use roboyard_reachability::Region;

/// Strips the center block cells from every region and drops emptied regions.
///
/// Only the overlapping cells are removed; a region that merely touches the
/// center block keeps its other cells.
#[must_use]
pub fn filter_regions(regions: Vec<Region>, board: &Board) -> Vec<Region> {
    regions
        .into_iter()
        .map(|region| {
            region
                .into_iter()
                .filter(|cell| !board.is_center_cell(*cell))
                .collect::<Region>()
        })
        .filter(|region| !region.is_empty())
        .collect()
}
