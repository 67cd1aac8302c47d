//! Connected-component split of an arbitrary cell set.

use std::collections::VecDeque;

use roboyard_core::Direction;

use crate::Region;

/// Partitions `cells` into maximal 4-connected regions.
///
/// Connectivity is plain grid adjacency; walls are deliberately ignored since
/// the input is usually a set of cells already known to be unreachable.
/// Regions are ordered by their smallest cell so reports stay reproducible.
#[must_use]
pub fn find_regions(cells: &Region) -> Vec<Region> {
    let mut remaining = cells.clone();
    let mut regions = Vec::new();
    let mut frontier = VecDeque::new();

    while let Some(start) = remaining.pop_first() {
        let mut region = Region::new();
        let _ = region.insert(start);
        frontier.push_back(start);

        while let Some(cell) = frontier.pop_front() {
            for direction in Direction::ALL {
                let Some(neighbor) = cell.step(direction) else {
                    continue;
                };
                if remaining.remove(&neighbor) {
                    let _ = region.insert(neighbor);
                    frontier.push_back(neighbor);
                }
            }
        }

        regions.push(region);
    }

    regions
}
