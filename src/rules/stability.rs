//! Stability bookkeeping
//!
//! Each cell carries a 4-bit mask, one bit per line family. A bit is locked
//! when the cell sits on the border along that family or when its line has
//! no free cell left. Locks then spread: a stone locked on all 4 families
//! locks the linking family of every same-colored neighbour, until nothing
//! changes.

use crate::board::{CellId, CellState, Topology, DIRECTIONS, FULLY_STABLE, LINE_FAMILIES};

/// Recompute free counts and locks from scratch
pub fn reset(topology: &Topology, cells: &[CellState], stable: &mut [u8], free: &mut [u16]) {
    for (line, count) in free.iter_mut().enumerate() {
        *count = topology
            .cells_on_line(line)
            .iter()
            .filter(|&&c| cells[c as usize].is_free())
            .count() as u16;
    }

    for cell in 0..cells.len() as CellId {
        let mut mask = 0u8;
        for family in 0..LINE_FAMILIES {
            if topology.is_edge(cell, family) || free[topology.line_of(cell, family)] == 0 {
                mask |= 1 << family;
            }
        }
        stable[cell as usize] = mask;
    }

    propagate(topology, cells, stable);
}

/// Account for a free cell that just got filled.
///
/// Each distinct line through `cell` loses one free cell; a line running out
/// locks its family on all member cells.
pub fn occupy(topology: &Topology, stable: &mut [u8], free: &mut [u16], cell: CellId) {
    let mut seen = [usize::MAX; LINE_FAMILIES];
    for family in 0..LINE_FAMILIES {
        let line = topology.line_of(cell, family);
        if seen.contains(&line) {
            continue;
        }
        seen[family] = line;

        free[line] = free[line].saturating_sub(1);
        if free[line] == 0 {
            lock_line(topology, stable, line);
        }
    }
}

fn lock_line(topology: &Topology, stable: &mut [u8], line: usize) {
    for &member in topology.cells_on_line(line) {
        for family in 0..LINE_FAMILIES {
            if topology.line_of(member, family) == line {
                stable[member as usize] |= 1 << family;
            }
        }
    }
}

/// Spread locks from fully stable stones to their same-colored neighbours
pub fn propagate(topology: &Topology, cells: &[CellState], stable: &mut [u8]) {
    let mut pending: Vec<CellId> = (0..cells.len() as CellId)
        .filter(|&c| cells[c as usize].is_stone() && stable[c as usize] == FULLY_STABLE)
        .collect();

    while let Some(cell) = pending.pop() {
        let state = cells[cell as usize];
        for dir in 0..DIRECTIONS {
            let Some(next) = topology.neighbour(cell, dir) else {
                continue;
            };
            if cells[next as usize] != state {
                continue;
            }
            let bit = 1 << (topology.continuation(cell, dir) % LINE_FAMILIES);
            let mask = &mut stable[next as usize];
            if *mask & bit == 0 {
                *mask |= bit;
                if *mask == FULLY_STABLE {
                    pending.push(next);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::MapDescription;

    fn setup(text: &str) -> (Topology, Vec<CellState>) {
        let desc: MapDescription = text.parse().unwrap();
        let cells = desc.grid.iter().flatten().copied().collect();
        (Topology::build(&desc).unwrap(), cells)
    }

    fn fresh(topo: &Topology, cells: &[CellState]) -> (Vec<u8>, Vec<u16>) {
        let mut stable = vec![0; cells.len()];
        let mut free = vec![0; topo.line_count()];
        reset(topo, cells, &mut stable, &mut free);
        (stable, free)
    }

    #[test]
    fn test_corner_is_fully_stable() {
        let (topo, cells) = setup("2\n0\n0 0\n3 3\n1 0 0\n0 0 0\n0 0 0\n");
        let (stable, _) = fresh(&topo, &cells);
        assert_eq!(stable[topo.cell_at(0, 0).unwrap() as usize], FULLY_STABLE);
        // Centre touches no border and every line has free cells
        assert_eq!(stable[topo.cell_at(1, 1).unwrap() as usize], 0);
        // Edge middle: border on 3 families, horizontal row still free
        assert_eq!(stable[topo.cell_at(1, 0).unwrap() as usize], 0b1011);
    }

    #[test]
    fn test_full_line_locks_family() {
        let (topo, cells) = setup("2\n0\n0 0\n3 3\n0 0 0\n1 2 1\n0 0 0\n");
        let (stable, free) = fresh(&topo, &cells);
        let centre = topo.cell_at(1, 1).unwrap();
        assert_eq!(free[topo.line_of(centre, 2)], 0);
        assert_eq!(stable[centre as usize], 0b0100, "only horizontal locked");
    }

    #[test]
    fn test_occupy_locks_line_when_last_free_cell_fills() {
        let (topo, mut cells) = setup("2\n0\n0 0\n3 3\n0 0 0\n1 0 1\n0 0 0\n");
        let (mut stable, mut free) = fresh(&topo, &cells);
        let centre = topo.cell_at(1, 1).unwrap();
        let row = topo.line_of(centre, 2);
        assert_eq!(free[row], 1);

        cells[centre as usize] = CellState::Stone(1);
        occupy(&topo, &mut stable, &mut free, centre);
        assert_eq!(free[row], 0);
        for &member in topo.cells_on_line(row) {
            assert_ne!(stable[member as usize] & 0b0100, 0);
        }
    }

    #[test]
    fn test_propagation_spreads_to_same_color() {
        // Corner stone is fully stable and locks its eastern neighbour horizontally
        let (topo, cells) = setup("2\n0\n0 0\n3 4\n1 1 0 0\n0 0 0 0\n0 0 0 0\n");
        let (stable, _) = fresh(&topo, &cells);
        let next = topo.cell_at(1, 0).unwrap();
        // Border on vertical/antidiagonal/diagonal, horizontal via propagation
        assert_eq!(stable[next as usize], FULLY_STABLE);
        let empty = topo.cell_at(2, 0).unwrap();
        assert_eq!(stable[empty as usize] & 0b0100, 0, "empty cell not reached");
    }

    #[test]
    fn test_propagation_ignores_other_colors() {
        let (topo, cells) = setup("2\n0\n0 0\n3 4\n1 2 0 0\n0 0 0 0\n0 0 0 0\n");
        let (stable, _) = fresh(&topo, &cells);
        let next = topo.cell_at(1, 0).unwrap();
        assert_eq!(stable[next as usize], 0b1011);
    }
}
