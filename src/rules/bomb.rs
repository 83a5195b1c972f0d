//! Bomb explosions

use crate::board::{CellId, CellState, Topology};

/// Cells destroyed by a bomb on `target`.
///
/// The blast floods the neighbour graph with a budget of `radius` steps.
/// Every reached cell keeps the largest budget it was reached with and is
/// only expanded again when reached with a strictly larger one, so the
/// result is the set of cells within graph distance `radius`. Destroyed
/// cells neither burn again nor carry the blast further.
pub fn blast(topology: &Topology, cells: &[CellState], target: CellId, radius: u8) -> Vec<CellId> {
    let mut budget: Vec<i16> = vec![-1; cells.len()];
    let mut pending = vec![(target, radius as i16)];

    while let Some((cell, remaining)) = pending.pop() {
        if cells[cell as usize] == CellState::Destroyed || budget[cell as usize] >= remaining {
            continue;
        }
        budget[cell as usize] = remaining;
        if remaining == 0 {
            continue;
        }
        for next in topology.neighbours(cell).iter().flatten() {
            if budget[*next as usize] < remaining - 1 {
                pending.push((*next, remaining - 1));
            }
        }
    }

    (0..cells.len() as CellId)
        .filter(|&c| budget[c as usize] >= 0)
        .collect()
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

    const OPEN_5X5: &str = "2\n0\n1 1\n5 5\n\
        0 0 0 0 0\n0 0 0 0 0\n0 0 0 0 0\n0 0 0 0 0\n0 0 0 0 0\n";

    #[test]
    fn test_radius_zero_hits_target_only() {
        let (topo, cells) = setup(OPEN_5X5);
        let target = topo.cell_at(2, 2).unwrap();
        assert_eq!(blast(&topo, &cells, target, 0), vec![target]);
    }

    #[test]
    fn test_radius_one_is_a_3x3_square() {
        let (topo, cells) = setup(OPEN_5X5);
        let target = topo.cell_at(2, 2).unwrap();
        let hit = blast(&topo, &cells, target, 1);
        assert_eq!(hit.len(), 9);
        for cell in hit {
            let (x, y) = topo.coords(cell);
            assert!((1..=3).contains(&x) && (1..=3).contains(&y));
        }
    }

    #[test]
    fn test_destroyed_cells_block_the_blast() {
        // Column of destroyed cells shields the right half
        let (topo, mut cells) = setup("2\n0\n1 2\n3 5\n0 0 0 0 0\n0 0 0 0 0\n0 0 0 0 0\n");
        for y in 0..3 {
            cells[topo.cell_at(2, y).unwrap() as usize] = CellState::Destroyed;
        }
        let target = topo.cell_at(0, 1).unwrap();
        let hit = blast(&topo, &cells, target, 2);
        assert!(hit.iter().all(|&c| topo.coords(c).0 < 2));
        assert_eq!(hit.len(), 6);
    }

    #[test]
    fn test_blast_follows_transitions() {
        let (topo, cells) = setup("2\n0\n1 1\n1 5\n0 0 0 0 0\n0 0 6 <-> 4 0 2\n");
        let target = topo.cell_at(0, 0).unwrap();
        let hit = blast(&topo, &cells, target, 1);
        assert!(hit.contains(&topo.cell_at(4, 0).unwrap()));
        assert_eq!(hit.len(), 3);
    }
}
