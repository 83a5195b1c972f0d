//! Capture runs
//!
//! From the landing cell a run follows the link graph in one direction,
//! passing over stones of other colors and expansion cells. The run is
//! captured when it closes on a stone of the mover's color after at least
//! one cell. Empty, special and destroyed cells, the landing cell itself and
//! missing links end the walk without capture.

use crate::board::{CellId, CellState, Topology, DIRECTIONS};

/// Length of the run captured in direction `dir`, 0 if the run does not close.
fn run_length(
    topology: &Topology,
    cells: &[CellState],
    start: CellId,
    dir: usize,
    color: u8,
) -> usize {
    let mut length = 0;
    let mut current = topology.neighbour(start, dir);
    let mut heading = topology.continuation(start, dir);

    while let Some(cell) = current {
        if cell == start {
            return 0;
        }
        match cells[cell as usize] {
            CellState::Stone(c) if c == color => return length,
            CellState::Stone(_) | CellState::Expansion => {
                length += 1;
                // A wrap cycle that never meets `start` must not spin forever
                if length > cells.len() {
                    return 0;
                }
                current = topology.neighbour(cell, heading);
                heading = topology.continuation(cell, heading);
            }
            _ => return 0,
        }
    }
    0
}

/// True if placing `color` on `start` captures in at least one direction
pub fn has_capture(topology: &Topology, cells: &[CellState], start: CellId, color: u8) -> bool {
    (0..DIRECTIONS).any(|dir| run_length(topology, cells, start, dir, color) > 0)
}

/// All cells captured by placing `color` on `start`.
///
/// A cell reachable along two runs appears twice, painting is idempotent.
pub fn captured_cells(
    topology: &Topology,
    cells: &[CellState],
    start: CellId,
    color: u8,
) -> Vec<CellId> {
    let mut captured = Vec::new();

    for dir in 0..DIRECTIONS {
        let length = run_length(topology, cells, start, dir, color);
        let mut cell = start;
        let mut heading = dir;
        for _ in 0..length {
            // Links were just walked by run_length
            let Some(next) = topology.neighbour(cell, heading) else {
                break;
            };
            heading = topology.continuation(cell, heading);
            cell = next;
            captured.push(cell);
        }
    }

    captured
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

    #[test]
    fn test_simple_run() {
        let (topo, cells) = setup("2\n0\n0 0\n1 4\n0 2 2 1\n");
        let start = topo.cell_at(0, 0).unwrap();
        let captured = captured_cells(&topo, &cells, start, 1);
        assert_eq!(
            captured,
            vec![topo.cell_at(1, 0).unwrap(), topo.cell_at(2, 0).unwrap()]
        );
        assert!(has_capture(&topo, &cells, start, 1));
        assert!(!has_capture(&topo, &cells, start, 2), "player 2 has no closing stone");
    }

    #[test]
    fn test_run_needs_at_least_one_cell() {
        let (topo, cells) = setup("2\n0\n0 0\n1 2\n0 1\n");
        let start = topo.cell_at(0, 0).unwrap();
        assert!(!has_capture(&topo, &cells, start, 1));
    }

    #[test]
    fn test_run_passes_expansion_cells() {
        let (topo, cells) = setup("2\n0\n0 0\n1 4\n0 x 2 1\n");
        let start = topo.cell_at(0, 0).unwrap();
        assert_eq!(captured_cells(&topo, &cells, start, 1).len(), 2);
    }

    #[test]
    fn test_run_stops_at_special_and_empty() {
        let (topo, cells) = setup("2\n0\n0 0\n1 4\n0 2 b 1\n");
        let start = topo.cell_at(0, 0).unwrap();
        assert!(!has_capture(&topo, &cells, start, 1));

        let (topo, cells) = setup("2\n0\n0 0\n1 4\n0 2 0 1\n");
        assert!(!has_capture(&topo, &cells, start, 1));
    }

    #[test]
    fn test_run_follows_transition() {
        // Leaving (0,0) westwards re-enters the row from the east end
        let (topo, cells) = setup("2\n0\n0 0\n1 4\n0 1 2 2\n0 0 6 <-> 3 0 2\n");
        let start = topo.cell_at(0, 0).unwrap();
        // East: 1 immediately, no run. West: wraps to (3,0)=2, (2,0)=2, (1,0)=1
        let captured = captured_cells(&topo, &cells, start, 1);
        assert_eq!(
            captured,
            vec![topo.cell_at(3, 0).unwrap(), topo.cell_at(2, 0).unwrap()]
        );
    }

    #[test]
    fn test_wrap_cycle_back_to_start_is_no_capture() {
        // Full ring of opponent stones returns to the landing cell
        let (topo, cells) = setup("2\n0\n0 0\n1 3\n0 2 2\n2 0 2 <-> 0 0 6\n");
        let start = topo.cell_at(0, 0).unwrap();
        assert!(!has_capture(&topo, &cells, start, 1));
    }
}
