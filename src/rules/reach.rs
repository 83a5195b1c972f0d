//! Reachability estimates
//!
//! - Which choice and inversion cells can plausibly still be captured
//! - Which players share a region of the board with a given player

use std::collections::VecDeque;

use crate::board::{CellId, CellState, IdentityMap, Topology, LINE_FAMILIES, MAX_PLAYERS};

/// Number of reachable `(choice, inversion)` cells.
///
/// A special cell counts when one of its lines is longer than 3 cells and
/// its connected region holds a contested stone: a stone bordered by at
/// least two stones of other colors or expansion cells.
pub fn reachable_specials(topology: &Topology, cells: &[CellState]) -> (u16, u16) {
    let region = regions(topology, cells);
    let region_count = region.iter().copied().max().map_or(0, |r| r + 1);

    let mut contested = vec![false; region_count];
    for cell in 0..cells.len() as CellId {
        let CellState::Stone(color) = cells[cell as usize] else {
            continue;
        };
        let rivals = topology
            .neighbours(cell)
            .iter()
            .flatten()
            .filter(|&&n| match cells[n as usize] {
                CellState::Stone(other) => other != color,
                CellState::Expansion => true,
                _ => false,
            })
            .count();
        if rivals > 1 {
            contested[region[cell as usize]] = true;
        }
    }

    let mut choice = 0;
    let mut inversion = 0;
    for cell in 0..cells.len() as CellId {
        let state = cells[cell as usize];
        if !matches!(state, CellState::Choice | CellState::Inversion) {
            continue;
        }
        let long_line = (0..LINE_FAMILIES)
            .any(|f| topology.cells_on_line(topology.line_of(cell, f)).len() > 3);
        if long_line && contested[region[cell as usize]] {
            if state == CellState::Choice {
                choice += 1;
            } else {
                inversion += 1;
            }
        }
    }
    (choice, inversion)
}

/// Connected component label of every cell, destroyed cells included
fn regions(topology: &Topology, cells: &[CellState]) -> Vec<usize> {
    let mut label = vec![usize::MAX; cells.len()];
    let mut next = 0;
    let mut queue = VecDeque::new();

    for seed in 0..cells.len() as CellId {
        if label[seed as usize] != usize::MAX {
            continue;
        }
        label[seed as usize] = next;
        queue.push_back(seed);
        while let Some(cell) = queue.pop_front() {
            for &n in topology.neighbours(cell).iter().flatten() {
                if label[n as usize] == usize::MAX {
                    label[n as usize] = next;
                    queue.push_back(n);
                }
            }
        }
        next += 1;
    }
    label
}

/// Players whose stones lie in the region grown from `player`'s stones.
///
/// The region spreads freely from stones, bonus and expansion cells, but
/// from an empty, choice or inversion cell only into stones and expansion
/// cells. Order: `player` first, then higher ids, then lower ids, skipping
/// disqualified players.
pub fn neighbouring_players(
    topology: &Topology,
    cells: &[CellState],
    identity: &IdentityMap,
    disqualified: &[bool],
    player: u8,
) -> Vec<u8> {
    let n = identity.players();
    let own = identity.color_of(player);
    let mut in_region = vec![false; cells.len()];
    let mut queue: VecDeque<CellId> = (0..cells.len() as CellId)
        .filter(|&c| cells[c as usize] == CellState::Stone(own))
        .collect();
    for &c in &queue {
        in_region[c as usize] = true;
    }

    let mut present = [false; MAX_PLAYERS + 1];
    while let Some(cell) = queue.pop_front() {
        let state = cells[cell as usize];
        if let CellState::Stone(color) = state {
            present[identity.owner_of(color) as usize] = true;
        }
        let open = !matches!(
            state,
            CellState::Empty | CellState::Choice | CellState::Inversion
        );
        for &next in topology.neighbours(cell).iter().flatten() {
            if in_region[next as usize] {
                continue;
            }
            let target = cells[next as usize];
            if target == CellState::Destroyed {
                continue;
            }
            if open || matches!(target, CellState::Stone(_) | CellState::Expansion) {
                in_region[next as usize] = true;
                queue.push_back(next);
            }
        }
    }

    let mut order = vec![player];
    order.extend(
        (player + 1..=n)
            .chain(1..player)
            .filter(|&p| present[p as usize] && !disqualified[p as usize]),
    );
    order
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
    fn test_special_reachable_in_contested_region() {
        // Stone 1 at (1,0) borders two stones of player 2
        let (topo, cells) = setup("2\n0\n0 0\n2 5\n2 1 2 0 c\n0 0 0 0 i\n");
        assert_eq!(reachable_specials(&topo, &cells), (1, 1));
    }

    #[test]
    fn test_special_unreachable_without_contest() {
        let (topo, cells) = setup("2\n0\n0 0\n2 5\n1 0 0 0 c\n0 0 0 0 2\n");
        assert_eq!(reachable_specials(&topo, &cells), (0, 0));
    }

    #[test]
    fn test_special_unreachable_on_separate_island() {
        let (topo, cells) = setup("2\n0\n0 0\n1 9\n2 1 2 0 - c 0 0 0\n");
        assert_eq!(reachable_specials(&topo, &cells), (0, 0));
    }

    #[test]
    fn test_neighbouring_players_order_and_islands() {
        // Players 1, 3 and 4 touch player 3; player 2 sits on an island
        let (topo, cells) = setup("4\n0\n0 0\n1 8\n1 3 4 0 - - 2 0\n");
        let identity = IdentityMap::new(4);
        let disqualified = [false; 9];
        let order = neighbouring_players(&topo, &cells, &identity, &disqualified, 3);
        assert_eq!(order, vec![3, 4, 1]);
    }

    #[test]
    fn test_neighbouring_players_skip_disqualified() {
        let (topo, cells) = setup("3\n0\n0 0\n1 3\n1 2 3\n");
        let identity = IdentityMap::new(3);
        let mut disqualified = [false; 9];
        disqualified[2] = true;
        let order = neighbouring_players(&topo, &cells, &identity, &disqualified, 1);
        assert_eq!(order, vec![1, 3]);
    }

    #[test]
    fn test_empty_cells_only_lead_into_stones() {
        // From the empty cell the region may enter player 2's stone but not the next empty
        let (topo, cells) = setup("3\n0\n0 0\n1 5\n1 0 2 0 3\n");
        let identity = IdentityMap::new(3);
        let order = neighbouring_players(&topo, &cells, &identity, &[false; 9], 1);
        assert_eq!(order, vec![1, 2, 3]);

        let (topo, cells) = setup("3\n0\n0 0\n1 5\n1 0 0 0 3\n");
        let order = neighbouring_players(&topo, &cells, &identity, &[false; 9], 1);
        assert_eq!(order, vec![1]);
    }
}
