//! Immutable board geometry
//!
//! Built once from a [`MapDescription`] and shared by every [`Board`](super::Board)
//! clone. Holds the neighbour graph (grid links plus explicit transitions),
//! the colinear lines of the 4 families with transitions merged in, and the
//! per-cell constants derived from them.

use super::parser::{Endpoint, MapDescription, MapError};
use super::{opposite, CellId, DIRECTIONS, DIRECTION_OFFSETS, LINE_FAMILIES};
use crate::eval::EvalWeight;

/// Scale of the adaptive resource weights
const WEIGHT_SCALE: i64 = 200;
/// Ceiling of a resource weight: one resource never outweighs a rank
pub const MAX_RESOURCE_WEIGHT: i64 = EvalWeight::BETTER_PLAYER;

/// Resource weights derived from the geometry, frozen for the whole game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Weights {
    /// Value of one override stone, grows with the average influence
    pub override_stone: i64,
    /// Value of one bomb, grows with (average degree)^radius
    pub bomb: i64,
}

impl Weights {
    fn derive(total_influence: i64, total_links: usize, cells: usize, radius: u8) -> Self {
        if cells == 0 {
            return Self::default();
        }
        let average_degree = total_links as f64 / cells as f64;
        Self {
            override_stone: (total_influence / cells as i64)
                .saturating_mul(WEIGHT_SCALE)
                .min(MAX_RESOURCE_WEIGHT),
            bomb: (average_degree.powi(i32::from(radius)) * WEIGHT_SCALE as f64)
                .min(MAX_RESOURCE_WEIGHT as f64) as i64,
        }
    }
}

/// Shared, read-only board geometry
#[derive(Debug)]
pub struct Topology {
    width: usize,
    height: usize,
    players: u8,
    override_stones: u16,
    bombs: u16,
    radius: u8,
    /// `(x, y)` of every cell
    coords: Vec<(u8, u8)>,
    /// Row-major grid → cell id
    index: Vec<Option<CellId>>,
    neighbours: Vec<[Option<CellId>; DIRECTIONS]>,
    /// Direction to keep walking in after following a link
    continuation: Vec<[u8; DIRECTIONS]>,
    /// Line id per family
    lines: Vec<[u16; LINE_FAMILIES]>,
    line_cells: Vec<Vec<CellId>>,
    influence: Vec<i64>,
    base_stability: Vec<[u8; DIRECTIONS]>,
    weights: Weights,
}

impl Topology {
    /// Build the geometry of a parsed description
    pub fn build(desc: &MapDescription) -> Result<Self, MapError> {
        let (width, height) = (desc.width, desc.height);

        let mut index = vec![None; width * height];
        let mut coords = Vec::new();
        for y in 0..height {
            for x in 0..width {
                if desc.grid[y * width + x].is_some() {
                    index[y * width + x] = Some(coords.len() as CellId);
                    coords.push((x as u8, y as u8));
                }
            }
        }
        let cells = coords.len();

        let lookup = |x: i32, y: i32| -> Option<CellId> {
            if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
                return None;
            }
            index[y as usize * width + x as usize]
        };

        let mut neighbours = vec![[None; DIRECTIONS]; cells];
        let mut continuation = vec![[0u8; DIRECTIONS]; cells];
        for (cell, &(x, y)) in coords.iter().enumerate() {
            for (dir, &(dx, dy)) in DIRECTION_OFFSETS.iter().enumerate() {
                neighbours[cell][dir] = lookup(x as i32 + dx, y as i32 + dy);
                continuation[cell][dir] = dir as u8;
            }
        }

        // Segments along grid links, one union-find node per (cell, family)
        let mut segments = UnionFind::new(cells * LINE_FAMILIES);
        for cell in 0..cells {
            for family in 0..LINE_FAMILIES {
                if let Some(next) = neighbours[cell][family] {
                    segments.union(
                        cell * LINE_FAMILIES + family,
                        next as usize * LINE_FAMILIES + family,
                    );
                }
            }
        }

        let endpoint_cell = |end: &Endpoint| -> Result<CellId, MapError> {
            lookup(end.x as i32, end.y as i32)
                .ok_or(MapError::TransitionEndpoint { x: end.x, y: end.y })
        };
        for transition in &desc.transitions {
            let a = endpoint_cell(&transition.from)?;
            let b = endpoint_cell(&transition.to)?;
            let (da, db) = (
                transition.from.dir as usize,
                transition.to.dir as usize,
            );
            neighbours[a as usize][da] = Some(b);
            continuation[a as usize][da] = opposite(db) as u8;
            neighbours[b as usize][db] = Some(a);
            continuation[b as usize][db] = opposite(da) as u8;
            segments.union(
                a as usize * LINE_FAMILIES + da % LINE_FAMILIES,
                b as usize * LINE_FAMILIES + db % LINE_FAMILIES,
            );
        }

        // Dense line ids in order of first appearance
        let mut line_id = vec![u16::MAX; cells * LINE_FAMILIES];
        let mut lines = vec![[0u16; LINE_FAMILIES]; cells];
        let mut line_cells: Vec<Vec<CellId>> = Vec::new();
        for cell in 0..cells {
            for family in 0..LINE_FAMILIES {
                let root = segments.find(cell * LINE_FAMILIES + family);
                if line_id[root] == u16::MAX {
                    line_id[root] = line_cells.len() as u16;
                    line_cells.push(Vec::new());
                }
                let id = line_id[root];
                lines[cell][family] = id;
                let members = &mut line_cells[id as usize];
                // Cells are visited in order, so a duplicate can only be the last entry
                if members.last() != Some(&(cell as CellId)) {
                    members.push(cell as CellId);
                }
            }
        }

        let influence: Vec<i64> = lines
            .iter()
            .map(|ids| ids.iter().map(|&l| line_cells[l as usize].len() as i64).sum::<i64>() - 3)
            .collect();

        // Number of families along which a cell touches the border
        let edge_families: Vec<u8> = neighbours
            .iter()
            .map(|nb| {
                (0..LINE_FAMILIES)
                    .filter(|&f| nb[f].is_none() || nb[opposite(f)].is_none())
                    .count() as u8
            })
            .collect();
        let base_stability = neighbours
            .iter()
            .map(|nb| {
                let mut base = [0u8; DIRECTIONS];
                for (dir, slot) in base.iter_mut().enumerate() {
                    if let Some(n) = nb[dir] {
                        *slot = edge_families[n as usize];
                    }
                }
                base
            })
            .collect();

        let total_links = neighbours.iter().flatten().filter(|n| n.is_some()).count();
        let weights = Weights::derive(influence.iter().sum(), total_links, cells, desc.radius);

        log::debug!(
            "topology built: {} cells, {} lines, {} transitions, weights {:?}",
            cells,
            line_cells.len(),
            desc.transitions.len(),
            weights
        );

        Ok(Self {
            width,
            height,
            players: desc.players,
            override_stones: desc.override_stones,
            bombs: desc.bombs,
            radius: desc.radius,
            coords,
            index,
            neighbours,
            continuation,
            lines,
            line_cells,
            influence,
            base_stability,
            weights,
        })
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_cells.len()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn players(&self) -> u8 {
        self.players
    }

    #[inline]
    pub fn explosion_radius(&self) -> u8 {
        self.radius
    }

    #[inline]
    pub fn initial_override_stones(&self) -> u16 {
        self.override_stones
    }

    #[inline]
    pub fn initial_bombs(&self) -> u16 {
        self.bombs
    }

    #[inline]
    pub fn weights(&self) -> Weights {
        self.weights
    }

    /// True if `cell` is a valid cell id
    #[inline]
    pub fn contains(&self, cell: CellId) -> bool {
        (cell as usize) < self.coords.len()
    }

    /// Cell at grid coordinates, `None` for void or out of bounds
    pub fn cell_at(&self, x: usize, y: usize) -> Option<CellId> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.index[y * self.width + x]
    }

    /// Grid coordinates `(x, y)` of a cell
    #[inline]
    pub fn coords(&self, cell: CellId) -> (usize, usize) {
        let (x, y) = self.coords[cell as usize];
        (x as usize, y as usize)
    }

    #[inline]
    pub fn neighbour(&self, cell: CellId, dir: usize) -> Option<CellId> {
        self.neighbours[cell as usize][dir]
    }

    /// All 8 neighbour links of a cell
    #[inline]
    pub fn neighbours(&self, cell: CellId) -> &[Option<CellId>; DIRECTIONS] {
        &self.neighbours[cell as usize]
    }

    /// Direction to continue in after crossing the link `dir` of `cell`
    #[inline]
    pub fn continuation(&self, cell: CellId, dir: usize) -> usize {
        self.continuation[cell as usize][dir] as usize
    }

    #[inline]
    pub fn line_of(&self, cell: CellId, family: usize) -> usize {
        self.lines[cell as usize][family] as usize
    }

    #[inline]
    pub fn cells_on_line(&self, line: usize) -> &[CellId] {
        &self.line_cells[line]
    }

    /// Sum of the cell's 4 line sizes minus 3
    #[inline]
    pub fn influence(&self, cell: CellId) -> i64 {
        self.influence[cell as usize]
    }

    /// Border strength of the neighbour in direction `dir`
    #[inline]
    pub fn base_stability(&self, cell: CellId, dir: usize) -> u8 {
        self.base_stability[cell as usize][dir]
    }

    /// True if the cell has no neighbour on at least one side of `family`
    #[inline]
    pub fn is_edge(&self, cell: CellId, family: usize) -> bool {
        let nb = &self.neighbours[cell as usize];
        nb[family].is_none() || nb[opposite(family)].is_none()
    }
}

// =============================================================================
// Union-find over (cell, family) nodes
// =============================================================================

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut node: usize) -> usize {
        while self.parent[node] != node {
            self.parent[node] = self.parent[self.parent[node]];
            node = self.parent[node];
        }
        node
    }

    /// Merge two sets, the smaller root wins
    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra < rb {
            self.parent[rb] = ra;
        } else if rb < ra {
            self.parent[ra] = rb;
        }
    }
}
