//! Player → color permutation
//!
//! Cells store colors. Choice cells swap two entries and inversion cells
//! rotate the whole map, so ownership changes without repainting the board.

use super::MAX_PLAYERS;

/// Bijection between players and colors on `1..=players`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityMap {
    players: u8,
    /// `color[p]` is the color currently played by `p` (index 0 unused)
    color: [u8; MAX_PLAYERS + 1],
    /// `owner[c]` is the player currently owning color `c`
    owner: [u8; MAX_PLAYERS + 1],
}

impl IdentityMap {
    /// Identity permutation for `players` players
    pub fn new(players: u8) -> Self {
        debug_assert!(players as usize <= MAX_PLAYERS);
        let mut color = [0; MAX_PLAYERS + 1];
        for (p, slot) in color.iter_mut().enumerate().take(players as usize + 1) {
            *slot = p as u8;
        }
        Self {
            players,
            color,
            owner: color,
        }
    }

    #[inline]
    pub fn players(&self) -> u8 {
        self.players
    }

    /// Color currently played by `player`
    #[inline]
    pub fn color_of(&self, player: u8) -> u8 {
        self.color[player as usize]
    }

    /// Player currently owning `color`
    #[inline]
    pub fn owner_of(&self, color: u8) -> u8 {
        self.owner[color as usize]
    }

    /// Exchange the colors of two players
    pub fn swap(&mut self, a: u8, b: u8) {
        self.color.swap(a as usize, b as usize);
        self.owner[self.color[a as usize] as usize] = a;
        self.owner[self.color[b as usize] as usize] = b;
    }

    /// Player `i` takes the color of player `i - 1`, player 1 that of the last player
    pub fn rotate(&mut self) {
        let n = self.players as usize;
        if n < 2 {
            return;
        }
        self.color[1..=n].rotate_right(1);
        for p in 1..=n {
            self.owner[self.color[p] as usize] = p as u8;
        }
    }

    /// True if every color has exactly one owner
    pub fn is_permutation(&self) -> bool {
        let n = self.players as usize;
        let mut seen = [false; MAX_PLAYERS + 1];
        for p in 1..=n {
            let c = self.color[p] as usize;
            if c == 0 || c > n || seen[c] || self.owner[c] as usize != p {
                return false;
            }
            seen[c] = true;
        }
        true
    }
}
