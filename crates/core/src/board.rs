//! Board module - sole owner of tile occupancy and coordinates
//!
//! The board is a runtime-sized grid where each slot is empty or holds
//! exactly one tile. Uses a flat array for better cache locality.
//! Coordinates: (h, v) where h ranges over columns (left to right) and v
//! over rows (bottom to top). Gravity compacts columns toward v = 0 and
//! refilled tiles enter from the top edge.

use cascade_types::{EngineError, Pos, TileKind};

use crate::rng::SimpleRng;

/// One grid slot's contents
///
/// `moving` is set while the tile is mid-animation (falling or refilling);
/// moving tiles are excluded from match scans and cannot be swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    kind: TileKind,
    moving: bool,
}

impl Tile {
    pub fn new(kind: TileKind) -> Self {
        Self {
            kind,
            moving: false,
        }
    }

    pub fn kind(&self) -> TileKind {
        self.kind
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }
}

/// A gravity relocation, reported to the presentation for animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileMove {
    pub from: Pos,
    pub to: Pos,
    pub kind: TileKind,
}

/// The game board - flat row-major storage (v * width + h)
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    width: u8,
    height: u8,
    kind_count: u8,
    cells: Vec<Option<Tile>>,
}

impl Board {
    /// Create an empty board
    pub fn new(width: u8, height: u8, kind_count: u8) -> Self {
        Self {
            width,
            height,
            kind_count,
            cells: vec![None; width as usize * height as usize],
        }
    }

    /// Generate a fully populated board with random normal kinds
    ///
    /// The generated board may contain ready-made matches; the first chain
    /// run resolves them, same as any cascade.
    pub fn generate(width: u8, height: u8, kind_count: u8, rng: &mut SimpleRng) -> Self {
        let mut board = Self::new(width, height, kind_count);
        for idx in 0..board.cells.len() {
            board.cells[idx] = Some(Tile::new(rng.next_kind(kind_count)));
        }
        board
    }

    /// Build a board from caller-supplied rows
    ///
    /// `rows[v][h]` is the kind at column h of row v (row 0 at the bottom).
    /// Every row must have the same length.
    pub fn from_rows(rows: &[Vec<TileKind>], kind_count: u8) -> Result<Self, EngineError> {
        let height = rows.len() as u8;
        let width = rows.first().map(|r| r.len()).unwrap_or(0) as u8;
        if height == 0 || width == 0 || rows.iter().any(|r| r.len() != width as usize) {
            return Err(EngineError::BoardCorruption);
        }
        let mut board = Self::new(width, height, kind_count);
        for (v, row) in rows.iter().enumerate() {
            for (h, kind) in row.iter().enumerate() {
                let idx = v * width as usize + h;
                board.cells[idx] = Some(Tile::new(*kind));
            }
        }
        Ok(board)
    }

    /// Calculate flat index from coordinates
    #[inline(always)]
    fn index(&self, h: i8, v: i8) -> Option<usize> {
        if h < 0 || h >= self.width as i8 || v < 0 || v >= self.height as i8 {
            return None;
        }
        Some((v as usize) * (self.width as usize) + (h as usize))
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn kind_count(&self) -> u8 {
        self.kind_count
    }

    /// Get the tile at (h, v); out-of-range and empty slots both yield None
    pub fn get(&self, h: i8, v: i8) -> Option<&Tile> {
        self.index(h, v).and_then(|idx| self.cells[idx].as_ref())
    }

    /// Kind at a position, if a tile is present
    pub fn kind_at(&self, pos: Pos) -> Option<TileKind> {
        self.get(pos.h, pos.v).map(|t| t.kind())
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        self.index(pos.h, pos.v).is_some()
    }

    /// Exchange two slots' contents
    ///
    /// Fails with `InvalidSwap` when either slot is empty or either tile is
    /// mid-animation. Adjacency is the caller's concern.
    pub fn swap(&mut self, a: Pos, b: Pos) -> Result<(), EngineError> {
        let ia = self.index(a.h, a.v).ok_or(EngineError::InvalidSwap)?;
        let ib = self.index(b.h, b.v).ok_or(EngineError::InvalidSwap)?;
        match (&self.cells[ia], &self.cells[ib]) {
            (Some(ta), Some(tb)) if !ta.is_moving() && !tb.is_moving() => {
                self.cells.swap(ia, ib);
                Ok(())
            }
            _ => Err(EngineError::InvalidSwap),
        }
    }

    /// Vacate a slot; gravity/refill follow-up is the caller's concern
    pub fn remove(&mut self, pos: Pos) -> Option<Tile> {
        let idx = self.index(pos.h, pos.v)?;
        self.cells[idx].take()
    }

    /// Promote/demote a tile's kind in place; false when the slot is empty
    pub fn set_kind(&mut self, pos: Pos, kind: TileKind) -> bool {
        match self.index(pos.h, pos.v) {
            Some(idx) => match &mut self.cells[idx] {
                Some(tile) => {
                    tile.kind = kind;
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// Mark or clear a tile's mid-animation flag
    pub fn set_moving(&mut self, pos: Pos, moving: bool) -> bool {
        match self.index(pos.h, pos.v) {
            Some(idx) => match &mut self.cells[idx] {
                Some(tile) => {
                    tile.moving = moving;
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// Clear the moving flag on every tile (animations settled)
    pub fn clear_moving(&mut self) {
        for cell in &mut self.cells {
            if let Some(tile) = cell {
                tile.moving = false;
            }
        }
    }

    /// Compact every column downward, closing gaps left by removals
    ///
    /// Moved tiles are flagged moving until the settle barrier completes.
    pub fn apply_gravity(&mut self) -> Vec<TileMove> {
        let width = self.width as usize;
        let mut moves = Vec::new();
        for h in 0..self.width as i8 {
            let mut write_v: i8 = 0;
            for v in 0..self.height as i8 {
                let idx = v as usize * width + h as usize;
                if let Some(mut tile) = self.cells[idx] {
                    if write_v != v {
                        tile.moving = true;
                        let widx = write_v as usize * width + h as usize;
                        self.cells[widx] = Some(tile);
                        self.cells[idx] = None;
                        moves.push(TileMove {
                            from: Pos::new(h, v),
                            to: Pos::new(h, write_v),
                            kind: tile.kind,
                        });
                    }
                    write_v += 1;
                }
            }
        }
        moves
    }

    /// Fill every empty slot with a fresh random normal tile
    ///
    /// New tiles are flagged moving until the settle barrier completes.
    pub fn refill(&mut self, rng: &mut SimpleRng) -> Vec<Pos> {
        let width = self.width as usize;
        let mut filled = Vec::new();
        for h in 0..self.width as i8 {
            for v in 0..self.height as i8 {
                let idx = v as usize * width + h as usize;
                if self.cells[idx].is_none() {
                    let mut tile = Tile::new(rng.next_kind(self.kind_count));
                    tile.moving = true;
                    self.cells[idx] = Some(tile);
                    filled.push(Pos::new(h, v));
                }
            }
        }
        filled
    }

    /// All occupied positions, bottom-to-top within each column
    pub fn occupied_positions(&self) -> Vec<Pos> {
        let mut out = Vec::new();
        for v in 0..self.height as i8 {
            for h in 0..self.width as i8 {
                if self.get(h, v).is_some() {
                    out.push(Pos::new(h, v));
                }
            }
        }
        out
    }

    /// Positions holding a tile of exactly the given kind
    pub fn positions_of_kind(&self, kind: TileKind) -> Vec<Pos> {
        let mut out = Vec::new();
        for v in 0..self.height as i8 {
            for h in 0..self.width as i8 {
                if self.get(h, v).map(|t| t.kind()) == Some(kind) {
                    out.push(Pos::new(h, v));
                }
            }
        }
        out
    }

    /// Distinct normal kinds currently present on the board
    pub fn present_normal_kinds(&self) -> Vec<u8> {
        let mut seen = [false; cascade_types::MAX_KIND_COUNT as usize];
        for cell in self.cells.iter().flatten() {
            if let TileKind::Normal(id) = cell.kind() {
                if (id as usize) < seen.len() {
                    seen[id as usize] = true;
                }
            }
        }
        seen.iter()
            .enumerate()
            .filter_map(|(id, present)| present.then_some(id as u8))
            .collect()
    }

    /// Number of occupied slots
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Iterate over occupied slots as (pos, tile)
    pub fn tiles(&self) -> impl Iterator<Item = (Pos, &Tile)> {
        self.cells.iter().enumerate().filter_map(move |(idx, cell)| {
            cell.as_ref().map(|tile| {
                let h = (idx % self.width as usize) as i8;
                let v = (idx / self.width as usize) as i8;
                (Pos::new(h, v), tile)
            })
        })
    }
}
