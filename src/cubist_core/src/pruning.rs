use crate::{
    coord::{
        MoveTables, N_CORNERS, N_FLIP, N_SLICE, N_SLICE_PERM, N_SLICE_SORTED, N_TWIST, N_UD_EDGES,
    },
    moves::Move,
    start, success, working,
};
use log::{debug, info, trace, warn};
use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Instant,
};
use thiserror::Error;

const UNVISITED: u8 = u8::MAX;

static SHARED: Mutex<Option<Arc<PruningTables>>> = Mutex::new(None);

#[derive(Error, Debug)]
pub enum TableBuildError {
    #[error("Could not allocate {bytes} bytes for the {table} table")]
    Allocation { table: &'static str, bytes: usize },
}

/// Allocates a table up front so a failed allocation is reported instead of
/// aborting the process.
pub(crate) fn allocate<T: Clone>(
    table: &'static str,
    len: usize,
    value: T,
) -> Result<Vec<T>, TableBuildError> {
    let mut entries = Vec::new();
    entries
        .try_reserve_exact(len)
        .map_err(|_| TableBuildError::Allocation {
            table,
            bytes: len.saturating_mul(size_of::<T>()),
        })?;
    entries.resize(len, value);
    Ok(entries)
}

/// Exact distances of coordinate projections, each an admissible lower bound
/// on the distance of any full state projecting onto it. Immutable once
/// built; share it with [`Arc`].
#[derive(Debug)]
pub struct PruningTables {
    moves: MoveTables,
    /// `slice * N_TWIST + twist`, all moves.
    twist_slice: Box<[u8]>,
    /// `slice * N_FLIP + flip`, all moves.
    flip_slice: Box<[u8]>,
    /// `corners * N_SLICE_PERM + slice_perm`, G1 moves.
    corners_slice_perm: Box<[u8]>,
    /// `ud_edges * N_SLICE_PERM + slice_perm`, G1 moves.
    ud_edges_slice_perm: Box<[u8]>,
    /// Corner permutation alone, all moves.
    corners: Box<[u8]>,
    /// Slice edge positions and order, all moves.
    slice_sorted: Box<[u8]>,
}

impl PruningTables {
    /// Builds every move and pruning table by breadth-first search from the
    /// solved cube.
    ///
    /// # Errors
    ///
    /// Fails if a table cannot be allocated.
    pub fn build() -> Result<PruningTables, TableBuildError> {
        info!(start!("Building pruning tables"));
        let start = Instant::now();

        let moves = MoveTables::build()?;
        let g1_moves: Vec<Move> = Move::ALL.into_iter().filter(|move_| move_.is_g1()).collect();
        debug!(
            working!("Built move tables in {:.3}s"),
            start.elapsed().as_secs_f64()
        );

        let slice_after = |slice: usize, move_: Move| {
            moves.slice_sorted((slice * N_SLICE_PERM) as u16, move_) as usize / N_SLICE_PERM
        };
        let twist_slice = breadth_first(
            "twist-slice",
            N_SLICE * N_TWIST,
            &Move::ALL,
            |index, move_| {
                let (slice, twist) = (index / N_TWIST, index % N_TWIST);
                slice_after(slice, move_) * N_TWIST + moves.twist(twist as u16, move_) as usize
            },
        )?;
        let flip_slice = breadth_first(
            "flip-slice",
            N_SLICE * N_FLIP,
            &Move::ALL,
            |index, move_| {
                let (slice, flip) = (index / N_FLIP, index % N_FLIP);
                slice_after(slice, move_) * N_FLIP + moves.flip(flip as u16, move_) as usize
            },
        )?;
        let corners_slice_perm = breadth_first(
            "corner-slice permutation",
            N_CORNERS * N_SLICE_PERM,
            &g1_moves,
            |index, move_| {
                let (corners, slice_perm) = (index / N_SLICE_PERM, index % N_SLICE_PERM);
                moves.corners(corners as u16, move_) as usize * N_SLICE_PERM
                    + moves.slice_sorted(slice_perm as u16, move_) as usize
            },
        )?;
        let ud_edges_slice_perm = breadth_first(
            "edge-slice permutation",
            N_UD_EDGES * N_SLICE_PERM,
            &g1_moves,
            |index, move_| {
                let (ud_edges, slice_perm) = (index / N_SLICE_PERM, index % N_SLICE_PERM);
                moves.ud_edges(ud_edges as u16, move_) as usize * N_SLICE_PERM
                    + moves.slice_sorted(slice_perm as u16, move_) as usize
            },
        )?;
        let corners = breadth_first("corner permutation", N_CORNERS, &Move::ALL, |index, move_| {
            moves.corners(index as u16, move_) as usize
        })?;
        let slice_sorted = breadth_first("slice", N_SLICE_SORTED, &Move::ALL, |index, move_| {
            moves.slice_sorted(index as u16, move_) as usize
        })?;

        info!(
            success!("Pruning tables built in {:.3}s"),
            start.elapsed().as_secs_f64()
        );
        Ok(PruningTables {
            moves,
            twist_slice,
            flip_slice,
            corners_slice_perm,
            ud_edges_slice_perm,
            corners,
            slice_sorted,
        })
    }

    /// The process-wide tables. The first caller builds them while any
    /// concurrent callers wait; everyone receives the same instance.
    ///
    /// # Errors
    ///
    /// Fails if the tables have not been built yet and building fails. A
    /// later call will try again.
    pub fn shared() -> Result<Arc<PruningTables>, TableBuildError> {
        let mut shared = SHARED.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(tables) = shared.as_ref() {
            return Ok(Arc::clone(tables));
        }
        let tables = Arc::new(PruningTables::build()?);
        *shared = Some(Arc::clone(&tables));
        Ok(tables)
    }

    #[must_use]
    pub fn moves(&self) -> &MoveTables {
        &self.moves
    }

    /// Lower bound on the moves needed to reach G1. Zero exactly in G1.
    #[must_use]
    pub fn phase1_heuristic(&self, twist: u16, flip: u16, slice_sorted: u16) -> u8 {
        let slice = slice_sorted as usize / N_SLICE_PERM;
        self.twist_slice[slice * N_TWIST + twist as usize]
            .max(self.flip_slice[slice * N_FLIP + flip as usize])
    }

    /// Lower bound on the G1 moves needed to solve a state inside G1.
    #[must_use]
    pub fn phase2_heuristic(&self, corners: u16, ud_edges: u16, slice_perm: u16) -> u8 {
        let slice_perm = slice_perm as usize;
        self.corners_slice_perm[corners as usize * N_SLICE_PERM + slice_perm]
            .max(self.ud_edges_slice_perm[ud_edges as usize * N_SLICE_PERM + slice_perm])
    }

    /// Lower bound on the moves needed to solve any state, under all 18
    /// moves.
    #[must_use]
    pub fn full_heuristic(&self, twist: u16, flip: u16, slice_sorted: u16, corners: u16) -> u8 {
        self.phase1_heuristic(twist, flip, slice_sorted)
            .max(self.corners[corners as usize])
            .max(self.slice_sorted[slice_sorted as usize])
    }
}

fn breadth_first(
    name: &'static str,
    size: usize,
    moves: &[Move],
    neighbor: impl Fn(usize, Move) -> usize,
) -> Result<Box<[u8]>, TableBuildError> {
    let start = Instant::now();
    let mut table = allocate(name, size, UNVISITED)?;
    table[0] = 0;

    let mut frontier: Vec<u32> = vec![0];
    let mut depth = 0;
    let mut visited = 1;
    while !frontier.is_empty() {
        let mut next = vec![];
        for &index in &frontier {
            for &move_ in moves {
                let next_index = neighbor(index as usize, move_);
                if table[next_index] == UNVISITED {
                    table[next_index] = depth + 1;
                    next.push(next_index as u32);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        depth += 1;
        visited += next.len();
        trace!("{name}: {} entries at depth {depth}", next.len());
        frontier = next;
    }

    if visited != size {
        warn!("The {name} table reached only {visited} of {size} entries");
    }
    debug!(
        working!("Built the {} table ({} entries, max depth {}) in {:.3}s"),
        name,
        size,
        depth,
        start.elapsed().as_secs_f64()
    );
    Ok(table.into_boxed_slice())
}
