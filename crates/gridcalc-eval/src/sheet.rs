//! The sheet: cell storage, dependency graph maintenance, printing.

use core::fmt;
use std::collections::VecDeque;

use gridcalc_common::{Position, SheetError, Size};
use rustc_hash::FxHashSet;

use crate::cell::{Cell, CellData};

/// Row-major grid of lazily materialized cells.
///
/// Storage grows monotonically: setting a cell extends the row list and
/// widens only the touched row, so rows may have different widths and a
/// read past a row's end is simply absent. Cleared slots revert to
/// `None` without shrinking anything.
#[derive(Debug, Default)]
pub struct Sheet {
    rows: Vec<Vec<Option<Cell>>>,
}

impl Sheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw text of a cell, running the full edit protocol.
    ///
    /// On failure (invalid position, formula syntax, cycle) nothing
    /// observable changes: the cell keeps its content, its edges, and
    /// any memoized result.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<(), SheetError> {
        if !pos.is_valid() {
            return Err(SheetError::InvalidPosition);
        }
        self.grow_to_include(pos);
        self.materialize_empty(pos);
        self.apply_edit(pos, text)
    }

    /// Look up a cell without growing storage.
    pub fn cell(&self, pos: Position) -> Result<Option<&Cell>, SheetError> {
        if !pos.is_valid() {
            return Err(SheetError::InvalidPosition);
        }
        Ok(self.cell_at(pos))
    }

    /// Clear a cell.
    ///
    /// A cell still referenced by others is kept as an empty placeholder
    /// so the back-edges from its dependents stay attached; an
    /// unreferenced cell is dropped outright.
    pub fn clear_cell(&mut self, pos: Position) -> Result<(), SheetError> {
        if !pos.is_valid() {
            return Err(SheetError::InvalidPosition);
        }
        let referenced = match self.cell_at(pos) {
            None => return Ok(()),
            Some(cell) => cell.is_referenced(),
        };
        if referenced {
            self.apply_edit(pos, "")?;
            self.unsubscribe_from_sources(pos);
            self.invalidate_downstream(pos);
        } else {
            self.unsubscribe_from_sources(pos);
            if let Some(slot) = self.slot_mut(pos) {
                *slot = None;
            }
        }
        Ok(())
    }

    /// Tight bounding rectangle over cells with non-empty text.
    pub fn printable_size(&self) -> Size {
        let mut max_row = -1;
        let mut max_col = -1;
        for (row, cells) in self.rows.iter().enumerate() {
            for (col, slot) in cells.iter().enumerate() {
                if let Some(cell) = slot {
                    if !cell.text().is_empty() {
                        max_row = max_row.max(row as i32);
                        max_col = max_col.max(col as i32);
                    }
                }
            }
        }
        Size {
            rows: max_row + 1,
            cols: max_col + 1,
        }
    }

    /// Write cell values over the printable rectangle, tab-separated,
    /// one line per row. Cells with empty text emit nothing.
    pub fn print_values<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        self.print_cells(out, |cell, out| write!(out, "{}", cell.value(self)))
    }

    /// Same layout as [`print_values`](Self::print_values), but raw text.
    pub fn print_texts<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        self.print_cells(out, |cell, out| out.write_str(&cell.text()))
    }

    fn print_cells<W, F>(&self, out: &mut W, print: F) -> fmt::Result
    where
        W: fmt::Write,
        F: Fn(&Cell, &mut W) -> fmt::Result,
    {
        let size = self.printable_size();
        for row in 0..size.rows {
            for col in 0..size.cols {
                if col > 0 {
                    out.write_char('\t')?;
                }
                if let Some(cell) = self.cell_at(Position::new(row, col)) {
                    if !cell.text().is_empty() {
                        print(cell, out)?;
                    }
                }
            }
            out.write_char('\n')?;
        }
        Ok(())
    }

    /* ───────────────────── edit protocol ──────────────────────────── */

    /// The transactional edit. The cell at `pos` is already materialized.
    ///
    /// Every fallible step runs before the first mutation, so a failure
    /// needs no rollback: the new content is built off to the side, the
    /// cycle check only reads the existing graph, and the swap, edge
    /// rewiring, and downstream invalidation follow unconditionally.
    fn apply_edit(&mut self, pos: Position, text: &str) -> Result<(), SheetError> {
        let current = match self.cell_at(pos) {
            Some(cell) => cell.text(),
            None => return Ok(()),
        };
        if current == text {
            return Ok(());
        }

        let data = CellData::parse(text)?;
        let new_refs = data.referenced_cells().to_vec();

        if self.would_cycle(pos, &new_refs) {
            #[cfg(feature = "tracing")]
            tracing::debug!(target: "gridcalc", %pos, "edit rejected: would create a cycle");
            return Err(SheetError::CircularDependency);
        }

        if let Some(cell) = self.cell_at_mut(pos) {
            cell.data = data;
        }
        self.rewire_edges(pos, &new_refs);
        self.invalidate_downstream(pos);

        #[cfg(feature = "tracing")]
        tracing::trace!(target: "gridcalc", %pos, "cell updated");
        Ok(())
    }

    /// Would rewiring `target` to read `new_refs` close a cycle?
    ///
    /// Reverse breadth-first search: from the proposed sources, walk
    /// source edges upstream and report a cycle iff `target` turns up.
    /// Positions without a live cell are skipped; they will be created
    /// empty and an empty cell has no outgoing edges to reach anything.
    fn would_cycle(&self, target: Position, new_refs: &[Position]) -> bool {
        let mut queue: VecDeque<Position> = VecDeque::new();
        for &pos in new_refs {
            if pos == target {
                return true;
            }
            if self.cell_at(pos).is_some() {
                queue.push_back(pos);
            }
        }

        let mut visited: FxHashSet<Position> = FxHashSet::default();
        while let Some(cur) = queue.pop_front() {
            if cur == target {
                return true;
            }
            if !visited.insert(cur) {
                continue;
            }
            if let Some(cell) = self.cell_at(cur) {
                queue.extend(cell.sources.iter().copied());
            }
        }
        false
    }

    /// Drop `pos` from the dependents of each of its sources, then
    /// forget the sources.
    fn unsubscribe_from_sources(&mut self, pos: Position) {
        let sources: Vec<Position> = match self.cell_at(pos) {
            Some(cell) => cell.sources.iter().copied().collect(),
            None => return,
        };
        for src in sources {
            if let Some(cell) = self.cell_at_mut(src) {
                cell.dependents.remove(&pos);
            }
        }
        if let Some(cell) = self.cell_at_mut(pos) {
            cell.sources.clear();
        }
    }

    /// Detach from the old sources and attach to the new ones,
    /// materializing empty placeholder cells for references that do not
    /// exist yet. Placeholder creation never re-enters the edit
    /// protocol, so no nested cycle checks can occur.
    fn rewire_edges(&mut self, pos: Position, new_refs: &[Position]) {
        self.unsubscribe_from_sources(pos);
        for &src in new_refs {
            if src == pos || !src.is_valid() {
                continue;
            }
            self.grow_to_include(src);
            self.materialize_empty(src);
            if let Some(cell) = self.cell_at_mut(src) {
                cell.dependents.insert(pos);
            }
            if let Some(cell) = self.cell_at_mut(pos) {
                cell.sources.insert(src);
            }
        }
    }

    /// Reset the memoized result of `pos` and of everything downstream
    /// of it along dependent edges, each cell at most once.
    fn invalidate_downstream(&self, pos: Position) {
        let mut stack = vec![pos];
        let mut visited: FxHashSet<Position> = FxHashSet::default();
        while let Some(cur) = stack.pop() {
            if !visited.insert(cur) {
                continue;
            }
            if let Some(cell) = self.cell_at(cur) {
                cell.data.invalidate_cache();
                stack.extend(cell.dependents.iter().copied());
            }
        }
    }

    /* ───────────────────── storage ────────────────────────────────── */

    pub(crate) fn cell_at(&self, pos: Position) -> Option<&Cell> {
        self.rows
            .get(pos.row as usize)?
            .get(pos.col as usize)?
            .as_ref()
    }

    fn cell_at_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        self.rows
            .get_mut(pos.row as usize)?
            .get_mut(pos.col as usize)?
            .as_mut()
    }

    fn slot_mut(&mut self, pos: Position) -> Option<&mut Option<Cell>> {
        self.rows.get_mut(pos.row as usize)?.get_mut(pos.col as usize)
    }

    fn grow_to_include(&mut self, pos: Position) {
        let row = pos.row as usize;
        if row >= self.rows.len() {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        let col = pos.col as usize;
        if col >= cells.len() {
            cells.resize_with(col + 1, || None);
        }
    }

    /// Allocate an empty cell at an already-grown position, if absent.
    fn materialize_empty(&mut self, pos: Position) {
        if let Some(slot) = self.slot_mut(pos) {
            if slot.is_none() {
                *slot = Some(Cell::empty());
            }
        }
    }

    /// Every position currently holding a cell, row-major.
    #[cfg(test)]
    pub(crate) fn occupied(&self) -> Vec<Position> {
        let mut out = Vec::new();
        for (row, cells) in self.rows.iter().enumerate() {
            for (col, slot) in cells.iter().enumerate() {
                if slot.is_some() {
                    out.push(Position::new(row as i32, col as i32));
                }
            }
        }
        out
    }
}
