//! Cell node: content variants, memoized formula result, graph edges.

use std::cell::RefCell;

use gridcalc_common::{CellValue, ESCAPE_SIGN, EvalResult, FORMULA_SIGN, Position, SheetError};
use rustc_hash::FxHashSet;

use crate::formula::Formula;
use crate::sheet::Sheet;

/// The three content behaviors a cell can have.
#[derive(Debug)]
pub(crate) enum CellData {
    Empty,
    Text(String),
    Formula {
        formula: Formula,
        /// Reset whenever this cell or anything upstream changes.
        /// Interior-mutable because evaluation walks shared references;
        /// acyclicity of the graph rules out re-entrant borrows of the
        /// same slot.
        cache: RefCell<Option<EvalResult>>,
    },
}

impl CellData {
    /// Classify raw input text into a behavior.
    ///
    /// Empty input is an empty cell; a leading escape sign forces text;
    /// a leading formula sign with anything after it parses as a
    /// formula; everything else, including a lone formula sign, is text.
    pub(crate) fn parse(text: &str) -> Result<Self, SheetError> {
        if text.is_empty() {
            Ok(CellData::Empty)
        } else if text.starts_with(ESCAPE_SIGN) {
            Ok(CellData::Text(text.to_string()))
        } else if text.starts_with(FORMULA_SIGN) && text.len() > 1 {
            let formula = Formula::parse(&text[1..])?;
            Ok(CellData::Formula {
                formula,
                cache: RefCell::new(None),
            })
        } else {
            Ok(CellData::Text(text.to_string()))
        }
    }

    pub(crate) fn value(&self, sheet: &Sheet) -> CellValue {
        match self {
            CellData::Empty => CellValue::Number(0.0),
            CellData::Text(text) => {
                let value = text.strip_prefix(ESCAPE_SIGN).unwrap_or(text);
                CellValue::Text(value.to_string())
            }
            CellData::Formula { formula, cache } => {
                if let Some(result) = *cache.borrow() {
                    return result.into();
                }
                let result = formula.evaluate(sheet);
                *cache.borrow_mut() = Some(result);
                result.into()
            }
        }
    }

    pub(crate) fn text(&self) -> String {
        match self {
            CellData::Empty => String::new(),
            CellData::Text(text) => text.clone(),
            CellData::Formula { formula, .. } => {
                format!("{FORMULA_SIGN}{}", formula.expression())
            }
        }
    }

    pub(crate) fn referenced_cells(&self) -> &[Position] {
        match self {
            CellData::Formula { formula, .. } => formula.referenced_cells(),
            _ => &[],
        }
    }

    /// Discard the memoized result; a no-op for non-formula cells.
    pub(crate) fn invalidate_cache(&self) {
        if let CellData::Formula { cache, .. } = self {
            cache.borrow_mut().take();
        }
    }
}

/// A materialized grid cell together with its dependency edges.
///
/// Edges are stored as positions, mirrored pairwise: for every source
/// `S` of a cell `C`, `C` appears in `S`'s dependents. The sheet is the
/// sole owner of all cells; edges never own anything.
#[derive(Debug)]
pub struct Cell {
    pub(crate) data: CellData,
    pub(crate) sources: FxHashSet<Position>,
    pub(crate) dependents: FxHashSet<Position>,
}

impl Cell {
    pub(crate) fn empty() -> Self {
        Self {
            data: CellData::Empty,
            sources: FxHashSet::default(),
            dependents: FxHashSet::default(),
        }
    }

    /// The cell's value; for formula cells this reads (and fills) the
    /// memoized result.
    pub fn value(&self, sheet: &Sheet) -> CellValue {
        self.data.value(sheet)
    }

    /// The cell's text: raw for literals, `=` plus the canonical
    /// expression for formulas.
    pub fn text(&self) -> String {
        self.data.text()
    }

    /// Positions this cell's formula reads, sorted and deduplicated.
    pub fn referenced_cells(&self) -> &[Position] {
        self.data.referenced_cells()
    }

    /// True when some other cell's formula reads this cell.
    pub fn is_referenced(&self) -> bool {
        !self.dependents.is_empty()
    }
}
