mod graph;

use gridcalc_common::{CellValue, Position};

use crate::Sheet;

pub(crate) fn pos(label: &str) -> Position {
    Position::from_label(label)
}

pub(crate) fn value(sheet: &Sheet, label: &str) -> CellValue {
    match sheet.cell(pos(label)) {
        Ok(Some(cell)) => cell.value(sheet),
        other => panic!("no cell at {label}: {other:?}"),
    }
}

pub(crate) fn text(sheet: &Sheet, label: &str) -> String {
    match sheet.cell(pos(label)) {
        Ok(Some(cell)) => cell.text(),
        other => panic!("no cell at {label}: {other:?}"),
    }
}
