//! Dependency-graph laws: edge symmetry, acyclicity, idempotent edits,
//! rollback on failure, cache discipline.

use gridcalc_common::{CellValue, Position, SheetError};
use rustc_hash::FxHashSet;

use super::{pos, text, value};
use crate::Sheet;
use crate::cell::CellData;

/// Edge symmetry: every source edge has its mirrored dependent edge and
/// vice versa, and all edges point at live cells.
fn assert_edges_symmetric(sheet: &Sheet) {
    for p in sheet.occupied() {
        let cell = sheet.cell(p).unwrap().unwrap();
        for &src in &cell.sources {
            let src_cell = sheet
                .cell(src)
                .unwrap()
                .unwrap_or_else(|| panic!("{p}: source {src} has no cell"));
            assert!(
                src_cell.dependents.contains(&p),
                "{src} is missing dependent {p}"
            );
        }
        for &dep in &cell.dependents {
            let dep_cell = sheet
                .cell(dep)
                .unwrap()
                .unwrap_or_else(|| panic!("{p}: dependent {dep} has no cell"));
            assert!(dep_cell.sources.contains(&p), "{dep} is missing source {p}");
        }
    }
}

/// Acyclicity: no cell is upstream of itself along source edges.
fn assert_acyclic(sheet: &Sheet) {
    for start in sheet.occupied() {
        let mut stack: Vec<Position> = match sheet.cell(start).unwrap() {
            Some(cell) => cell.sources.iter().copied().collect(),
            None => continue,
        };
        let mut visited: FxHashSet<Position> = FxHashSet::default();
        while let Some(cur) = stack.pop() {
            assert_ne!(cur, start, "{start} reaches itself through its sources");
            if !visited.insert(cur) {
                continue;
            }
            if let Some(cell) = sheet.cell(cur).unwrap() {
                stack.extend(cell.sources.iter().copied());
            }
        }
    }
}

/// Cached formula results must match a fresh evaluation.
fn assert_caches_fresh(sheet: &Sheet) {
    for p in sheet.occupied() {
        let cell = sheet.cell(p).unwrap().unwrap();
        if let CellData::Formula { formula, cache } = &cell.data {
            if let Some(cached) = *cache.borrow() {
                assert_eq!(cached, formula.evaluate(sheet), "stale cache at {p}");
            }
        }
    }
}

fn assert_consistent(sheet: &Sheet) {
    assert_edges_symmetric(sheet);
    assert_acyclic(sheet);
    assert_caches_fresh(sheet);
}

fn cache_is_filled(sheet: &Sheet, label: &str) -> bool {
    match &sheet.cell(pos(label)).unwrap().unwrap().data {
        CellData::Formula { cache, .. } => cache.borrow().is_some(),
        _ => false,
    }
}

#[test]
fn graph_stays_consistent_across_edits() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "1").unwrap();
    sheet.set_cell(pos("A2"), "=A1+1").unwrap();
    sheet.set_cell(pos("A3"), "=A1+A2").unwrap();
    assert_consistent(&sheet);

    assert_eq!(value(&sheet, "A3"), CellValue::Number(3.0));
    assert_consistent(&sheet);

    // Retarget A2 away from A1.
    sheet.set_cell(pos("A2"), "=B5*2").unwrap();
    assert_consistent(&sheet);
    let a1 = sheet.cell(pos("A1")).unwrap().unwrap();
    assert!(!a1.dependents.contains(&pos("A2")));

    // Demote a formula to a literal; its old source edges must go.
    sheet.set_cell(pos("A3"), "plain").unwrap();
    assert_consistent(&sheet);
    let a3 = sheet.cell(pos("A3")).unwrap().unwrap();
    assert!(a3.sources.is_empty());

    sheet.clear_cell(pos("A2")).unwrap();
    sheet.clear_cell(pos("A1")).unwrap();
    assert_consistent(&sheet);
}

#[test]
fn clearing_a_formula_detaches_its_back_edges() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "1").unwrap();
    sheet.set_cell(pos("B1"), "=A1").unwrap();
    sheet.clear_cell(pos("B1")).unwrap();

    assert!(sheet.cell(pos("B1")).unwrap().is_none());
    let a1 = sheet.cell(pos("A1")).unwrap().unwrap();
    assert!(!a1.is_referenced());
    assert_consistent(&sheet);
}

#[test]
fn repeated_set_is_a_no_op() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "3").unwrap();
    sheet.set_cell(pos("B1"), "=A1*A1").unwrap();
    assert_eq!(value(&sheet, "B1"), CellValue::Number(9.0));
    assert!(cache_is_filled(&sheet, "B1"));

    // Same text again: the cache must survive untouched.
    sheet.set_cell(pos("B1"), "=A1*A1").unwrap();
    assert!(cache_is_filled(&sheet, "B1"));
    assert_eq!(value(&sheet, "B1"), CellValue::Number(9.0));
    assert_consistent(&sheet);
}

#[test]
fn failed_edits_roll_back_completely() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "5").unwrap();
    sheet.set_cell(pos("B1"), "=A1*2").unwrap();
    sheet.set_cell(pos("C1"), "=B1").unwrap();
    assert_eq!(value(&sheet, "C1"), CellValue::Number(10.0));

    let refs_before: Vec<Position> = sheet
        .cell(pos("B1"))
        .unwrap()
        .unwrap()
        .referenced_cells()
        .to_vec();

    // Syntax failure.
    assert!(matches!(
        sheet.set_cell(pos("B1"), "=A1+"),
        Err(SheetError::Formula(_))
    ));
    // Cycle failure.
    assert_eq!(
        sheet.set_cell(pos("B1"), "=C1"),
        Err(SheetError::CircularDependency)
    );

    let b1 = sheet.cell(pos("B1")).unwrap().unwrap();
    assert_eq!(b1.text(), "=A1*2");
    assert_eq!(b1.referenced_cells(), refs_before.as_slice());
    assert!(b1.sources.contains(&pos("A1")));
    assert!(b1.dependents.contains(&pos("C1")));
    // The failed edits did not disturb the cached results either.
    assert!(cache_is_filled(&sheet, "B1"));
    assert_eq!(value(&sheet, "B1"), CellValue::Number(10.0));
    assert_consistent(&sheet);
}

#[test]
fn invalidation_reaches_the_whole_downstream_closure() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "1").unwrap();
    sheet.set_cell(pos("B1"), "=A1+1").unwrap();
    sheet.set_cell(pos("B2"), "=A1*10").unwrap();
    sheet.set_cell(pos("C1"), "=B1+B2").unwrap();
    assert_eq!(value(&sheet, "C1"), CellValue::Number(12.0));
    assert!(cache_is_filled(&sheet, "B1"));
    assert!(cache_is_filled(&sheet, "B2"));

    sheet.set_cell(pos("A1"), "2").unwrap();
    assert!(!cache_is_filled(&sheet, "B1"));
    assert!(!cache_is_filled(&sheet, "B2"));
    assert!(!cache_is_filled(&sheet, "C1"));
    assert_eq!(value(&sheet, "C1"), CellValue::Number(23.0));
    assert_consistent(&sheet);
}

#[test]
fn diamond_dependencies_evaluate_once_per_cell() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "2").unwrap();
    sheet.set_cell(pos("B1"), "=A1+1").unwrap();
    sheet.set_cell(pos("B2"), "=A1-1").unwrap();
    sheet.set_cell(pos("C1"), "=B1*B2").unwrap();
    assert_eq!(value(&sheet, "C1"), CellValue::Number(3.0));
    assert_consistent(&sheet);
}

#[test]
fn rewiring_prunes_stale_placeholder_edges() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "=Z9").unwrap();
    let z9 = sheet.cell(pos("Z9")).unwrap().unwrap();
    assert!(z9.dependents.contains(&pos("A1")));

    sheet.set_cell(pos("A1"), "=Y8").unwrap();
    let z9 = sheet.cell(pos("Z9")).unwrap().unwrap();
    assert!(!z9.dependents.contains(&pos("A1")));
    assert!(
        sheet
            .cell(pos("Y8"))
            .unwrap()
            .unwrap()
            .dependents
            .contains(&pos("A1"))
    );
    assert_consistent(&sheet);
}

#[test]
fn clear_then_rebuild_reuses_the_placeholder() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "7").unwrap();
    sheet.set_cell(pos("B1"), "=A1").unwrap();
    sheet.clear_cell(pos("A1")).unwrap();
    assert_eq!(value(&sheet, "B1"), CellValue::Number(0.0));

    // Writing into the placeholder revives it for its dependents.
    sheet.set_cell(pos("A1"), "9").unwrap();
    assert_eq!(value(&sheet, "B1"), CellValue::Number(9.0));
    assert_eq!(text(&sheet, "A1"), "9");
    assert_consistent(&sheet);
}
