use super::*;
use crate::config::BoundaryRule;
use crate::image::Mask;

fn row_entries(operator: &CsrMatrix, row: usize) -> Vec<(usize, f64)> {
    operator.row(row).collect()
}

#[test]
fn test_masked_block_stencils() {
    // 3x3 block inside a 5x5 image; only its center is interior.
    let mask = Mask::from_fn(5, 5, |row, col| (1..=3).contains(&row) && (1..=3).contains(&col));
    let (operator, index) = build_boundary_poisson_system(&Domain::masked(&mask)).unwrap();

    assert_eq!(operator.dim(), 9);
    let center = index.index_of(2, 2).unwrap();
    assert_eq!(center, 4);
    assert_eq!(
        row_entries(&operator, center),
        vec![(1, 1.0), (3, 1.0), (4, -4.0), (5, 1.0), (7, 1.0)]
    );

    for unknown in (0..9).filter(|&u| u != center) {
        assert_eq!(row_entries(&operator, unknown), vec![(unknown, 1.0)]);
    }
    assert_eq!(operator.nnz(), 8 + 5);
}

#[test]
fn test_single_pixel_mask_is_identity() {
    let mut mask = Mask::new_filled(3, 3, false);
    mask.set(1, 1, true);
    let (operator, index) = build_boundary_poisson_system(&Domain::masked(&mask)).unwrap();
    assert_eq!(index.len(), 1);
    assert_eq!(operator.dim(), 1);
    assert_eq!(row_entries(&operator, 0), vec![(0, 1.0)]);
}

#[test]
fn test_empty_mask_fails_before_assembly() {
    let mask = Mask::new_filled(3, 3, false);
    let err = build_boundary_poisson_system(&Domain::masked(&mask)).unwrap_err();
    assert!(matches!(err, Error::EmptyDomain));
}

#[test]
fn test_grid_edge_stencils() {
    // 4 wide, 3 high:
    //  0  1  2  3
    //  4  5  6  7
    //  8  9 10 11
    let (operator, _) = build_boundary_poisson_system(&Domain::full_grid(4, 3)).unwrap();

    assert_eq!(row_entries(&operator, 0), vec![(0, 1.0)]);
    assert_eq!(row_entries(&operator, 11), vec![(11, 1.0)]);
    // horizontal edge: along the row
    assert_eq!(
        row_entries(&operator, 1),
        vec![(0, -1.0), (1, 2.0), (2, -1.0)]
    );
    assert_eq!(
        row_entries(&operator, 10),
        vec![(9, -1.0), (10, 2.0), (11, -1.0)]
    );
    // vertical edge: along the column
    assert_eq!(
        row_entries(&operator, 4),
        vec![(0, -1.0), (4, 2.0), (8, -1.0)]
    );
    // interior: 5-point Laplacian
    assert_eq!(
        row_entries(&operator, 5),
        vec![(1, 1.0), (4, 1.0), (5, -4.0), (6, 1.0), (9, 1.0)]
    );
}

#[test]
fn test_stencil_rows_sum_to_zero() {
    let (operator, index) = build_boundary_poisson_system(&Domain::full_grid(6, 5)).unwrap();
    for (unknown, _, class) in index.iter() {
        let sum: f64 = operator.row(unknown).map(|(_, v)| v).sum();
        if class.is_constrained() {
            assert_eq!(sum, 1.0);
        } else {
            assert_eq!(sum, 0.0, "row {unknown} ({class:?})");
        }
    }
}

#[test]
fn test_single_row_grid() {
    let (operator, index) = build_boundary_poisson_system(&Domain::full_grid(3, 1)).unwrap();
    assert_eq!(index.class(1), PixelClass::HorizontalEdge);
    assert_eq!(
        row_entries(&operator, 1),
        vec![(0, -1.0), (1, 2.0), (2, -1.0)]
    );
}

#[test]
fn test_grid_rule_on_partial_mask_fails_fast() {
    let mask = Mask::from_fn(4, 4, |row, col| (row, col) != (1, 2));
    let domain = Domain::masked(&mask).with_rule(BoundaryRule::GridEdge);
    let err = build_boundary_poisson_system(&domain).unwrap_err();
    match err {
        Error::MissingNeighbor { row, col, .. } => assert_eq!((row, col), (1, 2)),
        other => panic!("expected MissingNeighbor, got {other:?}"),
    }
    assert_eq!(
        build_boundary_poisson_system(&domain).unwrap_err().kind(),
        crate::error::ErrorKind::Consistency
    );
}

#[test]
fn test_operator_is_rebuilt_identically() {
    let mask = Mask::from_fn(9, 7, |row, col| row * col % 5 != 3);
    let (first, _) = build_boundary_poisson_system(&Domain::masked(&mask)).unwrap();
    let (second, _) = build_boundary_poisson_system(&Domain::masked(&mask)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_built_operators_are_chained_dominant() {
    let mask = Mask::from_fn(9, 7, |row, col| row * col % 5 != 3);
    let (masked, _) = build_boundary_poisson_system(&Domain::masked(&mask)).unwrap();
    assert!(masked.is_chained_dominant());

    for (width, height) in [(1, 1), (1, 4), (5, 1), (6, 5)] {
        let (grid, _) = build_boundary_poisson_system(&Domain::full_grid(width, height)).unwrap();
        assert!(grid.is_chained_dominant(), "{width}x{height}");
        assert_eq!(grid.zero_row(), None);
    }
}
