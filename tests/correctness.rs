//! Combinatorial correctness on small, fully worked-out fields.
//!
//! Each scenario pins the exact tree (leaves, saddles, roots, regions) the
//! sweep must produce, independent of task scheduling.

mod support;

use support::fields::{
    assert_partition, canonical_form, leaf_vertices, root_vertices, triangle_mesh,
};
use sweeptree::{
    compute, compute_join_tree, compute_split_tree, AdjacencyMesh, Scalars, TreeParams, TreeType,
};

#[test]
fn test_single_minimum_on_path() {
    let mesh = AdjacencyMesh::path(5);
    let scalars = Scalars::from_f32(&[3.0, 1.0, 2.0, 4.0, 5.0]);
    let tree = compute_join_tree(&mesh, &scalars).unwrap();

    assert_eq!(leaf_vertices(&tree), vec![1]);
    assert_eq!(root_vertices(&tree), vec![4]);
    assert_eq!(tree.num_arcs(), 1);
    // Region in sweep order: 1 -> 2 -> 0 -> 3 -> 4.
    assert_eq!(tree.arc(0).region(), &[2, 0, 3]);
    assert_partition(&tree, 5);
}

#[test]
fn test_double_well_chain() {
    // Two wells (vertices 1 and 3) separated by one barrier at vertex 2.
    let mesh = AdjacencyMesh::path(5);
    let scalars = Scalars::from_f32(&[1.0, 0.0, 2.0, 0.0, 3.0]);
    let tree = compute_join_tree(&mesh, &scalars).unwrap();

    assert_eq!(leaf_vertices(&tree), vec![1, 3]);
    assert_eq!(root_vertices(&tree), vec![4]);
    assert_eq!(tree.num_nodes(), 4);
    assert_eq!(tree.num_arcs(), 3);
    assert_eq!(
        canonical_form(&tree),
        vec![(1, 2, vec![0]), (2, 4, vec![]), (3, 2, vec![])]
    );
    assert_partition(&tree, 5);
}

#[test]
fn test_w_shaped_chain() {
    // Three minima; the middle well meets each outer well at its own saddle,
    // and the global maximum (vertex 3) is both the last saddle and the root.
    let mesh = AdjacencyMesh::path(5);
    let scalars = Scalars::from_f32(&[0.0, 2.0, 1.0, 3.0, 0.0]);
    let tree = compute_join_tree(&mesh, &scalars).unwrap();

    assert_eq!(leaf_vertices(&tree), vec![0, 2, 4]);
    assert_eq!(
        canonical_form(&tree),
        vec![
            (0, 1, vec![]),
            (1, 3, vec![]),
            (2, 1, vec![]),
            (3, 3, vec![]),
            (4, 3, vec![]),
        ]
    );
    assert_partition(&tree, 5);
}

#[test]
fn test_flat_plateau_triangle() {
    // All-equal field: ties broken by vertex id leave a single minimum.
    let scalars = Scalars::from_f32(&[1.0, 1.0, 1.0]);
    let tree = compute_join_tree(&triangle_mesh(), &scalars).unwrap();

    assert_eq!(leaf_vertices(&tree), vec![0]);
    assert_eq!(root_vertices(&tree), vec![2]);
    assert_eq!(tree.num_arcs(), 1);
    assert_eq!(tree.arc(0).region(), &[1]);
    assert_partition(&tree, 3);
}

#[test]
fn test_two_minima_grid() {
    // 3x3 grid, two wells in the left and right columns separated by a high
    // middle column; the ridge opens lowest at vertex 7.
    let mesh = AdjacencyMesh::grid_2d(3, 3);
    let scalars = Scalars::from_f32(&[
        0.0, 9.0, 3.0, //
        1.0, 8.0, 4.0, //
        2.0, 7.0, 5.0,
    ]);
    let tree = compute_join_tree(&mesh, &scalars).unwrap();

    assert_eq!(leaf_vertices(&tree), vec![0, 2]);
    assert_eq!(root_vertices(&tree), vec![1]);
    assert_eq!(
        canonical_form(&tree),
        vec![(0, 7, vec![3, 6]), (2, 7, vec![5, 8]), (7, 1, vec![4])]
    );
    // The merge node carries both wells below and the trunk above.
    let saddle = match tree.corresponding(7) {
        sweeptree::Corresponding::Node(n) => n,
        other => panic!("vertex 7 should be a node, got {:?}", other),
    };
    assert_eq!(tree.node(saddle).down_arcs().len(), 2);
    assert_eq!(tree.node(saddle).up_arcs().len(), 1);
    assert_partition(&tree, 9);
}

#[test]
fn test_split_tree_single_maximum() {
    let mesh = AdjacencyMesh::path(5);
    let scalars = Scalars::from_f32(&[3.0, 1.0, 2.0, 4.0, 5.0]);
    let tree = compute_split_tree(&mesh, &scalars).unwrap();

    // One maximum at vertex 4; the split root lands on the global minimum.
    assert_eq!(leaf_vertices(&tree), vec![4]);
    assert_eq!(root_vertices(&tree), vec![1]);
    assert_eq!(tree.num_arcs(), 1);
    assert_eq!(tree.arc(0).region(), &[3, 0, 2]);
    assert_partition(&tree, 5);
}

#[test]
fn test_split_tree_double_well_becomes_double_peak() {
    // The mirror field of the double well: two maxima meeting at the barrier.
    let mesh = AdjacencyMesh::path(5);
    let scalars = Scalars::from_f32(&[-1.0, 0.0, -2.0, 0.0, -3.0]);
    let tree = compute_split_tree(&mesh, &scalars).unwrap();

    assert_eq!(leaf_vertices(&tree), vec![1, 3]);
    assert_eq!(root_vertices(&tree), vec![4]);
    assert_eq!(
        canonical_form(&tree),
        vec![(1, 2, vec![0]), (2, 4, vec![]), (3, 2, vec![])]
    );
    assert_partition(&tree, 5);
}

#[test]
fn test_segmentation_sums_to_vertex_count() {
    let mesh = AdjacencyMesh::grid_2d(3, 3);
    let scalars = Scalars::from_f32(&[
        0.0, 9.0, 3.0, //
        1.0, 8.0, 4.0, //
        2.0, 7.0, 5.0,
    ]);
    let tree = compute_join_tree(&mesh, &scalars).unwrap();

    let region_total: usize = tree.iter_arcs().map(|(_, a)| a.region_size()).sum();
    assert_eq!(region_total + tree.num_nodes(), 9);
}

#[test]
fn test_without_segmentation_regions_are_empty() {
    let mesh = AdjacencyMesh::path(5);
    let scalars = Scalars::from_f32(&[1.0, 0.0, 2.0, 0.0, 3.0]);
    let params = TreeParams {
        compute_segmentation: false,
        ..TreeParams::default()
    };
    let tree = compute(&mesh, &scalars, &params).unwrap();

    assert_eq!(tree.num_arcs(), 3);
    assert!(tree.iter_arcs().all(|(_, a)| a.region().is_empty()));
    // The combinatorial structure is unaffected.
    assert_eq!(leaf_vertices(&tree), vec![1, 3]);
}

#[test]
fn test_join_and_split_on_ramp_are_mirrors() {
    let mesh = AdjacencyMesh::path(6);
    let values: Vec<f32> = (0..6).map(|i| i as f32).collect();
    let scalars = Scalars::from_f32(&values);

    let join = compute_join_tree(&mesh, &scalars).unwrap();
    let split = compute_split_tree(&mesh, &scalars).unwrap();

    assert_eq!(leaf_vertices(&join), vec![0]);
    assert_eq!(root_vertices(&join), vec![5]);
    assert_eq!(leaf_vertices(&split), vec![5]);
    assert_eq!(root_vertices(&split), vec![0]);
    assert_partition(&join, 6);
    assert_partition(&split, 6);
}

#[test]
fn test_contour_type_rejected() {
    let mesh = AdjacencyMesh::path(3);
    let scalars = Scalars::from_f32(&[0.0, 1.0, 2.0]);
    let params = TreeParams::for_type(TreeType::Contour);
    assert!(compute(&mesh, &scalars, &params).is_err());
}
