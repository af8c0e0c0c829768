//! API surface: degenerate inputs, parameters, and post-build editing.

mod support;

use support::fields::{assert_partition, leaf_vertices, root_vertices};
use sweeptree::{compute_join_tree, AdjacencyMesh, Corresponding, Scalars, TreeParams, TreeType};

#[test]
fn test_empty_field_yields_empty_tree() {
    let mesh = AdjacencyMesh::from_edges(0, &[]);
    let scalars = Scalars::from_f32(&[]);
    let tree = compute_join_tree(&mesh, &scalars).unwrap();

    assert_eq!(tree.num_nodes(), 0);
    assert_eq!(tree.num_arcs(), 0);
    assert!(tree.leaves().is_empty());
    assert!(tree.roots().is_empty());
}

#[test]
fn test_single_vertex_field() {
    let mesh = AdjacencyMesh::from_edges(1, &[]);
    let scalars = Scalars::from_f32(&[0.5]);
    let tree = compute_join_tree(&mesh, &scalars).unwrap();

    assert_eq!(tree.num_nodes(), 1);
    assert_eq!(tree.node(0).vertex(), 0);
    assert_eq!(root_vertices(&tree), vec![0]);
    assert_partition(&tree, 1);
}

#[test]
fn test_two_vertex_edge() {
    let mesh = AdjacencyMesh::from_edges(2, &[(0, 1)]);
    let scalars = Scalars::from_f32(&[1.0, 0.0]);
    let tree = compute_join_tree(&mesh, &scalars).unwrap();

    assert_eq!(leaf_vertices(&tree), vec![1]);
    assert_eq!(root_vertices(&tree), vec![0]);
    assert_eq!(tree.num_arcs(), 1);
    assert_partition(&tree, 2);
}

#[test]
fn test_isolated_vertex_is_its_own_component() {
    // A 3-chain plus an isolated vertex: two components, two roots.
    let mesh = AdjacencyMesh::from_edges(4, &[(0, 1), (1, 2)]);
    let scalars = Scalars::from_f32(&[0.0, 1.0, 2.0, 5.0]);
    let tree = compute_join_tree(&mesh, &scalars).unwrap();

    assert_eq!(leaf_vertices(&tree), vec![0, 3]);
    assert_eq!(root_vertices(&tree), vec![2, 3]);
    assert_partition(&tree, 4);
}

#[test]
fn test_custom_sorted_order() {
    // Caller-supplied order reverses the id tie-break: with all-equal values
    // the leaf moves to the highest id.
    let mesh = AdjacencyMesh::path(3);
    let scalars = Scalars::from_sorted(vec![2, 1, 0]).unwrap();
    let tree = compute_join_tree(&mesh, &scalars).unwrap();

    assert_eq!(leaf_vertices(&tree), vec![2]);
    assert_eq!(root_vertices(&tree), vec![0]);
    assert_partition(&tree, 3);
}

#[test]
fn test_params_defaults() {
    let params = TreeParams::default();
    assert_eq!(params.tree_type, TreeType::Join);
    assert!(params.compute_segmentation);
    assert!(params.min_chunk_size >= 1);

    let split = TreeParams::for_type(TreeType::Split);
    assert_eq!(split.tree_type, TreeType::Split);
    assert!(split.compute_segmentation);
}

#[test]
fn test_insert_node_splits_arc_and_region() {
    let mesh = AdjacencyMesh::path(5);
    let scalars = Scalars::from_f32(&[3.0, 1.0, 2.0, 4.0, 5.0]);
    let mut tree = compute_join_tree(&mesh, &scalars).unwrap();
    assert_eq!(tree.arc(0).region(), &[2, 0, 3]);

    // Split the single arc at vertex 0 (middle of its region).
    let new_arc = tree.insert_node(0, &scalars, true).expect("split failed");

    assert_eq!(tree.num_nodes(), 3);
    let new_node = match tree.corresponding(0) {
        Corresponding::Node(n) => n,
        other => panic!("vertex 0 should be a node, got {:?}", other),
    };
    // Old arc keeps the part below the new node, the new arc takes the rest.
    assert_eq!(tree.arc(0).region(), &[2]);
    assert_eq!(tree.arc(new_arc).region(), &[3]);
    assert_eq!(tree.corresponding(3), Corresponding::Arc(new_arc));
    assert_eq!(tree.arc(0).up_node(), new_node);
    assert_eq!(tree.arc(new_arc).down_node(), new_node);
    assert_eq!(tree.node(new_node).down_arcs(), &[0]);
    assert_eq!(tree.node(new_node).up_arcs(), &[new_arc]);
    assert_partition(&tree, 5);
}

#[test]
fn test_insert_node_rejects_root_vertex() {
    let mesh = AdjacencyMesh::path(3);
    let scalars = Scalars::from_f32(&[0.0, 1.0, 2.0]);
    let mut tree = compute_join_tree(&mesh, &scalars).unwrap();

    // The root has no up arc, so there is nothing to split above it.
    let root_vertex = tree.node(tree.roots()[0]).vertex();
    assert!(tree.insert_node(root_vertex, &scalars, true).is_none());

    // A regular region vertex splits fine.
    assert!(tree.insert_node(1, &scalars, true).is_some());
}

#[test]
fn test_merge_arc_records_replacant() {
    let mesh = AdjacencyMesh::path(5);
    let scalars = Scalars::from_f32(&[1.0, 0.0, 2.0, 0.0, 3.0]);
    let mut tree = compute_join_tree(&mesh, &scalars).unwrap();

    // Find the two leaf arcs into the saddle.
    let saddle = match tree.corresponding(2) {
        Corresponding::Node(n) => n,
        other => panic!("vertex 2 should be a node, got {:?}", other),
    };
    let downs: Vec<_> = tree.node(saddle).down_arcs().to_vec();
    assert_eq!(downs.len(), 2);
    let (kept, folded) = (downs[0], downs[1]);

    let moved: Vec<_> = tree.arc(folded).region().to_vec();
    tree.merge_arc(folded, kept, true, &scalars);

    assert!(tree.arc(folded).is_merged());
    assert_eq!(tree.arc(folded).replacant(), Some(kept));
    assert!(tree.arc(folded).region().is_empty());
    for v in moved {
        assert_eq!(tree.corresponding(v), Corresponding::Arc(kept));
    }
    assert_eq!(tree.node(saddle).down_arcs(), &[kept]);
}

#[test]
fn test_del_node_root_with_one_child() {
    let mesh = AdjacencyMesh::path(5);
    let scalars = Scalars::from_f32(&[3.0, 1.0, 2.0, 4.0, 5.0]);
    let mut tree = compute_join_tree(&mesh, &scalars).unwrap();

    let root = tree.roots()[0];
    let leaf = tree.leaves()[0];
    tree.del_node(root);

    assert!(tree.node(root).down_arcs().is_empty());
    assert!(tree.node(leaf).up_arcs().is_empty());
}

#[test]
fn test_del_node_keeps_branching_nodes() {
    let mesh = AdjacencyMesh::path(5);
    let scalars = Scalars::from_f32(&[1.0, 0.0, 2.0, 0.0, 3.0]);
    let mut tree = compute_join_tree(&mesh, &scalars).unwrap();

    let saddle = match tree.corresponding(2) {
        Corresponding::Node(n) => n,
        other => panic!("vertex 2 should be a node, got {:?}", other),
    };
    let before_down = tree.node(saddle).down_arcs().len();
    let before_up = tree.node(saddle).up_arcs().len();

    // Two children: removal must be refused.
    tree.del_node(saddle);
    assert_eq!(tree.node(saddle).down_arcs().len(), before_down);
    assert_eq!(tree.node(saddle).up_arcs().len(), before_up);
}

#[test]
fn test_del_node_pass_through_concatenates_regions() {
    let mesh = AdjacencyMesh::path(5);
    let scalars = Scalars::from_f32(&[3.0, 1.0, 2.0, 4.0, 5.0]);
    let mut tree = compute_join_tree(&mesh, &scalars).unwrap();

    // Insert a pass-through node, then delete it again.
    let new_arc = tree.insert_node(0, &scalars, true).unwrap();
    let node = match tree.corresponding(0) {
        Corresponding::Node(n) => n,
        other => panic!("vertex 0 should be a node, got {:?}", other),
    };
    tree.del_node(node);

    assert!(tree.node(node).up_arcs().is_empty());
    assert!(tree.node(node).down_arcs().is_empty());
    // The surviving down arc took back the upper region.
    let mut region = tree.arc(0).region().to_vec();
    region.sort_unstable();
    assert_eq!(region, vec![2, 3]);
    assert!(tree.arc(new_arc).region().is_empty());
}

#[test]
fn test_sorted_nodes_follow_sweep_order() {
    let mesh = AdjacencyMesh::path(5);
    let scalars = Scalars::from_f32(&[1.0, 0.0, 2.0, 0.0, 3.0]);
    let tree = compute_join_tree(&mesh, &scalars).unwrap();

    let sorted = tree.sorted_nodes(&scalars);
    for pair in sorted.windows(2) {
        let a = tree.node(pair[0]).vertex();
        let b = tree.node(pair[1]).vertex();
        assert!(
            tree.vert_lower(&scalars, a, b),
            "nodes out of sweep order: {} before {}",
            a,
            b
        );
    }
}

#[test]
fn test_format_tree_smoke() {
    let mesh = AdjacencyMesh::path(5);
    let scalars = Scalars::from_f32(&[1.0, 0.0, 2.0, 0.0, 3.0]);
    let tree = compute_join_tree(&mesh, &scalars).unwrap();

    let dump = tree.format_tree();
    assert!(dump.contains("Nodes"));
    assert!(dump.contains("Arcs"));
    assert!(dump.contains("Leaves: 1 3") || dump.contains("Leaves: 3 1"));
}

#[test]
fn test_leaf_origins_point_to_themselves() {
    let mesh = AdjacencyMesh::path(5);
    let scalars = Scalars::from_f32(&[1.0, 0.0, 2.0, 0.0, 3.0]);
    let tree = compute_join_tree(&mesh, &scalars).unwrap();

    for &l in tree.leaves() {
        let node = tree.node(l);
        assert_eq!(node.origin(), node.vertex());
        assert!(node.is_leaf());
    }
}
