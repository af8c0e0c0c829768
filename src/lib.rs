//! Task-parallel merge trees for scalar fields on simplicial meshes.
//!
//! A merge tree records how the sublevel (join tree) or superlevel (split
//! tree) sets of a scalar field appear and fuse as the field value sweeps
//! from one extreme to the other. Leaves sit on local extrema, interior
//! nodes on saddles where components merge, and every super-arc carries the
//! region of mesh vertices attributed to it (the segmentation).
//!
//! The build runs one asynchronous task per extremum. Each task grows a
//! monotone wavefront; fronts meeting at a saddle are fused through a
//! lock-free union-find, and the last arriving task continues with the
//! combined front. Once a single front remains, the leftover backbone is
//! closed sequentially and the segmentation is filled by data-parallel
//! passes.
//!
//! # Example
//!
//! ```
//! use sweeptree::{compute_join_tree, AdjacencyMesh, Scalars};
//!
//! // A 1-D field with a single minimum at vertex 1.
//! let mesh = AdjacencyMesh::path(5);
//! let scalars = Scalars::from_f32(&[3.0, 1.0, 2.0, 4.0, 5.0]);
//! let tree = compute_join_tree(&mesh, &scalars).unwrap();
//!
//! assert_eq!(tree.leaves().len(), 1);
//! assert_eq!(tree.num_arcs(), 1);
//! // The single arc runs from the minimum to the maximum and owns every
//! // regular vertex, in sweep order.
//! assert_eq!(tree.arc(0).region(), &[2, 0, 3]);
//! ```

mod error;
mod mesh;
mod scalars;
mod sweep;
mod tree;
mod types;
pub mod validation;

pub use error::TreeError;
pub use mesh::{AdjacencyMesh, Mesh};
pub use scalars::Scalars;
pub use tree::{MergeTree, Node, SuperArc};
pub use types::{
    ArcId, Corresponding, NodeId, TreeType, VertexId, NULL_ARC, NULL_NODE, NULL_VERTEX,
};

/// Configuration for a tree build.
#[derive(Debug, Clone)]
pub struct TreeParams {
    /// Which tree to build. `Contour` is rejected; contour trees are
    /// assembled downstream from a join and a split tree.
    pub tree_type: TreeType,
    /// Attribute every regular vertex to its arc and materialize the per-arc
    /// regions. Skipping this leaves all regions empty.
    pub compute_segmentation: bool,
    /// Bulk phases aim for this many chunks per worker thread.
    pub tasks_per_thread: usize,
    /// Lower bound on chunk length, so small inputs stay in one task.
    pub min_chunk_size: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            tree_type: TreeType::Join,
            compute_segmentation: true,
            tasks_per_thread: 4,
            min_chunk_size: 1000,
        }
    }
}

impl TreeParams {
    /// Defaults for the given tree type.
    pub fn for_type(tree_type: TreeType) -> Self {
        Self {
            tree_type,
            ..Self::default()
        }
    }
}

/// Build a merge tree over `scalars` sampled on the vertices of `mesh`.
///
/// An empty field yields an empty tree. The scalar order must cover every
/// vertex id the mesh can return from a neighbor query.
pub fn compute<M: Mesh>(
    mesh: &M,
    scalars: &Scalars,
    params: &TreeParams,
) -> Result<MergeTree, TreeError> {
    sweep::build(mesh, scalars, params)
}

/// Build a join tree (sublevel sets, leaves on minima) with default params.
pub fn compute_join_tree<M: Mesh>(mesh: &M, scalars: &Scalars) -> Result<MergeTree, TreeError> {
    sweep::build(mesh, scalars, &TreeParams::for_type(TreeType::Join))
}

/// Build a split tree (superlevel sets, leaves on maxima) with default params.
pub fn compute_split_tree<M: Mesh>(mesh: &M, scalars: &Scalars) -> Result<MergeTree, TreeError> {
    sweep::build(mesh, scalars, &TreeParams::for_type(TreeType::Split))
}
