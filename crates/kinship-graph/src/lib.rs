pub mod canonical;
pub mod cluster;
pub mod force;
pub mod generation;
pub mod graph;
pub mod hierarchy;
pub mod hit_tester;
pub mod label;
pub mod layout;
pub mod memo;
pub mod radial;
pub mod style;

pub use canonical::{
    CanonicalPair, canonical_key, canonicalize, connection_exists, deduplicate, prepare_write,
    validate, validate_connection,
};
pub use cluster::ClusterLayouter;
pub use force::ForceLayouter;
pub use generation::{
    GenerationInfo, GenerationMap, calculate_generations, generation_layers,
    get_generational_connections, get_sibling_connections,
};
pub use graph::{FamilyGraph, NodeIndex, Vec2, person_lookup};
pub use hierarchy::{HierarchyNode, build_hierarchy};
pub use hit_tester::{HitTester, SelectionController, Viewport};
pub use label::{
    ConnectionSummary, RelationshipLabel, UNKNOWN_PERSON, describe, describe_for_viewpoint,
    summarize_connections,
};
pub use layout::{
    Canvas, FamilyLayout, FamilyLayouter, LayoutKind, LayoutLink, LayoutSettings, PositionedNode,
    Rect, TreeLayouter, layouter_for,
};
pub use memo::{MemoizedLayout, content_hash};
pub use radial::RadialLayouter;
pub use style::{
    Color, LinkStyle, NodeColors, generation_color, get_link_style, get_node_colors,
    get_node_colors_with, palette_color,
};
