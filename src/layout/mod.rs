pub mod circle_packing;
pub mod collision;
pub mod label_placement;
pub mod triangle_packing;

pub use circle_packing::{
    CirclePackingConfig, PackedCircle, circles_overlap, fit_circles, pack_circles,
};
pub use collision::{StackedLabel, resolve_vertical_collisions};
pub use label_placement::{
    LabelPlacementConfig, LabelPosition, PlacedLabel, PointLabel, assignment_cost,
    place_point_labels,
};
pub use triangle_packing::{
    PackedTriangle, TrianglePackingConfig, fit_triangles, pack_triangles, triangle_side_for_area,
};
