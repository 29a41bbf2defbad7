//! Map layouts: centroid bubbles and `GeoJSON` choropleth.
//!
//! Both are presentational. The only geography here is a static centroid
//! table and whatever country properties the boundaries file carries.

mod bubble;
mod centroids;
mod choropleth;

pub use bubble::{bubble_markers, bubble_radius, fit_viewport, BubbleMarker, Viewport};
pub use centroids::{centroid, Centroid, CENTROIDS};
pub use choropleth::{choropleth_styles, load_world, FeatureStyle, WorldBoundaries, WorldFeature};
