//! Page context and image discovery
//!
//! Everything the pipeline reads from the document lives here: the page's own
//! block id, the space/user identifiers used for auth, and the image targets.

pub mod discovery;
pub mod provider;
pub mod snapshot;

pub use discovery::{
    ImageReference, RasterImageHandle, VectorGraphicHandle, discover, serialize_svg,
};
pub use provider::{
    PageContext, PageContextProvider, SnapshotContext, SpecialIds, auth_headers_for,
    special_ids_from,
};
pub use snapshot::{
    BLOCK_ID_ATTR, PageSnapshot, RASTER_IMAGE_CSS, VECTOR_PREVIEW_CSS, closest_block_id,
};
