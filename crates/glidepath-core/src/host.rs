//! Host environment seams
//!
//! A browser binding implements these over real DOM nodes; the CLI simulator
//! and the tests implement them over plain structs.

use crate::geometry::{Bounds, Size};

/// A page element the engine can measure and decorate
///
/// Methods take `&self` so handles can be cheap shared references, the way
/// DOM node wrappers are.
pub trait ElementHandle {
    /// Bounding rect relative to the current viewport
    fn rect(&self) -> Bounds;

    /// Computed CSS `transform`, if any
    fn transform(&self) -> Option<String> {
        None
    }

    fn add_class(&self, class: &str);

    fn remove_class(&self, class: &str);
}

/// The scrolling viewport
pub trait Viewport {
    /// Visible area (`innerWidth` x `innerHeight`)
    fn size(&self) -> Size;

    /// Full scrollable document extent
    fn document_size(&self) -> Size;
}
