//! Component trait system
//!
//! - [`Component`]: identity + rendering
//! - [`Interactive`]: keyboard handling for focusable panels
//! - [`Scrollable`]: shared scroll navigation over a [`ScrollState`](crate::tui::scroll::ScrollState)
//! - [`Copyable`]: clipboard export

mod component;
mod copyable;
mod interactive;
mod scrollable;

pub use component::{Component, ComponentId, RenderContext};
pub use copyable::Copyable;
pub use interactive::{Handled, Interactive};
pub use scrollable::Scrollable;
