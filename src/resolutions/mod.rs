//! # Resolutions
//!
//! Ready-made leaf handlers that end (or nearly end) a chain. Application
//! handlers return one of these as their successor:
//!
//! | Handler | Effect |
//! |---|---|
//! | [`Redirect`] | `302` to a URL or to another handler's URI |
//! | [`View`] | forward to a dynamic template, rendered with the request attributes |
//! | [`Text`] | plain-text body |

mod redirect;
mod text;
mod view;

pub use redirect::Redirect;
pub use text::Text;
pub use view::View;
