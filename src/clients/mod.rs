//! Typed clients for the CMS REST backend, all sharing one [`ApiClient`].

pub mod admin_client;
pub mod api;
pub mod blog_client;
pub mod lead_client;
pub mod public_blog_client;
pub mod session;

pub use admin_client::*;
pub use api::*;
pub use blog_client::*;
pub use lead_client::*;
pub use public_blog_client::*;
pub use session::*;
