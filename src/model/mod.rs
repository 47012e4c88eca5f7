//! Pure data structures: the draft a run consumes, the values each step
//! produces, and the REST resources the clients exchange.

pub mod blog;
pub mod draft;
pub mod leads;
pub mod outcome;
pub mod progress;

pub use blog::*;
pub use draft::*;
pub use leads::*;
pub use outcome::*;
pub use progress::*;
