//! Client-side checks for the public lead forms.
//!
//! Post drafts are checked by [`DraftResource::validate`](crate::model::DraftResource::validate).

pub mod forms;

pub use forms::*;
