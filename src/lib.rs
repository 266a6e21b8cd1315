//! Async client for the OpenStreetMap editing API (v0.6).
//!
//! Elements (nodes, ways, relations) are immutable values with
//! copy-returning mutators; the XML wire format is converted through a
//! JSON tree at the boundary and never leaks into the typed models. The
//! network sits behind the [`Transport`] trait, so everything above it
//! can run against a scripted double.

pub mod client;
pub mod error;
pub mod traits;
pub mod types;
pub mod xml;

pub use client::{ClientConfig, Credentials, NativeTransport, OsmClient};
pub use error::{OsmError, Result};
pub use traits::Transport;
pub use types::{
    Bounds, Changeset, Element, ElementKind, ElementRef, Geometry, Member, Note, NoteAction,
    NoteComment, NoteStatus, Tags, UserInfo,
};
