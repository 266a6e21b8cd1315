pub mod changeset;
pub mod element;
pub mod note;
pub mod tags;
pub mod user;

pub use changeset::{Bounds, Changeset};
pub use element::{Element, ElementKind, ElementRef, Geometry, Member};
pub use note::{Note, NoteAction, NoteComment, NoteStatus};
pub use tags::Tags;
pub use user::UserInfo;
