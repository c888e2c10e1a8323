pub mod avatar;
pub mod compose;
pub mod layout;
pub mod renderer;

pub use avatar::{AvatarSource, HttpAvatarSource};
pub use renderer::{CardRenderer, CardRequest};
