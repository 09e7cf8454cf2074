mod conversation;
mod message;
mod principal;
mod support;

pub use conversation::Conversation;
pub use message::Message;
pub use principal::{NewPrincipal, Principal, Profile, PublicProfile, Role};
pub use support::{SupportRequest, SupportStatus};
