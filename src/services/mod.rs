pub mod relay;
pub mod session;

pub use relay::ConversationRelay;
pub use session::SessionService;
