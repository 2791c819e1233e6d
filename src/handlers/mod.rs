pub mod callback_handler;
pub mod command_handler;
pub mod creation_handler;
pub mod join_handler;
pub mod membership_handler;

pub use callback_handler::CallbackHandler;
pub use command_handler::CommandHandler;
pub use creation_handler::CreationHandler;
pub use join_handler::JoinHandler;
pub use membership_handler::MembershipHandler;
