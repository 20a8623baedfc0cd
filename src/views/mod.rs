pub mod chat;
pub mod header;
pub mod login;

pub use chat::ChatView;
pub use header::ChatHeader;
pub use login::LoginView;
