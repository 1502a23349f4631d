mod bind;
mod command;
mod info;
mod remove;
mod send_message;

pub use bind::*;
pub use command::*;
pub use info::*;
pub use remove::*;
pub use send_message::*;
