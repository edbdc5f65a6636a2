pub mod requests;
pub mod responses;

pub use requests::{validate_nickname, ClientCommand};
pub use responses::{GameSnapshot, ServerEvent};
