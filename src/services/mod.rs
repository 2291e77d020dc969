pub mod poll_loop;
pub mod session;

pub use poll_loop::PollLoop;
pub use session::{LiveView, Session};
