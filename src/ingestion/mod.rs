pub mod push_channel;

pub use push_channel::{push_endpoint, ChannelCore, ChannelState, PushChannel};
