mod message_sink;
mod shared;

pub use message_sink::MessageSink;
pub use shared::SharedSink;
