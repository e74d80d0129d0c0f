pub mod types;

pub use types::ChannelType;
