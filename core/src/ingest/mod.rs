pub mod frame;
pub mod source;

pub use frame::{FrameParser, RawReading};
pub use source::{ChannelSource, LineSource, SourceMessage};
