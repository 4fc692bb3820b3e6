pub mod decode;
pub mod sound_cache;

pub use decode::decode_bytes;
pub use sound_cache::SoundCache;
