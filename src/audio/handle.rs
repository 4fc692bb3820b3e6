use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

// Opaque reference to a clip the engine holds for a pad. Handles are never reused, so a
// command or event carrying an old handle can be recognised and dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub u64);

// atomic so generation worker threads can mint handles too
pub fn next_handle() -> SoundHandle {
    SoundHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
}
