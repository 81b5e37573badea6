use super::Backend;
use crate::broadcast::Transmitter;

/// Backend without any store: configuration lives in process only.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryBackend;

impl Backend for MemoryBackend {}

pub type MemoryTransmitter = Transmitter<MemoryBackend>;

impl Default for MemoryTransmitter {
    fn default() -> Self {
        Self::memory()
    }
}

impl MemoryTransmitter {
    pub fn memory() -> Self {
        Transmitter::new(MemoryBackend)
    }
}
