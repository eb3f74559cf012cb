//! In-memory storage: rooms live as long as the process.

mod room;

pub use room::InMemoryRoomRepository;
