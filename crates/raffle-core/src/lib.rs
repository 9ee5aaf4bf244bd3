// Library root: the raffle engine. Name normalization, duplicate
// resolution, participant and winner persistence, the draw engine, and the
// cosmetic shuffle animator.

pub mod animator;
pub mod config;
pub mod draw;
pub mod error;
pub mod ledger;
pub mod model;
pub mod normalize;
pub mod pool;
pub mod resolve;
pub mod store;
pub mod ticker;

pub use error::RaffleError;
pub use model::{Participant, ParticipantId, Winner};
pub use store::RaffleStore;
