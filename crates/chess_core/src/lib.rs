pub mod clock;
pub mod pgn;
pub mod replay;
pub mod types;

// Re-export the game model and notation helpers
pub use clock::*;
pub use pgn::*;
pub use replay::*;
pub use types::*;
