//! Randomization generators
//!
//! All generators take the random source as an argument instead of
//! owning one, so a single seeded `StdRng` drives a whole conversion.

pub mod indent;
pub mod spacing;
pub mod strength;
pub mod tilt;
pub mod walk;

pub use indent::IndentGenerator;
pub use spacing::LineSpacingGenerator;
pub use strength::Strength;
pub use tilt::{HandwritingTiltSimulator, TiltState};
pub use walk::{BoundedRandomWalk, CharacterPositionJitter, CharacterSizeJitter, WalkState};
