mod league;
mod points;
mod roster;

pub use league::*;
pub use points::*;
pub use roster::*;
