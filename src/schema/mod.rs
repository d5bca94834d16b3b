pub mod normalize;
pub mod types;

pub use normalize::{aliases, normalize, parse_int, ID_ALIASES};
pub use types::{Field, NormalizedRecord};
