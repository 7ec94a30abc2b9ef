//! Element types and the promotion lattice.

mod promote;
mod type_id;

pub use promote::{common_type, promote};
pub use type_id::{Resolution, TypeId};
