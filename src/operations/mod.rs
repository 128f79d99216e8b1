pub mod classify;
pub mod creation;
pub mod glue;
pub mod imprint;
pub mod timeout;
pub mod volume;

pub use classify::{ClassifyIntersection, IntersectResult, IntersectStatus, NEGATIVE_COMMON_RATIO};
pub use creation::MakeBox;
pub use glue::{snap_shapes, Glue};
pub use imprint::{Imprint, ImprintResult, ImprintStatus};
pub use timeout::TimeoutGuard;
pub use volume::non_negative_volume;
