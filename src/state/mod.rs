pub mod autopan;
pub mod camera;
pub mod geometry;
pub mod gesture;
pub mod input;
pub mod store;
pub mod touch;
pub mod viewport;

pub use autopan::IntervalScheduler;
pub use geometry::ViewportSize;
pub use gesture::{BoardController, GestureMode};
pub use viewport::Viewport;
