//! egui front end

pub mod app;
pub mod pane;
pub mod picker;
pub mod surface;

pub use app::ComparisonApp;
pub use pane::PlayerPane;
pub use picker::FilePicker;
pub use surface::TextureSurface;
