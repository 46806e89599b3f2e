pub mod actions;
pub mod edit_widget;
pub mod grid_widget;
pub mod input;

pub use actions::GridAction;
pub use edit_widget::{CellEditor, EditorOutcome};
pub use grid_widget::{GridGeometry, GridTheme, GridWidget};
pub use input::{map_key, MouseTracker};
