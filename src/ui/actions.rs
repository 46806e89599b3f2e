/// Everything the UI layer can ask the grid to do. Key and mouse handling
/// translate raw terminal events into these; the application loop applies
/// them to the `GridState`.
#[derive(Debug, Clone, PartialEq)]
pub enum GridAction {
    // Cursor movement
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    PageUp,
    PageDown,
    FirstRow,
    LastRow,

    /// Scroll the viewport by a signed distance in logical units.
    ScrollBy(i64),

    // Selection
    ToggleSelect,
    SelectAllVisible,
    ClearSelection,

    // Expansion
    ToggleExpand,

    // Sorting
    SortCurrentColumn,
    ClickHeader(String),

    // Column layout
    HideCurrentColumn,
    MoveColumnLeft,
    MoveColumnRight,
    WidenColumn,
    NarrowColumn,
    ResetLayout,
    BeginResize { column_id: String, pointer_x: i32 },
    ResizeTo { pointer_x: i32 },
    EndResize,
    DragHeaderOver { dragged: String, target: String },
    EndDrag,

    // Editing
    BeginEdit,

    // Rows
    ClickRow { view_idx: usize },

    // Misc
    CycleDensity,
    YankCell,
    YankRow,
    Quit,
}
