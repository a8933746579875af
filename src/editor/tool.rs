//! Editing tools.

/// The tool pointer events are routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Click to add draft vertices
    #[default]
    Draw,
    /// Pick, drag and insert vertices
    Select,
    /// Drag whole polygons
    Move,
    /// Remove vertices
    Erase,
}

impl Tool {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Draw => "Draw",
            Tool::Select => "Select",
            Tool::Move => "Move",
            Tool::Erase => "Erase",
        }
    }
}
