use ratatui::layout::Rect;

/// Split the frame into the output pane and the single input line at
/// the bottom.
pub fn layout_regions(area: Rect) -> (Rect, Rect) {
    let input_height = 1.min(area.height);
    let output = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: area.height.saturating_sub(input_height),
    };
    let input = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(input_height),
        width: area.width,
        height: input_height,
    };
    (output, input)
}

/// Overlay content area: everything above a one-line status bar.
pub fn overlay_regions(area: Rect) -> (Rect, Rect) {
    let status_height = 1.min(area.height);
    let content = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: area.height.saturating_sub(status_height),
    };
    let status = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(status_height),
        width: area.width,
        height: status_height,
    };
    (content, status)
}
