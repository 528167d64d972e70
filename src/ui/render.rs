use ratatui::layout::Rect;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Clear, Paragraph};
use ratatui::Frame;

use crate::kernel::Kernel;
use crate::ui::layout::{layout_regions, overlay_regions};

pub fn draw(frame: &mut Frame<'_>, kernel: &Kernel) {
    let area = frame.area();

    if let Some(overlay) = &kernel.display.overlay {
        draw_overlay(frame, area, overlay);
        return;
    }

    let (output_area, input_area) = layout_regions(area);

    // Output pane, pinned to the bottom like a terminal scrollback.
    let lines = kernel.display.lines();
    let visible = output_area.height as usize;
    let start = lines.len().saturating_sub(visible);
    let output = Text::from(lines[start..].to_vec());
    frame.render_widget(Paragraph::new(output), output_area);

    // Prompt + in-progress line, cursor at the edit position.
    let fg = kernel.foreground();
    let core = kernel.core(fg);
    let mut line = core
        .and_then(|c| c.prompt.as_ref())
        .map(|p| p.render().lines.into_iter().next().unwrap_or_default())
        .unwrap_or_default();
    let prompt_width: usize = line.spans.iter().map(|s| s.content.chars().count()).sum();
    let content = kernel.display.input.content();
    let shown = if core.is_some_and(|c| c.password) {
        "*".repeat(content.chars().count())
    } else {
        content.to_string()
    };
    line.spans.push(Span::raw(shown));
    frame.render_widget(Paragraph::new(line), input_area);

    if core.is_some_and(|c| c.input_enabled) {
        let cursor_x = input_area.x
            + (prompt_width + kernel.display.input.cursor()).min(input_area.width.saturating_sub(1) as usize)
                as u16;
        frame.set_cursor_position((cursor_x, input_area.y));
    }
}

fn draw_overlay(frame: &mut Frame<'_>, area: Rect, overlay: &crate::kernel::Overlay) {
    frame.render_widget(Clear, area);
    let (content_area, status_area) = overlay_regions(area);

    // Scroll so the cursor line stays visible.
    let visible = content_area.height as usize;
    let top = overlay
        .cursor_line
        .saturating_sub(visible.saturating_sub(1));
    let end = (top + visible).min(overlay.lines.len());
    let lines: Vec<Line<'static>> = overlay.lines[top.min(end)..end].to_vec();
    frame.render_widget(Paragraph::new(Text::from(lines)), content_area);
    frame.render_widget(Paragraph::new(overlay.status.clone()), status_area);

    let cursor_y = content_area.y + (overlay.cursor_line - top.min(overlay.cursor_line)) as u16;
    let cursor_x = content_area.x
        + overlay
            .cursor_col
            .min(content_area.width.saturating_sub(1) as usize) as u16;
    if content_area.height > 0 {
        frame.set_cursor_position((cursor_x, cursor_y.min(content_area.bottom().saturating_sub(1))));
    }
}
