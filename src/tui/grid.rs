use crate::shared::{PadId, PadView, GRID_COLS, GRID_ROWS};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

pub fn draw_pad_grid(frame: &mut Frame, area: Rect, pads: &[PadView], cursor: PadId) {
    let row_constraints = [Constraint::Ratio(1, GRID_ROWS as u32); GRID_ROWS];
    let col_constraints = [Constraint::Ratio(1, GRID_COLS as u32); GRID_COLS];

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(row_constraints)
        .split(area);

    for (row_idx, row_area) in rows.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(col_constraints)
            .split(*row_area);

        for (col_idx, cell_area) in cols.iter().enumerate() {
            let pad_idx = row_idx * GRID_COLS + col_idx;
            let Some(pad) = pads.get(pad_idx) else { continue };
            draw_pad(frame, *cell_area, pad, pad_idx == cursor.index());
        }
    }
}

fn draw_pad(frame: &mut Frame, area: Rect, pad: &PadView, selected: bool) {
    let fill = if pad.playing {
        Style::default().fg(Color::White).bg(Color::LightRed)
    } else if pad.loaded {
        Style::default().fg(Color::White).bg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let border = if selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let icon = if pad.generating {
        "…"
    } else if !pad.loaded {
        "+"
    } else if pad.playing {
        "■"
    } else {
        "▶"
    };
    let mut lines = vec![Line::from(icon)];
    if pad.loaded {
        lines.push(Line::from(pad.label.clone()));
        let mut flags = String::new();
        if pad.looping {
            flags.push_str("⟳ ");
        }
        if pad.repeat_interval_ms > 0 {
            flags.push_str(&format!("{}ms", pad.repeat_interval_ms));
        }
        lines.push(Line::from(flags));
    }

    let block = Block::default().borders(Borders::ALL).border_style(border);
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).style(fill).block(block),
        area,
    );
}
