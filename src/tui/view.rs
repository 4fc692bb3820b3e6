use crate::shared::{DisplayState, Overlay};
use super::grid::draw_pad_grid;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

const HELP: &str = "arrows/hjkl move  enter play/stop  o loop  [ ] vol  - = rate  , . repeat  x clear  9 0 master  K key  C clear all  E/I export/import  esc quit";

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title + master volume
            Constraint::Min(15),   // pad grid
            Constraint::Length(3), // selected pad details
            Constraint::Length(2), // status + help
        ])
        .split(area);

    draw_header(frame, sections[0], state);
    draw_pad_grid(frame, sections[1], &state.pads, state.cursor);
    draw_pad_details(frame, sections[2], state);
    draw_status(frame, sections[3], state);

    match &state.overlay {
        Overlay::None => {}
        Overlay::Generate { pad, draft, examples, selected_example, in_flight, can_submit } => {
            let mut lines = vec![
                Line::from("Describe the sound you want to generate."),
                Line::from(""),
                Line::from(Span::styled(format!("> {draft}▏"), Style::default().fg(Color::White))),
                Line::from(""),
                Line::from(Span::styled("Example prompts (tab):", Style::default().fg(Color::Gray))),
            ];
            for (i, example) in examples.iter().enumerate() {
                let style = if *selected_example == Some(i) {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                lines.push(Line::from(Span::styled(format!("  {example}"), style)));
            }
            lines.push(Line::from(""));
            let action = if *in_flight {
                Span::styled("Generating...", Style::default().fg(Color::Yellow))
            } else if *can_submit {
                Span::styled("[enter] Generate Sound", Style::default().fg(Color::Cyan))
            } else {
                Span::styled("[enter] Generate Sound", Style::default().fg(Color::DarkGray))
            };
            lines.push(Line::from(vec![action, Span::raw("   [esc] close")]));
            draw_popup(frame, area, &format!(" Generate New Sound · pad {} ", pad.0 + 1), lines);
        }
        Overlay::ApiKey { masked, can_save } => {
            let save_style = if *can_save { Style::default().fg(Color::Cyan) } else { Style::default().fg(Color::DarkGray) };
            let lines = vec![
                Line::from("Enter your ElevenLabs API key."),
                Line::from(""),
                Line::from(format!("> {masked}▏")),
                Line::from(""),
                Line::from(vec![Span::styled("[enter] Save API Key", save_style), Span::raw("   [esc] cancel")]),
            ];
            draw_popup(frame, area, " ElevenLabs API Key ", lines);
        }
        Overlay::Notice(text) => {
            let mut lines: Vec<Line> = text.lines().map(|l| Line::from(l.to_string())).collect();
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("press any key", Style::default().fg(Color::DarkGray))));
            draw_popup(frame, area, " Notice ", lines);
        }
    }
}

fn draw_header(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let filled = (state.master_volume * 10.0).round() as usize;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(10usize.saturating_sub(filled)));
    let key = if state.api_key_set {
        Span::styled("key ✓", Style::default().fg(Color::Green))
    } else {
        Span::styled("no API key (K)", Style::default().fg(Color::Yellow))
    };
    let line = Line::from(vec![
        Span::styled("AI Sound Board", Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::raw("    master "),
        Span::styled(bar, Style::default().fg(Color::Cyan)),
        Span::raw(format!(" {:>3.0}%    ", state.master_volume * 100.0)),
        key,
    ]);
    frame.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn draw_pad_details(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let text = match state.pads.get(state.cursor.index()) {
        Some(pad) if pad.loaded => format!(
            "pad {}: {}   vol {:.0}%   rate {:.1}x   repeat {}ms   loop {}",
            state.cursor.0 + 1,
            pad.label,
            pad.volume * 100.0,
            pad.playback_rate,
            pad.repeat_interval_ms,
            if pad.looping { "on" } else { "off" },
        ),
        Some(pad) if pad.generating => format!("pad {}: generating...", state.cursor.0 + 1),
        _ => format!("pad {}: empty, press enter to generate a sound", state.cursor.0 + 1),
    };
    frame.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn draw_status(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let lines = vec![
        Line::from(Span::styled(state.status_text.clone(), Style::default().fg(Color::Gray))),
        Line::from(Span::styled(HELP, Style::default().fg(Color::DarkGray))),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_popup(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line>) {
    let height = (lines.len() as u16 + 2).min(area.height);
    let popup = centered(area, 60, height);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false })
            .block(Block::default().title(title.to_string()).borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan))),
        popup,
    );
}

// `width` is a percentage of the area, `height` is in rows
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = (u32::from(area.width) * u32::from(width) / 100) as u16;
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: w,
        height,
    }
}
