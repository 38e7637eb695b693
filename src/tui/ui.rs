//! UI rendering for the debugger.

use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use super::app::DebuggerApp;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &DebuggerApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(frame.area());

    // Left side: program and status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(8),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_program(frame, left_chunks[0], app);
    draw_registers(frame, left_chunks[1], app);
    draw_status(frame, left_chunks[2], app);

    // Right side: memory and help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(6)])
        .split(chunks[1]);

    draw_memory(frame, right_chunks[0], app);
    draw_help(frame, right_chunks[1]);
}

/// Draw the program pane with the pc cursor and breakpoints.
fn draw_program(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let window = app.disassembly_window((area.height as usize).saturating_sub(2));

    let items: Vec<ListItem> = window
        .iter()
        .map(|(pc, text, is_current)| {
            let prefix = if *is_current { "▶ " } else { "  " };
            let bp = if app.breakpoints.contains(pc) { "●" } else { " " };
            let line = format!("{}{}{:3X}: {}", bp, prefix, pc, text);

            let style = if *is_current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if app.breakpoints.contains(pc) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };

            ListItem::new(line).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Program ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(list, area);
}

/// Draw register state as hex words.
fn draw_registers(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let mut lines = vec![Line::from(vec![
        Span::raw("pc: "),
        Span::styled(format!("{:X}", app.pc), Style::default().fg(Color::Yellow)),
        Span::raw("   cycles: "),
        Span::styled(
            format!("{}", app.machine.cycles),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("   jumps: "),
        Span::styled(
            format!("{}", app.machine.jumps),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("   state: "),
        Span::styled(
            format!("{:?}", app.machine.state),
            if app.machine.is_running() {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Red)
            },
        ),
    ])];

    let non_zero = app.machine.regs.non_zero();
    if non_zero.is_empty() {
        lines.push(Line::from(Span::styled(
            "all registers zero",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for chunk in non_zero.chunks(4) {
        let mut spans = Vec::new();
        for (number, word) in chunk {
            spans.push(Span::raw(format!("r{}: ", number)));
            spans.push(Span::styled(
                word.to_hex(),
                Style::default().fg(Color::White),
            ));
            spans.push(Span::raw("   "));
        }
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Registers ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)),
    );

    frame.render_widget(paragraph, area);
}

/// Draw the sparse memory view.
fn draw_memory(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let visible_rows = (area.height as usize).saturating_sub(2);
    let cells = app.machine.mem.non_zero();
    let start = app.mem_scroll.min(cells.len().saturating_sub(1));
    let end = (start + visible_rows).min(cells.len());

    let items: Vec<ListItem> = cells[start..end]
        .iter()
        .map(|(address, value)| {
            let text = format!("{:04X}: {} = {}", address, value.to_hex(), value.to_u16());
            ListItem::new(text).style(Style::default().fg(Color::White))
        })
        .collect();

    let title = format!(" Memory ({} non-zero) ", cells.len());
    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)),
    );

    frame.render_widget(list, area);
}

/// Draw status bar.
fn draw_status(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default().title(" Status ").borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Draw help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("s: Step  r: Run  p: Pause  b: Breakpoint"),
        Line::from("x: Reset  ↑↓: Scroll memory  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default().title(" Help ").borders(Borders::ALL));

    frame.render_widget(help, area);
}
