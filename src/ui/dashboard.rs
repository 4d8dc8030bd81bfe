use crate::ui::app::{App, FocusPanel};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, List, ListItem, Paragraph, Row, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Table,
    },
    Frame,
};

const BRAND_DARK: Color = Color::Rgb(0x1F, 0x2F, 0x3C);
const BRAND_SELECT_BG: Color = Color::Rgb(0xC3, 0xD3, 0xE0);
const BRAND_GREEN: Color = Color::Rgb(0x82, 0x9A, 0x68);
const BRAND_ORANGE: Color = Color::Rgb(0x9E, 0x68, 0x3C);
const BRAND_MUTED: Color = Color::Rgb(0x71, 0x65, 0x65);

const HEADER_STYLE: Style = Style::new().fg(BRAND_DARK).add_modifier(Modifier::BOLD);
const CURSOR_STYLE: Style = Style::new()
    .bg(BRAND_SELECT_BG)
    .fg(BRAND_DARK)
    .add_modifier(Modifier::BOLD);
const PICKED_COLOR: Color = BRAND_GREEN;

pub fn draw_dashboard(frame: &mut Frame, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Min(10),   // Main content
        Constraint::Length(3), // Footer
    ])
    .split(frame.area());

    draw_header(frame, chunks[0], app);
    draw_main_content(frame, chunks[1], app);
    draw_footer(
        frame,
        chunks[2],
        " ←→ Panel | ↑↓ Move | Space Select | a All | c Clear | s Strategy | t Quantities | q Quit ",
    );
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let timing = app
        .engine
        .last_elapsed_ms()
        .map_or_else(String::new, |ms| format!(" | {ms:.2} ms"));
    let title = format!(
        " IFC QTO | {} models | {} selected | strategy: {}{timing} ",
        app.model_keys.len(),
        app.selection.len(),
        app.engine.strategy().label(),
    );

    let header = Paragraph::new(title)
        .style(HEADER_STYLE)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn draw_main_content(frame: &mut Frame, area: Rect, app: &App) {
    if app.qto_visible {
        let chunks = Layout::horizontal([
            Constraint::Percentage(20), // Models
            Constraint::Percentage(45), // Elements
            Constraint::Percentage(35), // Quantification
        ])
        .split(area);

        draw_models(frame, chunks[0], app);
        draw_elements(frame, chunks[1], app);
        draw_quantities(frame, chunks[2], app);
    } else {
        let chunks = Layout::horizontal([Constraint::Percentage(25), Constraint::Percentage(75)])
            .split(area);

        draw_models(frame, chunks[0], app);
        draw_elements(frame, chunks[1], app);
    }
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(BRAND_ORANGE)
    } else {
        Style::default()
    }
}

fn draw_models(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus_panel == FocusPanel::Models;

    let items: Vec<ListItem> = app
        .engine
        .models()
        .enumerate()
        .map(|(i, model)| {
            let is_current = i == app.selected_model;
            let style = if is_current && is_focused {
                CURSOR_STYLE
            } else if is_current {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let index_marker = if app.engine.has_index(&model.key) {
                ""
            } else {
                " (no properties)"
            };

            ListItem::new(Line::from(vec![
                Span::styled(&model.key, style),
                Span::styled(
                    format!(" ({})", model.total_elements()),
                    Style::default().fg(PICKED_COLOR),
                ),
                Span::styled(index_marker, Style::default().fg(BRAND_MUTED)),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Models ")
            .borders(Borders::ALL)
            .border_style(border_style(is_focused)),
    );

    frame.render_widget(list, area);
}

fn draw_elements(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus_panel == FocusPanel::Elements;
    let elements = app.current_elements();
    let model_key = app.current_model().map(|m| m.key.as_str()).unwrap_or("-");

    // borders and header row
    let visible_rows = (area.height as usize).saturating_sub(3);
    let scroll_offset = if app.selected_element >= visible_rows {
        app.selected_element - visible_rows + 1
    } else {
        0
    };

    let header = Row::new(vec!["", "ID", "Type", "Name", "Level"])
        .style(HEADER_STYLE)
        .height(1);

    let rows: Vec<Row> = elements
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_rows)
        .map(|(i, element)| {
            let picked = app.is_selected(model_key, element.id);
            let style = if i == app.selected_element && is_focused {
                CURSOR_STYLE
            } else if picked {
                Style::default().fg(PICKED_COLOR).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            Row::new(vec![
                if picked { "●" } else { " " }.to_string(),
                format!("#{}", element.id),
                element.entity_type.trim_start_matches("IFC").to_string(),
                element.name.clone(),
                element.storey.clone().unwrap_or_else(|| "-".to_string()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(2),
        Constraint::Length(8),
        Constraint::Percentage(22),
        Constraint::Percentage(45),
        Constraint::Percentage(20),
    ];

    let title = format!(" {model_key} ({} elements) ", elements.len());
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style(is_focused)),
    );

    frame.render_widget(table, area);

    if elements.len() > visible_rows {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));
        let mut scrollbar_state = ScrollbarState::new(elements.len()).position(app.selected_element);

        let scrollbar_area = Rect {
            x: area.x + area.width - 1,
            y: area.y + 2,
            width: 1,
            height: area.height - 3,
        };
        frame.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
    }
}

fn draw_quantities(frame: &mut Frame, area: Rect, app: &App) {
    let result = app.engine.result();
    let kinds = app.engine.quantity_kinds();

    let mut lines: Vec<Line> = Vec::new();
    if result.is_empty() {
        lines.push(Line::styled(
            "Select elements to sum their quantities",
            Style::default().fg(BRAND_MUTED).add_modifier(Modifier::ITALIC),
        ));
    }

    for (set_name, quantities) in result.sets() {
        lines.push(Line::styled(set_name.to_string(), HEADER_STYLE));
        for (name, value) in quantities {
            let unit = kinds.get(set_name, name).map_or("", |k| k.unit());
            lines.push(Line::from(vec![
                Span::raw(format!("  {name}: ")),
                Span::styled(format!("{value:.2}"), Style::default().fg(PICKED_COLOR)),
                Span::styled(format!(" {unit}"), Style::default().fg(BRAND_MUTED)),
            ]));
        }
    }

    let panel = Paragraph::new(lines).block(
        Block::default()
            .title(" Quantification ")
            .borders(Borders::ALL),
    );

    frame.render_widget(panel, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, help: &str) {
    let footer = Paragraph::new(help)
        .style(Style::default().fg(BRAND_MUTED))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}
