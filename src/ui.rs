use crate::app::{App, Focus};
use crate::braille::BrailleCanvas;
use crate::classify::color_for;
use crate::format::format_population;
use crate::layout::YEARS_LABEL;
use crate::map::{MapView, Viewport, PEN_EMPHASIZED};
use crate::panels::INFO_TITLE;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

/// Outline colour of the emphasized style
const EMPHASIS_GREY: Color = Color::Rgb(0x66, 0x66, 0x66);
const SWATCH: &str = "██";

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let layout = app.layout;

    render_header(frame, app, layout.header);
    render_years(frame, app, layout.years);
    render_map(frame, app, layout.map);
    render_search(frame, app, layout.search);
    render_list(frame, app, layout.list);
    render_status_bar(frame, app, layout.status);
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let border = if focused { Color::Yellow } else { Color::DarkGray };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let state = &app.state;
    let mut spans = vec![Span::styled(
        format!(" {INFO_TITLE} "),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    spans.push(Span::styled("| ", Style::default().fg(Color::DarkGray)));
    if state.dataset.year().is_some() {
        spans.push(Span::raw(format!(
            "Total population of Indonesia ({}): ",
            state.current_year
        )));
        spans.push(Span::styled(
            format!("{} people", format_population(app.total_population())),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    } else {
        spans.push(Span::styled(
            "Loading population data...",
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_years(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(YEARS_LABEL, Style::default().fg(Color::DarkGray))];
    for (idx, (_, _, year, active)) in app.years.buttons().enumerate() {
        if idx > 0 {
            spans.push(Span::raw(" "));
        }
        let style = if active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {year} "), style));
    }
    if app.years.is_empty() {
        spans.push(Span::styled("...", Style::default().fg(Color::DarkGray)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = pane_block(" Indonesia ".to_string(), app.focus == Focus::Map);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let map_widget = MapWidget {
        view: &app.map,
        outlines: app.map.outlines(inner.width as usize, inner.height as usize),
    };
    frame.render_widget(map_widget, inner);

    render_info(frame, app, inner);
    render_legend(frame, app, inner);
}

/// Filled province cells with braille outlines on top
struct MapWidget<'a> {
    view: &'a MapView,
    outlines: BrailleCanvas,
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for row in 0..area.height {
            for col in 0..area.width {
                let cell = &mut buf[(area.x + col, area.y + row)];
                if let Some(band) = self.view.cell_band(col, row) {
                    cell.set_bg(band.color());
                }
                if let Some(ch) = self.outlines.glyph(col as usize, row as usize) {
                    let fg = if self.outlines.pen_at(col as usize, row as usize) == PEN_EMPHASIZED
                    {
                        EMPHASIS_GREY
                    } else {
                        Color::White
                    };
                    cell.set_char(ch).set_fg(fg);
                }
            }
        }
    }
}

/// Clamp an overlay to the map area
fn overlay(inner: Rect, x: u16, y: u16, width: u16, height: u16) -> Rect {
    Rect::new(x, y, width, height).intersection(inner)
}

fn render_info(frame: &mut Frame, app: &App, inner: Rect) {
    let lines = app.info.lines();
    let text_width = lines
        .iter()
        .map(|l| l.chars().count())
        .chain(std::iter::once(INFO_TITLE.chars().count()))
        .max()
        .unwrap_or(0) as u16;
    let width = text_width + 4;
    let height = lines.len() as u16 + 2;
    let area = overlay(
        inner,
        (inner.x + inner.width).saturating_sub(width + 1),
        inner.y + 1,
        width,
        height,
    );
    if area.is_empty() {
        return;
    }

    let body: Vec<Line> = match app.info.current() {
        Some(_) => vec![
            Line::from(Span::styled(
                lines[0].clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(lines[1].clone()),
        ],
        None => vec![Line::from(Span::styled(
            lines[0].clone(),
            Style::default().fg(Color::DarkGray),
        ))],
    };

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(body).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(
                    format!(" {INFO_TITLE} "),
                    Style::default().fg(Color::Cyan),
                )),
        ),
        area,
    );
}

fn render_legend(frame: &mut Frame, app: &App, inner: Rect) {
    let entries = app.legend.entries();
    let width = (app.legend.label_width() + SWATCH.chars().count() + 1 + 4) as u16;
    let height = entries.len() as u16 + 2;
    let area = overlay(
        inner,
        (inner.x + inner.width).saturating_sub(width + 1),
        (inner.y + inner.height).saturating_sub(height + 1),
        width,
        height,
    );
    if area.is_empty() {
        return;
    }

    let body: Vec<Line> = entries
        .iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled(SWATCH, Style::default().fg(entry.band.color())),
                Span::raw(" "),
                Span::raw(entry.label.clone()),
            ])
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(body).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(" Population ", Style::default().fg(Color::Cyan))),
        ),
        area,
    );
}

fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Search;
    let block = pane_block(" Search (/) ".to_string(), focused);
    let line = if app.state.search.is_empty() && !focused {
        Line::from(Span::styled(
            "Search province...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut spans = vec![Span::raw(app.state.search.clone())];
        if focused {
            spans.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
        }
        Line::from(spans)
    };
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::List;
    let block = pane_block(
        format!(" Provinces ({}) ", app.list.rows().len()),
        focused,
    );
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width as usize;
    let selected = app.list.selected_index();
    let lines: Vec<Line> = app
        .list
        .visible(inner.height as usize)
        .map(|(idx, row)| {
            // Swatch, name, right-aligned population
            let label_width = row.label.chars().count();
            let name_width = width.saturating_sub(label_width + 4);
            let name: String = row.name.chars().take(name_width).collect();
            let text = format!(
                "{name:<name_width$} {label:>label_width$}",
                label = row.label
            );

            let mut style = Style::default();
            if app.state.hovered.as_ref() == Some(&row.id) {
                style = style.fg(Color::Yellow);
            }
            if idx == selected {
                style = if focused {
                    style.add_modifier(Modifier::REVERSED)
                } else {
                    style.add_modifier(Modifier::BOLD)
                };
            }
            Line::from(vec![
                Span::styled(
                    SWATCH,
                    Style::default().fg(color_for(row.population).color()),
                ),
                Span::raw(" "),
                Span::styled(text, style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn center_coords(viewport: &Viewport) -> String {
    format!(
        "{:.1}°{}, {:.1}°{}",
        viewport.center_lat.abs(),
        if viewport.center_lat >= 0.0 { "N" } else { "S" },
        viewport.center_lon.abs(),
        if viewport.center_lon >= 0.0 { "E" } else { "W" }
    )
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let viewport = &app.map.viewport;
    let mut spans = Vec::new();

    if let Some(err) = &app.state.status {
        spans.push(Span::styled(
            format!(" {err} "),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled("| ", Style::default().fg(Color::DarkGray)));
    } else if app.state.pending > 0 {
        spans.push(Span::styled(" Loading... ", Style::default().fg(Color::Yellow)));
        spans.push(Span::styled("| ", Style::default().fg(Color::DarkGray)));
    }

    spans.extend([
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{:.1}x", viewport.zoom),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(center_coords(viewport), Style::default().fg(Color::Cyan)),
        Span::styled(
            " | Tab:pane /:search [ ]:year hjkl:pan +/-:zoom r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
