use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use province_map::api::{Completion, HttpTransport};
use province_map::app::{App, Focus};
use province_map::config::{Args, Config};
use province_map::ui;
use ratatui::DefaultTerminal;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::mpsc::{self, Receiver};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = Config::from_args(Args::parse())?;
    init_logging(&config.log_file)?;
    info!(base_url = %config.base_url, year = %config.initial_year, "province-map starting");

    let (tx, rx) = mpsc::channel();
    let transport = HttpTransport::new(&config, tx)?;

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, &config, transport, rx);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    if let Err(e) = &result {
        error!(error = %e, "exited with error");
    }
    result
}

/// The terminal belongs to the UI, so logs go to a file
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn handle_mouse(app: &mut App, mouse: MouseEvent, now: Instant) {
    let (col, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Moved => app.pointer_moved(col, row),
        // Scroll wheel zooms the map or scrolls the list
        MouseEventKind::ScrollUp => app.wheel(col, row, true),
        MouseEventKind::ScrollDown => app.wheel(col, row, false),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        // Click, or click and drag to pan
        MouseEventKind::Down(MouseButton::Left) => app.mouse_down(col, row, now),
        MouseEventKind::Drag(MouseButton::Left) => {
            app.mouse_drag(col, row);
            app.pointer_moved(col, row);
        }
        MouseEventKind::Up(MouseButton::Left) => app.mouse_up(col, row),
        _ => {}
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Tab => app.focus = Focus::List,
        KeyCode::Backspace => app.pop_search(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => app.clear_search(),
        KeyCode::Char(ch) => app.push_search(ch),
        _ => {}
    }
}

fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }
    if app.focus == Focus::Search {
        handle_search_key(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Tab => {
            app.focus = match app.focus {
                Focus::Map => Focus::List,
                _ => Focus::Map,
            }
        }
        KeyCode::Char('/') => app.focus = Focus::Search,

        // Years
        KeyCode::Char('[') => app.prev_year(),
        KeyCode::Char(']') => app.next_year(),
        KeyCode::Char(d @ '1'..='9') => app.select_year(d as usize - '1' as usize),

        // Zoom
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

        // Reset view
        KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

        _ if app.focus == Focus::List => match key.code {
            KeyCode::Up | KeyCode::Char('k') => app.list_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.list_next(),
            KeyCode::PageUp => app.list_scroll(-(app.layout.list_inner.height as i32)),
            KeyCode::PageDown => app.list_scroll(app.layout.list_inner.height as i32),
            KeyCode::Enter => app.focus_selected(now),
            _ => {}
        },

        // Pan with hjkl or arrow keys
        KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
        KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
        KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
        KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

        _ => {}
    }
}

fn run(
    terminal: &mut DefaultTerminal,
    config: &Config,
    transport: HttpTransport,
    completions: Receiver<Completion>,
) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(
        Box::new(transport),
        config.initial_year.clone(),
        config.capabilities,
        size.width,
        size.height,
    );
    app.start();

    // Main loop
    loop {
        // Apply whatever finished since the last frame, in arrival order
        while let Ok(completion) = completions.try_recv() {
            app.apply(completion);
        }
        app.tick(Instant::now());
        app.prepare_frame();

        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                // Only handle key press events (not release)
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key(&mut app, key, Instant::now());
                }
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse, Instant::now()),
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    info!("province-map exiting");
    Ok(())
}
