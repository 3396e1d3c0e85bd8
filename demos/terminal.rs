//! Terminal Example - The showcase state core driven by a real terminal
//!
//! Maps terminal input onto the page model:
//! - Mouse wheel scrolls a virtual page of four stacked sections
//! - Mouse movement feeds the pointer parallax sampler
//! - The hero typewriter runs on a wall-clock frame timer
//!
//! Press `q` or `Esc` to quit.
//!
//! Run with: cargo run --example terminal

use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, MouseEventKind},
    execute, queue,
    style::Print,
    terminal::{self, ClearType},
};
use spark_showcase::{
    host::events, mount, FrameClock, PageLayout, ShowcaseConfig, Snapshot,
};

/// Pixels per terminal cell, used to turn cell coordinates into client pixels.
const CELL_WIDTH: f64 = 10.0;
const CELL_HEIGHT: f64 = 20.0;

/// Pixels per wheel notch.
const WHEEL_STEP: f64 = 60.0;

/// Frame budget (~60fps).
const FRAME: Duration = Duration::from_millis(16);

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();

    let layout = Rc::new(PageLayout::stacked([
        ("home", 900.0),
        ("about", 700.0),
        ("projects", 1100.0),
        ("contact", 600.0),
    ]));
    let max_offset = layout.document_height();

    let (cols, rows) = terminal::size()?;
    events::set_viewport(f64::from(cols) * CELL_WIDTH, f64::from(rows) * CELL_HEIGHT);

    let clock = Rc::new(FrameClock::new());
    let handle = match mount(&ShowcaseConfig::default(), layout, clock.clone()) {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("mount failed: {err}");
            return Ok(());
        }
    };

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(stdout, terminal::EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;

    let result = run(&mut stdout, &clock, &handle, max_offset);

    execute!(stdout, cursor::Show, DisableMouseCapture, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    handle.unmount();
    result
}

fn run(
    stdout: &mut io::Stdout,
    clock: &FrameClock,
    handle: &spark_showcase::MountHandle,
    max_offset: f64,
) -> io::Result<()> {
    let mut offset = 0.0_f64;

    loop {
        let timeout = clock.time_until_next().map_or(FRAME, |next| next.min(FRAME));
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollDown => {
                        offset = (offset + WHEEL_STEP).min(max_offset);
                        events::dispatch_scroll(offset);
                    }
                    MouseEventKind::ScrollUp => {
                        offset = (offset - WHEEL_STEP).max(0.0);
                        events::dispatch_scroll(offset);
                    }
                    MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                        events::dispatch_pointer_move(
                            f64::from(mouse.column) * CELL_WIDTH,
                            f64::from(mouse.row) * CELL_HEIGHT,
                        );
                    }
                    _ => {}
                },
                Event::Resize(cols, rows) => {
                    events::set_viewport(f64::from(cols) * CELL_WIDTH, f64::from(rows) * CELL_HEIGHT);
                }
                _ => {}
            }
        }

        clock.run_due();
        draw(stdout, &handle.frame(), offset)?;
    }
}

fn draw(stdout: &mut io::Stdout, snapshot: &Snapshot, offset: f64) -> io::Result<()> {
    let active = snapshot
        .active
        .as_ref()
        .map_or("-".to_string(), |id| id.to_string());
    let revealed: Vec<String> = snapshot.revealed.iter().map(|id| id.to_string()).collect();

    queue!(stdout, terminal::Clear(ClearType::All), cursor::MoveTo(2, 1))?;
    queue!(stdout, Print(format!("> {}_", snapshot.text)), cursor::MoveTo(2, 3))?;
    queue!(
        stdout,
        Print(format!(
            "scroll {offset:>6.0}px  navbar {}  active [{active}]",
            if snapshot.scrolled { "solid" } else { "clear" }
        )),
        cursor::MoveTo(2, 4)
    )?;
    queue!(
        stdout,
        Print(format!(
            "parallax dx {:>6.2} dy {:>6.2}",
            snapshot.pointer.dx, snapshot.pointer.dy
        )),
        cursor::MoveTo(2, 5)
    )?;
    queue!(
        stdout,
        Print(format!(
            "hero offset {:>5.1}  opacity {:.2}",
            snapshot.hero_offset, snapshot.hero_opacity
        )),
        cursor::MoveTo(2, 6)
    )?;
    queue!(
        stdout,
        Print(format!("revealed: {}", revealed.join(", "))),
        cursor::MoveTo(2, 8),
        Print("wheel to scroll, move the mouse, q to quit")
    )?;
    stdout.flush()
}
