use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Position, Size};

use super::render::paint;
use super::surface::{Canvas, INTERRUPT, RESIZE, Surface};
use super::theme::Theme;

/// Longest single wait on stdin before checking for resize and signals
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Set from the signal handler, consumed by the input loop
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// The real terminal: raw mode on the alternate screen, drawn through
/// ratatui, with key codes read byte by byte from stdin.
pub struct TerminalSurface {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    theme: Theme,
    pending: VecDeque<u8>,
    last_size: Size,
    closed_input: bool,
}

impl TerminalSurface {
    pub fn open() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        // Restore the terminal on panic
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            tracing::error!(%panic_info, "panic");
            original_hook(panic_info);
        }));
        install_signal_handlers();

        let last_size = current_size()?;
        Ok(TerminalSurface {
            terminal,
            theme: Theme::default(),
            pending: VecDeque::new(),
            last_size,
            closed_input: false,
        })
    }

    /// Leave raw mode and the alternate screen
    pub fn close(mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()
    }

    /// Next code, waiting at most `wait` (forever when None)
    fn wait_for_code(&mut self, wait: Option<Duration>) -> io::Result<Option<i32>> {
        let deadline = wait.map(|w| Instant::now() + w);
        loop {
            if INTERRUPTED.swap(false, Ordering::SeqCst) || self.closed_input {
                return Ok(Some(INTERRUPT));
            }
            if let Some(byte) = self.pending.pop_front() {
                return Ok(Some(i32::from(byte)));
            }
            let size = current_size()?;
            if size != self.last_size {
                self.last_size = size;
                return Ok(Some(RESIZE));
            }

            let slice = match deadline {
                None => POLL_INTERVAL,
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        return Ok(None);
                    }
                    left.min(POLL_INTERVAL)
                }
            };
            match read_stdin(slice)? {
                Some(bytes) if bytes.is_empty() => {
                    tracing::info!("stdin closed");
                    self.closed_input = true;
                }
                Some(bytes) => self.pending.extend(bytes),
                None => {}
            }
        }
    }
}

impl Surface for TerminalSurface {
    fn size(&mut self) -> io::Result<Size> {
        current_size()
    }

    fn present(&mut self, canvas: &Canvas) -> io::Result<()> {
        let theme = &self.theme;
        self.terminal.draw(|frame| {
            paint(canvas, frame.buffer_mut(), theme);
            if let Some((row, col)) = canvas.cursor() {
                frame.set_cursor_position(Position::new(col, row));
            }
        })?;
        Ok(())
    }

    fn next_code(&mut self) -> io::Result<i32> {
        loop {
            if let Some(code) = self.wait_for_code(None)? {
                return Ok(code);
            }
        }
    }

    fn next_code_within(&mut self, wait: Duration) -> io::Result<Option<i32>> {
        self.wait_for_code(Some(wait))
    }
}

fn current_size() -> io::Result<Size> {
    let (width, height) = crossterm::terminal::size()?;
    Ok(Size::new(width, height))
}

#[cfg(unix)]
extern "C" fn on_signal(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Route SIGINT, SIGTERM and SIGHUP into the input loop as [`INTERRUPT`]
#[cfg(unix)]
fn install_signal_handlers() {
    let handler = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
    for signal in [libc::SIGINT, libc::SIGTERM, libc::SIGHUP] {
        // SAFETY: the handler only stores to an atomic
        let previous = unsafe { libc::signal(signal, handler) };
        if previous == libc::SIG_ERR {
            tracing::warn!(signal, "could not install signal handler");
        }
    }
}

#[cfg(not(unix))]
fn install_signal_handlers() {}

/// Wait up to `wait` for stdin to become readable and read what is there.
/// None means nothing arrived; an empty vector means end of input.
#[cfg(unix)]
fn read_stdin(wait: Duration) -> io::Result<Option<Vec<u8>>> {
    let mut fds = libc::pollfd {
        fd: libc::STDIN_FILENO,
        events: libc::POLLIN,
        revents: 0,
    };
    let timeout = libc::c_int::try_from(wait.as_millis()).unwrap_or(libc::c_int::MAX);
    // SAFETY: one valid pollfd, count matches
    let ready = unsafe { libc::poll(&mut fds, 1, timeout) };
    if ready < 0 {
        return not_ready_on_eintr();
    }
    if ready == 0 {
        return Ok(None);
    }

    let mut buf = [0u8; 64];
    // SAFETY: buf is valid for buf.len() bytes
    let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
    if n < 0 {
        return not_ready_on_eintr();
    }
    let n = usize::try_from(n).unwrap_or(0);
    Ok(Some(buf[..n].to_vec()))
}

#[cfg(unix)]
fn not_ready_on_eintr() -> io::Result<Option<Vec<u8>>> {
    let err = io::Error::last_os_error();
    if err.kind() == io::ErrorKind::Interrupted {
        Ok(None)
    } else {
        Err(err)
    }
}

#[cfg(not(unix))]
fn read_stdin(_wait: Duration) -> io::Result<Option<Vec<u8>>> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "raw terminal input is only available on unix",
    ))
}
