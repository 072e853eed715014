// SPDX-License-Identifier: MIT
//
// Terminal control: raw mode, alternate screen, resize signal, and input
// polling.
//
// Safety: termios (tcgetattr, tcsetattr), ioctl (TIOCGWINSZ), isatty,
// sigaction, poll, and raw fd reads/writes are the POSIX interfaces for
// terminal control. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// `Terminal` owns the raw state and restores it on drop. A panic hook writes
// a prebuilt restore sequence straight to fd 1 (bypassing the stdout lock,
// which the panicking frame may hold) and resets termios, so a crash never
// leaves the user's shell without echo.
//
// Resizes arrive as SIGWINCH. The handler only sets an atomic flag; the
// driver picks it up on its next poll, which the signal interrupts.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, Once};
use std::time::Duration;

use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

/// Query the terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal or the query fails.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Whether stdin is connected to a terminal.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── SIGWINCH ───────────────────────────────────────────────────────────────

static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);
static SIGWINCH_INSTALLED: Once = Once::new();

/// Install the resize handler (once per process).
///
/// No `SA_RESTART`: a resize must interrupt a blocking `poll`.
#[cfg(unix)]
fn install_sigwinch_handler() {
    SIGWINCH_INSTALLED.call_once(|| unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = 0;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    });
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

/// Consume the pending-resize flag.
pub fn take_resize() -> bool {
    SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed)
}

// ─── Input ──────────────────────────────────────────────────────────────────

/// Wait until stdin is readable.
///
/// `None` waits indefinitely. Returns `Ok(false)` on timeout and when a
/// signal interrupted the wait.
///
/// # Errors
///
/// Returns the OS error from `poll(2)` for anything other than `EINTR`.
#[cfg(unix)]
pub fn poll_stdin(timeout: Option<Duration>) -> io::Result<bool> {
    let millis = timeout.map_or(-1, |t| libc::c_int::try_from(t.as_millis()).unwrap_or(libc::c_int::MAX));
    let mut fds = libc::pollfd {
        fd: libc::STDIN_FILENO,
        events: libc::POLLIN,
        revents: 0,
    };
    let n = unsafe { libc::poll(&raw mut fds, 1, millis) };
    if n < 0 {
        let err = io::Error::last_os_error();
        return if err.kind() == io::ErrorKind::Interrupted {
            Ok(false)
        } else {
            Err(err)
        };
    }
    Ok(n > 0)
}

#[cfg(not(unix))]
pub fn poll_stdin(_timeout: Option<Duration>) -> io::Result<bool> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "terminal input requires a unix platform"))
}

/// Read whatever bytes stdin has ready. `Ok(0)` means end of input.
///
/// # Errors
///
/// Returns the OS error from `read(2)`.
#[cfg(unix)]
pub fn read_stdin(buf: &mut [u8]) -> io::Result<usize> {
    let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
    usize::try_from(n).map_err(|_| io::Error::last_os_error())
}

#[cfg(not(unix))]
pub fn read_stdin(_buf: &mut [u8]) -> io::Result<usize> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "terminal input requires a unix platform"))
}

// ─── Saved State ────────────────────────────────────────────────────────────

/// Termios as it was before raw mode, shared with the panic hook so a crash
/// can put it back. `None` while not in raw mode.
#[cfg(unix)]
static SAVED_TERMIOS: Mutex<Option<libc::termios>> = Mutex::new(None);

/// SGR reset, cursor on, primary screen.
const RESTORE_SEQUENCE: &[u8] = b"\x1b[0m\x1b[?25h\x1b[?1049l";

static PANIC_HOOK: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_after_panic();
            previous(info);
        }));
    });
}

/// Best-effort restore from inside a panic. Writes to fd 1 directly since
/// the panicking thread may hold the stdout lock.
fn restore_after_panic() {
    #[cfg(unix)]
    {
        unsafe {
            let _ = libc::write(
                libc::STDOUT_FILENO,
                RESTORE_SEQUENCE.as_ptr().cast::<libc::c_void>(),
                RESTORE_SEQUENCE.len(),
            );
        }
        let saved = SAVED_TERMIOS.lock().ok().and_then(|g| *g);
        if let Some(t) = saved {
            let _ = set_termios(&t, libc::TCSANOW);
        }
    }

    #[cfg(not(unix))]
    {
        let mut out = io::stdout();
        let _ = out.write_all(RESTORE_SEQUENCE);
        let _ = out.flush();
    }
}

// ─── Raw Mode ───────────────────────────────────────────────────────────────

#[cfg(unix)]
fn get_termios() -> io::Result<libc::termios> {
    let mut t: libc::termios = unsafe { std::mem::zeroed() };
    if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut t) } == 0 {
        Ok(t)
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(unix)]
fn set_termios(t: &libc::termios, when: libc::c_int) -> io::Result<()> {
    if unsafe { libc::tcsetattr(libc::STDIN_FILENO, when, t) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Switch stdin to raw mode, remembering the previous settings.
#[cfg(unix)]
fn enable_raw_mode() -> io::Result<()> {
    let saved = get_termios()?;
    let mut raw_mode = saved;
    unsafe { libc::cfmakeraw(&raw mut raw_mode) };
    // Block for at least one byte; poll() decides when to read.
    raw_mode.c_cc[libc::VMIN] = 1;
    raw_mode.c_cc[libc::VTIME] = 0;

    if let Ok(mut slot) = SAVED_TERMIOS.lock() {
        *slot = Some(saved);
    }
    set_termios(&raw_mode, libc::TCSAFLUSH)
}

#[cfg(unix)]
fn disable_raw_mode() -> io::Result<()> {
    let saved = SAVED_TERMIOS.lock().ok().and_then(|mut g| g.take());
    saved.map_or(Ok(()), |t| set_termios(&t, libc::TCSAFLUSH))
}

#[cfg(not(unix))]
fn enable_raw_mode() -> io::Result<()> {
    Ok(())
}

#[cfg(not(unix))]
fn disable_raw_mode() -> io::Result<()> {
    Ok(())
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Full-screen session on the controlling terminal. Dropping an active
/// handle restores the terminal.
///
/// ```no_run
/// use ted_term::terminal::Terminal;
///
/// let mut term = Terminal::new();
/// term.enter()?;
/// // draw, read keys
/// term.leave()?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Terminal {
    active: bool,
}

impl Terminal {
    #[must_use]
    pub const fn new() -> Self {
        Self { active: false }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Raw input, alternate screen, hidden cursor. Does nothing when
    /// already active.
    ///
    /// # Errors
    ///
    /// Fails when stdin is not a terminal or termios cannot be changed.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        if !is_tty() {
            return Err(io::Error::other("standard input is not a terminal"));
        }

        install_panic_hook();
        install_sigwinch_handler();
        enable_raw_mode()?;

        let mut out = io::stdout().lock();
        ansi::enter_alt_screen(&mut out)?;
        ansi::cursor_hide(&mut out)?;
        ansi::clear_screen(&mut out)?;
        out.flush()?;

        self.active = true;
        tracing::debug!("raw mode on");
        Ok(())
    }

    /// Undo [`enter`](Self::enter). Does nothing when inactive.
    ///
    /// # Errors
    ///
    /// Fails when the restore sequence cannot be written or termios cannot
    /// be reset.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        {
            let mut out = io::stdout().lock();
            ansi::reset(&mut out)?;
            ansi::cursor_show(&mut out)?;
            ansi::exit_alt_screen(&mut out)?;
            out.flush()?;
        }
        disable_raw_mode()?;
        tracing::debug!("raw mode off");
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_terminal_is_inactive() {
        let term = Terminal::new();
        assert!(!term.is_active());
    }

    #[test]
    fn leave_when_inactive_is_noop() {
        let mut term = Terminal::new();
        assert!(term.leave().is_ok());
    }

    #[test]
    fn resize_flag_is_consumed() {
        SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
        assert!(take_resize());
        assert!(!take_resize());
    }
}
