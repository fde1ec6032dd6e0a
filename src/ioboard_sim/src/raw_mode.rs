//! Serial-line console mode.
//!
//! Makes the console behave like the board's serial port: bytes arrive one
//! at a time, nothing is echoed, and the Enter key delivers a bare `\r`
//! instead of being translated to `\n`.
//!
//! - On **Unix**, it uses the `termios` crate to manipulate terminal attributes.
//! - On **Windows**, it uses the `winapi` crate to modify console modes.
//!
//! The original mode is restored when the guard is dropped.

use std::io;

/// Guard holding the console mode that was active before.
pub struct RawMode {
    #[cfg(unix)]
    /// Original terminal settings (Unix).
    original: termios::Termios,
    #[cfg(unix)]
    fd: i32,
    #[cfg(windows)]
    /// Original console mode (Windows).
    original_mode: u32,
}

impl RawMode {
    /// Switches the console to serial-line mode.
    ///
    /// On Unix, `fd` is the file descriptor (usually 0 for stdin).
    /// On Windows, the argument is ignored.
    #[cfg(unix)]
    pub fn new(fd: i32) -> io::Result<Self> {
        use termios::*;
        let original = Termios::from_fd(fd)?;
        let mut raw = original;
        raw.c_lflag &= !(ICANON | ECHO);
        raw.c_iflag &= !(ICRNL | INLCR | IGNCR);
        tcsetattr(fd, TCSANOW, &raw)?;
        Ok(RawMode { original, fd })
    }

    #[cfg(windows)]
    pub fn new(_: i32) -> io::Result<Self> {
        use winapi::um::{
            consoleapi::{GetConsoleMode, SetConsoleMode},
            handleapi::INVALID_HANDLE_VALUE,
            processenv::GetStdHandle,
            winbase::STD_INPUT_HANDLE,
            wincon::{ENABLE_ECHO_INPUT, ENABLE_LINE_INPUT},
        };
        unsafe {
            let handle = GetStdHandle(STD_INPUT_HANDLE);
            if handle == INVALID_HANDLE_VALUE {
                return Err(io::Error::last_os_error());
            }
            let mut mode = 0;
            if GetConsoleMode(handle, &mut mode) == 0 {
                return Err(io::Error::last_os_error());
            }
            let original_mode = mode;
            // Without line input, Enter is delivered as a bare '\r'
            mode &= !(ENABLE_LINE_INPUT | ENABLE_ECHO_INPUT);
            if SetConsoleMode(handle, mode) == 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(RawMode { original_mode })
        }
    }
}

impl Drop for RawMode {
    /// Restores the original terminal/console mode when dropped.
    #[cfg(unix)]
    fn drop(&mut self) {
        use termios::*;
        if let Err(e) = tcsetattr(self.fd, TCSANOW, &self.original) {
            eprintln!("⚠️ failed to restore terminal mode: {}", e);
        }
    }

    #[cfg(windows)]
    fn drop(&mut self) {
        use winapi::um::{
            consoleapi::SetConsoleMode,
            handleapi::INVALID_HANDLE_VALUE,
            processenv::GetStdHandle,
            winbase::STD_INPUT_HANDLE,
        };
        unsafe {
            let handle = GetStdHandle(STD_INPUT_HANDLE);
            if handle != INVALID_HANDLE_VALUE {
                SetConsoleMode(handle, self.original_mode);
            }
        }
    }
}
