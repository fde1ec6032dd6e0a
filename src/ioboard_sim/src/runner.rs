//! Simulator main loop.
//!
//! A reader thread plays the role of the UART receive interrupt: it pulls
//! bytes from the console and pushes them into a single-producer
//! single-consumer queue. The loop below plays the firmware main loop: it
//! drains the queue into the command processor and answers every complete
//! line with one reply.

use std::io::{self, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use cmdproc_config::{INPUT_BUF_SIZE, LINE_TERMINATOR};
use cmdproc_core::CommandProcessor;
use heapless::spsc::Queue;
use ioboard::{Board, Gpio, ParamStore, commands};

use crate::transport::{ByteFilter, LineMode};

/// Receive queue size, the simulated UART FIFO.
const RX_QUEUE_LEN: usize = 64;

const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Serves commands read from `input` until it ends or `DFU` is requested.
pub fn run<R, W, G, S>(
    input: R,
    output: &mut W,
    mode: LineMode,
    board: &mut Board<G, S>,
) -> io::Result<()>
where
    R: Read + Send + 'static,
    W: Write,
    G: Gpio,
    S: ParamStore,
{
    // The reader thread is never joined; it may stay blocked on the console
    // after a DFU request, so the queue must outlive this call.
    let queue: &'static mut Queue<u8, RX_QUEUE_LEN> = Box::leak(Box::new(Queue::new()));
    let (mut producer, mut consumer) = queue.split();
    let reader_done = Arc::new(AtomicBool::new(false));
    let stop = StopOnDrop(Arc::new(AtomicBool::new(false)));

    let done = Arc::clone(&reader_done);
    let stop_requested = Arc::clone(&stop.0);
    thread::spawn(move || {
        pump(input, mode, |byte| {
            forward(|b| producer.enqueue(b), byte, &stop_requested)
        });
        done.store(true, Ordering::Release);
    });

    let mut processor = CommandProcessor::<INPUT_BUF_SIZE>::new(commands::registry());
    loop {
        // Sampled before dequeueing: once set, every byte is already queued.
        let finished = reader_done.load(Ordering::Acquire);
        match consumer.dequeue() {
            Some(byte) => processor.submit_byte(byte),
            None if finished => return Ok(()),
            None => {
                thread::sleep(POLL_INTERVAL);
                continue;
            }
        }

        if processor.has_line_ready() {
            let reply = board.respond(processor.parse_command());
            output.write_all(reply.as_bytes())?;
            output.flush()?;
            if board.take_dfu_request() {
                eprintln!("🔁 DFU requested, leaving simulator");
                return Ok(());
            }
        }
    }
}

/// Raises the reader's stop flag when the serving loop returns.
struct StopOnDrop(Arc<AtomicBool>);

impl Drop for StopOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Queues `byte`, waiting while the queue is full.
///
/// Returns `false` once `stop` is raised; the byte is then discarded.
fn forward(mut try_push: impl FnMut(u8) -> Result<(), u8>, byte: u8, stop: &AtomicBool) -> bool {
    let mut pending = byte;
    loop {
        if stop.load(Ordering::Acquire) {
            return false;
        }
        match try_push(pending) {
            Ok(()) => return true,
            Err(rejected) => {
                pending = rejected;
                thread::sleep(POLL_INTERVAL);
            }
        }
    }
}

/// Reads `input` until it ends or `push` refuses a byte, handing every
/// filtered byte to `push`.
///
/// In [`LineMode::Raw`] the console does not echo, so accepted bytes are
/// echoed on stderr.
fn pump<R: Read>(mut input: R, mode: LineMode, mut push: impl FnMut(u8) -> bool) {
    let mut filter = ByteFilter::new(mode);
    let mut echo = (mode == LineMode::Raw).then(io::stderr);
    let mut buf = [0u8; 64];

    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => return,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                eprintln!("⛔ input error: {}", e);
                return;
            }
        };

        for &raw in &buf[..n] {
            let Some(byte) = filter.apply(raw) else {
                return;
            };
            if let Some(echo) = echo.as_mut() {
                let _ = if byte == LINE_TERMINATOR {
                    echo.write_all(b"\r\n")
                } else {
                    echo.write_all(&[byte])
                };
            }
            if !push(byte) {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ioboard::{MemoryStore, TerminalBank};
    use std::io::Cursor;

    fn session(script: &'static [u8]) -> (String, Board<TerminalBank, MemoryStore<64>>) {
        let mut board = Board::new(TerminalBank::new(), MemoryStore::new());
        let mut out = Vec::new();
        run(Cursor::new(script), &mut out, LineMode::Cooked, &mut board).unwrap();
        (String::from_utf8(out).unwrap(), board)
    }

    #[test]
    fn test_scripted_session() {
        let (out, board) = session(b"IDN?\nOUT:3=1\nOUT:3?\nFOO?\n");
        assert_eq!(out, "IDN=UXIB-DN12,000000\r\nOK\r\nOUT:3=1\r\nERROR:CMD\r\n");
        assert_eq!(board.gpio().output(3), Ok(true));
    }

    #[test]
    fn test_crlf_script() {
        let (out, _) = session(b"DIR:13?\r\nDIR:13=1\r\n");
        assert_eq!(out, "DIR:13=0\r\nOK\r\n");
    }

    #[test]
    fn test_unterminated_tail_ignored() {
        let (out, _) = session(b"TCP:1?\nTCP:2?");
        assert_eq!(out, "TCP:1=O\r\n");
    }

    #[test]
    fn test_dfu_stops_session() {
        let (out, _) = session(b"DFU\nIDN?\n");
        assert_eq!(out, "OK\r\n");
    }

    #[test]
    fn test_dfu_with_unread_backlog() {
        let mut script = b"DFU\n".to_vec();
        script.extend(std::iter::repeat_n(b'X', 4 * RX_QUEUE_LEN));
        let mut board = Board::new(TerminalBank::new(), MemoryStore::<64>::new());
        let mut out = Vec::new();
        run(Cursor::new(script), &mut out, LineMode::Cooked, &mut board).unwrap();
        assert_eq!(out, b"OK\r\n");
    }

    #[test]
    fn test_forward_waits_for_room() {
        let stop = AtomicBool::new(false);
        let mut attempts = 0;
        let pushed = forward(
            |b| {
                attempts += 1;
                if attempts < 3 { Err(b) } else { Ok(()) }
            },
            b'A',
            &stop,
        );
        assert!(pushed);
        assert_eq!(attempts, 3);
    }

    #[test]
    fn test_forward_gives_up_when_stopped() {
        let stop = AtomicBool::new(true);
        assert!(!forward(|b| Err(b), b'A', &stop));
    }

    #[test]
    fn test_pump_stops_when_push_refuses() {
        let mut taken = Vec::new();
        pump(Cursor::new(b"OUT:1=1\n".to_vec()), LineMode::Cooked, |b| {
            taken.push(b);
            taken.len() < 3
        });
        assert_eq!(taken, b"OUT");
    }

    #[test]
    fn test_board_id_update() {
        let (out, board) = session(b"BID=SIM-7\nBID?\n");
        assert_eq!(out, "OK\r\nBID=SIM-7\r\n");
        assert_eq!(board.params().board_id(), "SIM-7");
    }
}
