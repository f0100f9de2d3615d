//! Interactive mode: collect pasted markup from stdin.
//!
//! A paste arrives as a burst of lines. Once the first line is in, input
//! that stays idle for the configured period is taken as the end of the
//! paste, so the user does not have to send end-of-file.

use std::io::{self, BufRead};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Read lines from `reader` until it is idle for `idle` after the first
/// line, or reaches end of input. Lines are joined with `\n`.
///
/// The reader runs on its own thread; after an idle timeout that thread is
/// left blocked on the reader.
pub fn collect_paste<R>(reader: R, idle: Duration) -> io::Result<String>
where
    R: BufRead + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    let _ = thread::spawn(move || {
        for line in reader.lines() {
            let failed = line.is_err();
            if sender.send(line).is_err() || failed {
                break;
            }
        }
    });

    let mut lines = Vec::new();
    // Wait as long as it takes for the first line.
    match receiver.recv() {
        Ok(line) => lines.push(line?),
        Err(_) => return Ok(String::new()),
    }
    loop {
        match receiver.recv_timeout(idle) {
            Ok(line) => lines.push(line?),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
        }
    }
    Ok(lines.join("\n"))
}

pub fn print_prompt() {
    println!("\nNo files selected. Paste html?");
    println!(">>>>>>>>>>>>>>>>>>");
    println!(">>> paste html >>>");
    println!(">>>>>>>>>>>>>>>>>>\n");
}

pub fn print_result_banner() {
    println!("\n##############################################");
    println!("### serialized and formatted python (htpy) ###");
    println!("##############################################\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_until_end_of_input() {
        let input = Cursor::new("<ul>\n  <li>a</li>\n</ul>\n");
        let paste = collect_paste(input, Duration::from_secs(5)).expect("reads");
        assert_eq!(paste, "<ul>\n  <li>a</li>\n</ul>");
    }

    #[test]
    fn empty_input_is_empty_paste() {
        let paste = collect_paste(Cursor::new(""), Duration::from_millis(10)).expect("reads");
        assert_eq!(paste, "");
    }

    /// Yields one line, then blocks far longer than the idle period.
    struct StallingReader {
        sent: bool,
    }

    impl io::Read for StallingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                thread::sleep(Duration::from_secs(60));
                return Ok(0);
            }
            self.sent = true;
            let line = b"<p>x</p>\n";
            buf[..line.len()].copy_from_slice(line);
            Ok(line.len())
        }
    }

    #[test]
    fn idle_input_ends_the_paste() {
        let reader = io::BufReader::new(StallingReader { sent: false });
        let paste = collect_paste(reader, Duration::from_millis(50)).expect("reads");
        assert_eq!(paste, "<p>x</p>");
    }
}
