use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;

/// Removes CSI sequences (`ESC [ ... final`) so the log file stays plain text.
pub fn strip_ansi_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        if chars.next() == Some('[') {
            for c in chars.by_ref() {
                if ('\x40'..='\x7e').contains(&c) {
                    break;
                }
            }
        }
    }
    out
}

struct LogFile {
    handle: Option<File>,
    /// Complete lines currently in the file.
    lines: usize,
}

/// Append-only log file capped at roughly `max_lines`.
///
/// Clones share one handle and one line count, so the tracing layer and
/// `log_println!` see the same file. The file may grow past the cap by a
/// slack of a tenth of it (at least 50 lines) before it is cut back to the
/// newest `max_lines`.
#[derive(Clone)]
pub(crate) struct CappedFileWriter {
    path: PathBuf,
    max_lines: usize,
    state: Arc<Mutex<LogFile>>,
}

impl CappedFileWriter {
    pub fn new(path: impl Into<PathBuf>, max_lines: u32) -> Self {
        let path = path.into();
        let lines = count_lines(&path).unwrap_or(0);
        Self {
            path,
            max_lines: max_lines.max(1) as usize,
            state: Arc::new(Mutex::new(LogFile {
                handle: None,
                lines,
            })),
        }
    }

    fn slack(&self) -> usize {
        (self.max_lines / 10).max(50)
    }

    fn open(&self) -> io::Result<File> {
        OpenOptions::new().create(true).append(true).open(&self.path)
    }

    /// Rewrites the file with its newest `max_lines` lines and returns how
    /// many were kept.
    fn cut_back(&self) -> io::Result<usize> {
        let contents = fs::read_to_string(&self.path)?;
        let lines: Vec<&str> = contents.lines().collect();
        let kept = &lines[lines.len().saturating_sub(self.max_lines)..];

        let mut out = kept.join("\n");
        if !kept.is_empty() {
            out.push('\n');
        }
        fs::write(&self.path, out)?;
        Ok(kept.len())
    }
}

fn count_lines(path: &Path) -> io::Result<usize> {
    let reader = BufReader::new(File::open(path)?);
    Ok(reader.split(b'\n').count())
}

impl io::Write for CappedFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        let mut file = match state.handle.take() {
            Some(file) => file,
            None => self.open()?,
        };
        file.write_all(buf)?;
        state.lines += buf.iter().filter(|&&b| b == b'\n').count();

        // only cut on a line boundary; formatted events arrive in pieces
        if state.lines > self.max_lines + self.slack() && buf.ends_with(b"\n") {
            drop(file);
            match self.cut_back() {
                Ok(kept) => state.lines = kept,
                Err(e) => eprintln!("Failed to trim log file {}: {}", self.path.display(), e),
            }
        } else {
            state.handle = Some(file);
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.state.lock().handle.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CappedFileWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("admute-{}-{}.log", name, std::process::id()));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn strips_color_codes() {
        assert_eq!(strip_ansi_escapes("\x1b[32mINFO \x1b[0mready"), "INFO ready");
        assert_eq!(strip_ansi_escapes("\x1b[1;31mERROR\x1b[0m"), "ERROR");
    }

    #[test]
    fn cuts_back_to_newest_lines_past_slack() {
        let path = temp_log("cap");
        let mut writer = CappedFileWriter::new(path.clone(), 10);

        // cap 10 + slack 50: the 61st line triggers the cut
        for i in 0..60 {
            writeln!(writer, "line {}", i).unwrap();
        }
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 60);

        writeln!(writer, "line 60").unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines.first(), Some(&"line 51"));
        assert_eq!(lines.last(), Some(&"line 60"));

        writeln!(writer, "line 61").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().lines().last(), Some("line 61"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn counts_lines_already_on_disk() {
        let path = temp_log("existing");
        let old: String = (0..60).map(|i| format!("old {}\n", i)).collect();
        fs::write(&path, old).unwrap();

        let mut writer = CappedFileWriter::new(path.clone(), 10);
        writeln!(writer, "new").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines.last(), Some(&"new"));
        let _ = fs::remove_file(&path);
    }
}
