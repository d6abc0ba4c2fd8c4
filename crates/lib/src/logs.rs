//! Human-oriented build log.
//!
//! Structured diagnostics go through `tracing`; this is the indented output a
//! user reads in the build transcript:
//!
//! ```text
//! Gotip Buildpack 0.1.0
//!   Executing build process
//!     Installing Go 1.19.3
//!       Completed in 1.50s
//! ```

use std::fmt::Display;
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

pub struct Emitter {
  writer: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for Emitter {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Emitter").finish_non_exhaustive()
  }
}

impl Emitter {
  pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
    Self {
      writer: Mutex::new(Box::new(writer)),
    }
  }

  pub fn stdout() -> Self {
    Self::new(std::io::stdout())
  }

  /// An emitter that drops everything.
  pub fn discard() -> Self {
    Self::new(std::io::sink())
  }

  pub fn title(&self, message: impl Display) {
    self.line(0, message);
  }

  pub fn process(&self, message: impl Display) {
    self.line(2, message);
  }

  pub fn subprocess(&self, message: impl Display) {
    self.line(4, message);
  }

  pub fn action(&self, message: impl Display) {
    self.line(6, message);
  }

  /// Indent every line of `message`, e.g. captured command output.
  pub fn detail(&self, message: impl Display) {
    let text = message.to_string();
    for line in text.lines() {
      self.line(8, line);
    }
  }

  pub fn break_line(&self) {
    self.write(format_args!("\n"));
  }

  fn line(&self, indent: usize, message: impl Display) {
    self.write(format_args!("{:indent$}{}\n", "", message, indent = indent));
  }

  // Write errors are dropped; the build never depends on its log.
  fn write(&self, args: std::fmt::Arguments<'_>) {
    if let Ok(mut writer) = self.writer.lock() {
      let _ = writer.write_fmt(args);
      let _ = writer.flush();
    }
  }
}

impl Default for Emitter {
  fn default() -> Self {
    Self::stdout()
  }
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    format!("{}m {}s", mins, remaining_secs)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}
