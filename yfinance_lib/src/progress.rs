//! Single-line text progress bar for batch downloads.

use std::io::{self, Stdout, Write};

const WIDTH: usize = 50;
const FILL: char = '*';

/// Renders `[*****   50%        ]  1 of 2 downloaded` style progress,
/// rewriting the same terminal line after every unit of work.
pub struct ProgressBar<W: Write = Stdout> {
    label: String,
    total: usize,
    elapsed: usize,
    out: W,
}

impl ProgressBar<Stdout> {
    pub fn new(total: usize, label: &str) -> Self {
        Self::with_writer(total, label, io::stdout())
    }
}

impl<W: Write> ProgressBar<W> {
    pub fn with_writer(total: usize, label: &str, out: W) -> Self {
        Self {
            label: label.to_string(),
            total,
            elapsed: 0,
            out,
        }
    }

    pub fn elapsed(&self) -> usize {
        self.elapsed
    }

    fn percent(&self) -> usize {
        if self.total == 0 {
            return 100;
        }
        (self.elapsed as f64 / self.total as f64 * 100.0).round() as usize
    }

    /// The current bar, without the leading carriage return.
    pub fn render(&self) -> String {
        let percent = self.percent();
        let inner = WIDTH - 2;
        let filled = ((percent as f64 / 100.0) * inner as f64).round() as usize;
        let filled = filled.min(inner);

        let mut bar: Vec<char> = Vec::with_capacity(WIDTH);
        bar.push('[');
        bar.extend(std::iter::repeat(FILL).take(filled));
        bar.extend(std::iter::repeat(' ').take(inner - filled));
        bar.push(']');

        let digits = percent.to_string();
        let start = WIDTH / 2 - digits.len();
        for (i, c) in format!("{}%", digits).chars().enumerate() {
            bar[start + i] = c;
        }

        let bar: String = bar.into_iter().collect();
        format!("{}  {} of {} {}", bar, self.elapsed, self.total, self.label)
    }

    fn draw(&mut self) {
        let line = self.render();
        let result = write!(self.out, "\r{}", line).and_then(|_| self.out.flush());
        if let Err(e) = result {
            tracing::debug!("Failed to draw progress bar: {}", e);
        }
    }

    /// Records one finished unit and redraws.
    pub fn animate(&mut self) {
        self.elapsed = (self.elapsed + 1).min(self.total);
        self.draw();
    }

    /// Draws the final state and ends the line.
    pub fn completed(&mut self) {
        self.elapsed = self.total;
        self.draw();
        if let Err(e) = writeln!(self.out) {
            tracing::debug!("Failed to finish progress bar: {}", e);
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
