use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Program I/O as seen by `print`, `inputi` and `inputs`. Swapped out in tests and
/// when input is scripted from the command line.
pub trait Console {
    fn output(&mut self, line: &str);
    /// Next input line without its trailing newline, or `None` at end of input.
    fn get_input(&mut self) -> Option<String>;
}

impl<C: Console + ?Sized> Console for &mut C {
    fn output(&mut self, line: &str) {
        (**self).output(line)
    }

    fn get_input(&mut self) -> Option<String> {
        (**self).get_input()
    }
}

pub struct StdConsole;

impl Console for StdConsole {
    fn output(&mut self, line: &str) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{line}");
        let _ = stdout.flush();
    }

    fn get_input(&mut self) -> Option<String> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()),
        }
    }
}

/// Console fed from a fixed list of input lines that records everything printed.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    lines: Vec<String>,
    echo: bool,
}

impl ScriptedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inputs<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Parses `LAZYBREW_INPUTS`-style text: lines separated by `|`.
    pub fn from_pipe_separated(text: &str) -> Self {
        Self::with_inputs(text.split('|'))
    }

    /// Also write every output line to stdout as it is produced.
    pub fn echoing(mut self) -> Self {
        self.echo = true;
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl Console for ScriptedConsole {
    fn output(&mut self, line: &str) {
        if self.echo {
            StdConsole.output(line);
        }
        self.lines.push(line.to_string());
    }

    fn get_input(&mut self) -> Option<String> {
        self.inputs.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_console_replays_inputs_and_records_output() {
        let mut console = ScriptedConsole::from_pipe_separated("21|abc");
        assert_eq!(console.get_input().as_deref(), Some("21"));
        assert_eq!(console.get_input().as_deref(), Some("abc"));
        assert_eq!(console.get_input(), None);

        console.output("hello");
        assert_eq!(console.lines(), ["hello".to_string()]);
    }
}
