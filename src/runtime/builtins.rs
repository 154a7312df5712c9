//! Built-in functions and the host they talk to
//!
//! Builtins never touch stdin/stdout directly; they go through a [`Host`],
//! so embedders and tests can capture output and script input.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// The fixed set of host-implemented functions bound in the global scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Print,
    Capture,
    Random,
    Round,
}

impl Builtin {
    pub const ALL: [Builtin; 4] = [
        Builtin::Print,
        Builtin::Capture,
        Builtin::Random,
        Builtin::Round,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Capture => "capture",
            Builtin::Random => "random",
            Builtin::Round => "round",
        }
    }

    /// Parameter names the arguments are bound under
    pub fn params(&self) -> &'static [&'static str] {
        match self {
            Builtin::Print | Builtin::Capture => &["data"],
            Builtin::Random => &[],
            Builtin::Round => &["val"],
        }
    }
}

/// Round half up, like JavaScript's `Math.round`
pub fn round_half_up(n: f64) -> f64 {
    let rounded = n.round();
    if (rounded - n).abs() == 0.5 {
        n.ceil()
    } else {
        rounded
    }
}

/// Side effects available to running programs
pub trait Host {
    /// Write one line of program output
    fn print(&mut self, text: &str);

    /// Show `prompt` and read one line of input, without its line terminator
    fn capture(&mut self, prompt: &str) -> io::Result<String>;

    /// A uniformly distributed number in [0, 1)
    fn random(&mut self) -> f64;
}

/// Host backed by the process's stdin/stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct StdHost;

impl Host for StdHost {
    fn print(&mut self, text: &str) {
        println!("{}", text);
    }

    fn capture(&mut self, prompt: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "end of input",
            ));
        }

        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }

    fn random(&mut self) -> f64 {
        rand::random::<f64>()
    }
}

/// In-memory host: records output and prompts, serves scripted input
#[derive(Debug, Default, Clone)]
pub struct BufferHost {
    pub output: Vec<String>,
    pub prompts: Vec<String>,
    input: VecDeque<String>,
    randoms: VecDeque<f64>,
}

impl BufferHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines returned by successive `capture` calls
    pub fn with_input<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input.extend(lines.into_iter().map(Into::into));
        self
    }

    /// Values returned by successive `random` calls; 0.5 once exhausted
    pub fn with_randoms(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.randoms.extend(values);
        self
    }
}

impl Host for BufferHost {
    fn print(&mut self, text: &str) {
        self.output.push(text.to_string());
    }

    fn capture(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts.push(prompt.to_string());
        self.input.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted input left")
        })
    }

    fn random(&mut self) -> f64 {
        self.randoms.pop_front().unwrap_or(0.5)
    }
}
