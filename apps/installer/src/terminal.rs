//! Line-oriented prompts for interactive mode.
//!
//! Menus and prompts are written to `out` (stderr in the binary). Each
//! answer is read from stdin on a blocking thread so a pending read never
//! stalls the runtime or Ctrl-C handling. Passwords are read with the
//! terminal in raw mode, so nothing is echoed.

use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use mikroclaw_deploy::MethodSelector;
use mikroclaw_protocol::Endpoint;
use mikroclaw_protocol::constants::INSTALLER_VERSION;
use tokio::sync::mpsc;

const RULE: &str = "═══════════════════════════════════════════";

enum Input {
    Stdin,
    /// Answers fed over a channel, secrets included.
    #[cfg_attr(not(test), allow(dead_code))]
    Lines(mpsc::Receiver<String>),
}

pub struct Terminal<W> {
    input: Input,
    out: W,
}

impl Terminal<io::Stderr> {
    /// Terminal on stdin/stderr.
    pub fn stdio() -> Self {
        Self {
            input: Input::Stdin,
            out: io::stderr(),
        }
    }
}

impl<W: Write> Terminal<W> {
    pub fn banner(&mut self) -> io::Result<()> {
        let title = format!("MikroClaw Installer {INSTALLER_VERSION}");
        writeln!(self.out, "╔{RULE}╗")?;
        writeln!(self.out, "║{title:^43}║")?;
        writeln!(self.out, "║{:^43}║", "AI Agent for MikroTik RouterOS")?;
        writeln!(self.out, "╚{RULE}╝")?;
        writeln!(self.out)
    }

    /// Numbered menu. Returns the 1-based choice, or 0 for anything that
    /// is not a number.
    pub async fn menu(&mut self, title: &str, options: &[&str]) -> io::Result<usize> {
        writeln!(self.out)?;
        writeln!(self.out, "{RULE}")?;
        writeln!(self.out, "  {title}")?;
        writeln!(self.out, "{RULE}")?;
        writeln!(self.out)?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.out, "   [{}] {option}", i + 1)?;
        }
        writeln!(self.out)?;
        write!(self.out, "➤ Select option: ")?;
        self.out.flush()?;
        Ok(self.read_line().await?.trim().parse().unwrap_or(0))
    }

    /// Free-text answer; an empty answer takes `default`.
    pub async fn input(&mut self, prompt: &str, default: Option<&str>) -> io::Result<String> {
        match default {
            Some(d) if !d.is_empty() => write!(self.out, "❓ {prompt} [{d}]: ")?,
            _ => write!(self.out, "❓ {prompt}: ")?,
        }
        self.out.flush()?;
        let value = self.read_line().await?;
        match default {
            Some(d) if value.is_empty() => Ok(d.to_string()),
            _ => Ok(value),
        }
    }

    /// Reads a password without echoing it.
    pub async fn secret(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.out, "🔑 {prompt}: ")?;
        self.out.flush()?;
        let secret = match &mut self.input {
            Input::Stdin => blocking(read_stdin_secret).await?,
            Input::Lines(lines) => next_line(lines).await?,
        };
        writeln!(self.out)?;
        Ok(secret)
    }

    pub fn msg(&mut self, msg: &str) -> io::Result<()> {
        writeln!(self.out, "  {msg}")
    }

    pub fn error(&mut self, msg: &str) -> io::Result<()> {
        writeln!(self.out, " ❌ {msg}")
    }

    async fn read_line(&mut self) -> io::Result<String> {
        match &mut self.input {
            Input::Stdin => blocking(read_stdin_line).await,
            Input::Lines(lines) => next_line(lines).await,
        }
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }
}

fn input_closed() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "input closed")
}

async fn next_line(lines: &mut mpsc::Receiver<String>) -> io::Result<String> {
    lines.recv().await.ok_or_else(input_closed)
}

async fn blocking(read: fn() -> io::Result<String>) -> io::Result<String> {
    tokio::task::spawn_blocking(read)
        .await
        .map_err(io::Error::other)?
}

fn read_stdin_line() -> io::Result<String> {
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Err(input_closed());
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Piped input has no echo to turn off and is read as a plain line.
fn read_stdin_secret() -> io::Result<String> {
    if !io::stdin().is_terminal() {
        return read_stdin_line();
    }
    let _raw = RawMode::enable()?;
    collect_secret(event::read)
}

/// Raw mode for as long as the guard lives.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Gathers typed characters until Enter. Ctrl-C interrupts and Ctrl-D
/// closes the input, since raw mode delivers both as plain keys.
fn collect_secret(mut next: impl FnMut() -> io::Result<Event>) -> io::Result<String> {
    let mut secret = String::new();
    loop {
        let Event::Key(key) = next()? else { continue };
        if key.kind == KeyEventKind::Release {
            continue;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => return Ok(secret),
            KeyCode::Char('c') if ctrl => {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted"));
            }
            KeyCode::Char('d') if ctrl => return Err(input_closed()),
            KeyCode::Backspace => {
                secret.pop();
            }
            KeyCode::Char(c) if !ctrl => secret.push(c),
            _ => {}
        }
    }
}

/// A menu answer that has already been read.
#[derive(Debug, Clone, Copy)]
pub struct MenuChoice(pub usize);

impl MethodSelector for MenuChoice {
    fn select(&self, _methods: &[Endpoint]) -> usize {
        self.0
    }
}

#[cfg(test)]
pub(crate) fn scripted(answers: &[&str]) -> Terminal<Vec<u8>> {
    let (tx, rx) = mpsc::channel(answers.len().max(1));
    for answer in answers {
        tx.try_send(answer.to_string()).unwrap();
    }
    Terminal {
        input: Input::Lines(rx),
        out: Vec::new(),
    }
}
