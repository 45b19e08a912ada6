use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// write a formatted, coloured line to the given stream
#[macro_export]
macro_rules! emit {
    ($stream:ident, $colour:ident, $fmt:literal $(, $($arg:tt)*)?) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::$stream(), "{}", format!($fmt $(, $($arg)*)?).$colour());
    }};
    ($stream:ident, $colour:ident, $expr:expr) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::$stream(), "{}", format!("{}", $expr).$colour());
    }};
}

#[macro_export]
macro_rules! warning {
    ($($arg:tt)+) => {
        $crate::emit!(stderr, yellow, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        $crate::emit!(stderr, red, $($arg)+)
    };
}

#[macro_export]
macro_rules! status {
    ($($arg:tt)+) => {
        $crate::emit!(stdout, green, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    () => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout());
    }};
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), $fmt $(, $($arg)*)?);
    }};
    ($expr:expr) => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), "{}", $expr);
    }};
}

/// single keypress choice between options, returns the chosen index
///
/// enter picks the first option, esc and ctrl-c return None
pub fn choose(question: &str, options: &[&str]) -> Result<Option<usize>> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
        terminal::{disable_raw_mode, enable_raw_mode},
    };
    use std::io::{self, Write};

    debug_assert!(!options.is_empty(), "choose requires at least one option");

    // build prompt string like "[Y]ES/[n]o"
    let mut prompt_parts = Vec::with_capacity(options.len());
    let mut keys = Vec::with_capacity(options.len());
    for opt in options {
        let mut chars = opt.chars();
        let Some(first) = chars.next() else {
            continue;
        };
        prompt_parts.push(format!("[{first}]{}", chars.as_str()));
        keys.push(first.to_lowercase().next().unwrap_or(first));
    }

    print!("{question} {} ? ", prompt_parts.join("/"));
    let _ = io::stdout().flush();

    enable_raw_mode().context("this command requires an interactive terminal")?;

    let choice = loop {
        let Ok(Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        })) = event::read()
        else {
            continue;
        };
        if kind == KeyEventKind::Release {
            continue;
        }
        match code {
            KeyCode::Esc => break None,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => break None,
            KeyCode::Enter => break Some(0),
            KeyCode::Char(c) => {
                let lower = c.to_lowercase().next().unwrap_or(c);
                if let Some(idx) = keys.iter().position(|&key| key == lower) {
                    break Some(idx);
                }
            }
            _ => {}
        }
    };

    disable_raw_mode().ok();
    match choice {
        Some(idx) => info!(options[idx]),
        None => info!("^C"),
    }
    Ok(choice)
}

/// read one line of text, ctrl-c and ctrl-d return None
pub fn read_line(question: &str) -> Result<Option<String>> {
    use rustyline::DefaultEditor;
    use rustyline::error::ReadlineError;

    let mut editor = DefaultEditor::new().context("failed to initialise line editor")?;
    match editor.readline(&format!("{question} ")) {
        Ok(line) => Ok(Some(line.trim().to_string())),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
            info!("^C");
            Ok(None)
        }
        Err(e) => Err(e).context("failed to read input"),
    }
}

/// steady spinner shown while waiting on something slow
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
