// src/session.rs

//! Line-oriented form session.
//!
//! Reads commands from any async line source and writes screens to any
//! [`Write`] sink, interleaving user input with request completions.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::controller::{Channel, Controller, Resolution};
use crate::error::Result;
use crate::models::Field;
use crate::render;

pub const HELP: &str = "\
Commands:
  set <field> <value>   edit a field (N, P, K, temperature, humidity, ph, rainfall)
  clear <field>         empty a field
  submit                validate and request a recommendation
  sensor                prefill temperature, humidity and rainfall from the sensor
  show                  redraw the form and results
  fields                list fields with their ranges
  help                  this text
  quit                  exit";

const PROMPT: &str = "advisor> ";

/// One line typed at the prompt.
#[derive(Debug, PartialEq)]
pub enum Input {
    Set(Field, String),
    Clear(Field),
    Submit,
    Sensor,
    Show,
    Fields,
    Help,
    Quit,
}

/// Why the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// `quit` was typed; requests still in flight are abandoned
    Quit,
    /// Input ran out; requests in flight were awaited first
    EndOfInput,
}

/// Parse one prompt line. Blank lines are `Ok(None)`.
pub fn parse_input(line: &str) -> std::result::Result<Option<Input>, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let field = |word: Option<&str>| -> std::result::Result<Field, String> {
        word.ok_or_else(|| "missing field name".to_string())?
            .parse::<Field>()
            .map_err(|e| e.to_string())
    };

    let input = match command.to_ascii_lowercase().as_str() {
        "set" => {
            let field = field(words.next())?;
            let value = words.collect::<Vec<_>>().join(" ");
            Input::Set(field, value)
        }
        "clear" => Input::Clear(field(words.next())?),
        "submit" | "s" => Input::Submit,
        "sensor" => Input::Sensor,
        "show" => Input::Show,
        "fields" => Input::Fields,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(Some(input))
}

fn prompt(out: &mut impl Write) -> Result<()> {
    write!(out, "{PROMPT}")?;
    out.flush()?;
    Ok(())
}

/// Apply one parsed line to the controller.
fn apply(ctl: &mut Controller, input: Input, out: &mut impl Write, bar_width: usize) -> Result<()> {
    match input {
        Input::Quit => {}
        Input::Help => writeln!(out, "{HELP}")?,
        Input::Fields => {
            for field in Field::ALL {
                writeln!(out, "  {:<12} {:<22} {}", field.name(), field.label(), field.hint())?;
            }
        }
        Input::Show => writeln!(out, "{}", render::render_state(ctl.state(), bar_width))?,
        Input::Set(field, value) => {
            ctl.edit(field, value);
            writeln!(out, "  {} = {}", field, ctl.state().input().get(field))?;
        }
        Input::Clear(field) => {
            ctl.edit(field, "");
            writeln!(out, "  {} cleared", field)?;
        }
        Input::Submit => {
            // one recommendation at a time, like the disabled button
            if ctl.state().is_submitting() {
                writeln!(out, "  A recommendation is already being fetched.")?;
            } else if ctl.submit() {
                writeln!(out, "  🔄 Getting Recommendation...")?;
            } else if let Some(banner) = ctl.state().banner() {
                writeln!(out, "{}", render::render_banner(banner))?;
            }
        }
        Input::Sensor => {
            if ctl.state().is_fetching_sensor() {
                writeln!(out, "  Sensor data is already being fetched.")?;
            } else {
                ctl.fetch_sensor();
                writeln!(out, "  🔄 Fetching Sensor Data...")?;
            }
        }
    }
    Ok(())
}

fn show_completion(
    ctl: &Controller,
    channel: Channel,
    out: &mut impl Write,
    bar_width: usize,
) -> Result<()> {
    writeln!(out)?;
    match channel {
        Channel::Recommend => writeln!(out, "{}", render::render_state(ctl.state(), bar_width))?,
        Channel::Sensor => {
            if let Some(reading) = ctl.state().sensor() {
                writeln!(out, "{}", render::render_sensor(reading))?;
            }
            if let Some(banner) = ctl.state().banner() {
                writeln!(out, "{}", render::render_banner(banner))?;
            }
        }
    }
    Ok(())
}

/// Run the form until `quit` or end of input.
///
/// At end of input every request still in flight is awaited and the final
/// screen is written, so piped sessions see their last result.
pub async fn run<R>(
    ctl: &mut Controller,
    reader: R,
    out: &mut impl Write,
    bar_width: usize,
) -> Result<SessionEnd>
where
    R: AsyncBufRead + Unpin,
{
    writeln!(out, "🌾 AI Crop Recommendation System")?;
    writeln!(out, "{HELP}\n")?;
    writeln!(out, "{}", render::render_state(ctl.state(), bar_width))?;

    let mut lines = reader.lines();
    prompt(out)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Ok(Some(Input::Quit)) => {
                        if ctl.has_pending() {
                            log::debug!("Quitting with requests still in flight");
                        }
                        return Ok(SessionEnd::Quit);
                    }
                    Ok(Some(input)) => apply(ctl, input, out, bar_width)?,
                    Ok(None) => {}
                    Err(message) => writeln!(out, "{message}")?,
                }
                prompt(out)?;
            }
            Some(resolution) = ctl.next_completion(), if ctl.has_pending() => {
                if let Resolution::Applied { channel, .. } = resolution {
                    show_completion(ctl, channel, out, bar_width)?;
                    prompt(out)?;
                }
            }
        }
    }

    writeln!(out)?;
    if ctl.has_pending() {
        log::debug!("Input closed, waiting for requests in flight");
        ctl.settle().await;
        writeln!(out, "{}", render::render_state(ctl.state(), bar_width))?;
    }
    Ok(SessionEnd::EndOfInput)
}
