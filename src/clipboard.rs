//! Clipboard writing with a terminal-escape fallback.
//!
//! Prefers a platform clipboard helper when one is installed; when none is
//! available the text goes out as an OSC 52 escape sequence, which modern
//! terminal emulators translate into a clipboard write themselves.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow};
use base64::Engine;

/// Copy text to the system clipboard.
pub fn copy(text: &str) -> Result<()> {
    for (program, args) in helper_commands() {
        match copy_via_command(program, args, text) {
            Ok(()) => {
                tracing::info!("copied {} bytes via {program}", text.len());
                return Ok(());
            }
            Err(err) => tracing::debug!("clipboard helper {program} unavailable: {err}"),
        }
    }
    osc52_copy(text)
}

/// Candidate helper commands for the current platform, in preference order.
fn helper_commands() -> &'static [(&'static str, &'static [&'static str])] {
    if cfg!(target_os = "macos") {
        &[("pbcopy", &[])]
    } else if cfg!(target_os = "windows") {
        &[("clip", &[])]
    } else {
        &[
            ("wl-copy", &[]),
            ("xclip", &["-selection", "clipboard"]),
        ]
    }
}

/// Pipe the text through an external clipboard helper.
fn copy_via_command(program: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("could not start {program}"))?;

    child
        .stdin
        .take()
        .ok_or_else(|| anyhow!("{program}: no stdin"))?
        .write_all(text.as_bytes())?;

    let status = child.wait()?;
    if !status.success() {
        return Err(anyhow!("{program} exited with {status}"));
    }
    Ok(())
}

/// Emit the text as an OSC 52 clipboard escape on stdout.
///
/// Works in kitty, WezTerm, iTerm2, Ghostty and most other modern
/// terminals; writes directly to stdout, bypassing the TUI backend buffer.
fn osc52_copy(text: &str) -> Result<()> {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    let mut stdout = std::io::stdout();
    stdout.write_all(format!("\x1b]52;c;{encoded}\x07").as_bytes())?;
    stdout.flush()?;
    tracing::info!("copied {} bytes via OSC 52", text.len());
    Ok(())
}
