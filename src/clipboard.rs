use crate::error::{Result, ViewerError};
use base64::Engine;
use std::io::{IsTerminal, Write};
use std::process::{Command, Stdio};

/// Destination for copied text
pub trait Clipboard {
    fn copy(&self, text: &str) -> Result<()>;
}

/// The terminal or desktop clipboard.
///
/// When stdout is a terminal an OSC 52 escape is tried first (works through
/// tmux and ssh). Redirected or piped output goes straight to the native
/// clipboard tools so the escape never lands in a file.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn copy(&self, text: &str) -> Result<()> {
        let stdout = std::io::stdout();
        let is_terminal = stdout.is_terminal();
        let in_tmux = std::env::var("TMUX").is_ok();
        copy_via(text, is_terminal, in_tmux, &mut stdout.lock(), try_native_clipboard)
    }
}

fn copy_via<W, F>(
    text: &str,
    is_terminal: bool,
    in_tmux: bool,
    out: &mut W,
    native: F,
) -> Result<()>
where
    W: Write,
    F: FnOnce(&str) -> Result<()>,
{
    if is_terminal && try_osc52_copy(out, text, in_tmux) {
        return Ok(());
    }
    native(text)
}

/// Copy text, logging failures instead of reporting them.
///
/// Returns whether the text reached the clipboard. Empty text is never copied.
pub fn copy_to_clipboard(clipboard: &impl Clipboard, text: &str) -> bool {
    if text.is_empty() {
        return false;
    }

    match clipboard.copy(text) {
        Ok(()) => {
            ::log::debug!("Copied {} bytes to clipboard", text.len());
            true
        }
        Err(e) => {
            ::log::error!("{}", e);
            false
        }
    }
}

fn osc52_sequence(text: &str, in_tmux: bool) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text);
    if in_tmux {
        format!("\x1bPtmux;\x1b\x1b]52;c;{}\x07\x1b\\", encoded)
    } else {
        format!("\x1b]52;c;{}\x07", encoded)
    }
}

fn try_osc52_copy(out: &mut impl Write, text: &str, in_tmux: bool) -> bool {
    let osc52 = osc52_sequence(text, in_tmux);
    out.write_all(osc52.as_bytes()).is_ok() && out.flush().is_ok()
}

fn try_native_clipboard(text: &str) -> Result<()> {
    let try_command = |cmd: &str, args: &[&str]| -> bool {
        Command::new(cmd)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .ok()
            .and_then(|mut child| {
                let written = child
                    .stdin
                    .take()
                    .map(|mut stdin| stdin.write_all(text.as_bytes()).is_ok())
                    .unwrap_or(false);
                if written {
                    child.wait().ok().filter(|status| status.success())
                } else {
                    None
                }
            })
            .is_some()
    };

    if std::env::var("WAYLAND_DISPLAY").is_ok() && try_command("wl-copy", &[]) {
        return Ok(());
    }

    if try_command("xclip", &["-selection", "clipboard"]) {
        return Ok(());
    }

    if try_command("xsel", &["--clipboard", "--input"]) {
        return Ok(());
    }

    if try_command("pbcopy", &[]) {
        return Ok(());
    }

    Err(ViewerError::Clipboard("no clipboard tool available".to_string()))
}
