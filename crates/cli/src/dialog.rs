//! Terminal alerts and confirmation prompts.
//!
//! Alerts mirror the backend's message/suggestion pairs; confirmations
//! guard destructive actions. Both write to an injected sink so tests can
//! capture the output.

use std::io::{self, BufRead, Write};

use posyandu_types::{AlertKind, ConfirmStyle};

/// A one-shot notification with an optional recovery suggestion.
#[derive(Clone, Debug)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl Alert {
    pub fn new(kind: AlertKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: Option<String>) -> Self {
        self.suggestion = suggestion;
        self
    }

    fn tag(&self) -> &'static str {
        match self.kind {
            AlertKind::Success => "BERHASIL",
            AlertKind::Error => "GAGAL",
            AlertKind::Warning => "PERINGATAN",
            AlertKind::Info => "INFO",
        }
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "[{}] {}", self.tag(), self.title)?;
        writeln!(out, "  {}", self.message)?;
        if let Some(suggestion) = &self.suggestion {
            writeln!(out, "  Saran: {suggestion}")?;
        }
        Ok(())
    }
}

fn style_tag(style: ConfirmStyle) -> &'static str {
    match style {
        ConfirmStyle::Danger => "BERBAHAYA",
        ConfirmStyle::Warning => "PERINGATAN",
        ConfirmStyle::Info => "KONFIRMASI",
    }
}

/// Ask a yes/no question, reading one line from `input`. Only `y`/`ya`
/// (case-insensitive) confirms; everything else, including end of input,
/// declines.
pub fn confirm(
    input: &mut impl BufRead,
    out: &mut impl Write,
    style: ConfirmStyle,
    title: &str,
    message: &str,
) -> io::Result<bool> {
    writeln!(out, "[{}] {title}", style_tag(style))?;
    writeln!(out, "  {message}")?;
    write!(out, "  Lanjutkan? [y/N] ")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(false);
    }
    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "ya")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_renders_title_message_and_suggestion() {
        let alert = Alert::new(AlertKind::Error, "Gagal Menyimpan", "Data tidak valid")
            .with_suggestion(Some("Periksa kembali isian Anda".to_string()));
        let mut out = Vec::new();
        alert.render(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[GAGAL] Gagal Menyimpan"));
        assert!(text.contains("Data tidak valid"));
        assert!(text.contains("Saran: Periksa kembali isian Anda"));
    }

    #[test]
    fn confirm_accepts_y_and_ya() {
        for answer in ["y\n", "Y\n", "ya\n", "YA\n"] {
            let mut input = answer.as_bytes();
            let mut out = Vec::new();
            assert!(confirm(
                &mut input,
                &mut out,
                ConfirmStyle::Danger,
                "Hapus Pasien",
                "Data akan hilang permanen",
            )
            .unwrap());
        }
    }

    #[test]
    fn confirm_declines_on_anything_else() {
        for answer in ["n\n", "\n", "yes please\n", ""] {
            let mut input = answer.as_bytes();
            let mut out = Vec::new();
            assert!(!confirm(
                &mut input,
                &mut out,
                ConfirmStyle::Warning,
                "Selesaikan Pemeriksaan",
                "Status akan dikunci",
            )
            .unwrap());
        }
    }
}
