//! Log output with Telegram bot tokens masked.

use regex::Regex;
use std::io::{self, Write};
use std::mem;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{prelude::*, EnvFilter};

const MASK: &str = "[TELEGRAM_TOKEN]";

const PRODUCTION_FILTER: &str =
    "camsnap_core=info,camsnap_transport_telegram=info,camsnap=info,teloxide=warn,hyper=warn,reqwest=warn";

/// Ordered rewrite rules; each one replaces the token part of a match with [`MASK`].
pub struct TokenRedactor {
    rules: Vec<(Regex, String)>,
}

impl TokenRedactor {
    /// Compile the rules.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        let rules = [
            // API URLs as printed by reqwest errors
            (r"(https?://[^/\s]+/bot)[0-9]+:[A-Za-z0-9_-]+", format!("${{1}}{MASK}")),
            (r"[0-9]{8,10}:[A-Za-z0-9_-]{35}", MASK.to_string()),
            (r"(bot[0-9]{8,10}:)[A-Za-z0-9_-]+", format!("${{1}}{MASK}")),
        ];
        let rules = rules
            .into_iter()
            .map(|(pattern, replacement)| Regex::new(pattern).map(|re| (re, replacement)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Returns `input` with every token masked.
    pub fn redact(&self, input: &str) -> String {
        self.rules
            .iter()
            .fold(input.to_string(), |text, (pattern, replacement)| {
                pattern.replace_all(&text, replacement.as_str()).into_owned()
            })
    }
}

/// Writer that redacts whole lines.
///
/// Bytes are held until a newline arrives, so a token split across two
/// `write` calls is still caught. Whatever is left is emitted on flush.
pub struct LineRedactor<W: Write> {
    inner: W,
    redactor: Arc<TokenRedactor>,
    pending: Vec<u8>,
}

impl<W: Write> LineRedactor<W> {
    pub const fn new(inner: W, redactor: Arc<TokenRedactor>) -> Self {
        Self {
            inner,
            redactor,
            pending: Vec::new(),
        }
    }

    fn emit(&mut self, chunk: &[u8]) -> io::Result<()> {
        let text = String::from_utf8_lossy(chunk);
        self.inner.write_all(self.redactor.redact(&text).as_bytes())
    }
}

impl<W: Write> Write for LineRedactor<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(end) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            self.emit(&line)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let rest = mem::take(&mut self.pending);
            self.emit(&rest)?;
        }
        self.inner.flush()
    }
}

impl<W: Write> Drop for LineRedactor<W> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// `MakeWriter` handing out a [`LineRedactor`] over stderr for each event.
struct RedactedStderr {
    redactor: Arc<TokenRedactor>,
}

impl<'a> MakeWriter<'a> for RedactedStderr {
    type Writer = LineRedactor<io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        LineRedactor::new(io::stderr(), Arc::clone(&self.redactor))
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins; otherwise `DEBUG_MODE=true|1` selects `debug` and
/// anything else the production filter.
pub fn init(redactor: Arc<TokenRedactor>) {
    let debug_mode = std::env::var("DEBUG_MODE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug_mode { "debug" } else { PRODUCTION_FILTER })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(RedactedStderr { redactor }))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "1234567890:AAbbCCddEEffGGhhIIjjKKllMMnnOOppQQr";

    fn redactor() -> Arc<TokenRedactor> {
        match TokenRedactor::new() {
            Ok(r) => Arc::new(r),
            Err(e) => panic!("patterns must compile: {e}"),
        }
    }

    #[test]
    fn test_redacts_token_in_api_url() {
        let line = format!(
            "error sending request for url (https://api.telegram.org/bot{TOKEN}/GetUpdates)"
        );
        assert_eq!(
            redactor().redact(&line),
            "error sending request for url (https://api.telegram.org/bot[TELEGRAM_TOKEN]/GetUpdates)"
        );
    }

    #[test]
    fn test_redacts_bare_token() {
        assert_eq!(redactor().redact(&format!("token={TOKEN}")), "token=[TELEGRAM_TOKEN]");
    }

    #[test]
    fn test_leaves_plain_text_alone() {
        let line = "User 12345 (alice) initiated /photo command.";
        assert_eq!(redactor().redact(line), line);
    }

    #[test]
    fn test_writer_reports_original_length() -> io::Result<()> {
        let mut out = Vec::new();
        let input = format!("bot{TOKEN}\n");
        {
            let mut writer = LineRedactor::new(&mut out, redactor());
            assert_eq!(writer.write(input.as_bytes())?, input.len());
        }
        let out = String::from_utf8_lossy(&out);
        assert!(!out.contains(TOKEN));
        assert!(out.ends_with('\n'));
        Ok(())
    }

    #[test]
    fn test_token_split_across_writes_is_masked() -> io::Result<()> {
        let mut out = Vec::new();
        let (head, tail) = TOKEN.split_at(15);
        {
            let mut writer = LineRedactor::new(&mut out, redactor());
            writer.write_all(format!("token={head}").as_bytes())?;
            writer.write_all(format!("{tail}\nnext line\n").as_bytes())?;
        }
        assert_eq!(
            String::from_utf8_lossy(&out),
            "token=[TELEGRAM_TOKEN]\nnext line\n"
        );
        Ok(())
    }

    #[test]
    fn test_unterminated_line_is_emitted_on_flush() -> io::Result<()> {
        let mut out = Vec::new();
        let mut writer = LineRedactor::new(&mut out, redactor());
        writer.write_all(format!("partial {TOKEN}").as_bytes())?;
        writer.flush()?;
        drop(writer);
        assert_eq!(String::from_utf8_lossy(&out), "partial [TELEGRAM_TOKEN]");
        Ok(())
    }
}
