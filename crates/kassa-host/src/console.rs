// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line-oriented host surfaces for the desktop demo shell.
//
// Outbound envelopes go to stdout one per line; everything else the shell
// shows is prefixed so it can be told apart from protocol traffic.

use kassa_core::types::StoreErrorInfo;
use kassa_host::{AdBanner, HostShell, WebDocument};
use kassa_store::stub::StubOutcome;

/// Prints messages posted to the document.
pub struct ConsoleDocument;

impl WebDocument for ConsoleDocument {
    fn post_message(&self, text: &str) {
        println!("{text}");
    }

    fn go_back(&self) {
        println!("# document: back");
    }
}

/// Prints alerts and banner changes.
pub struct ConsoleShell;

impl HostShell for ConsoleShell {
    fn show_alert(&self, message: &str) {
        println!("# alert: {message}");
    }

    fn update_banner(&self, banner: Option<&AdBanner>) {
        match banner {
            Some(banner) => println!(
                "# banner: mounted {} ({:?}, non-personalized: {})",
                banner.unit_id, banner.size, banner.non_personalized_ads_only
            ),
            None => println!("# banner: unmounted"),
        }
    }
}

/// One line of input to the demo shell.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Raw text from the web document.
    Web(String),
    Load,
    Nav(bool),
    Back,
    /// How the stub store answers subsequent purchases.
    Outcome(StubOutcome),
    /// Deliver a transaction the store is redelivering.
    Redeliver(String),
    Quit,
}

/// Parse one input line. `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if line.starts_with('{') {
        return Ok(Some(Command::Web(line.to_owned())));
    }

    let mut words = line.split_whitespace();
    let command = match words.next().unwrap_or_default() {
        ":load" => Command::Load,
        ":nav" => match words.next() {
            Some("true") => Command::Nav(true),
            Some("false") => Command::Nav(false),
            _ => return Err("usage: :nav <true|false>".into()),
        },
        ":back" => Command::Back,
        ":outcome" => Command::Outcome(parse_outcome(words)?),
        ":redeliver" => match words.next() {
            Some(sku) => Command::Redeliver(sku.to_owned()),
            None => return Err("usage: :redeliver <sku>".into()),
        },
        ":quit" | ":q" => Command::Quit,
        other => return Err(format!("unknown command `{other}`")),
    };
    Ok(Some(command))
}

const OUTCOME_USAGE: &str =
    "usage: :outcome <complete|defer|pend|fail CODE MESSAGE|reject CODE MESSAGE>";

fn parse_outcome<'a>(mut words: impl Iterator<Item = &'a str>) -> Result<StubOutcome, String> {
    match words.next().ok_or(OUTCOME_USAGE)? {
        "complete" => Ok(StubOutcome::Complete),
        "defer" => Ok(StubOutcome::Deferred),
        "pend" => Ok(StubOutcome::Pend),
        "fail" => Ok(StubOutcome::Fail(parse_store_error(words)?)),
        "reject" => Ok(StubOutcome::Reject(parse_store_error(words)?)),
        _ => Err(OUTCOME_USAGE.into()),
    }
}

fn parse_store_error<'a>(mut words: impl Iterator<Item = &'a str>) -> Result<StoreErrorInfo, String> {
    let code = words.next().ok_or(OUTCOME_USAGE)?;
    let message = words.collect::<Vec<_>>().join(" ");
    Ok(StoreErrorInfo::new(code, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_lines_are_web_messages() {
        assert_eq!(
            parse_line(r#"  {"intent":"ad","content":false}"#).unwrap(),
            Some(Command::Web(r#"{"intent":"ad","content":false}"#.into()))
        );
    }

    #[test]
    fn host_commands() {
        assert_eq!(parse_line(":load").unwrap(), Some(Command::Load));
        assert_eq!(parse_line(":nav true").unwrap(), Some(Command::Nav(true)));
        assert_eq!(parse_line(":back").unwrap(), Some(Command::Back));
        assert_eq!(parse_line(":q").unwrap(), Some(Command::Quit));
        assert_eq!(
            parse_line(":redeliver coins_100").unwrap(),
            Some(Command::Redeliver("coins_100".into()))
        );
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn outcome_with_store_error() {
        assert_eq!(
            parse_line(":outcome fail E_USER_CANCELLED user backed out").unwrap(),
            Some(Command::Outcome(StubOutcome::Fail(StoreErrorInfo::new(
                "E_USER_CANCELLED",
                "user backed out"
            ))))
        );
        assert_eq!(
            parse_line(":outcome defer").unwrap(),
            Some(Command::Outcome(StubOutcome::Deferred))
        );
    }

    #[test]
    fn bad_commands_are_errors() {
        assert!(parse_line(":nav maybe").is_err());
        assert!(parse_line(":outcome fail").is_err());
        assert!(parse_line(":fly").is_err());
    }
}
