//! Operation scripts: one tree command per line.
//!
//! ```text
//! # comment
//! add 010203 first payload
//! select 0 0102 10
//! remove 010203
//! dump
//! ```

use std::str::FromStr;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::Mask;

/// A single script command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { key: Vec<u8>, payload: String },
    Remove { key: Vec<u8> },
    Get { key: Vec<u8> },
    Select { mask: Mask, limit: Option<usize> },
    Dump,
    Layers,
    Verify,
    Clear,
}

/// A parsed script: commands paired with their 1-based line numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    pub commands: Vec<(usize, Command)>,
}

impl Script {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

fn decode_hex(line: usize, what: &str, text: Option<&str>) -> ApplicationResult<Vec<u8>> {
    let text = text.ok_or_else(|| ApplicationError::parse(line, format!("missing {what}")))?;
    hex::decode(text).map_err(|e| ApplicationError::parse(line, format!("{what} '{text}': {e}")))
}

fn parse_number(line: usize, what: &str, text: &str) -> ApplicationResult<usize> {
    text.parse()
        .map_err(|_| ApplicationError::parse(line, format!("{what} '{text}' is not a number")))
}

fn parse_line(line: usize, text: &str) -> ApplicationResult<Command> {
    let mut words = text.split_whitespace();
    let verb = words.next().unwrap_or_default();

    let command = match verb {
        "add" => {
            let key = decode_hex(line, "key", words.next())?;
            let payload = words.by_ref().collect::<Vec<_>>().join(" ");
            if payload.is_empty() {
                return Err(ApplicationError::parse(line, "add needs a payload"));
            }
            Command::Add { key, payload }
        }
        "remove" | "rm" => Command::Remove {
            key: decode_hex(line, "key", words.next())?,
        },
        "get" => Command::Get {
            key: decode_hex(line, "key", words.next())?,
        },
        "select" => {
            let offset = words
                .next()
                .ok_or_else(|| ApplicationError::parse(line, "missing offset"))
                .and_then(|w| parse_number(line, "offset", w))?;
            let bytes = decode_hex(line, "mask bytes", words.next())?;
            let limit = words
                .next()
                .map(|w| parse_number(line, "limit", w))
                .transpose()?;
            Command::Select {
                mask: Mask::new(offset, bytes),
                limit,
            }
        }
        "dump" => Command::Dump,
        "layers" => Command::Layers,
        "verify" => Command::Verify,
        "clear" => Command::Clear,
        other => {
            return Err(ApplicationError::parse(line, format!("unknown command '{other}'")));
        }
    };

    let takes_rest = matches!(command, Command::Add { .. });
    if !takes_rest {
        if let Some(extra) = words.next() {
            return Err(ApplicationError::parse(line, format!("unexpected '{extra}'")));
        }
    }
    Ok(command)
}

impl FromStr for Script {
    type Err = ApplicationError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut commands = Vec::new();
        for (number, raw) in text.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            commands.push((number + 1, parse_line(number + 1, trimmed)?));
        }
        Ok(Self { commands })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn given_script_when_parsing_then_comments_and_blanks_skipped() {
        let script: Script = "# header\n\nadd 0102 hello world\n  select 0 01 5\ndump\n"
            .parse()
            .unwrap();

        assert_eq!(
            script.commands,
            vec![
                (
                    3,
                    Command::Add {
                        key: vec![1, 2],
                        payload: "hello world".into()
                    }
                ),
                (
                    4,
                    Command::Select {
                        mask: Mask::new(0, vec![1]),
                        limit: Some(5)
                    }
                ),
                (5, Command::Dump),
            ]
        );
    }

    #[rstest]
    #[case("add 0102", "needs a payload")]
    #[case("add zz payload", "key 'zz'")]
    #[case("select x 01", "offset 'x'")]
    #[case("select 0", "missing mask bytes")]
    #[case("remove 01 02", "unexpected '02'")]
    #[case("frobnicate", "unknown command")]
    fn given_bad_line_when_parsing_then_error_names_line(#[case] line: &str, #[case] needle: &str) {
        let err = format!("add 01 ok\n{line}").parse::<Script>().unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("line 2:"), "{message}");
        assert!(message.contains(needle), "{message}");
    }
}
