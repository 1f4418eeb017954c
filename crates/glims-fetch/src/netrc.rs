//! Minimal netrc reader for Earthdata credentials.
//!
//! Supports the `machine`, `default`, `login`, `password` and `account`
//! tokens. `macdef` bodies are skipped up to the next blank line.

use crate::{FetchError, Result};
use std::path::Path;

/// Login and password for one host.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User name.
    pub login: String,
    /// Password.
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    machine: Option<String>,
    credentials: Credentials,
}

/// Parsed netrc file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Netrc {
    entries: Vec<Entry>,
}

impl Netrc {
    /// Read and parse a netrc file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse netrc text.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = Vec::new();
        let mut current: Option<(Option<String>, Option<String>, Option<String>)> = None;

        let mut lines = text.lines();
        while let Some(line) = lines.next() {
            let mut tokens = line.split_whitespace();
            while let Some(token) = tokens.next() {
                match token {
                    "machine" => {
                        let host = tokens
                            .next()
                            .ok_or_else(|| FetchError::Netrc("machine without a host".into()))?;
                        finish_entry(&mut entries, current.take())?;
                        current = Some((Some(host.to_string()), None, None));
                    }
                    "default" => {
                        finish_entry(&mut entries, current.take())?;
                        current = Some((None, None, None));
                    }
                    "login" | "password" | "account" => {
                        let value = tokens
                            .next()
                            .ok_or_else(|| {
                                FetchError::Netrc(format!("{} without a value", token))
                            })?;
                        let Some(entry) = current.as_mut() else {
                            return Err(FetchError::Netrc(format!("{} outside a machine", token)));
                        };
                        match token {
                            "login" => entry.1 = Some(value.to_string()),
                            "password" => entry.2 = Some(value.to_string()),
                            _ => {}
                        }
                    }
                    "macdef" => {
                        for body in lines.by_ref() {
                            if body.trim().is_empty() {
                                break;
                            }
                        }
                        break;
                    }
                    t if t.starts_with('#') => break,
                    other => {
                        return Err(FetchError::Netrc(format!("unexpected token '{}'", other)));
                    }
                }
            }
        }
        finish_entry(&mut entries, current.take())?;

        Ok(Self { entries })
    }

    /// Credentials for a host: its `machine` entry, else the `default` entry.
    pub fn credentials_for(&self, host: &str) -> Option<&Credentials> {
        self.entries
            .iter()
            .find(|e| {
                e.machine
                    .as_deref()
                    .is_some_and(|m| m.eq_ignore_ascii_case(host))
            })
            .or_else(|| self.entries.iter().find(|e| e.machine.is_none()))
            .map(|e| &e.credentials)
    }

    /// Whether the file has no usable entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn finish_entry(
    entries: &mut Vec<Entry>,
    entry: Option<(Option<String>, Option<String>, Option<String>)>,
) -> Result<()> {
    let Some((machine, login, password)) = entry else {
        return Ok(());
    };
    match (login, password) {
        (Some(login), Some(password)) => {
            entries.push(Entry {
                machine,
                credentials: Credentials { login, password },
            });
            Ok(())
        }
        _ => Err(FetchError::Netrc(format!(
            "entry for {} needs both login and password",
            machine.as_deref().unwrap_or("default")
        ))),
    }
}
