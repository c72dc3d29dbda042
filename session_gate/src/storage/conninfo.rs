//! Postgres connection descriptors.
//!
//! Two spellings are accepted: a `postgres://` URL, or the keyword/value form
//! (`"host=db.internal port=5432 dbname = auth"`). Anything the descriptor leaves
//! out falls back to the client's environment defaults (`PGHOST`, `PGUSER`, ...).

use std::iter::Peekable;
use std::str::{Chars, FromStr};

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use url::Url;

use crate::errors::ConfigError;

const MASK: &str = "********";

pub(crate) fn parse_descriptor(descriptor: &str) -> Result<PgConnectOptions, ConfigError> {
    let descriptor = descriptor.trim();

    if is_url(descriptor) {
        return PgConnectOptions::from_str(descriptor).map_err(|e| {
            ConfigError::InvalidDescriptor(format!("{}: {e}", redact_descriptor(descriptor)))
        });
    }

    let mut options = PgConnectOptions::new();
    for (key, value) in parse_keyword_pairs(descriptor)? {
        options = match key.as_str() {
            "host" | "hostaddr" => options.host(&value),
            "port" => options.port(
                value
                    .parse()
                    .map_err(|_| ConfigError::InvalidPort(value.clone()))?,
            ),
            "dbname" => options.database(&value),
            "user" => options.username(&value),
            "password" => options.password(&value),
            "sslmode" => options.ssl_mode(PgSslMode::from_str(&value).map_err(|_| {
                ConfigError::InvalidDescriptor(format!("invalid sslmode '{value}'"))
            })?),
            "application_name" => options.application_name(&value),
            other => {
                return Err(ConfigError::InvalidDescriptor(format!(
                    "unsupported connection option '{other}'"
                )));
            }
        };
    }

    Ok(options)
}

/// Render a descriptor for logs with any password masked.
pub(crate) fn redact_descriptor(descriptor: &str) -> String {
    let descriptor = descriptor.trim();

    if is_url(descriptor) {
        return match Url::parse(descriptor) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some(MASK));
                }
                url.to_string()
            }
            Err(_) => "<unparsable postgres url>".to_string(),
        };
    }

    match parse_keyword_pairs(descriptor) {
        Ok(pairs) => pairs
            .iter()
            .map(|(key, value)| {
                let value = if key == "password" { MASK } else { value.as_str() };
                if value.is_empty() || value.contains(char::is_whitespace) {
                    format!("{key}='{value}'")
                } else {
                    format!("{key}={value}")
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
        Err(_) => "<malformed descriptor>".to_string(),
    }
}

fn is_url(descriptor: &str) -> bool {
    descriptor.starts_with("postgres://") || descriptor.starts_with("postgresql://")
}

fn parse_keyword_pairs(input: &str) -> Result<Vec<(String, String)>, ConfigError> {
    let mut pairs = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        skip_whitespace(&mut chars);
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' || c.is_whitespace() {
                break;
            }
            key.push(c);
            chars.next();
        }

        skip_whitespace(&mut chars);
        if key.is_empty() || chars.next() != Some('=') {
            return Err(ConfigError::InvalidDescriptor(format!(
                "missing \"=\" after \"{key}\""
            )));
        }
        skip_whitespace(&mut chars);

        let value = if chars.peek() == Some(&'\'') {
            chars.next();
            read_quoted(&mut chars)?
        } else {
            read_bare(&mut chars)
        };

        pairs.push((key, value));
    }

    Ok(pairs)
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

fn read_quoted(chars: &mut Peekable<Chars<'_>>) -> Result<String, ConfigError> {
    let mut value = String::new();
    loop {
        match chars.next() {
            Some('\\') => match chars.next() {
                Some(c) => value.push(c),
                None => break,
            },
            Some('\'') => return Ok(value),
            Some(c) => value.push(c),
            None => break,
        }
    }
    Err(ConfigError::InvalidDescriptor(
        "unterminated quoted string".to_string(),
    ))
}

fn read_bare(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut value = String::new();
    while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                value.push(escaped);
            }
        } else {
            value.push(c);
        }
    }
    value
}
