//! SIP003 plugin options string
//!
//! The host passes plugin options as `key=value` pairs separated by `;`.
//! A key without `=` is a boolean switch and reads as `"1"`. A backslash
//! escapes the following character, so `\;`, `\=` and `\\` can appear in
//! keys and values.

use crate::config::error::{ConfigError, Result};

/// Parsed plugin options, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginOptions {
    pairs: Vec<(String, String)>,
}

impl PluginOptions {
    /// Parse an options string
    pub fn parse(s: &str) -> Result<Self> {
        let mut pairs = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            let (key, term) = read_unescaped(&mut chars, &['=', ';'], s)?;
            if key.is_empty() {
                return Err(ConfigError::Options(format!("empty key in {:?}", s)));
            }

            if term != Some('=') {
                pairs.push((key, "1".to_string()));
                continue;
            }

            let (value, _) = read_unescaped(&mut chars, &[';'], s)?;
            pairs.push((key, value));
        }

        Ok(Self { pairs })
    }

    /// First value given for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All pairs in input order, repeated keys included
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Read until one of `terms`, consuming the terminator and returning it
fn read_unescaped<I>(
    chars: &mut std::iter::Peekable<I>,
    terms: &[char],
    whole: &str,
) -> Result<(String, Option<char>)>
where
    I: Iterator<Item = char>,
{
    let mut out = String::new();

    while let Some(c) = chars.next() {
        if terms.contains(&c) {
            return Ok((out, Some(c)));
        }
        if c == '\\' {
            match chars.next() {
                Some(escaped) => out.push(escaped),
                None => {
                    return Err(ConfigError::Options(format!(
                        "nothing following final escape in {:?}",
                        whole
                    )))
                }
            }
        } else {
            out.push(c);
        }
    }

    Ok((out, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_value_pairs() {
        let opts = PluginOptions::parse("mode=websocket;host=example.com;path=/ws").unwrap();
        assert_eq!(opts.get("mode"), Some("websocket"));
        assert_eq!(opts.get("host"), Some("example.com"));
        assert_eq!(opts.get("path"), Some("/ws"));
        assert_eq!(opts.get("mux"), None);
    }

    #[test]
    fn test_bare_key_is_switch() {
        let opts = PluginOptions::parse("server;mux=0").unwrap();
        assert_eq!(opts.get("server"), Some("1"));
        assert_eq!(opts.get("mux"), Some("0"));

        let opts = PluginOptions::parse("__android_vpn").unwrap();
        assert_eq!(opts.get("__android_vpn"), Some("1"));
    }

    #[test]
    fn test_escapes() {
        let opts = PluginOptions::parse(r"path=/a\;b\=c\\d;host=h").unwrap();
        assert_eq!(opts.get("path"), Some(r"/a;b=c\d"));
        assert_eq!(opts.get("host"), Some("h"));
    }

    #[test]
    fn test_first_value_wins() {
        let opts = PluginOptions::parse("host=a;host=b").unwrap();
        assert_eq!(opts.get("host"), Some("a"));
        assert_eq!(opts.iter().count(), 2);
    }

    #[test]
    fn test_trailing_separator_and_empty_value() {
        let opts = PluginOptions::parse("path=;mode=websocket;").unwrap();
        assert_eq!(opts.get("path"), Some(""));
        assert_eq!(opts.get("mode"), Some("websocket"));
        assert!(PluginOptions::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(PluginOptions::parse("=value"), Err(ConfigError::Options(_))));
        assert!(matches!(PluginOptions::parse("mode=websocket;;"), Err(ConfigError::Options(_))));
        assert!(matches!(PluginOptions::parse(r"path=abc\"), Err(ConfigError::Options(_))));
    }
}
