//! Config command: print the effective configuration.

use std::io::Write;

use anyhow::Result;

use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    writeln!(writer, "{json}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn prints_defaults_as_json() {
        let mut buffer = Vec::new();
        run(&mut buffer, &Config::default()).unwrap();

        assert_snapshot!(String::from_utf8(buffer).unwrap(), @r#"
        {
          "stream": {
            "url": "ws://127.0.0.1:10501/ws",
            "reconnect_backoff_ms": 3000,
            "connect_timeout_ms": 5000,
            "stop_timeout_ms": 3000
          },
          "tracking": {
            "solid_reason": "Solid Reason",
            "ageless_words": "Ageless Words",
            "eureka_moment": "Eureka Moment"
          },
          "display": {
            "color": false
          }
        }
        "#);
    }
}
