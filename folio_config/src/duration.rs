use std::ops::Deref;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration(pub std::time::Duration);

impl From<Duration> for std::time::Duration {
    fn from(value: Duration) -> Self {
        value.0
    }
}

impl std::fmt::Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut secs = self.0.as_secs();
        if secs == 0 {
            return f.write_str("0s");
        }
        let mut first = true;
        for (unit, len) in [('d', 24 * 3600), ('h', 3600), ('m', 60), ('s', 1)] {
            let n = secs / len;
            secs %= len;
            if n > 0 {
                if !first {
                    f.write_str(" ")?;
                }
                write!(f, "{n}{unit}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl Deref for Duration {
    type Target = std::time::Duration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl std::str::FromStr for Duration {
    type Err = String;

    /// Parses whitespace separated parts like `1h 30m`. A part without a
    /// unit counts as seconds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_whitespace()
            .try_fold(0u64, |total, part| {
                let (digits, unit) = match part.find(|c: char| !c.is_ascii_digit()) {
                    Some(idx) => part.split_at(idx),
                    None => (part, "s"),
                };
                let factor = match unit {
                    "s" => 1,
                    "m" => 60,
                    "h" => 3600,
                    "d" => 24 * 3600,
                    _ => return None,
                };
                digits
                    .parse::<u64>()
                    .ok()?
                    .checked_mul(factor)?
                    .checked_add(total)
            })
            .map(|secs| Self(std::time::Duration::from_secs(secs)))
            .ok_or_else(|| format!("Invalid duration: {s:?}"))
    }
}
