//! Hierarchical node identifiers
//!
//! An identifier is a sequence of path segments rendered as `/seg/seg/...`.
//! Sibling nodes of the same kind are distinguished by their last segment
//! (usually an index), e.g. `/intelcpu/0/temperature/3`.

use std::fmt;
use std::str::FromStr;

use sj_error::{Result, SensorJsonError};

/// Separator between identifier segments
pub const SEPARATOR: char = '/';

/// Structured, hierarchical node identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    segments: Vec<String>,
}

impl Identifier {
    /// Build an identifier from its segments.
    ///
    /// Fails when there are no segments, or a segment is empty or contains
    /// the separator.
    pub fn new<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(SensorJsonError::InvalidIdentifier(
                "identifier has no segments".into(),
            ));
        }
        for segment in &segments {
            validate_segment(segment)?;
        }
        Ok(Self { segments })
    }

    /// Append one segment. Separator characters inside the segment are
    /// replaced with `_` and an empty segment becomes `_`.
    pub fn child(&self, segment: impl fmt::Display) -> Self {
        let mut segments = self.segments.clone();
        segments.push(sanitize_segment(&segment.to_string()));
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment
    pub fn leaf(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// The identifier one level up, if any
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// True when `self` is a strict prefix of `other`
    pub fn is_ancestor_of(&self, other: &Identifier) -> bool {
        other.segments.len() > self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }
}

fn validate_segment(segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(SensorJsonError::InvalidIdentifier(
            "empty identifier segment".into(),
        ));
    }
    if segment.contains(SEPARATOR) {
        return Err(SensorJsonError::InvalidIdentifier(format!(
            "segment {:?} contains '{}'",
            segment, SEPARATOR
        )));
    }
    Ok(())
}

fn sanitize_segment(segment: &str) -> String {
    if segment.is_empty() {
        return "_".to_string();
    }
    segment.replace(SEPARATOR, "_")
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{}{}", SEPARATOR, segment)?;
        }
        Ok(())
    }
}

impl FromStr for Identifier {
    type Err = SensorJsonError;

    fn from_str(s: &str) -> Result<Self> {
        let rest = s.strip_prefix(SEPARATOR).ok_or_else(|| {
            SensorJsonError::InvalidIdentifier(format!("{:?} must start with '{}'", s, SEPARATOR))
        })?;
        Self::new(rest.split(SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_slash_path() {
        let id = Identifier::new(["mainboard", "0"]).unwrap();
        assert_eq!(id.to_string(), "/mainboard/0");
    }

    #[test]
    fn test_parse_roundtrip() {
        let id: Identifier = "/intelcpu/0/temperature/0".parse().unwrap();
        assert_eq!(id.segments().len(), 4);
        assert_eq!(id.leaf(), "0");
        assert_eq!(id.to_string(), "/intelcpu/0/temperature/0");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("intelcpu/0".parse::<Identifier>().is_err());
        assert!("/".parse::<Identifier>().is_err());
        assert!("/a//b".parse::<Identifier>().is_err());
        assert!("".parse::<Identifier>().is_err());
    }

    #[test]
    fn test_new_rejects_separator_in_segment() {
        assert!(Identifier::new(["a/b"]).is_err());
        assert!(Identifier::new(Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_child_sanitizes() {
        let id = Identifier::new(["lpc"]).unwrap();
        assert_eq!(id.child("nct/6798").to_string(), "/lpc/nct_6798");
        assert_eq!(id.child("").to_string(), "/lpc/_");
        assert_eq!(id.child(3).to_string(), "/lpc/3");
    }

    #[test]
    fn test_parent_and_ancestry() {
        let hw: Identifier = "/intelcpu/0".parse().unwrap();
        let sensor = hw.child("temperature").child(1);
        assert_eq!(sensor.parent().unwrap().parent().unwrap(), hw);
        assert!(hw.is_ancestor_of(&sensor));
        assert!(!sensor.is_ancestor_of(&hw));
        assert!(!hw.is_ancestor_of(&hw));
        assert!("/ram".parse::<Identifier>().unwrap().parent().is_none());
    }
}
