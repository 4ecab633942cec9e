//! CRM vocabulary shared by the store and the command line.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Sales-pipeline stage of a prospect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProspectStatus {
    Prospect,
    Contacted,
    Qualified,
    Visited,
    /// Do not contact.
    Dnc,
}

impl ProspectStatus {
    pub const ALL: [Self; 5] = [
        Self::Prospect,
        Self::Contacted,
        Self::Qualified,
        Self::Visited,
        Self::Dnc,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prospect => "prospect",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Visited => "visited",
            Self::Dnc => "dnc",
        }
    }
}

impl std::fmt::Display for ProspectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProspectStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| CoreError::InvalidStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Call,
    Email,
    Sms,
    Visit,
    Note,
}

impl Channel {
    pub const ALL: [Self; 5] = [Self::Call, Self::Email, Self::Sms, Self::Visit, Self::Note];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Visit => "visit",
            Self::Note => "note",
        }
    }

    /// Whether logging this channel means the prospect has been reached out to.
    /// Internal notes do not count.
    #[must_use]
    pub fn is_outreach(self) -> bool {
        !matches!(self, Self::Note)
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Channel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|channel| channel.as_str() == normalized)
            .ok_or_else(|| CoreError::InvalidChannel(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outbound,
    Inbound,
}

impl Direction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Outbound => "outbound",
            Self::Inbound => "inbound",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "outbound" => Ok(Self::Outbound),
            "inbound" => Ok(Self::Inbound),
            _ => Err(CoreError::InvalidDirection(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_display() {
        for status in ProspectStatus::ALL {
            assert_eq!(
                status.to_string().parse::<ProspectStatus>().unwrap(),
                status
            );
        }
    }

    #[test]
    fn status_rejects_unknown() {
        assert!(matches!(
            "archived".parse::<ProspectStatus>(),
            Err(CoreError::InvalidStatus(ref s)) if s == "archived"
        ));
    }

    #[test]
    fn channel_parse_is_case_insensitive() {
        assert_eq!("SMS".parse::<Channel>().unwrap(), Channel::Sms);
        assert_eq!(" Call ".parse::<Channel>().unwrap(), Channel::Call);
        assert!("fax".parse::<Channel>().is_err());
    }

    #[test]
    fn notes_are_not_outreach() {
        assert!(!Channel::Note.is_outreach());
        assert!(Channel::Call.is_outreach());
        assert!(Channel::Visit.is_outreach());
    }

    #[test]
    fn direction_parses() {
        assert_eq!("inbound".parse::<Direction>().unwrap(), Direction::Inbound);
        assert!("sideways".parse::<Direction>().is_err());
    }
}
