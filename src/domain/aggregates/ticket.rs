//! Support Ticket Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;
use validator::Validate;

use crate::domain::aggregates::order::UnknownVariant;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub message: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct NewTicket {
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

impl NewTicket {
    pub fn trimmed(self) -> Self {
        Self {
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }
}

impl Ticket {
    pub fn open(user_id: Uuid, new: NewTicket) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            subject: new.subject,
            message: new.message,
            status: TicketStatus::Open,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    #[default]
    Open,
    Closed,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_only_ticket_is_invalid() {
        let new = NewTicket { subject: "   ".into(), message: "help".into() }.trimmed();
        assert!(new.validate().is_err());
    }

    #[test]
    fn test_status_parse_is_strict() {
        assert_eq!("closed".parse::<TicketStatus>().unwrap(), TicketStatus::Closed);
        assert!("resolved".parse::<TicketStatus>().is_err());
    }
}
