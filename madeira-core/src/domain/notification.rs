use std::str::FromStr;

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[display("system")]
    System,
    #[display("update")]
    Update,
    #[display("calculation")]
    Calculation,
    #[display("profile")]
    Profile,
    #[display("plan")]
    Plan,
    #[display("error")]
    Error,
    #[display("success")]
    Success,
}

impl FromStr for NotificationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "system" => Ok(NotificationKind::System),
            "update" => Ok(NotificationKind::Update),
            "calculation" => Ok(NotificationKind::Calculation),
            "profile" => Ok(NotificationKind::Profile),
            "plan" => Ok(NotificationKind::Plan),
            "error" => Ok(NotificationKind::Error),
            "success" => Ok(NotificationKind::Success),
            other => Err(DomainError::Validation(format!(
                "unknown notification type: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: String, message: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title,
            message,
            time: now,
            read: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationFilter {
    #[default]
    All,
    Unread,
    Read,
    Kind(NotificationKind),
}

impl NotificationFilter {
    pub fn matches(&self, notification: &Notification) -> bool {
        match self {
            NotificationFilter::All => true,
            NotificationFilter::Unread => !notification.read,
            NotificationFilter::Read => notification.read,
            NotificationFilter::Kind(kind) => notification.kind == *kind,
        }
    }
}

impl FromStr for NotificationFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "" => Ok(NotificationFilter::All),
            "unread" => Ok(NotificationFilter::Unread),
            "read" => Ok(NotificationFilter::Read),
            other => other.parse().map(NotificationFilter::Kind),
        }
    }
}

/// Relative age in the app's language ("5 minutos atrás").
pub fn relative_time(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - time).num_seconds().max(0);
    match diff {
        0..60 => "Agora".to_string(),
        60..3_600 => format!("{} minutos atrás", diff / 60),
        3_600..86_400 => format!("{} horas atrás", diff / 3_600),
        86_400..2_592_000 => format!("{} dias atrás", diff / 86_400),
        2_592_000..31_536_000 => format!("{} meses atrás", diff / 2_592_000),
        _ => time.format("%d/%m/%Y").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    #[rstest]
    #[case(Duration::seconds(10), "Agora")]
    #[case(Duration::minutes(5), "5 minutos atrás")]
    #[case(Duration::hours(3), "3 horas atrás")]
    #[case(Duration::days(2), "2 dias atrás")]
    #[case(Duration::days(65), "2 meses atrás")]
    fn relative_time_buckets(#[case] age: Duration, #[case] expected: &str) {
        let now = Utc::now();
        assert_eq!(relative_time(now - age, now), expected);
    }

    #[test]
    fn filter_parses_kinds() {
        assert_eq!(
            "plan".parse::<NotificationFilter>().unwrap(),
            NotificationFilter::Kind(NotificationKind::Plan)
        );
        assert!("nope".parse::<NotificationFilter>().is_err());
    }
}
