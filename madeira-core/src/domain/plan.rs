use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanKind {
    #[display("free")]
    Free,
    #[display("monthly")]
    Monthly,
    #[display("yearly")]
    Yearly,
    #[display("expired")]
    Expired,
}

/// Static catalog entry for a plan.
#[derive(Debug, Clone, Serialize)]
pub struct PlanInfo {
    pub kind: PlanKind,
    pub name: &'static str,
    pub price: f64,
    pub duration_days: i64,
    pub features: &'static [&'static str],
}

const FREE: PlanInfo = PlanInfo {
    kind: PlanKind::Free,
    name: "Plano Gratuito",
    price: 0.0,
    duration_days: 30,
    features: &["Cálculos básicos", "Relatórios simples", "Suporte por email"],
};

const MONTHLY: PlanInfo = PlanInfo {
    kind: PlanKind::Monthly,
    name: "Plano Mensal",
    price: 10.0,
    duration_days: 30,
    features: &[
        "Cálculos avançados",
        "Relatórios detalhados",
        "Suporte prioritário",
        "Backup automático",
    ],
};

const YEARLY: PlanInfo = PlanInfo {
    kind: PlanKind::Yearly,
    name: "Plano Anual",
    price: 120.0,
    duration_days: 365,
    features: &[
        "Cálculos avançados",
        "Relatórios detalhados",
        "Suporte prioritário",
        "Backup automático",
        "Desconto de 50%",
    ],
};

const EXPIRED: PlanInfo = PlanInfo {
    kind: PlanKind::Expired,
    name: "Plano Expirado",
    price: 0.0,
    duration_days: 0,
    features: &[],
};

impl PlanKind {
    pub fn info(self) -> &'static PlanInfo {
        match self {
            PlanKind::Free => &FREE,
            PlanKind::Monthly => &MONTHLY,
            PlanKind::Yearly => &YEARLY,
            PlanKind::Expired => &EXPIRED,
        }
    }

    /// Plans a user can be moved onto.
    pub fn purchasable() -> [PlanKind; 3] {
        [PlanKind::Free, PlanKind::Monthly, PlanKind::Yearly]
    }
}

impl FromStr for PlanKind {
    type Err = DomainError;

    /// Only plans from the purchasable catalog parse; `expired` is a state, not a choice.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(PlanKind::Free),
            "monthly" => Ok(PlanKind::Monthly),
            "yearly" => Ok(PlanKind::Yearly),
            _ => Err(DomainError::InvalidPlan(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecord {
    #[serde(rename = "type")]
    pub kind: PlanKind,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl PlanRecord {
    pub fn starting(kind: PlanKind, now: DateTime<Utc>) -> Self {
        Self {
            kind,
            start_date: Some(now),
            end_date: Some(now + Duration::days(kind.info().duration_days)),
        }
    }

    pub fn expired() -> Self {
        Self {
            kind: PlanKind::Expired,
            start_date: None,
            end_date: None,
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self.end_date {
            Some(end) => self.kind != PlanKind::Expired && now <= end,
            None => false,
        }
    }

    pub fn is_lapsed_trial(&self, now: DateTime<Utc>) -> bool {
        self.kind == PlanKind::Free && self.end_date.is_some_and(|end| now > end)
    }

    pub fn days_left(&self, now: DateTime<Utc>) -> i64 {
        self.end_date
            .map(|end| (end - now).num_days().max(0))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("free", PlanKind::Free)]
    #[case("Monthly", PlanKind::Monthly)]
    #[case(" YEARLY ", PlanKind::Yearly)]
    fn parses_catalog_keys(#[case] input: &str, #[case] expected: PlanKind) {
        assert_eq!(input.parse::<PlanKind>().unwrap(), expected);
    }

    #[rstest]
    #[case("expired")]
    #[case("premium")]
    #[case("")]
    fn rejects_unknown_keys(#[case] input: &str) {
        assert!(matches!(
            input.parse::<PlanKind>(),
            Err(DomainError::InvalidPlan(_))
        ));
    }

    #[test]
    fn plan_window_matches_catalog_duration() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let yearly = PlanRecord::starting(PlanKind::Yearly, now);
        assert_eq!(yearly.end_date, Some(now + Duration::days(365)));
        assert!(yearly.is_active(now + Duration::days(365)));
        assert!(!yearly.is_active(now + Duration::days(365) + Duration::seconds(1)));
    }

    #[test]
    fn only_free_plans_lapse_into_expired() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let later = now + Duration::days(31);
        assert!(PlanRecord::starting(PlanKind::Free, now).is_lapsed_trial(later));
        assert!(!PlanRecord::starting(PlanKind::Monthly, now).is_lapsed_trial(later));
        assert!(!PlanRecord::expired().is_active(now));
    }
}
