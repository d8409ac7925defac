// src/models/inquiry.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use utoipa::ToSchema;

use crate::common::error::AppError;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "inquiry_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InquiryType {
    Rent,
    Sale,
    Maintenance,
}

impl InquiryType {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "RENT" => Ok(InquiryType::Rent),
            "SALE" => Ok(InquiryType::Sale),
            "MAINTENANCE" => Ok(InquiryType::Maintenance),
            _ => Err(AppError::validation("Invalid inquiry type")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "inquiry_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InquiryStatus {
    Open,
    Contacted,
    MeetingScheduled,
    FollowUp,
    Accepted,
    Rejected,
    Closed,
}

impl InquiryStatus {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        use InquiryStatus::*;
        match value.trim().to_ascii_uppercase().as_str() {
            "OPEN" => Ok(Open),
            "CONTACTED" => Ok(Contacted),
            "MEETING_SCHEDULED" => Ok(MeetingScheduled),
            "FOLLOW_UP" => Ok(FollowUp),
            "ACCEPTED" => Ok(Accepted),
            "REJECTED" => Ok(Rejected),
            "CLOSED" => Ok(Closed),
            _ => Err(AppError::validation("Invalid status")),
        }
    }

    /// ACCEPTED, REJECTED e CLOSED encerram o lead (closedAt preenchido).
    pub fn is_terminal(self) -> bool {
        matches!(self, InquiryStatus::Accepted | InquiryStatus::Rejected | InquiryStatus::Closed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "follow_up_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FollowUpType {
    Call,
    Viewing,
    Meeting,
    SiteVisit,
    Paperwork,
    Other,
}

impl FollowUpType {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        use FollowUpType::*;
        match value.trim().to_ascii_uppercase().as_str() {
            "CALL" => Ok(Call),
            "VIEWING" => Ok(Viewing),
            "MEETING" => Ok(Meeting),
            "SITE_VISIT" => Ok(SiteVisit),
            "PAPERWORK" => Ok(Paperwork),
            "OTHER" => Ok(Other),
            _ => Err(AppError::validation("Invalid follow-up type")),
        }
    }
}

/// Classificação do campo livre `outcome` de um follow-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUpOutcome {
    Won,
    Lost,
    Neutral,
}

impl FollowUpOutcome {
    pub fn classify(outcome: &str) -> Self {
        match outcome.trim().to_ascii_uppercase().as_str() {
            "ACCEPTED" | "DEAL_CLOSED" => FollowUpOutcome::Won,
            "REJECTED" | "CLIENT_DECLINED" => FollowUpOutcome::Lost,
            _ => FollowUpOutcome::Neutral,
        }
    }
}

// --- ENTIDADES ---

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "PREMIUM")]
    pub subscription_plan: Option<String>,
    pub terms_accepted_at: Option<DateTime<Utc>>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

impl AgentProfile {
    pub fn new(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            subscription_plan: None,
            terms_accepted_at: None,
            is_available: true,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub inquiry_type: InquiryType,
    pub agent_id: Uuid,
    pub property_id: Option<Uuid>,
    #[schema(example = "Fatima Al Mansoori")]
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub message: Option<String>,
    #[schema(value_type = Option<f64>, example = 120000.0)]
    pub budget: Option<Decimal>,
    #[schema(example = "Dubai Marina")]
    pub preferred_area: Option<String>,
    #[schema(example = "direct")]
    pub source: String,
    pub status: InquiryStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Inquiry {
    /// Troca o status mantendo o acoplamento closedAt <-> status terminal.
    pub fn set_status(&mut self, status: InquiryStatus, now: DateTime<Utc>) {
        self.status = status;
        self.closed_at = if status.is_terminal() { Some(now) } else { None };
        self.updated_at = now;
    }

    /// Efeitos de um novo follow-up sobre o lead. O `outcome` é avaliado por
    /// último e sobrescreve o status definido pelo agendamento.
    pub fn apply_follow_up(
        &mut self,
        follow_up_type: FollowUpType,
        scheduled_at: Option<DateTime<Utc>>,
        outcome: Option<&str>,
        now: DateTime<Utc>,
    ) {
        if let Some(when) = scheduled_at {
            if self.status == InquiryStatus::Open {
                let next = if follow_up_type == FollowUpType::Meeting {
                    InquiryStatus::MeetingScheduled
                } else {
                    InquiryStatus::FollowUp
                };
                self.set_status(next, now);
                self.scheduled_at = Some(when);
            }
        }

        match outcome.map(FollowUpOutcome::classify) {
            Some(FollowUpOutcome::Won) => self.set_status(InquiryStatus::Accepted, now),
            Some(FollowUpOutcome::Lost) => self.set_status(InquiryStatus::Rejected, now),
            Some(FollowUpOutcome::Neutral) | None => {}
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InquiryFollowUp {
    pub id: Uuid,
    pub inquiry_id: Uuid,
    #[serde(rename = "type")]
    pub follow_up_type: FollowUpType,
    #[schema(example = "Viewing at Marina Gate")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "RESCHEDULED")]
    pub outcome: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn open_inquiry() -> Inquiry {
        let now = Utc::now();
        Inquiry {
            id: Uuid::new_v4(),
            inquiry_type: InquiryType::Rent,
            agent_id: Uuid::new_v4(),
            property_id: None,
            client_name: "Omar Haddad".into(),
            client_email: "omar@example.ae".into(),
            client_phone: None,
            message: None,
            budget: None,
            preferred_area: None,
            source: "direct".into(),
            status: InquiryStatus::Open,
            scheduled_at: None,
            closed_at: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(InquiryStatus::parse("meeting_scheduled").unwrap(), InquiryStatus::MeetingScheduled);
        assert_eq!(InquiryType::parse("rent").unwrap(), InquiryType::Rent);
        assert_eq!(FollowUpType::parse("Site_Visit").unwrap(), FollowUpType::SiteVisit);
        assert!(InquiryStatus::parse("WON").is_err());
        assert!(InquiryType::parse("LEASE").is_err());
    }

    #[test]
    fn outcome_classification() {
        assert_eq!(FollowUpOutcome::classify("accepted"), FollowUpOutcome::Won);
        assert_eq!(FollowUpOutcome::classify("DEAL_CLOSED"), FollowUpOutcome::Won);
        assert_eq!(FollowUpOutcome::classify("client_declined"), FollowUpOutcome::Lost);
        assert_eq!(FollowUpOutcome::classify("RESCHEDULED"), FollowUpOutcome::Neutral);
    }

    #[test]
    fn closed_at_tracks_terminal_status() {
        let mut inquiry = open_inquiry();
        inquiry.set_status(InquiryStatus::Closed, Utc::now());
        assert!(inquiry.closed_at.is_some());
        inquiry.set_status(InquiryStatus::Contacted, Utc::now());
        assert!(inquiry.closed_at.is_none());
    }

    #[test]
    fn scheduled_meeting_on_open_inquiry() {
        let when = Utc.with_ymd_and_hms(2026, 11, 2, 10, 0, 0).unwrap();
        let mut inquiry = open_inquiry();
        inquiry.apply_follow_up(FollowUpType::Meeting, Some(when), None, Utc::now());
        assert_eq!(inquiry.status, InquiryStatus::MeetingScheduled);
        assert_eq!(inquiry.scheduled_at, Some(when));

        let mut inquiry = open_inquiry();
        inquiry.apply_follow_up(FollowUpType::Call, Some(when), None, Utc::now());
        assert_eq!(inquiry.status, InquiryStatus::FollowUp);
    }

    #[test]
    fn schedule_is_ignored_once_inquiry_moved_on() {
        let when = Utc.with_ymd_and_hms(2026, 11, 2, 10, 0, 0).unwrap();
        let mut inquiry = open_inquiry();
        inquiry.status = InquiryStatus::Contacted;
        inquiry.apply_follow_up(FollowUpType::Meeting, Some(when), None, Utc::now());
        assert_eq!(inquiry.status, InquiryStatus::Contacted);
        assert!(inquiry.scheduled_at.is_none());
    }

    #[test]
    fn outcome_overrides_schedule() {
        let when = Utc.with_ymd_and_hms(2026, 11, 2, 10, 0, 0).unwrap();
        let mut inquiry = open_inquiry();
        inquiry.apply_follow_up(FollowUpType::Viewing, Some(when), Some("client_declined"), Utc::now());
        assert_eq!(inquiry.status, InquiryStatus::Rejected);
        assert!(inquiry.closed_at.is_some());
        assert_eq!(inquiry.scheduled_at, Some(when));
    }

    #[test]
    fn neutral_outcome_keeps_status() {
        let mut inquiry = open_inquiry();
        inquiry.apply_follow_up(FollowUpType::Call, None, Some("RESCHEDULED"), Utc::now());
        assert_eq!(inquiry.status, InquiryStatus::Open);
        assert!(inquiry.closed_at.is_none());
    }
}
