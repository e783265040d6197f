use super::builder::{end_date_on, parse_date};
use super::templates::*;
use super::{QueryError, QueryValidator, ReportFilters, TemplateBuilder};
use chrono::{Duration, Local, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

pub const DEFAULT_LIMIT: u32 = 1000;
pub const MAX_LIMIT: u32 = 10_000;

const TENANT_ID: &str = "tenant_id";
const USER_ID: &str = "user_id";
const CARE_RECORD_ID: &str = "care_record_id";

/// Every report the catalog can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    TotalSessions,
    SessionsByStatus,
    SessionsTrend,
    TopTenants,
    TopPractitioners,
    AuditTrail,
    AuditTrailByUser,
    UnsignedNotes,
    UnsignedNotesCount,
    UnsignedNotesByPractitioner,
    WeeklySummary,
    WeeklySummaryByTenant,
    WeekOverWeek,
    DailyActiveUsers,
    MonthlyActiveUsers,
    UserRetentionCohort,
    GrowthMetrics,
    ServiceUsageTenant,
    ServiceUsagePractitioner,
    ServiceUsagePatient,
    EventsByType,
    SessionLifecycle,
    NoteFormatUsage,
    AudioDurationStats,
    AudioDurationDistribution,
}

impl ReportType {
    pub const ALL: [ReportType; 25] = [
        ReportType::TotalSessions,
        ReportType::SessionsByStatus,
        ReportType::SessionsTrend,
        ReportType::TopTenants,
        ReportType::TopPractitioners,
        ReportType::AuditTrail,
        ReportType::AuditTrailByUser,
        ReportType::UnsignedNotes,
        ReportType::UnsignedNotesCount,
        ReportType::UnsignedNotesByPractitioner,
        ReportType::WeeklySummary,
        ReportType::WeeklySummaryByTenant,
        ReportType::WeekOverWeek,
        ReportType::DailyActiveUsers,
        ReportType::MonthlyActiveUsers,
        ReportType::UserRetentionCohort,
        ReportType::GrowthMetrics,
        ReportType::ServiceUsageTenant,
        ReportType::ServiceUsagePractitioner,
        ReportType::ServiceUsagePatient,
        ReportType::EventsByType,
        ReportType::SessionLifecycle,
        ReportType::NoteFormatUsage,
        ReportType::AudioDurationStats,
        ReportType::AudioDurationDistribution,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportType::TotalSessions => "total_sessions",
            ReportType::SessionsByStatus => "sessions_by_status",
            ReportType::SessionsTrend => "sessions_trend",
            ReportType::TopTenants => "top_tenants",
            ReportType::TopPractitioners => "top_practitioners",
            ReportType::AuditTrail => "audit_trail",
            ReportType::AuditTrailByUser => "audit_trail_by_user",
            ReportType::UnsignedNotes => "unsigned_notes",
            ReportType::UnsignedNotesCount => "unsigned_notes_count",
            ReportType::UnsignedNotesByPractitioner => "unsigned_notes_by_practitioner",
            ReportType::WeeklySummary => "weekly_summary",
            ReportType::WeeklySummaryByTenant => "weekly_summary_by_tenant",
            ReportType::WeekOverWeek => "week_over_week",
            ReportType::DailyActiveUsers => "daily_active_users",
            ReportType::MonthlyActiveUsers => "monthly_active_users",
            ReportType::UserRetentionCohort => "user_retention_cohort",
            ReportType::GrowthMetrics => "growth_metrics",
            ReportType::ServiceUsageTenant => "service_usage_tenant",
            ReportType::ServiceUsagePractitioner => "service_usage_practitioner",
            ReportType::ServiceUsagePatient => "service_usage_patient",
            ReportType::EventsByType => "events_by_type",
            ReportType::SessionLifecycle => "session_lifecycle",
            ReportType::NoteFormatUsage => "note_format_usage",
            ReportType::AudioDurationStats => "audio_duration_stats",
            ReportType::AudioDurationDistribution => "audio_duration_distribution",
        }
    }

    /// Display name and description shown in the catalog
    pub fn describe(self) -> (&'static str, &'static str) {
        match self {
            ReportType::TotalSessions => (
                "Total Sessions Overview",
                "Get total sessions, tenants, and users count",
            ),
            ReportType::SessionsByStatus => (
                "Sessions by Status",
                "Count of sessions grouped by status (IN_PROGRESS, COMPLETED, SIGNED, etc.)",
            ),
            ReportType::SessionsTrend => ("Daily Sessions Trend", "Daily session count over time"),
            ReportType::TopTenants => ("Top Tenants", "Top 10 tenants by session count"),
            ReportType::TopPractitioners => (
                "Top Practitioners",
                "Top practitioners within a tenant by session count",
            ),
            ReportType::AuditTrail => (
                "Audit Trail",
                "Detailed event log for compliance and tracking",
            ),
            ReportType::AuditTrailByUser => (
                "Audit Trail by User",
                "Detailed event log for a single practitioner",
            ),
            ReportType::UnsignedNotes => ("Unsigned Notes", "Notes awaiting practitioner signature"),
            ReportType::UnsignedNotesCount => ("Unsigned Notes Count", "Count of unsigned notes"),
            ReportType::UnsignedNotesByPractitioner => (
                "Unsigned Notes by Practitioner",
                "Unsigned note count per practitioner",
            ),
            ReportType::WeeklySummary => (
                "Weekly Summary",
                "Week-over-week usage trends by tenant",
            ),
            ReportType::WeeklySummaryByTenant => (
                "Weekly Summary by Tenant",
                "Weekly usage broken down per tenant",
            ),
            ReportType::WeekOverWeek => (
                "Week over Week Comparison",
                "The last 7 days against the 7 days before, for a tenant",
            ),
            ReportType::DailyActiveUsers => (
                "Daily Active Users",
                "Daily active user count (DAU) over time",
            ),
            ReportType::MonthlyActiveUsers => (
                "Monthly Active Users",
                "Monthly active user count (MAU) over time",
            ),
            ReportType::UserRetentionCohort => (
                "User Retention Cohorts",
                "Monthly cohorts of users by first activity",
            ),
            ReportType::GrowthMetrics => (
                "Growth Metrics",
                "Monthly sessions, users, patients and tenants",
            ),
            ReportType::ServiceUsageTenant => (
                "Service Usage by Tenant",
                "Service usage analytics for a tenant",
            ),
            ReportType::ServiceUsagePractitioner => (
                "Service Usage by Practitioner",
                "Sessions, patients and audio time per practitioner",
            ),
            ReportType::ServiceUsagePatient => (
                "Service Usage by Patient",
                "Visits and audio time per patient",
            ),
            ReportType::EventsByType => ("Events by Type", "Event counts grouped by event name"),
            ReportType::SessionLifecycle => (
                "Session Lifecycle",
                "Milestone timestamps for a single care record",
            ),
            ReportType::NoteFormatUsage => (
                "Note Format Usage",
                "Usage statistics by note format (GIRPP, SOAP, etc.)",
            ),
            ReportType::AudioDurationStats => (
                "Audio Duration Statistics",
                "Average, minimum, maximum and median audio duration per tenant",
            ),
            ReportType::AudioDurationDistribution => (
                "Audio Duration Distribution",
                "Session counts by audio duration bucket",
            ),
        }
    }

    /// Parameters that must be present before the report can run
    pub fn required_params(self) -> &'static [&'static str] {
        match self {
            ReportType::TopPractitioners
            | ReportType::UnsignedNotes
            | ReportType::UnsignedNotesCount
            | ReportType::WeeklySummary
            | ReportType::WeekOverWeek
            | ReportType::DailyActiveUsers
            | ReportType::ServiceUsageTenant
            | ReportType::NoteFormatUsage => &[TENANT_ID],
            ReportType::AuditTrailByUser => &[TENANT_ID, USER_ID],
            ReportType::SessionLifecycle => &[TENANT_ID, CARE_RECORD_ID],
            _ => &[],
        }
    }

    pub fn requires_tenant(self) -> bool {
        self.required_params().contains(&TENANT_ID)
    }

    fn template(self) -> &'static str {
        match self {
            ReportType::TotalSessions => TOTAL_SESSIONS,
            ReportType::SessionsByStatus => SESSIONS_BY_STATUS,
            ReportType::SessionsTrend => SESSIONS_TREND,
            ReportType::TopTenants => TOP_TENANTS,
            ReportType::TopPractitioners => TOP_PRACTITIONERS,
            ReportType::AuditTrail => AUDIT_TRAIL,
            ReportType::AuditTrailByUser => AUDIT_TRAIL_BY_USER,
            ReportType::UnsignedNotes => UNSIGNED_NOTES,
            ReportType::UnsignedNotesCount => UNSIGNED_NOTES_COUNT,
            ReportType::UnsignedNotesByPractitioner => UNSIGNED_NOTES_BY_PRACTITIONER,
            ReportType::WeeklySummary => WEEKLY_SUMMARY,
            ReportType::WeeklySummaryByTenant => WEEKLY_SUMMARY_BY_TENANT,
            ReportType::WeekOverWeek => WEEK_OVER_WEEK,
            ReportType::DailyActiveUsers => DAILY_ACTIVE_USERS,
            ReportType::MonthlyActiveUsers => MONTHLY_ACTIVE_USERS,
            ReportType::UserRetentionCohort => USER_RETENTION_COHORT,
            ReportType::GrowthMetrics => GROWTH_METRICS,
            ReportType::ServiceUsageTenant => SERVICE_USAGE_BY_TENANT,
            ReportType::ServiceUsagePractitioner => SERVICE_USAGE_BY_PRACTITIONER,
            ReportType::ServiceUsagePatient => SERVICE_USAGE_BY_PATIENT,
            ReportType::EventsByType => EVENTS_BY_TYPE,
            ReportType::SessionLifecycle => SESSION_LIFECYCLE,
            ReportType::NoteFormatUsage => NOTE_FORMAT_USAGE,
            ReportType::AudioDurationStats => AUDIO_DURATION_STATS,
            ReportType::AudioDurationDistribution => AUDIO_DURATION_DISTRIBUTION,
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportType::ALL
            .into_iter()
            .find(|report| report.as_str() == s)
            .ok_or_else(|| format!("Unknown query type: {s}"))
    }
}

/// Turns a report request into validated SQL
#[derive(Debug, Clone)]
pub struct ReportCatalog {
    builder: TemplateBuilder,
    validator: QueryValidator,
}

impl ReportCatalog {
    pub fn new(builder: TemplateBuilder, validator: QueryValidator) -> Self {
        Self { builder, validator }
    }

    /// Checks required parameters, builds the report query and validates it.
    /// No engine call happens when this fails.
    pub fn prepare(&self, report: ReportType, filters: &ReportFilters) -> Result<String, QueryError> {
        self.prepare_on(report, filters, Local::now().date_naive())
    }

    fn prepare_on(
        &self,
        report: ReportType,
        filters: &ReportFilters,
        today: NaiveDate,
    ) -> Result<String, QueryError> {
        for &param in report.required_params() {
            let value = match param {
                TENANT_ID => &filters.tenant_id,
                USER_ID => &filters.user_id,
                _ => &filters.care_record_id,
            };
            if value.as_deref().unwrap_or_default().is_empty() {
                return Err(QueryError::MissingParameter {
                    param,
                    report: report.as_str(),
                });
            }
        }

        let extra = match report {
            ReportType::WeekOverWeek => week_windows(&end_date_on(filters, today))?,
            ReportType::SessionLifecycle => vec![(
                CARE_RECORD_ID,
                filters.care_record_id.clone().unwrap_or_default(),
            )],
            _ => Vec::new(),
        };

        let query = self
            .builder
            .build(report.template(), filters, &extra, today)?;
        debug!("Built {} query: {}", report, query);

        self.validator.validate(&query)?;
        Ok(query)
    }
}

/// Current window: the 7 days ending at `end_date`; previous: the 7 days before
fn week_windows(end_date: &str) -> Result<Vec<(&'static str, String)>, QueryError> {
    let end = parse_date(end_date)?;
    let day = |offset: i64| (end - Duration::days(offset)).format("%Y-%m-%d").to_string();
    Ok(vec![
        ("current_week_start", day(6)),
        ("current_week_end", day(0)),
        ("previous_week_start", day(13)),
        ("previous_week_end", day(7)),
    ])
}
