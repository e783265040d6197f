use super::QueryError;
use chrono::{Duration, NaiveDate};
use regex::{Captures, Regex};
use std::collections::HashMap;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DEFAULT_RANGE_DAYS: i64 = 30;

/// Optional filters supplied with a report request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilters {
    pub tenant_id: Option<String>,
    pub user_id: Option<String>,
    pub care_record_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: u32,
}

/// Reduces `YYYY-MM-DD HH:MM:SS` and ISO date-times to their date part.
/// Anything else is returned unchanged.
pub(super) fn normalize_date(date: &str) -> &str {
    if date.contains(' ') {
        date.split_whitespace().next().unwrap_or(date)
    } else if let Some((day, _)) = date.split_once('T') {
        day
    } else {
        date
    }
}

/// Fills report templates with table, date range, filters and extra values.
///
/// Substitution is literal: values are not quoted or escaped, so callers must
/// only pass identifiers they are willing to see verbatim in the SQL text.
#[derive(Debug, Clone)]
pub struct TemplateBuilder {
    table_name: String,
    placeholder: Regex,
}

impl TemplateBuilder {
    pub fn new(table_name: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            table_name: table_name.into(),
            placeholder: Regex::new(r"\{([a-z_]+)\}")?,
        })
    }

    /// Builds `template`; missing dates default to the 30 days ending `today`
    pub(super) fn build(
        &self,
        template: &str,
        filters: &ReportFilters,
        extra: &[(&str, String)],
        today: NaiveDate,
    ) -> Result<String, QueryError> {
        let (start_date, end_date) = date_range(filters, today);

        let tenant_id = filters.tenant_id.as_deref().filter(|t| !t.is_empty());
        let user_id = filters.user_id.as_deref().filter(|u| !u.is_empty());

        let mut values: HashMap<&str, String> = HashMap::from([
            ("table_name", self.table_name.clone()),
            ("start_date", start_date),
            ("end_date", end_date),
            ("tenant_id", tenant_id.unwrap_or_default().to_string()),
            ("user_id", user_id.unwrap_or_default().to_string()),
            (
                "tenant_filter",
                tenant_id
                    .map(|id| format!("AND tenant_id = '{id}'"))
                    .unwrap_or_default(),
            ),
            (
                "user_filter",
                user_id
                    .map(|id| format!("AND user_id = '{id}'"))
                    .unwrap_or_default(),
            ),
            ("limit", filters.limit.to_string()),
        ]);
        values.extend(extra.iter().map(|(name, value)| (*name, value.clone())));

        if let Some(missing) = self
            .placeholder
            .captures_iter(template)
            .map(|caps| caps[1].to_string())
            .find(|name| !values.contains_key(name.as_str()))
        {
            return Err(QueryError::MissingPlaceholder(missing));
        }

        Ok(self
            .placeholder
            .replace_all(template, |caps: &Captures| {
                values.get(&caps[1]).cloned().unwrap_or_default()
            })
            .into_owned())
    }
}

/// Start and end dates as `YYYY-MM-DD`, defaulting to `today - 30 days ..= today`
fn date_range(filters: &ReportFilters, today: NaiveDate) -> (String, String) {
    let given = |date: &Option<String>| {
        date.as_deref()
            .filter(|d| !d.is_empty())
            .map(|d| normalize_date(d).to_string())
    };

    let start = given(&filters.start_date).unwrap_or_else(|| {
        (today - Duration::days(DEFAULT_RANGE_DAYS))
            .format(DATE_FORMAT)
            .to_string()
    });
    let end = given(&filters.end_date).unwrap_or_else(|| today.format(DATE_FORMAT).to_string());
    (start, end)
}

/// Parses a normalized `YYYY-MM-DD` date
pub(super) fn parse_date(date: &str) -> Result<NaiveDate, QueryError> {
    NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| QueryError::InvalidDate(date.to_string()))
}

/// The resolved end date of a request, for templates that derive their own windows
pub(super) fn end_date_on(filters: &ReportFilters, today: NaiveDate) -> String {
    date_range(filters, today).1
}
