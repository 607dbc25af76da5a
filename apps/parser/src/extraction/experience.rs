//! Experience Aggregator: rolls per-job tenure up into resume-level metrics.
//!
//! Total experience is a plain sum of per-job tenure. Concurrent jobs with
//! overlapping date ranges are counted twice.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::extraction::catalogue::Catalogue;
use crate::extraction::dates::{self, ResumeDate};
use crate::extraction::fields::{ExtractedFields, FieldValue};
use crate::extraction::location::is_us_location;
use crate::extraction::tenure::resolve_tenure;

/// One employment slot. Unused slots carry `FieldValue::Absent` as company.
#[derive(Debug, Clone, PartialEq)]
pub struct EmploymentRecord {
    pub company: FieldValue,
    pub start: ResumeDate,
    pub end: ResumeDate,
    pub location: Option<String>,
}

impl EmploymentRecord {
    pub fn new(company: &str, start: &str, end: &str, location: Option<&str>) -> Self {
        Self {
            company: FieldValue::from_raw(company),
            start: dates::parse(start),
            end: dates::parse(end),
            location: location
                .map(FieldValue::from_raw)
                .and_then(|v| v.as_str().map(String::from)),
        }
    }

    /// Builds all employment slots, most recent first, from extracted columns.
    pub fn from_fields(fields: &ExtractedFields, catalogue: &Catalogue) -> Vec<Self> {
        catalogue
            .slots()
            .iter()
            .map(|slot| Self {
                company: fields.value(&slot.company).clone(),
                start: parse_column(fields, &slot.start_date),
                end: parse_column(fields, &slot.end_date),
                location: fields.value(&slot.location).as_str().map(String::from),
            })
            .collect()
    }
}

fn parse_column(fields: &ExtractedFields, column: &str) -> ResumeDate {
    fields
        .value(column)
        .as_str()
        .map(dates::parse)
        .unwrap_or(ResumeDate::Unknown)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMetrics {
    pub company: String,
    pub is_current: bool,
    pub tenure_years: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceMetrics {
    pub total_experience: f64,
    pub avg_tenure: f64,
    pub us_experience: f64,
    /// Fraction of jobs whose start and end both resolved.
    pub confidence: f64,
    pub job_metrics: Vec<JobMetrics>,
}

/// Computes experience metrics for `jobs` as of `reference_date`.
///
/// Slots without a company are skipped. Never fails: unparsable dates simply
/// contribute zero tenure and lower the confidence.
pub fn compute(jobs: &[EmploymentRecord], reference_date: NaiveDate) -> ExperienceMetrics {
    let mut metrics = ExperienceMetrics::default();
    let mut resolved_jobs = 0usize;
    let mut fully_dated_jobs = 0usize;

    for job in jobs {
        let company = match job.company.as_str() {
            Some(c) => c,
            None => continue,
        };

        let tenure = resolve_tenure(job.start, job.end, reference_date);
        let tenure_years = tenure.unwrap_or(0.0);

        if tenure.is_some() {
            resolved_jobs += 1;
        }
        if !job.start.is_unknown() && !job.end.is_unknown() {
            fully_dated_jobs += 1;
        }

        metrics.total_experience += tenure_years;
        if job.location.as_deref().is_some_and(is_us_location) {
            metrics.us_experience += tenure_years;
        }

        metrics.job_metrics.push(JobMetrics {
            company: company.to_string(),
            is_current: dates::is_current(job.end),
            tenure_years,
        });
    }

    if resolved_jobs > 0 {
        metrics.avg_tenure = metrics.total_experience / resolved_jobs as f64;
    }
    if !metrics.job_metrics.is_empty() {
        metrics.confidence = fully_dated_jobs as f64 / metrics.job_metrics.len() as f64;
    }

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::catalogue::default_catalogue;
    use crate::extraction::fields::extract;

    fn ref_date(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_jobs() {
        let m = compute(&[], ref_date(2023, 1));
        assert_eq!(m.total_experience, 0.0);
        assert_eq!(m.avg_tenure, 0.0);
        assert_eq!(m.us_experience, 0.0);
        assert_eq!(m.confidence, 0.0);
        assert!(m.job_metrics.is_empty());
    }

    #[test]
    fn test_single_current_job() {
        let jobs = [EmploymentRecord::new("A", "Jan 2020", "Present", None)];
        let m = compute(&jobs, ref_date(2023, 1));
        assert_eq!(m.job_metrics.len(), 1);
        assert!(approx(m.job_metrics[0].tenure_years, 3.0));
        assert!(m.job_metrics[0].is_current);
        assert!(approx(m.total_experience, 3.0));
        assert!(approx(m.avg_tenure, 3.0));
        assert!(approx(m.confidence, 1.0));
    }

    #[test]
    fn test_overlapping_jobs_are_summed() {
        let jobs = [
            EmploymentRecord::new("A", "Jan 2020", "Jan 2022", Some("Austin, TX")),
            EmploymentRecord::new("B", "Jan 2021", "Jan 2022", Some("Paris, France")),
        ];
        let m = compute(&jobs, ref_date(2023, 1));
        assert!(approx(m.total_experience, 3.0));
        assert!(approx(m.avg_tenure, 1.5));
        assert!(approx(m.us_experience, 2.0));
    }

    #[test]
    fn test_unparsable_dates_degrade() {
        let jobs = [
            EmploymentRecord::new("A", "Jan 2019", "Jan 2021", None),
            EmploymentRecord::new("B", "sometime", "Present", None),
            EmploymentRecord::new("C", "Mar 2017", "NULL", None),
            EmploymentRecord::new("D", "Jan 2018", "Jan 2016", None),
        ];
        let m = compute(&jobs, ref_date(2023, 1));
        assert!(approx(m.total_experience, 2.0));
        // Only job A resolved a tenure.
        assert!(approx(m.avg_tenure, 2.0));
        // A and D have both dates; B and C do not.
        assert!(approx(m.confidence, 0.5));
        let tenures: Vec<_> = m.job_metrics.iter().map(|j| j.tenure_years).collect();
        assert_eq!(tenures, vec![2.0, 0.0, 0.0, 0.0]);
        assert!(m.job_metrics[1].is_current);
    }

    #[test]
    fn test_absent_company_slots_are_skipped() {
        let jobs = [
            EmploymentRecord::new("A", "Jan 2020", "Jan 2021", None),
            EmploymentRecord::new("NULL", "Jan 2010", "Jan 2015", None),
            EmploymentRecord::new("", "", "", None),
        ];
        let m = compute(&jobs, ref_date(2023, 1));
        assert_eq!(m.job_metrics.len(), 1);
        assert!(approx(m.total_experience, 1.0));
    }

    #[test]
    fn test_order_is_preserved() {
        let jobs = [
            EmploymentRecord::new("Newest", "Jan 2022", "Present", None),
            EmploymentRecord::new("Older", "Jan 2018", "Dec 2021", None),
        ];
        let m = compute(&jobs, ref_date(2023, 1));
        let names: Vec<_> = m.job_metrics.iter().map(|j| j.company.as_str()).collect();
        assert_eq!(names, vec!["Newest", "Older"]);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let jobs = [
            EmploymentRecord::new("A", "May 2018", "Present", Some("Denver, CO")),
            EmploymentRecord::new("B", "2015", "2018", Some("Remote")),
        ];
        let r = ref_date(2024, 6);
        assert_eq!(compute(&jobs, r), compute(&jobs, r));
    }

    #[test]
    fn test_from_fields_builds_all_slots() {
        let text = "\
- Most Recent Company: Acme
- Most Recent Start Date: Jan 2020
- Most Recent End Date: Present
- Most Recent Job Location: Austin, TX
- Second Most Recent Company: Beta
- Second Most Recent Start Date: 2016-06-01
- Second Most Recent End Date: 2019-12-31
- Second Most Recent Job Location: NULL
";
        let catalogue = default_catalogue();
        let fields = extract(text, catalogue.specs()).unwrap();
        let jobs = EmploymentRecord::from_fields(&fields, catalogue);
        assert_eq!(jobs.len(), 7);
        assert_eq!(jobs[0].company.as_str(), Some("Acme"));
        assert_eq!(jobs[0].end, ResumeDate::Ongoing);
        assert_eq!(jobs[0].location.as_deref(), Some("Austin, TX"));
        assert_eq!(jobs[1].location, None);
        assert_eq!(jobs[2].company, FieldValue::Absent);

        let m = compute(&jobs, ref_date(2023, 1));
        assert_eq!(m.job_metrics.len(), 2);
        assert!(approx(m.us_experience, 3.0));
    }
}
