use serde_json::Value;
use thiserror::Error;

use crate::analysis::coerce::text;
use crate::analysis::slices::{
    education_from_value, employment_from_value, overview_text, projects_from_value, ContactInfo,
    CustomScores, Designation, Experience, FunctionalConstituent, OtherComments,
    RecruitersOverview, ResumeScore, SummaryOverview, TechnicalConstituent,
};
use crate::persisted::decode::{field, field_or_null, years};
use crate::view_state::{CandidateContext, InsightSlices, SliceState};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("candidate not found")]
    NotFound,
}

/// A persisted record translated into view-state.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedCandidate {
    pub context: CandidateContext,
    pub slices: InsightSlices,
}

// Column names, snake_case first with the camelCase spelling as fallback.
const SCORE: &[&str] = &["score_resume", "scoreResume"];
const CONTACTS: &[&str] = &["get_contacts", "getContacts"];
const SUMMARY: &[&str] = &["get_summary_overview", "getSummaryOverview"];
const CUSTOM_SCORES: &[&str] = &["get_custom_scores", "getCustomScores"];
const OTHER_COMMENTS: &[&str] = &["get_other_comments", "getOtherComments"];
const FUNCTIONAL: &[&str] = &["get_functional_constituent", "getFunctionalConstituent"];
const TECHNICAL: &[&str] = &["get_technical_constituent", "getTechnicalConstituent"];
const EDUCATION: &[&str] = &["get_education", "getEducation"];
const EMPLOYMENT: &[&str] = &["get_company", "getCompany"];
const PROJECTS: &[&str] = &["get_projects", "getProjects"];
const DESIGNATION: &[&str] = &["get_designation", "getDesignation"];
const RECRUITERS_OVERVIEW: &[&str] = &["get_recruiters_overview", "getRecruitersOverview"];
const YOE: &[&str] = &["get_yoe", "getYoe"];
const RYOE: &[&str] = &["get_ryoe", "getRyoe"];

/// Translates a candidate lookup response into view-state.
///
/// `None` (the backend answered 404), an `error` field, a non-object or empty
/// payload, and a record without a name all read as not found. Every other
/// malformation degrades to slice defaults.
pub fn map_record(response: Option<&Value>) -> Result<MappedCandidate, LookupError> {
    let record = response.ok_or(LookupError::NotFound)?;
    let object = record.as_object().ok_or(LookupError::NotFound)?;
    if object.is_empty() || object.contains_key("error") {
        return Err(LookupError::NotFound);
    }
    let name = text(record, "name")
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or(LookupError::NotFound)?;

    let context = CandidateContext {
        name,
        job_role: first_text(record, &["job_role", "jobRole"]),
        resume_text: first_text(record, &["resume_raw_text", "resumeRawText"]),
    };

    let slices = InsightSlices {
        score: loaded(ResumeScore::from_value(&field_or_null(record, SCORE))),
        contacts: loaded(ContactInfo::from_value(&field_or_null(record, CONTACTS))),
        summary: loaded(SummaryOverview::from_value(&field_or_null(record, SUMMARY))),
        custom_scores: loaded(CustomScores::from_value(&field_or_null(record, CUSTOM_SCORES))),
        other_comments: loaded(OtherComments::from_value(&field_or_null(
            record,
            OTHER_COMMENTS,
        ))),
        functional_constituent: loaded(FunctionalConstituent::from_value(&field_or_null(
            record, FUNCTIONAL,
        ))),
        technical_constituent: loaded(TechnicalConstituent::from_value(&field_or_null(
            record, TECHNICAL,
        ))),
        education: loaded(education_from_value(&field_or_null(record, EDUCATION))),
        employment: loaded(employment_from_value(&field_or_null(record, EMPLOYMENT))),
        projects: loaded(projects_from_value(&field_or_null(record, PROJECTS))),
        experience: loaded(Experience {
            total: years(record, YOE, |e| e.total),
            relevant: years(record, RYOE, |e| e.relevant),
        }),
        recruiters_overview: loaded(RecruitersOverview {
            designation: designation(record),
            overview: overview_text(&field_or_null(record, RECRUITERS_OVERVIEW)),
        }),
    };

    Ok(MappedCandidate { context, slices })
}

/// The designation has been stored under either column; take the first whose
/// shape matches, else empty strings.
fn designation(record: &Value) -> Designation {
    [DESIGNATION, RECRUITERS_OVERVIEW]
        .iter()
        .filter_map(|names| field(record, names))
        .find_map(|value| Designation::detect(&value))
        .unwrap_or_default()
}

fn first_text(record: &Value, names: &[&str]) -> String {
    names
        .iter()
        .find_map(|name| text(record, name))
        .unwrap_or_default()
}

fn loaded<T>(value: T) -> SliceState<T> {
    SliceState::Loaded(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn native_record() -> Value {
        json!({
            "candidate_id": 17,
            "name": "Priya Sharma",
            "job_role": "Data Engineer",
            "resume_raw_text": "Priya Sharma\nData Engineer",
            "mode": "Manual",
            "score_resume": {"score": "82%", "items": ["Quantify impact"]},
            "get_contacts": {"mobile_number": "+91 90000 00000", "email_id": "priya@x.com",
                             "color": "green", "comment": "All contacts present"},
            "get_summary_overview": {"score": 75, "color": "yellow", "label": "good",
                                     "comment": "Clear summary", "summary": ["Concise"]},
            "get_custom_scores": {"searchibility_score": 80, "hard_skills_score": "70",
                                  "soft_skill_score": 60, "formatting_score": 90},
            "get_other_comments": {"headings_feedback": "Good", "title_match": "Exact",
                                   "formatting_feedback": "Clean"},
            "get_functional_constituent": {"constituent": {"IT": 70, "Finance": 30},
                                           "industries": ["IT", "Finance"],
                                           "has_industry_experience": true,
                                           "has_completed_college": true},
            "get_technical_constituent": {"high": ["Spark"], "medium": ["Kafka"], "low": []},
            "get_education": {"education_history": [
                {"degree": "B.E.", "institution": "VTU", "start_year": 2014, "end_year": 2018}]},
            "get_company": {"employment_history": [
                {"company": "Acme", "position": "Engineer", "start_year": 2018,
                 "end_year": "Currently Working", "employment_type": "Permanent"}]},
            "get_projects": {"projects": [
                {"title": "Lakehouse", "description": "Built it", "technologies": ["Delta"],
                 "duration": "6 months"}]},
            "get_designation": {"current_designation": "Senior Data Engineer",
                                "previous_designation": "Data Engineer"},
            "get_recruiters_overview": "Strong pipeline background",
            "get_yoe": 6,
            "get_ryoe": "4.5 years"
        })
    }

    /// Re-encodes every object/array sub-field as a JSON string, the way some
    /// rows are stored.
    fn string_encoded(record: &Value) -> Value {
        let mut encoded = record.clone();
        if let Some(map) = encoded.as_object_mut() {
            for value in map.values_mut() {
                if value.is_object() || value.is_array() {
                    *value = Value::String(value.to_string());
                }
            }
        }
        encoded
    }

    #[test]
    fn test_string_encoded_and_native_records_map_identically() {
        let native = native_record();
        let encoded = string_encoded(&native);
        assert!(encoded["get_contacts"].is_string());

        let from_native = map_record(Some(&native)).unwrap();
        let from_encoded = map_record(Some(&encoded)).unwrap();
        assert_eq!(from_native, from_encoded);
    }

    #[test]
    fn test_mapped_values() {
        let mapped = map_record(Some(&native_record())).unwrap();
        assert_eq!(mapped.context.name, "Priya Sharma");
        assert_eq!(mapped.context.job_role, "Data Engineer");
        assert_eq!(mapped.slices.score.data().unwrap().score, 82.0);
        assert_eq!(mapped.slices.contacts.data().unwrap().email_id, "priya@x.com");
        assert_eq!(mapped.slices.employment.data().unwrap()[0].end_year, "Currently Working");
        let experience = mapped.slices.experience.data().unwrap();
        assert_eq!(experience.total, 6.0);
        assert_eq!(experience.relevant, 4.5);
        let overview = mapped.slices.recruiters_overview.data().unwrap();
        assert_eq!(overview.designation.current_designation, "Senior Data Engineer");
        assert_eq!(overview.overview, "Strong pipeline background");
    }

    #[test]
    fn test_designation_recovered_from_recruiters_overview_field() {
        let record = json!({
            "name": "Sam",
            "get_designation": "Lead Engineer",
            "get_recruiters_overview": {"current_designation": "Lead Engineer",
                                        "previous_designation": "Engineer"}
        });
        let mapped = map_record(Some(&record)).unwrap();
        let designation = &mapped.slices.recruiters_overview.data().unwrap().designation;
        assert_eq!(designation.current_designation, "Lead Engineer");
        assert_eq!(designation.previous_designation, "Engineer");
    }

    #[test]
    fn test_designation_absent_from_both_fields_is_empty() {
        let record = json!({"name": "Sam", "get_recruiters_overview": "Just text"});
        let mapped = map_record(Some(&record)).unwrap();
        let designation = &mapped.slices.recruiters_overview.data().unwrap().designation;
        assert_eq!(designation, &Designation::default());
    }

    #[test]
    fn test_snake_case_yoe_preferred_over_camel_case() {
        let record = json!({"name": "Sam", "get_yoe": 3, "getYoe": 9, "getRyoe": "2"});
        let experience = map_record(Some(&record)).unwrap().slices.experience;
        let experience = experience.data().unwrap();
        assert_eq!(experience.total, 3.0);
        assert_eq!(experience.relevant, 2.0);
    }

    #[test]
    fn test_camel_case_columns_are_accepted() {
        let record = json!({"name": "Sam", "getContacts": {"email_id": "sam@x.com"}});
        let mapped = map_record(Some(&record)).unwrap();
        assert_eq!(mapped.slices.contacts.data().unwrap().email_id, "sam@x.com");
    }

    #[test]
    fn test_not_found_shapes() {
        assert_eq!(map_record(None), Err(LookupError::NotFound));
        assert_eq!(map_record(Some(&json!({}))), Err(LookupError::NotFound));
        assert_eq!(
            map_record(Some(&json!({"error": "no candidate"}))),
            Err(LookupError::NotFound)
        );
        assert_eq!(map_record(Some(&json!([1, 2]))), Err(LookupError::NotFound));
        assert_eq!(
            map_record(Some(&json!({"get_yoe": 3, "name": "  "}))),
            Err(LookupError::NotFound)
        );
    }

    #[test]
    fn test_undecodable_fields_fall_back_to_defaults() {
        let record = json!({
            "name": "Sam",
            "get_contacts": "{broken",
            "get_education": "[also broken",
            "score_resume": 42
        });
        let mapped = map_record(Some(&record)).unwrap();
        assert_eq!(mapped.slices.contacts.data(), Some(&ContactInfo::default()));
        assert_eq!(mapped.slices.education.data(), Some(&Vec::new()));
        assert_eq!(mapped.slices.score.data().unwrap().score, 0.0);
    }
}
