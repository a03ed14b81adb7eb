//! Normalized analysis slices.
//!
//! Each slice type has a `from_value` normalizer used by both acquisition paths:
//! the fresh-analysis orchestrator feeds it a backend response body, the
//! persisted-record mapper feeds it a decoded record column. Normalizers never
//! fail; absent or malformed fields fall back to the documented defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::coerce::{
    decode_if_string, flag, number, number_value, object_list, scalar_text, string_list, text,
    text_or,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeScore {
    /// 0 to 100. The backend reports it as `"85%"`.
    pub score: f64,
    pub items: Vec<String>,
}

impl ResumeScore {
    pub fn from_value(value: &Value) -> Self {
        let value = decode_if_string(value);
        Self {
            score: number(&value, "score"),
            items: string_list(&value, "items"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub mobile_number: String,
    pub email_id: String,
    pub color: String,
    pub comment: String,
}

impl Default for ContactInfo {
    fn default() -> Self {
        Self::from_value(&Value::Null)
    }
}

impl ContactInfo {
    pub fn from_value(value: &Value) -> Self {
        let value = decode_if_string(value);
        Self {
            mobile_number: text(&value, "mobile_number").unwrap_or_default(),
            email_id: text(&value, "email_id").unwrap_or_default(),
            color: text_or(&value, "color", "red"),
            comment: text_or(&value, "comment", "Contact information not available"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryOverview {
    pub score: f64,
    pub color: String,
    pub label: String,
    pub comment: String,
    pub summary: Vec<String>,
}

impl Default for SummaryOverview {
    fn default() -> Self {
        Self::from_value(&Value::Null)
    }
}

impl SummaryOverview {
    pub fn from_value(value: &Value) -> Self {
        let value = decode_if_string(value);
        Self {
            score: number(&value, "score"),
            color: text_or(&value, "color", "red"),
            label: text_or(&value, "label", "critical"),
            comment: text_or(&value, "comment", "Summary analysis not available"),
            summary: string_list(&value, "summary"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomScores {
    pub searchibility_score: f64,
    pub hard_skills_score: f64,
    pub soft_skill_score: f64,
    pub formatting_score: f64,
}

impl CustomScores {
    pub fn from_value(value: &Value) -> Self {
        let value = decode_if_string(value);
        Self {
            searchibility_score: number(&value, "searchibility_score"),
            hard_skills_score: number(&value, "hard_skills_score"),
            soft_skill_score: number(&value, "soft_skill_score"),
            formatting_score: number(&value, "formatting_score"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherComments {
    pub headings_feedback: String,
    pub title_match: String,
    pub formatting_feedback: String,
}

impl Default for OtherComments {
    fn default() -> Self {
        Self::from_value(&Value::Null)
    }
}

impl OtherComments {
    pub fn from_value(value: &Value) -> Self {
        let value = decode_if_string(value);
        Self {
            headings_feedback: text_or(
                &value,
                "headings_feedback",
                "Section headings analysis not available",
            ),
            title_match: text_or(&value, "title_match", "Job title match analysis not available"),
            formatting_feedback: text_or(
                &value,
                "formatting_feedback",
                "Data formatting analysis not available",
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionalConstituent {
    /// Industry label → share in percent.
    pub constituent: BTreeMap<String, f64>,
    pub industries: Vec<String>,
    pub has_industry_experience: bool,
    pub has_completed_college: bool,
}

impl FunctionalConstituent {
    pub fn from_value(value: &Value) -> Self {
        let value = decode_if_string(value);
        let constituent = value
            .get("constituent")
            .map(|v| decode_if_string(v).into_owned())
            .and_then(|v| v.as_object().cloned())
            .map(|map| {
                map.iter()
                    .map(|(label, share)| (label.clone(), number_value(share)))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            constituent,
            industries: string_list(&value, "industries"),
            has_industry_experience: flag(&value, "has_industry_experience"),
            has_completed_college: flag(&value, "has_completed_college"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalConstituent {
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
}

impl TechnicalConstituent {
    pub fn from_value(value: &Value) -> Self {
        let value = decode_if_string(value);
        Self {
            high: string_list(&value, "high"),
            medium: string_list(&value, "medium"),
            low: string_list(&value, "low"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationRecord {
    pub degree: String,
    pub institution: String,
    pub start_year: String,
    pub end_year: String,
}

/// Education arrives either as a bare array or wrapped in `education_history`.
pub fn education_from_value(value: &Value) -> Vec<EducationRecord> {
    let value = decode_if_string(value);
    object_list(&value, &["education_history", "education"])
        .into_iter()
        .map(|entry| EducationRecord {
            degree: text(entry, "degree").unwrap_or_default(),
            institution: text(entry, "institution").unwrap_or_default(),
            start_year: year(entry, "start_year"),
            end_year: year(entry, "end_year"),
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmploymentRecord {
    pub company: String,
    pub position: String,
    pub start_year: String,
    /// A year, or free text such as `"Currently Working"`.
    pub end_year: String,
    pub employment_type: String,
}

pub fn employment_from_value(value: &Value) -> Vec<EmploymentRecord> {
    let value = decode_if_string(value);
    object_list(&value, &["employment_history", "company"])
        .into_iter()
        .map(|entry| EmploymentRecord {
            company: text(entry, "company").unwrap_or_default(),
            position: text(entry, "position").unwrap_or_default(),
            start_year: year(entry, "start_year"),
            end_year: year(entry, "end_year"),
            employment_type: text(entry, "employment_type").unwrap_or_default(),
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub duration: String,
}

pub fn projects_from_value(value: &Value) -> Vec<ProjectRecord> {
    let value = decode_if_string(value);
    object_list(&value, &["projects"])
        .into_iter()
        .map(|entry| ProjectRecord {
            title: text(entry, "title").unwrap_or_default(),
            description: text(entry, "description").unwrap_or_default(),
            technologies: string_list(entry, "technologies"),
            duration: text(entry, "duration").unwrap_or_default(),
        })
        .collect()
}

fn year(entry: &Value, key: &str) -> String {
    entry.get(key).and_then(scalar_text).unwrap_or_default()
}

/// Total and role-relevant years of experience.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub total: f64,
    pub relevant: f64,
}

const TOTAL_EXPERIENCE_KEYS: [&str; 4] = ["yoe", "total", "total_experience", "years_of_experience"];
const RELEVANT_EXPERIENCE_KEYS: [&str; 3] = ["ryoe", "relevant", "relevant_experience"];

impl Experience {
    pub fn from_value(value: &Value) -> Self {
        let value = decode_if_string(value);
        Self {
            total: first_number(&value, &TOTAL_EXPERIENCE_KEYS),
            relevant: first_number(&value, &RELEVANT_EXPERIENCE_KEYS),
        }
    }
}

fn first_number(value: &Value, keys: &[&str]) -> f64 {
    keys.iter()
        .find_map(|key| value.get(*key))
        .map(number_value)
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Designation {
    pub current_designation: String,
    pub previous_designation: String,
}

impl Designation {
    /// Returns a designation only when the value has the designation shape,
    /// i.e. a `current_designation` or `previous_designation` key.
    pub fn detect(value: &Value) -> Option<Self> {
        let value = decode_if_string(value);
        let has_shape = value.get("current_designation").is_some()
            || value.get("previous_designation").is_some();
        has_shape.then(|| Self {
            current_designation: text(&value, "current_designation").unwrap_or_default(),
            previous_designation: text(&value, "previous_designation").unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecruitersOverview {
    pub designation: Designation,
    pub overview: String,
}

const OVERVIEW_KEYS: [&str; 3] = ["overview", "recruiters_overview", "comment"];

impl RecruitersOverview {
    pub fn from_value(value: &Value) -> Self {
        Self {
            designation: Designation::detect(value).unwrap_or_default(),
            overview: overview_text(value),
        }
    }
}

/// Free-text overview: a plain string as is, or the first overview key of an object.
pub fn overview_text(value: &Value) -> String {
    let value = decode_if_string(value);
    match value.as_ref() {
        Value::String(s) => s.clone(),
        other => OVERVIEW_KEYS
            .iter()
            .find_map(|key| text(other, key))
            .unwrap_or_default(),
    }
}
