//! The fixed set of analysis kinds fired for every fresh resume analysis.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Input shared by every per-kind request of one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub resume_text: String,
    pub job_role: String,
}

/// One independently loading analysis on the scoring backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Score,
    Contacts,
    Summary,
    CustomScores,
    OtherComments,
    FunctionalConstituent,
    TechnicalConstituent,
    Education,
    Employment,
    Projects,
    YearsOfExperience,
    RecruitersOverview,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 12] = [
        AnalysisKind::Score,
        AnalysisKind::Contacts,
        AnalysisKind::Summary,
        AnalysisKind::CustomScores,
        AnalysisKind::OtherComments,
        AnalysisKind::FunctionalConstituent,
        AnalysisKind::TechnicalConstituent,
        AnalysisKind::Education,
        AnalysisKind::Employment,
        AnalysisKind::Projects,
        AnalysisKind::YearsOfExperience,
        AnalysisKind::RecruitersOverview,
    ];

    pub fn endpoint(self) -> &'static str {
        match self {
            AnalysisKind::Score => "/scoreResume",
            AnalysisKind::Contacts => "/getContacts",
            AnalysisKind::Summary => "/getSummaryOverview",
            AnalysisKind::CustomScores => "/getCustomScores",
            AnalysisKind::OtherComments => "/getOtherComments",
            AnalysisKind::FunctionalConstituent => "/getFunctionalConstituent",
            AnalysisKind::TechnicalConstituent => "/getTechnicalConstituent",
            AnalysisKind::Education => "/getEducation",
            AnalysisKind::Employment => "/getCompany",
            AnalysisKind::Projects => "/getProjects",
            AnalysisKind::YearsOfExperience => "/getYoe",
            AnalysisKind::RecruitersOverview => "/getRecruitersOverview",
        }
    }

    /// Contact, education and employment extraction ignore the target role.
    pub fn uses_job_role(self) -> bool {
        !matches!(
            self,
            AnalysisKind::Contacts | AnalysisKind::Education | AnalysisKind::Employment
        )
    }

    pub fn request_body(self, input: &AnalysisInput) -> Value {
        if self.uses_job_role() {
            json!({ "resumeText": input.resume_text, "jobRole": input.job_role })
        } else {
            json!({ "resumeText": input.resume_text })
        }
    }
}
