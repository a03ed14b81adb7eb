use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::acquisition::{AcquisitionMode, ModeKind};
use crate::analysis::kinds::AnalysisKind;
use crate::analysis::slices::{
    education_from_value, employment_from_value, projects_from_value, ContactInfo, CustomScores,
    EducationRecord, EmploymentRecord, Experience, FunctionalConstituent, OtherComments,
    ProjectRecord, RecruitersOverview, ResumeScore, SummaryOverview, TechnicalConstituent,
};
use crate::view_state::slice::SliceState;

/// The shared "current resume" context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateContext {
    pub name: String,
    pub job_role: String,
    pub resume_text: String,
}

impl CandidateContext {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.job_role.is_empty() && self.resume_text.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PagePhase {
    #[default]
    Idle,
    Resolving {
        mode: ModeKind,
    },
    Loading {
        mode: ModeKind,
    },
    Loaded {
        mode: ModeKind,
    },
    Failed {
        mode: ModeKind,
        reason: String,
    },
}

/// Every analysis slice of the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InsightSlices {
    pub score: SliceState<ResumeScore>,
    pub contacts: SliceState<ContactInfo>,
    pub summary: SliceState<SummaryOverview>,
    pub custom_scores: SliceState<CustomScores>,
    pub other_comments: SliceState<OtherComments>,
    pub functional_constituent: SliceState<FunctionalConstituent>,
    pub technical_constituent: SliceState<TechnicalConstituent>,
    pub education: SliceState<Vec<EducationRecord>>,
    pub employment: SliceState<Vec<EmploymentRecord>>,
    pub projects: SliceState<Vec<ProjectRecord>>,
    pub experience: SliceState<Experience>,
    pub recruiters_overview: SliceState<RecruitersOverview>,
}

/// Maps `$f` over every slice of an `InsightSlices`, regardless of payload type.
macro_rules! each_slice {
    ($slices:expr, |$slot:ident| $body:expr) => {{
        let s = $slices;
        {
            let $slot = &s.score;
            $body
        }
        {
            let $slot = &s.contacts;
            $body
        }
        {
            let $slot = &s.summary;
            $body
        }
        {
            let $slot = &s.custom_scores;
            $body
        }
        {
            let $slot = &s.other_comments;
            $body
        }
        {
            let $slot = &s.functional_constituent;
            $body
        }
        {
            let $slot = &s.technical_constituent;
            $body
        }
        {
            let $slot = &s.education;
            $body
        }
        {
            let $slot = &s.employment;
            $body
        }
        {
            let $slot = &s.projects;
            $body
        }
        {
            let $slot = &s.experience;
            $body
        }
        {
            let $slot = &s.recruiters_overview;
            $body
        }
    }};
}

impl InsightSlices {
    pub fn any_loading(&self) -> bool {
        let mut loading = false;
        each_slice!(self, |slot| loading |= slot.is_loading());
        loading
    }

    pub fn all_settled(&self) -> bool {
        let mut settled = true;
        each_slice!(self, |slot| settled &= slot.is_settled());
        settled
    }

    pub fn set_loading(&mut self, kind: AnalysisKind) {
        match kind {
            AnalysisKind::Score => self.score = SliceState::Loading,
            AnalysisKind::Contacts => self.contacts = SliceState::Loading,
            AnalysisKind::Summary => self.summary = SliceState::Loading,
            AnalysisKind::CustomScores => self.custom_scores = SliceState::Loading,
            AnalysisKind::OtherComments => self.other_comments = SliceState::Loading,
            AnalysisKind::FunctionalConstituent => {
                self.functional_constituent = SliceState::Loading
            }
            AnalysisKind::TechnicalConstituent => {
                self.technical_constituent = SliceState::Loading
            }
            AnalysisKind::Education => self.education = SliceState::Loading,
            AnalysisKind::Employment => self.employment = SliceState::Loading,
            AnalysisKind::Projects => self.projects = SliceState::Loading,
            AnalysisKind::YearsOfExperience => self.experience = SliceState::Loading,
            AnalysisKind::RecruitersOverview => self.recruiters_overview = SliceState::Loading,
        }
    }

    /// Settles the slice of `kind`: a response body is normalized and loaded,
    /// an error message marks the slice failed. Other slices are untouched.
    pub fn settle(&mut self, kind: AnalysisKind, outcome: Result<&Value, String>) {
        fn state<T>(outcome: Result<&Value, String>, normalize: fn(&Value) -> T) -> SliceState<T> {
            match outcome {
                Ok(body) => SliceState::Loaded(normalize(body)),
                Err(message) => SliceState::Failed(message),
            }
        }

        match kind {
            AnalysisKind::Score => self.score = state(outcome, ResumeScore::from_value),
            AnalysisKind::Contacts => self.contacts = state(outcome, ContactInfo::from_value),
            AnalysisKind::Summary => self.summary = state(outcome, SummaryOverview::from_value),
            AnalysisKind::CustomScores => {
                self.custom_scores = state(outcome, CustomScores::from_value)
            }
            AnalysisKind::OtherComments => {
                self.other_comments = state(outcome, OtherComments::from_value)
            }
            AnalysisKind::FunctionalConstituent => {
                self.functional_constituent = state(outcome, FunctionalConstituent::from_value)
            }
            AnalysisKind::TechnicalConstituent => {
                self.technical_constituent = state(outcome, TechnicalConstituent::from_value)
            }
            AnalysisKind::Education => self.education = state(outcome, education_from_value),
            AnalysisKind::Employment => self.employment = state(outcome, employment_from_value),
            AnalysisKind::Projects => self.projects = state(outcome, projects_from_value),
            AnalysisKind::YearsOfExperience => {
                self.experience = state(outcome, Experience::from_value)
            }
            AnalysisKind::RecruitersOverview => {
                self.recruiters_overview = state(outcome, RecruitersOverview::from_value)
            }
        }
    }
}

/// Page view-state of one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InsightsView {
    pub epoch: u64,
    pub phase: PagePhase,
    pub context: CandidateContext,
    pub slices: InsightSlices,
}

impl InsightsView {
    /// Returns every slice to its empty default before `mode` starts, and
    /// clears the candidate context when the mode asks for it.
    /// The epoch and phase are left to the caller.
    pub fn reset_for(&mut self, mode: &AcquisitionMode) {
        self.slices = InsightSlices::default();
        if mode.clears_context() {
            self.context = CandidateContext::default();
        }
    }
}
