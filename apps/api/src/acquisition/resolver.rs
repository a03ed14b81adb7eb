use serde::{Deserialize, Serialize};

/// Resume text already extracted on this session, waiting for analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalResume {
    pub text: String,
    pub job_role: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ResolverInput {
    /// Identifier carried by the request path or query, if any.
    pub route_identifier: Option<String>,
    /// Free-text identifier typed into the lookup field.
    pub identifier_field: String,
    pub local_text: Option<LocalResume>,
}

/// Where the current view's data comes from. Exactly one is active per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AcquisitionMode {
    DirectAccess,
    FreshAnalysis {
        text: String,
        job_role: String,
        name: Option<String>,
    },
    PersistedLookup {
        identifier: String,
    },
}

impl AcquisitionMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            AcquisitionMode::DirectAccess => ModeKind::DirectAccess,
            AcquisitionMode::FreshAnalysis { .. } => ModeKind::FreshAnalysis,
            AcquisitionMode::PersistedLookup { .. } => ModeKind::PersistedLookup,
        }
    }

    /// Whether entering this mode drops the previous candidate's context.
    /// A fresh analysis replaces it with the uploaded resume instead.
    pub fn clears_context(&self) -> bool {
        !matches!(self, AcquisitionMode::FreshAnalysis { .. })
    }
}

/// Payload-free tag of an `AcquisitionMode`, used by the page phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    DirectAccess,
    FreshAnalysis,
    PersistedLookup,
}

/// Decides the acquisition mode.
///
/// Precedence: route identifier, then the identifier field, then locally
/// extracted text, then direct access. Blank identifiers count as absent.
pub fn resolve(input: ResolverInput) -> AcquisitionMode {
    let route_identifier = input
        .route_identifier
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    let field_identifier = Some(input.identifier_field.trim()).filter(|id| !id.is_empty());

    if let Some(identifier) = route_identifier.or(field_identifier) {
        return AcquisitionMode::PersistedLookup {
            identifier: identifier.to_string(),
        };
    }

    match input.local_text {
        Some(local) if !local.text.trim().is_empty() => AcquisitionMode::FreshAnalysis {
            text: local.text,
            job_role: local.job_role,
            name: local.name,
        },
        _ => AcquisitionMode::DirectAccess,
    }
}
