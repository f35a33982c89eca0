// SPDX-License-Identifier: MIT

//! Participant: a single enrolled recipient within a project.

use crate::ids::{ParticipantId, ProjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    Active,
    Inactive,
}

crate::simple_display! {
    ParticipantStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub project_id: ProjectId,
    pub language: String,
    pub status: ParticipantStatus,
    pub external_id: String,
}

impl Participant {
    /// Enrolls a new Active participant.
    pub fn new(project_id: ProjectId, language: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            id: ParticipantId::new(),
            project_id,
            language: language.into(),
            status: ParticipantStatus::Active,
            external_id: external_id.into(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ParticipantStatus::Active
    }

    /// Spanish is recognized case-insensitively as either the full word or
    /// the ISO code; anything else resolves to English.
    pub fn is_spanish(&self) -> bool {
        let lower = self.language.trim().to_lowercase();
        lower == "spanish" || lower == "es"
    }
}

crate::builder! {
    pub struct ParticipantBuilder => Participant {
        into { language: String = "English", external_id: String = "ext-1" }
        set {
            project_id: ProjectId = ProjectId::new(),
            status: ParticipantStatus = ParticipantStatus::Active
        }
        computed { id: ParticipantId = ParticipantId::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        spanish_word = { "Spanish" },
        spanish_code = { "es" },
        spanish_code_upper = { "ES" },
    )]
    fn recognizes_spanish_variants(language: &str) {
        let participant = Participant::builder().language(language).build();
        assert!(participant.is_spanish());
    }

    #[test]
    fn english_is_not_spanish() {
        let participant = Participant::builder().language("English").build();
        assert!(!participant.is_spanish());
    }

    #[test]
    fn new_enrolls_as_active() {
        let participant = Participant::new(ProjectId::new(), "English", "ext-42");
        assert!(participant.is_active());
        assert_eq!(participant.external_id, "ext-42");
    }
}
