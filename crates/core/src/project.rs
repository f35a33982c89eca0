// SPDX-License-Identifier: MIT

//! Project: the tenant-scoping container for a protocol definition.

use crate::ids::ProjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Inactive,
}

crate::simple_display! {
    ProjectStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub status: ProjectStatus,
}

impl Project {
    pub fn is_active(&self) -> bool {
        self.status == ProjectStatus::Active
    }
}

crate::builder! {
    pub struct ProjectBuilder => Project {
        into { name: String = "test-project" }
        set { status: ProjectStatus = ProjectStatus::Active }
        computed { id: ProjectId = ProjectId::new() }
    }
}
