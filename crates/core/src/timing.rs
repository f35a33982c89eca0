// SPDX-License-Identifier: MIT

//! TimingElement: a named non-negative offset attached to a node's schedule.

use crate::ids::{ProjectId, TimingElementId};
use serde::{Deserialize, Serialize};

/// Only `After` is acted on by the engine today; `Before` is schema-supported
/// but reserved, and is rejected at seed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingDirection {
    Before,
    After,
}

crate::simple_display! {
    TimingDirection {
        Before => "before",
        After => "after",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingElement {
    pub id: TimingElementId,
    pub project_id: ProjectId,
    pub name: String,
    pub direction: TimingDirection,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimingElement {
    /// `Before` is reserved; the only construction path an engine may act on.
    pub fn is_after(&self) -> bool {
        self.direction == TimingDirection::After
    }
}

crate::builder! {
    pub struct TimingElementBuilder => TimingElement {
        into { name: String = "Instantly" }
        set {
            project_id: ProjectId = ProjectId::new(),
            direction: TimingDirection = TimingDirection::After,
            days: i64 = 0,
            hours: i64 = 0,
            minutes: i64 = 0,
            seconds: i64 = 0
        }
        computed { id: TimingElementId = TimingElementId::new() }
    }
}
