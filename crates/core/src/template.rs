// SPDX-License-Identifier: MIT

//! MessageTemplate: the text (and, for polls, the answer binding) sent by a node.

use crate::ids::{MessageTemplateId, ProjectId, VariableId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateType {
    Broadcast,
    Poll,
}

crate::simple_display! {
    TemplateType {
        Broadcast => "broadcast",
        Poll => "poll",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub id: MessageTemplateId,
    pub project_id: ProjectId,
    pub template_type: TemplateType,
    pub text_en: Option<String>,
    pub text_es: Option<String>,
    /// Set only for `Poll` templates: where the answer is stored.
    pub variable_id: Option<VariableId>,
    pub choices_en: Vec<String>,
    pub choices_es: Vec<String>,
}

impl MessageTemplate {
    pub fn is_poll(&self) -> bool {
        self.template_type == TemplateType::Poll
    }

    /// The accepted-answer set used by poll-answer dispatch: the union of
    /// both language choice lists, lower-cased.
    pub fn choice_set(&self) -> std::collections::HashSet<String> {
        self.choices_en
            .iter()
            .chain(self.choices_es.iter())
            .map(|c| c.trim().to_lowercase())
            .collect()
    }

    pub fn has_choices(&self) -> bool {
        !self.choices_en.is_empty() || !self.choices_es.is_empty()
    }
}

crate::builder! {
    pub struct MessageTemplateBuilder => MessageTemplate {
        set {
            project_id: ProjectId = ProjectId::new(),
            template_type: TemplateType = TemplateType::Broadcast,
            text_en: Option<String> = None,
            text_es: Option<String> = None,
            variable_id: Option<VariableId> = None,
            choices_en: Vec<String> = Vec::new(),
            choices_es: Vec<String> = Vec::new()
        }
        computed { id: MessageTemplateId = MessageTemplateId::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_template_is_not_poll() {
        let template = MessageTemplate::builder().build();
        assert!(!template.is_poll());
    }

    #[test]
    fn poll_template_reports_poll() {
        let template = MessageTemplate::builder()
            .template_type(TemplateType::Poll)
            .build();
        assert!(template.is_poll());
    }

    #[test]
    fn choice_set_unions_and_lowercases_both_languages() {
        let template = MessageTemplate::builder()
            .template_type(TemplateType::Poll)
            .choices_en(vec!["Yes".to_string(), "No".to_string()])
            .choices_es(vec!["Si".to_string()])
            .build();
        let choices = template.choice_set();
        assert!(choices.contains("yes"));
        assert!(choices.contains("no"));
        assert!(choices.contains("si"));
    }

    #[test]
    fn has_choices_is_false_when_both_lists_empty() {
        let template = MessageTemplate::builder()
            .template_type(TemplateType::Poll)
            .build();
        assert!(!template.has_choices());
    }
}
