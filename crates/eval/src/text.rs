// SPDX-License-Identifier: MIT

use dashmsg_core::MessageTemplate;

/// Picks the template body for a participant's language.
///
/// Spanish (`"spanish"` or `"es"`, case-insensitive) resolves `text_es`
/// falling back to `text_en`; any other language is the reverse. Empty if
/// both bodies are absent (P5).
pub fn resolve_text(template: &MessageTemplate, language: &str) -> String {
    let spanish = is_spanish(language);
    let (primary, fallback) = if spanish {
        (&template.text_es, &template.text_en)
    } else {
        (&template.text_en, &template.text_es)
    };
    primary
        .clone()
        .or_else(|| fallback.clone())
        .unwrap_or_default()
}

fn is_spanish(language: &str) -> bool {
    let lower = language.trim().to_lowercase();
    lower == "spanish" || lower == "es"
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashmsg_core::TemplateType;
    use yare::parameterized;

    fn template(text_en: Option<&str>, text_es: Option<&str>) -> MessageTemplate {
        MessageTemplate::builder()
            .template_type(TemplateType::Broadcast)
            .text_en(text_en.map(str::to_string))
            .text_es(text_es.map(str::to_string))
            .build()
    }

    #[parameterized(
        english = { "English", "hello", "hola", "hello" },
        spanish_word = { "Spanish", "hello", "hola", "hola" },
        spanish_code = { "es", "hello", "hola", "hola" },
        spanish_code_upper = { "ES", "hello", "hola", "hola" },
    )]
    fn picks_body_for_language(language: &str, en: &str, es: &str, expected: &str) {
        let template = template(Some(en), Some(es));
        assert_eq!(resolve_text(&template, language), expected);
    }

    #[test]
    fn falls_back_to_english_when_spanish_body_missing() {
        let template = template(Some("hello"), None);
        assert_eq!(resolve_text(&template, "Spanish"), "hello");
    }

    #[test]
    fn falls_back_to_spanish_when_english_body_missing() {
        let template = template(None, Some("hola"));
        assert_eq!(resolve_text(&template, "English"), "hola");
    }

    #[test]
    fn empty_when_both_bodies_missing() {
        let template = template(None, None);
        assert_eq!(resolve_text(&template, "English"), "");
    }
}
