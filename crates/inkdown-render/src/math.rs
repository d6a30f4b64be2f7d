//! LaTeX math typesetting via pulldown-latex → MathML.

use pulldown_latex::{
    Parser, Storage, config::DisplayMode, config::RenderConfig, mathml::push_mathml,
};

use crate::postprocess::{MathTypesetter, TypesetResult};
use crate::types::Theme;

/// Typesets placeholder sources to MathML in-process.
///
/// MathML inherits its colors from the page, so the theme does not
/// change the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatexTypesetter;

impl MathTypesetter for LatexTypesetter {
    fn typeset(&self, source: &str, display: bool, _theme: Theme) -> TypesetResult {
        let storage = Storage::new();
        let parser = Parser::new(source, &storage);
        let config = RenderConfig {
            display_mode: if display {
                DisplayMode::Block
            } else {
                DisplayMode::Inline
            },
            ..Default::default()
        };

        let events: Vec<_> = parser.collect();
        let errors: Vec<String> = events
            .iter()
            .filter_map(|e| e.as_ref().err().map(|err| err.to_string()))
            .collect();
        if !errors.is_empty() {
            return TypesetResult::Failed(errors.join("; "));
        }

        let mut mathml = String::new();
        // push_mathml wants the Results directly
        match push_mathml(&mut mathml, events.into_iter(), config) {
            Ok(()) => TypesetResult::Replaced(mathml),
            Err(err) => TypesetResult::Failed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_inline_math() {
        let result = LatexTypesetter.typeset("x^2", false, Theme::Light);
        let TypesetResult::Replaced(mathml) = result else {
            panic!("expected mathml, got {result:?}");
        };
        assert!(mathml.contains("<math"));
        assert!(mathml.contains("</math>"));
    }

    #[test]
    fn renders_display_math() {
        let result = LatexTypesetter.typeset(r"\frac{a}{b}", true, Theme::Light);
        let TypesetResult::Replaced(mathml) = result else {
            panic!("expected mathml, got {result:?}");
        };
        assert!(mathml.contains("<math"));
        assert!(mathml.contains("<mfrac"));
    }

    #[test]
    fn reports_invalid_latex() {
        // Unclosed brace
        let result = LatexTypesetter.typeset(r"\frac{a", false, Theme::Light);
        let TypesetResult::Failed(message) = result else {
            panic!("expected failure, got {result:?}");
        };
        assert!(!message.is_empty());
    }

    #[test]
    fn theme_does_not_change_output() {
        let light = LatexTypesetter.typeset(r"\sum_{i=0}^{n} x_i", true, Theme::Light);
        let dark = LatexTypesetter.typeset(r"\sum_{i=0}^{n} x_i", true, Theme::Dark);
        assert_eq!(light, dark);
    }
}
