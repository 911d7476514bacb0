use super::{ValidationError, ValidationErrorKind};
use crate::lexer::LineBreaks;
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};

const ARIADNE_MSG: &str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";

pub trait ValidationFormatter {
    fn format_error(&self, error: &ValidationError) -> String;
}

pub struct BasicFormatter;

impl ValidationFormatter for BasicFormatter {
    fn format_error(&self, error: &ValidationError) -> String {
        let mut line = format!("[{}] {}", error.code(), error.kind);
        if let (Some(span), Some(script)) = (error.span, &error.script) {
            let number = LineBreaks::new(script).get_line_from_span(span);
            line = format!("({number}) {line}");
        }
        if let Some(key) = &error.key {
            line.push_str(&format!(" {{key: {key}}}"));
        }
        line
    }
}

pub struct PrettyFormatter<'src> {
    name: &'src str,
}

impl<'src> PrettyFormatter<'src> {
    pub fn new(name: &'src str) -> Self {
        Self { name }
    }
}

impl ValidationFormatter for PrettyFormatter<'_> {
    fn format_error(&self, error: &ValidationError) -> String {
        let name = error.key.as_deref().unwrap_or(self.name);
        let text = error.script.as_deref().unwrap_or_default();
        let range = error.span.map_or(0..0, |span| span.range());
        let mut output = std::io::Cursor::new(Vec::new());

        let mut report = Report::build(ReportKind::Error, (name, range.clone()))
            .with_code(error.code())
            .with_message(&error.kind);
        report = match &error.kind {
            ValidationErrorKind::TokenNotFound(token) => report.with_label(
                Label::new((name, range))
                    .with_message(format!(
                        "No keyword or stored script matches {}",
                        token.fg(Color::BrightRed)
                    ))
                    .with_color(Color::BrightRed),
            ),
            ValidationErrorKind::InvalidTransition { keyword, .. } => report.with_label(
                Label::new((name, range))
                    .with_message(format!("{} cannot follow here", keyword.fg(Color::BrightRed)))
                    .with_color(Color::BrightRed),
            ),
            ValidationErrorKind::EmptyKey => report,
            _ => report.with_note("Counted over the whole script"),
        };
        report
            .finish()
            .write((name, Source::from(text)), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        String::from_utf8(output.into_inner()).expect(ARIADNE_MSG)
    }
}
