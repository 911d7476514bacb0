use super::error::{RuntimeError, RuntimeErrorKind};
use crate::lexer::LineBreaks;
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};

const ARIADNE_MSG: &str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";

pub trait RuntimeErrorFormatter {
    fn format_error(&self, error: &RuntimeError) -> String;
}

pub struct DebugFormatter;

impl RuntimeErrorFormatter for DebugFormatter {
    fn format_error(&self, error: &RuntimeError) -> String {
        format!("{error:?}")
    }
}

/// One line per error, prefixed with the line inside the innermost script.
pub struct BasicFormatter;

impl RuntimeErrorFormatter for BasicFormatter {
    fn format_error(&self, error: &RuntimeError) -> String {
        let line = match (error.span, error.script_text()) {
            (Some(span), Some(text)) => LineBreaks::new(text).get_line_from_span(span),
            _ => 1,
        };
        let nesting = error.scripts.len().saturating_sub(1);
        if nesting > 0 {
            format!("({line}) [{}] {} {{nested {nesting}}}", error.code(), error.kind)
        } else {
            format!("({line}) [{}] {}", error.code(), error.kind)
        }
    }
}

/// Renders the failing token inside the script that contains it.
pub struct PrettyFormatter<'src> {
    name: &'src str,
}

impl<'src> PrettyFormatter<'src> {
    /// `name` labels the script in the report, usually the file it came from.
    pub fn new(name: &'src str) -> Self {
        Self { name }
    }

    fn label_message(kind: &RuntimeErrorKind) -> String {
        match kind {
            RuntimeErrorKind::NotNumeric(value) => {
                format!("{} is not an integer", value.fg(Color::BrightRed))
            }
            RuntimeErrorKind::NotBoolean(value) => {
                format!("{} is not a boolean", value.fg(Color::BrightRed))
            }
            RuntimeErrorKind::TokenNotFound(token) => {
                format!("No stored script named {}", token.fg(Color::BrightRed))
            }
            RuntimeErrorKind::ParamCountMismatch {
                expected, found, ..
            } => format!(
                "Takes {} arguments, given {}",
                expected.fg(Color::BrightGreen),
                found.fg(Color::BrightRed)
            ),
            RuntimeErrorKind::StructuralImbalance(imbalance) => format!("{imbalance}"),
            RuntimeErrorKind::DivideByZero => "Divisor is zero".to_string(),
            RuntimeErrorKind::UnexpectedCharacter(c) => {
                format!("Stray {} in list value", c.fg(Color::BrightRed))
            }
            RuntimeErrorKind::UnexpectedToken(_) => "Not allowed here".to_string(),
            RuntimeErrorKind::InvalidIndex(index) => {
                format!("Index {} is negative", index.fg(Color::BrightRed))
            }
            RuntimeErrorKind::RecursionLimit(limit) => {
                format!("Nesting limit is {limit}")
            }
        }
    }
}

impl RuntimeErrorFormatter for PrettyFormatter<'_> {
    fn format_error(&self, error: &RuntimeError) -> String {
        let name = self.name;
        let text = error.script_text().unwrap_or_default();
        let range = error.span.map_or(0..0, |span| span.range());
        let mut output = std::io::Cursor::new(Vec::new());

        let mut report = Report::build(ReportKind::Error, (name, range.clone()))
            .with_code(error.code())
            .with_message(&error.kind)
            .with_label(
                Label::new((name, range))
                    .with_message(Self::label_message(&error.kind))
                    .with_color(Color::BrightRed),
            );
        for outer in error.scripts.iter().skip(1) {
            report = report.with_note(format!("called from {}", outer.trim().fg(Color::Cyan)));
        }
        report
            .finish()
            .write((name, Source::from(text)), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        String::from_utf8(output.into_inner()).expect(ARIADNE_MSG)
    }
}
