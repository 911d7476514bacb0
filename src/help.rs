//! Reference text listing every keyword, grouped by purpose.

use crate::keyword::{Form, KEYWORDS};
use std::fmt::Write;

const WRITE_FMT_MSG: &str = "Writing into a String should not fail.";

pub fn help() -> String {
    let mut result = String::new();
    let mut group = None;
    for spec in KEYWORDS.iter() {
        if group != Some(spec.group) {
            if group.is_some() {
                result.push('\n');
            }
            writeln!(result, "{}:", spec.group).expect(WRITE_FMT_MSG);
            group = Some(spec.group);
        }
        match spec.form {
            Form::Call => writeln!(result, "   {}{})", spec.keyword, spec.params),
            Form::Bare | Form::Either => writeln!(result, "   {}", spec.keyword),
        }
        .expect(WRITE_FMT_MSG);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::help;

    #[test]
    fn lists_signatures_by_group() {
        let text = help();
        assert!(text.starts_with("Statements:\n   @comment(x)\n"));
        assert!(text.contains("\nFor loop:\n   @for(token,start,end)\n   @endfor\n"));
        assert!(text.ends_with("   @getinchannel\n   @setoutchannel(value)\n"));
    }
}
