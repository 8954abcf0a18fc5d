use thiserror::Error;

use crate::{
    cmd::command_list::{Command, CommandList},
    limits::{MAX_ARGS, MAX_STAGES},
};

use self::token::tokenize;

pub mod token;

pub const PIPE: char = '|';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("warning: no commands provided")]
    EmptyPipeline,
    #[error("error: piping limited to {} commands", MAX_STAGES)]
    TooManyStages,
    #[error("error: empty command in pipeline")]
    EmptySegment,
    #[error("error: too many arguments, limited to {}", MAX_ARGS)]
    ArgumentOverflow,
}

impl ParseError {
    /// Warnings mean "nothing to do" and leave the last status alone.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::EmptyPipeline)
    }
}

/// Parses one line into the stages of a pipeline.
///
/// The line is split on [`PIPE`] before tokenizing, so a quoted `|` still
/// separates stages.
pub fn parse_command_list(line: &str) -> Result<CommandList, ParseError> {
    let line = line.trim();

    if line.is_empty() {
        return Err(ParseError::EmptyPipeline);
    }

    let segments = line.split(PIPE).collect::<Vec<_>>();

    if segments.len() > MAX_STAGES {
        return Err(ParseError::TooManyStages);
    }

    let commands = segments
        .into_iter()
        .map(|segment| Command::new(tokenize(segment)?))
        .collect::<Result<Vec<_>, _>>()?;

    CommandList::new(commands)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argvs(list: &CommandList) -> Vec<Vec<&str>> {
        list.iter()
            .map(|cmd| cmd.argv().iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn single_command_with_quotes() {
        let list = parse_command_list(r#"echo "a b" c"#).unwrap();
        assert_eq!(argvs(&list), [vec!["echo", "a b", "c"]]);
    }

    #[test]
    fn two_stage_pipeline() {
        let list = parse_command_list("echo a | wc -l").unwrap();
        assert_eq!(argvs(&list), [vec!["echo", "a"], vec!["wc", "-l"]]);
    }

    #[test]
    fn pipes_without_spaces() {
        let list = parse_command_list("ls|grep rs|wc").unwrap();
        assert_eq!(
            argvs(&list),
            [vec!["ls"], vec!["grep", "rs"], vec!["wc"]]
        );
    }

    #[test]
    fn whitespace_only_is_empty_pipeline() {
        assert_eq!(parse_command_list("   "), Err(ParseError::EmptyPipeline));
        assert_eq!(parse_command_list(""), Err(ParseError::EmptyPipeline));
        assert!(ParseError::EmptyPipeline.is_warning());
    }

    #[test]
    fn too_many_stages() {
        let line = vec!["true"; MAX_STAGES + 1].join(" | ");
        assert_eq!(parse_command_list(&line), Err(ParseError::TooManyStages));
        assert!(!ParseError::TooManyStages.is_warning());

        let line = vec!["true"; MAX_STAGES].join(" | ");
        assert_eq!(parse_command_list(&line).unwrap().len(), MAX_STAGES);
    }

    #[test]
    fn empty_segments_are_rejected() {
        for line in ["| ls", "ls |", "ls || wc", "ls |   | wc", "ls | \"\""] {
            assert_eq!(
                parse_command_list(line),
                Err(ParseError::EmptySegment),
                "{line:?}"
            );
        }
    }

    #[test]
    fn argument_overflow_in_any_stage() {
        let line = format!("ls | echo {}", vec!["x"; MAX_ARGS].join(" "));
        assert_eq!(parse_command_list(&line), Err(ParseError::ArgumentOverflow));
    }

    #[test]
    fn quoted_pipe_still_splits() {
        let list = parse_command_list(r#"echo "a|b""#).unwrap();
        assert_eq!(argvs(&list), [vec!["echo", "a"], vec!["b"]]);
    }

    #[test]
    fn parsing_is_repeatable() {
        let line = r#"  grep -v "x y" | sort |  uniq -c "#;
        assert_eq!(parse_command_list(line), parse_command_list(line));
    }
}
