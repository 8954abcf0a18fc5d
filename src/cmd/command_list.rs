use std::{fmt, ops::Deref, str::FromStr};

use itertools::Itertools;

use crate::{
    limits::{MAX_ARGS, MAX_STAGES},
    parse::{parse_command_list, ParseError},
};

/// One stage of a pipeline: the program name followed by its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    argv: Vec<String>,
}

impl Command {
    pub fn new<I, S>(argv: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv = argv.into_iter().map(Into::into).collect::<Vec<String>>();

        match argv.first() {
            None => Err(ParseError::EmptySegment),
            Some(program) if program.is_empty() => Err(ParseError::EmptySegment),
            Some(_) if argv.len() > MAX_ARGS => Err(ParseError::ArgumentOverflow),
            Some(_) => Ok(Self { argv }),
        }
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Everything after the program name.
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv.iter().join(" "))
    }
}

/// The stages of one input line, in pipeline order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandList(Vec<Command>);

impl CommandList {
    pub fn new(commands: Vec<Command>) -> Result<Self, ParseError> {
        if commands.is_empty() {
            Err(ParseError::EmptyPipeline)
        } else if commands.len() > MAX_STAGES {
            Err(ParseError::TooManyStages)
        } else {
            Ok(Self(commands))
        }
    }

    pub fn as_slice(&self) -> &[Command] {
        &self.0
    }
}

impl Deref for CommandList {
    type Target = [Command];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for CommandList {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_command_list(s)
    }
}

impl fmt::Display for CommandList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_rejects_empty_program() {
        assert_eq!(
            Command::new(Vec::<String>::new()),
            Err(ParseError::EmptySegment)
        );
        assert_eq!(Command::new([""]), Err(ParseError::EmptySegment));
    }

    #[test]
    fn command_rejects_too_many_args() {
        let argv = (0..=MAX_ARGS).map(|i| format!("a{i}"));
        assert_eq!(Command::new(argv), Err(ParseError::ArgumentOverflow));
    }

    #[test]
    fn command_splits_program_from_args() {
        let cmd = Command::new(["wc", "-l"]).unwrap();
        assert_eq!(cmd.program(), "wc");
        assert_eq!(cmd.args(), ["-l"]);
        assert_eq!(cmd.argv(), ["wc", "-l"]);
    }

    #[test]
    fn list_bounds() {
        assert_eq!(CommandList::new(Vec::new()), Err(ParseError::EmptyPipeline));

        let stages = vec![Command::new(["true"]).unwrap(); MAX_STAGES + 1];
        assert_eq!(CommandList::new(stages), Err(ParseError::TooManyStages));
    }

    #[test]
    fn display_joins_stages() {
        let list: CommandList = "ls -la | grep  foo".parse().unwrap();
        assert_eq!(list.to_string(), "ls -la | grep foo");
    }
}
