use std::io::{self, Write};

use crate::{
    cmd::execute::ForkExecutor,
    limits::PROMPT,
    state::{Outcome, State},
};

/// Interactive shell on the controlling terminal. Pipelines inherit this
/// process's stdio.
pub fn run() -> io::Result<i32> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut state = State::new();
    let mut executor = ForkExecutor;
    let mut line = String::new();

    loop {
        write!(stdout, "{PROMPT}")?;
        stdout.flush()?;

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            writeln!(stdout)?;
            break;
        }

        let line = line.trim_end_matches(['\n', '\r']);

        match state.dispatch(line, &mut executor, None, &mut stdout)? {
            Outcome::Continue => {}
            Outcome::CloseConnection | Outcome::StopServer => break,
        }
    }

    Ok(state.last_status)
}
