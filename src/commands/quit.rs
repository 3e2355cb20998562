use super::{Command, CommandResult, SessionInfo};

pub struct QuitCommand;

impl Command for QuitCommand {
    fn name(&self) -> &str {
        "/quit"
    }

    fn aliases(&self) -> &[&str] {
        &["/exit", "/q"]
    }

    fn description(&self) -> &str {
        "exit the REPL"
    }

    fn execute(&self, _info: &SessionInfo<'_>) -> CommandResult {
        CommandResult::Quit
    }
}
