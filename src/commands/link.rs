use super::{Command, CommandResult, SessionInfo};

pub struct LinkCommand;

impl Command for LinkCommand {
    fn name(&self) -> &str {
        "/link"
    }

    fn description(&self) -> &str {
        "print a link that reopens the current declaration"
    }

    fn execute(&self, info: &SessionInfo<'_>) -> CommandResult {
        println!("  {}", info.deep_link);
        CommandResult::Handled
    }
}
