use super::{Command, CommandResult, SessionInfo};

pub struct StateCommand;

impl Command for StateCommand {
    fn name(&self) -> &str {
        "/state"
    }

    fn description(&self) -> &str {
        "show the session phase, engine and current input"
    }

    fn execute(&self, info: &SessionInfo<'_>) -> CommandResult {
        println!("  phase   {:?}", info.phase);
        println!("  engine  {}", info.engine);
        println!("  input   {}", info.input);
        CommandResult::Handled
    }
}
