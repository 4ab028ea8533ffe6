use anyhow::{Context, Result, bail};
use clap::{Args, CommandFactory};
use clap_complete::{Shell, generate};

use crate::cli::app::App;

#[derive(Args, Clone, Debug)]
pub struct CompletionsArg {
    /// Shell to generate for; detected from the parent process when omitted
    #[arg(long)]
    shell: Option<Shell>,
}

impl CompletionsArg {
    pub fn run(self) -> Result<()> {
        let shell = match self.shell {
            Some(shell) => shell,
            None => detect_shell()?,
        };

        let mut cmd = App::command();
        generate(shell, &mut cmd, "clipkeep", &mut std::io::stdout());
        Ok(())
    }
}

fn detect_shell() -> Result<Shell> {
    let shell = query_shell::get_shell().context("failed to detect the current shell, pass --shell")?;
    let shell = match shell {
        query_shell::Shell::Bash => Shell::Bash,
        query_shell::Shell::Elvish => Shell::Elvish,
        query_shell::Shell::Fish => Shell::Fish,
        query_shell::Shell::Powershell => Shell::PowerShell,
        query_shell::Shell::Zsh => Shell::Zsh,
        _ => bail!("no completions available for the detected shell, pass --shell"),
    };
    Ok(shell)
}
