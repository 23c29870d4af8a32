//! `secretvault completions <SHELL>` — print a completion script to stdout.
//!
//! The accepted shell names come from `clap_complete::Shell`, so clap
//! rejects unknown shells before this runs.

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::Result;

/// Execute the `completions` command.
pub fn execute(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin, &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Commands;

    fn parsed_shell(args: &[&str]) -> Option<Shell> {
        let cli = Cli::try_parse_from(args).ok()?;
        match cli.command {
            Commands::Completions { shell } => Some(shell),
            _ => None,
        }
    }

    #[test]
    fn every_supported_shell_parses() {
        assert_eq!(
            parsed_shell(&["secretvault", "completions", "zsh"]),
            Some(Shell::Zsh)
        );
        assert_eq!(
            parsed_shell(&["secretvault", "completions", "powershell"]),
            Some(Shell::PowerShell)
        );
        assert_eq!(
            parsed_shell(&["secretvault", "completions", "elvish"]),
            Some(Shell::Elvish)
        );
    }

    #[test]
    fn unknown_shell_is_a_usage_error() {
        assert!(parsed_shell(&["secretvault", "completions", "csh"]).is_none());
        assert!(parsed_shell(&["secretvault", "completions"]).is_none());
    }
}
