//! Line commands for the interactive access shell. Parsing and evaluation live
//! here; the binary owns the terminal (rustyline) loop.

use crate::access::AccessChecker;
use crate::render;

pub const HELP: &str = "\
Commands:
  check <user> <resource> <operation>   decide one access question
  role <name>                            show a role's permissions
  roles                                  table of every role and resource
  users                                  list users and their roles
  help                                   show this help
  quit | exit                            leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Check { user: String, resource: String, operation: String },
    Role(String),
    Roles,
    Users,
    Help,
    Quit,
    Empty,
}

pub fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some(head) = words.first() else { return Ok(ShellCommand::Empty); };
    match (head.to_ascii_lowercase().as_str(), &words[1..]) {
        ("check", [user, resource, operation]) => Ok(ShellCommand::Check {
            user: user.to_string(),
            resource: resource.to_string(),
            operation: operation.to_string(),
        }),
        ("check", _) => Err("usage: check <user> <resource> <operation>".into()),
        ("role", [name]) => Ok(ShellCommand::Role(name.to_string())),
        ("role", _) => Err("usage: role <name>".into()),
        ("roles", []) => Ok(ShellCommand::Roles),
        ("users", []) => Ok(ShellCommand::Users),
        ("help", _) => Ok(ShellCommand::Help),
        ("quit", _) | ("exit", _) => Ok(ShellCommand::Quit),
        (other, _) => Err(format!("unknown command '{}', try 'help'", other)),
    }
}

/// Text to print for a command. `Quit` and `Empty` produce nothing.
pub fn evaluate(checker: &AccessChecker, cmd: &ShellCommand) -> String {
    match cmd {
        ShellCommand::Check { user, resource, operation } => {
            render::decision_line(&checker.check_access_raw(user, resource, operation))
        }
        ShellCommand::Role(name) => match checker.roles().get(name) {
            Some(role) => render::role_matrix(role),
            None => format!("no role named '{}'", name),
        },
        ShellCommand::Roles => render::roles_table(checker.roles()),
        ShellCommand::Users => checker
            .users()
            .iter()
            .map(|u| format!("{} -> {}", u.name, u.role))
            .collect::<Vec<_>>()
            .join("\n"),
        ShellCommand::Help => HELP.to_string(),
        ShellCommand::Quit | ShellCommand::Empty => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::defaults::{default_role_table, default_user_directory};

    #[test]
    fn parses_commands() {
        assert_eq!(parse_line("   "), Ok(ShellCommand::Empty));
        assert_eq!(parse_line("EXIT"), Ok(ShellCommand::Quit));
        assert_eq!(
            parse_line("check sales_user parts write"),
            Ok(ShellCommand::Check { user: "sales_user".into(), resource: "parts".into(), operation: "write".into() })
        );
        assert!(parse_line("check sales_user parts").is_err());
        assert!(parse_line("drop parts").unwrap_err().contains("unknown command"));
    }

    #[test]
    fn evaluates_against_the_checker() {
        let checker = AccessChecker::new(default_role_table(), default_user_directory());
        let out = evaluate(&checker, &parse_line("check ghost_user parts read").unwrap());
        assert_eq!(out, "DENIED - unknown user");
        let out = evaluate(&checker, &parse_line("check reports_user orders read").unwrap());
        assert_eq!(out, "ALLOWED - access granted");
        assert!(evaluate(&checker, &ShellCommand::Role("auditor".into())).contains("no role"));
        assert!(evaluate(&checker, &ShellCommand::Users).contains("reports_user -> readonly"));
    }
}
