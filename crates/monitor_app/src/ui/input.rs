//! Console line parsing.

use monitor_core::Msg;

pub const HELP: &str = "commands: start <url> [types...] | preview <url> [types...] | cancel | history | status | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Start { url: String, file_types: Vec<String> },
    Preview { url: String, file_types: Vec<String> },
    Cancel,
    History,
    Status,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_line(line: &str) -> ConsoleCommand {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return ConsoleCommand::Empty;
    };
    let rest: Vec<String> = words.map(str::to_string).collect();
    match verb.to_ascii_lowercase().as_str() {
        "start" | "download" => job_command(rest, true),
        "preview" => job_command(rest, false),
        "cancel" => ConsoleCommand::Cancel,
        "history" => ConsoleCommand::History,
        "status" => ConsoleCommand::Status,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        other => ConsoleCommand::Unknown(other.to_string()),
    }
}

/// A missing URL is passed on as empty so the controller reports it.
fn job_command(mut args: Vec<String>, start: bool) -> ConsoleCommand {
    let url = if args.is_empty() {
        String::new()
    } else {
        args.remove(0)
    };
    if start {
        ConsoleCommand::Start {
            url,
            file_types: args,
        }
    } else {
        ConsoleCommand::Preview {
            url,
            file_types: args,
        }
    }
}

/// Messages that carry out a job command. Without explicit types the
/// configured defaults apply.
pub fn job_msgs(url: String, file_types: Vec<String>, defaults: &[String], start: bool) -> Vec<Msg> {
    let file_types = if file_types.is_empty() {
        defaults.to_vec()
    } else {
        file_types
    };
    vec![
        Msg::UrlChanged(url),
        Msg::FileTypesChanged(file_types),
        if start {
            Msg::StartClicked
        } else {
            Msg::PreviewClicked
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_with_types() {
        assert_eq!(
            parse_line("  start https://example.com image script "),
            ConsoleCommand::Start {
                url: "https://example.com".to_string(),
                file_types: vec!["image".to_string(), "script".to_string()],
            }
        );
    }

    #[test]
    fn verbs_are_case_insensitive() {
        assert_eq!(parse_line("CANCEL"), ConsoleCommand::Cancel);
        assert_eq!(parse_line("Quit"), ConsoleCommand::Quit);
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(parse_line("   "), ConsoleCommand::Empty);
        assert_eq!(parse_line("pause"), ConsoleCommand::Unknown("pause".to_string()));
    }

    #[test]
    fn bare_start_keeps_empty_url() {
        assert_eq!(
            parse_line("start"),
            ConsoleCommand::Start {
                url: String::new(),
                file_types: Vec::new(),
            }
        );
    }

    #[test]
    fn defaults_fill_in_missing_types() {
        let defaults = vec!["image".to_string()];
        let msgs = job_msgs("u".to_string(), Vec::new(), &defaults, false);
        assert_eq!(msgs[1], Msg::FileTypesChanged(defaults.clone()));
        assert_eq!(msgs[2], Msg::PreviewClicked);

        let msgs = job_msgs("u".to_string(), vec!["font".to_string()], &defaults, true);
        assert_eq!(msgs[1], Msg::FileTypesChanged(vec!["font".to_string()]));
        assert_eq!(msgs[2], Msg::StartClicked);
    }
}
