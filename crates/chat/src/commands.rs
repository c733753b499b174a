//! Tokenizer for the text command surface.
//!
//! The call command itself is configuration, not a hard-coded literal; a
//! message whose first token is anything else is simply not for this bot.

/// A structured album command. Arity problems are folded into `Invalid` so
/// the controller answers with usage text instead of doing index arithmetic
/// on split results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AlbumCommand {
    /// Bare call command: show the numbered album menu.
    Menu,
    Help,
    Create { title: String },
    Add { title: String },
    Invalid { usage: CommandUsage },
    Unknown { verb: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandUsage {
    Create,
    Add,
}

/// Parses `text` against the configured call command. Returns `None` when
/// the message does not address the bot at all.
///
/// Titles are opaque single tokens; `create`/`add` take exactly one
/// argument, so a multi-word title is a usage error rather than a silent
/// mis-parse.
pub fn parse_command(call_command: &str, text: &str) -> Option<AlbumCommand> {
    let mut tokens = text.split_whitespace();
    if tokens.next()? != call_command {
        return None;
    }

    let Some(verb) = tokens.next() else {
        return Some(AlbumCommand::Menu);
    };
    let args: Vec<&str> = tokens.collect();

    let command = match verb {
        "-h" | "--help" | "help" => AlbumCommand::Help,
        "create" => match args.as_slice() {
            [title] => AlbumCommand::Create { title: (*title).to_owned() },
            _ => AlbumCommand::Invalid { usage: CommandUsage::Create },
        },
        "add" => match args.as_slice() {
            [title] => AlbumCommand::Add { title: (*title).to_owned() },
            _ => AlbumCommand::Invalid { usage: CommandUsage::Add },
        },
        other => AlbumCommand::Unknown { verb: other.to_owned() },
    };
    Some(command)
}
