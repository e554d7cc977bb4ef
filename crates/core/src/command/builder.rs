use crate::types::{CommandLine, OptionSet};
use std::borrow::Cow;

/// Assembles `<base> <options...> <target>` command lines.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    escape_target: bool,
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self {
            escape_target: true,
        }
    }
}

impl CommandBuilder {
    pub fn new(escape_target: bool) -> Self {
        Self { escape_target }
    }

    /// Build the command line. `base` is used verbatim, every option is
    /// escaped on its own, and the target is escaped unless disabled. An
    /// empty target means "the whole project" and is left out.
    pub fn build(&self, base: &str, options: &OptionSet, target: &str) -> CommandLine {
        let mut cmd = String::from(base.trim());

        for option in options {
            if !cmd.is_empty() {
                cmd.push(' ');
            }
            cmd.push_str(&shell_escape(option));
        }

        if !target.is_empty() {
            if !cmd.is_empty() {
                cmd.push(' ');
            }
            if self.escape_target {
                cmd.push_str(&shell_escape(target));
            } else {
                cmd.push_str(target);
            }
        }

        CommandLine::from_built(cmd)
    }

    /// Same as [`build`](Self::build) with `-t <name>` appended to the options.
    pub fn build_filtered(
        &self,
        base: &str,
        options: &OptionSet,
        target: &str,
        name: &str,
    ) -> CommandLine {
        self.build(base, &options.with_filter(name), target)
    }
}

fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '=' | ':' | ',' | '+' | '@' | '%')
}

/// Quote `arg` for a POSIX shell.
///
/// Plain words pass through untouched; anything else is single-quoted with
/// embedded quotes written as `'\''`.
pub fn shell_escape(arg: &str) -> Cow<'_, str> {
    if !arg.is_empty() && arg.chars().all(is_shell_safe) {
        return Cow::Borrowed(arg);
    }

    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('\'');
    for c in arg.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    Cow::Owned(quoted)
}
