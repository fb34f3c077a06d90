//! Runner workflow commands written to stdout.

/// Escapes `%`, `\r` and `\n` so a message survives as a single workflow command.
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// The `::error::` command that marks the step as failed with `message`.
pub fn error_command(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

/// Marks the current step failed. The caller still decides the exit code.
pub fn set_failed(message: &str) {
    println!("{}", error_command(message));
}
