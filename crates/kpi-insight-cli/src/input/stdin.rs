use std::io::{self, Read};

fn stdin_is_tty() -> bool {
    atty::is(atty::Stream::Stdin)
}

/// Read piped text from stdin.
/// Returns None if stdin is a TTY (interactive) or the input is blank.
pub fn read_stdin_text() -> Result<Option<String>, Box<dyn std::error::Error>> {
    if stdin_is_tty() {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    if buffer.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(buffer))
}

/// Read a piped CSV upload from stdin.
pub fn read_stdin_bytes() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    if stdin_is_tty() {
        return Err("--data - expects CSV piped on stdin".into());
    }
    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer)?;
    Ok(buffer)
}
