use crate::domain::ports::Confirmation;
use crate::utils::error::{Result, StackError};
use async_trait::async_trait;
use std::io::{self, BufRead, Write};

/// Asks on stderr and reads one line from stdin. Only `y`/`yes` confirm.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirmation;

#[async_trait]
impl Confirmation for StdinConfirmation {
    async fn confirm(&self, prompt: &str) -> Result<bool> {
        let prompt = prompt.to_string();
        // stdin 讀取會阻塞，移到 blocking 執行緒
        tokio::task::spawn_blocking(move || ask(&prompt))
            .await
            .map_err(|e| StackError::IoError(io::Error::other(e)))?
    }
}

fn ask(prompt: &str) -> Result<bool> {
    let mut stderr = io::stderr();
    write!(stderr, "{} [y/N] ", prompt)?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_affirmative(&answer))
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative("  YES "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("yep"));
    }
}
