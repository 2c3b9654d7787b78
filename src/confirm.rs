use anyhow::{Context, Result};
use std::io::{self, Write};

/// Ask the operator a yes/no question and block until a line of input
/// arrives. Anything other than an affirmative answer declines.
pub fn ask(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Failed to read confirmation input")?;

    Ok(is_affirmative(&input))
}

/// Only `yes` and `y` affirm, case-insensitively, ignoring surrounding
/// whitespace.
pub fn is_affirmative(input: &str) -> bool {
    let input = input.trim().to_lowercase();
    input == "yes" || input == "y"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmative_tokens() {
        assert!(is_affirmative("yes"));
        assert!(is_affirmative("y"));
        assert!(is_affirmative("YES"));
        assert!(is_affirmative("Y"));
        assert!(is_affirmative("  Yes \n"));
    }

    #[test]
    fn test_everything_else_declines() {
        assert!(!is_affirmative("no"));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("\n"));
        assert!(!is_affirmative("yeah"));
        assert!(!is_affirmative("yes please"));
    }
}
