use std::io::{self, Write};

/// Helper function to read a line from stdin
pub fn read_line() -> io::Result<String> {
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Print a prompt without a trailing newline and read the answer
pub fn prompt_line(prompt: &str) -> io::Result<String> {
    print!("{}: ", prompt);
    io::stdout().flush()?;
    read_line()
}

/// Ask a yes/no question; an empty answer takes `default_yes`
pub fn prompt_with_confirmation(question: &str, default_yes: bool) -> io::Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    print!("{} ({}): ", question, hint);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(parse_confirmation(&input, default_yes))
}

/// Interpret a yes/no answer. Anything unrecognised counts as "no".
pub fn parse_confirmation(input: &str, default_yes: bool) -> bool {
    match input.trim().to_lowercase().as_str() {
        "" => default_yes,
        "y" | "yes" => true,
        _ => false,
    }
}

/// Helper function to validate email format
pub fn is_valid_email(email: &str) -> bool {
    // Basic email validation
    email.contains('@')
        && email.contains('.')
        && !email.contains(' ')
        && email.chars().filter(|&c| c == '@').count() == 1
        && email.len() >= 5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        // Valid emails
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("alerts.inbox@example.co.uk"));
        assert!(is_valid_email("user+tag@example.com"));

        // Invalid emails
        assert!(!is_valid_email("user@example")); // Missing TLD
        assert!(!is_valid_email("user example.com")); // Contains space
        assert!(!is_valid_email("user")); // No @ symbol
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("user@@example.com"));
    }

    #[test]
    fn test_parse_confirmation() {
        assert!(parse_confirmation("y\n", false));
        assert!(parse_confirmation("YES", false));
        assert!(!parse_confirmation("n", true));
        assert!(!parse_confirmation("maybe", true));

        // Empty answer falls back to the default
        assert!(parse_confirmation("\n", true));
        assert!(!parse_confirmation("   ", false));
    }
}
