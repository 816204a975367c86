use std::io::{self, BufRead, Write};

/// Asks a yes/no question on the terminal. Anything but `y`/`yes` is a no,
/// and so is a closed stdin.
pub fn confirm(question: &str) -> bool {
    print!("{} (y/n): ", question);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(0) | Err(_) => false,
        Ok(_) => is_yes(&answer),
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
