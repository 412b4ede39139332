use anyhow::{Result, bail};
use std::io::{self, IsTerminal};
use zeroize::Zeroizing;

pub const PASSPHRASE_ENV: &str = "PASSVAULT_PASSPHRASE";

/// Reads the vault passphrase.
///
/// Sources, in order: the `PASSVAULT_PASSPHRASE` environment variable, one
/// line of piped stdin, an interactive prompt with echo disabled. An empty
/// passphrase is returned as-is; a fresh vault accepts any passphrase for
/// reads.
pub fn read_passphrase(prompt: &str) -> Result<Zeroizing<Vec<u8>>> {
    //  PASSVAULT_PASSPHRASE="supersecret" passvault get github
    if let Ok(pw) = std::env::var(PASSPHRASE_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw.into_bytes()));
        }
    }

    Ok(Zeroizing::new(read_hidden(prompt)?.as_bytes().to_vec()))
}

/// Reads a new passphrase twice and checks both entries match.
pub fn read_new_passphrase_with_confirmation() -> Result<Zeroizing<Vec<u8>>> {
    let pw1 = read_hidden("New passphrase: ")?;
    let pw2 = read_hidden("Confirm passphrase: ")?;

    if pw1.is_empty() {
        bail!("passphrase cannot be empty");
    }

    if *pw1 != *pw2 {
        bail!("passphrases do not match");
    }

    Ok(Zeroizing::new(pw1.as_bytes().to_vec()))
}

/// Reads a secret value to store; never taken from the environment.
pub fn read_secret(prompt: &str) -> Result<Zeroizing<String>> {
    read_hidden(prompt)
}

/// One line from piped stdin, or a no-echo prompt on a terminal.
fn read_hidden(prompt: &str) -> Result<Zeroizing<String>> {
    if io::stdin().is_terminal() {
        return Ok(Zeroizing::new(rpassword::prompt_password(prompt)?));
    }

    let mut line = Zeroizing::new(String::new());
    io::stdin().read_line(&mut line)?;
    trim_newline(&mut line);
    Ok(line)
}

fn trim_newline(s: &mut String) {
    if s.ends_with('\n') {
        s.pop();
        if s.ends_with('\r') {
            s.pop();
        }
    }
}
