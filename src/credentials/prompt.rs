//! Interactive credential entry.

use super::{Credential, CredentialError};
use std::io::{BufRead, Write};

/// A credential typed in by the user.
#[derive(Debug)]
pub struct PromptAnswer {
    /// Entered account name and password.
    pub credential: Credential,
    /// Whether the user asked for it to be persisted.
    pub save: bool,
}

/// Asks the user for a credential. Only user-initiated paths prompt.
pub trait CredentialPrompt: Send + Sync {
    /// Ask for the credential for `target`.
    ///
    /// Returns `Ok(None)` when the user cancels.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Prompt`] if input cannot be read.
    fn prompt(
        &self,
        target: &str,
        default_principal: Option<&str>,
    ) -> Result<Option<PromptAnswer>, CredentialError>;
}

/// Terminal prompt on stdin/stderr.
///
/// The password is read as a plain line; pipe it in or set
/// `MYDNS_SYNC_PASSWORD` when echo matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl CredentialPrompt for StdinPrompt {
    fn prompt(
        &self,
        target: &str,
        default_principal: Option<&str>,
    ) -> Result<Option<PromptAnswer>, CredentialError> {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stderr();
        read_answer(&mut input, &mut output, target, default_principal)
    }
}

/// Drive the prompt dialogue over arbitrary reader/writer pairs.
///
/// End of input at any question cancels.
pub(crate) fn read_answer<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    target: &str,
    default_principal: Option<&str>,
) -> Result<Option<PromptAnswer>, CredentialError> {
    let question = match default_principal {
        Some(default) => format!("{target} account [{default}]: "),
        None => format!("{target} account: "),
    };
    let Some(principal) = ask(input, output, &question)? else {
        return Ok(None);
    };
    let principal = match (principal.is_empty(), default_principal) {
        (true, Some(default)) => default.to_owned(),
        (true, None) => return Ok(None),
        (false, _) => principal,
    };

    let Some(secret) = ask(input, output, "password: ")? else {
        return Ok(None);
    };

    let save = match ask(input, output, "save credential? [Y/n]: ")? {
        Some(reply) => !matches!(reply.to_ascii_lowercase().as_str(), "n" | "no"),
        None => true,
    };

    Ok(Some(PromptAnswer {
        credential: Credential::new(principal, secret),
        save,
    }))
}

fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> Result<Option<String>, CredentialError> {
    write!(output, "{question}")
        .and_then(|()| output.flush())
        .map_err(|e| CredentialError::Prompt(e.to_string()))?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| CredentialError::Prompt(e.to_string()))?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).trim().to_owned()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::io::Cursor;

    fn run(input: &str, default: Option<&str>) -> (Option<PromptAnswer>, String) {
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut written = Vec::new();
        let answer = read_answer(&mut reader, &mut written, "MyDnsSync", default).unwrap();
        (answer, String::from_utf8(written).unwrap())
    }

    #[test]
    fn full_dialogue_saves_by_default() {
        let (answer, transcript) = run("mydns000001\nhunter2\n\n", None);
        let answer = answer.unwrap();
        assert_eq!(answer.credential, Credential::new("mydns000001", "hunter2"));
        assert!(answer.save);
        assert!(transcript.contains("MyDnsSync account: "));
        assert!(!transcript.contains("hunter2"));
    }

    #[test]
    fn declining_save_is_respected() {
        let (answer, _) = run("u\np\nn\n", None);
        assert!(!answer.unwrap().save);
    }

    #[test]
    fn empty_account_uses_default() {
        let (answer, transcript) = run("\np\ny\n", Some("mydns000001"));
        assert_eq!(answer.unwrap().credential.principal(), "mydns000001");
        assert!(transcript.contains("[mydns000001]"));
    }

    #[test]
    fn empty_account_without_default_cancels() {
        let (answer, _) = run("\n", None);
        assert!(answer.is_none());
    }

    #[test]
    fn end_of_input_cancels() {
        let (answer, _) = run("u\n", None);
        assert!(answer.is_none());
    }

    #[test]
    fn missing_save_answer_defaults_to_save() {
        let (answer, _) = run("u\np\n", None);
        assert!(answer.unwrap().save);
    }
}
