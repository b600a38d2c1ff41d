//! Line based operator prompts.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Asks questions on a writer and reads trimmed answers from a reader.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R, W> Prompter<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print a line.
    pub async fn say(&mut self, message: impl AsRef<str>) -> io::Result<()> {
        self.output.write_all(message.as_ref().as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await
    }

    /// Print a question and read one answer. End of input reads as an empty answer.
    pub async fn ask(&mut self, question: impl AsRef<str>) -> io::Result<String> {
        self.output.write_all(question.as_ref().as_bytes()).await?;
        self.output.flush().await?;

        let mut answer = String::new();
        self.input.read_line(&mut answer).await?;
        Ok(answer.trim().to_string())
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn answers_are_trimmed() {
        let mut prompter = Prompter::new(&b"  wlan0mon \r\nsecond\n"[..], Vec::new());
        assert_eq!(prompter.ask("Interface: ").await.unwrap(), "wlan0mon");
        assert_eq!(prompter.ask("Next: ").await.unwrap(), "second");
        assert_eq!(prompter.ask("Past the end: ").await.unwrap(), "");

        let out = String::from_utf8(prompter.into_output()).unwrap();
        assert_eq!(out, "Interface: Next: Past the end: ");
    }

    #[tokio::test]
    async fn say_appends_newline() {
        let mut prompter = Prompter::new(&b""[..], Vec::new());
        prompter.say("hello").await.unwrap();
        assert_eq!(prompter.into_output(), b"hello\n");
    }
}
