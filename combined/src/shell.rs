//! Interactive mode: one command per line, one session for the whole run.

use std::io::Write;

use clap::Parser;
use common::{AppError, AppResult};
use domain::Session;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::cli::{Command, ShellCommand, ShellLine};
use crate::commands::Harness;
use crate::render;

/// Read commands from `input` until EOF or `exit`.
pub async fn run<R, W>(
    harness: &Harness<'_>,
    session: &mut Session,
    input: R,
    out: &mut W,
) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        write!(out, "{}", prompt(session)).map_err(io_error)?;
        out.flush().map_err(io_error)?;

        let Some(line) = lines.next_line().await.map_err(io_error)? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let args = match split_args(line) {
            Ok(args) => args,
            Err(reason) => {
                writeln!(out, "{reason}").map_err(io_error)?;
                continue;
            }
        };
        let parsed = match ShellLine::try_parse_from(args) {
            Ok(parsed) => parsed,
            Err(err) => {
                write!(out, "{err}").map_err(io_error)?;
                continue;
            }
        };

        let output = match parsed.command {
            ShellCommand::Exit => break,
            ShellCommand::Whoami => render::session(session),
            ShellCommand::Logout => {
                session.clear();
                "로그아웃되었습니다".to_string()
            }
            ShellCommand::Api(Command::Shell) => "already in the shell".to_string(),
            ShellCommand::Api(command) => match harness.run(command, session).await {
                Ok(output) => output,
                Err(err) => render::error(&err),
            },
        };
        writeln!(out, "{output}").map_err(io_error)?;
    }

    Ok(())
}

fn prompt(session: &Session) -> String {
    match session.current_user() {
        Some(user) => format!("board({})> ", user.nickname),
        None => "board> ".to_string(),
    }
}

fn io_error(err: std::io::Error) -> AppError {
    AppError::internal(format!("shell I/O failed: {err}"))
}

/// Split a line into words with shell quoting rules.
fn split_args(line: &str) -> Result<Vec<String>, String> {
    shlex::split(line).ok_or_else(|| "unbalanced quote or trailing escape".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use client::{ApiReply, Endpoints, MockBoardApi};
    use contracts::{LoginData, Response};

    #[test]
    fn test_split_args() {
        assert_eq!(
            split_args(r#"comments create 3 "좋은 글이네요 ㅎㅎ""#).unwrap(),
            ["comments", "create", "3", "좋은 글이네요 ㅎㅎ"]
        );
        assert_eq!(split_args("  whoami  ").unwrap(), ["whoami"]);
        assert_eq!(split_args("sentiment ''").unwrap(), ["sentiment", ""]);
        assert_eq!(
            split_args(r"comments create 3 it\'s\ fine").unwrap(),
            ["comments", "create", "3", "it's fine"]
        );
        assert!(split_args("login 'a@b.cd").is_err());
        assert!(split_args("login a@b.cd \\").is_err());
    }

    #[tokio::test]
    async fn test_session_lives_across_lines() {
        let mut api = MockBoardApi::new();
        api.expect_login().times(1).returning(|_| {
            Ok(ApiReply::new(
                200,
                Response::LoginSuccess(LoginData {
                    user_id: 3,
                    nickname: "유저2".to_string(),
                    profile_image_url: None,
                }),
            ))
        });
        let harness = Harness::new(&api, Endpoints::default());
        let mut session = Session::anonymous();

        let script = "whoami\nlogin testuser2@example.com AnotherPass456!@#\nwhoami\nlogout\nwhoami\nexit\nwhoami\n";
        let mut out = Vec::new();
        run(&harness, &mut session, script.as_bytes(), &mut out)
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.matches("로그인되지 않음").count(), 2);
        assert!(out.contains("board(유저2)> "));
        assert!(out.contains("유저2 (user_id 3)"));
        assert!(out.contains("로그아웃되었습니다"));
        assert!(!session.is_logged_in());
    }

    #[tokio::test]
    async fn test_errors_do_not_end_the_shell() {
        let api = MockBoardApi::new();
        let harness = Harness::new(&api, Endpoints::default());
        let mut session = Session::anonymous();

        let script = "validate nickname '닉 네임'\nnot-a-command\nvalidate email a@b.cd\n";
        let mut out = Vec::new();
        run(&harness, &mut session, script.as_bytes(), &mut out)
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("nickname: invalid\n  - 공백을 포함할 수 없습니다"));
        assert!(out.contains("email: valid"));
    }
}
