use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

use crate::utils::{AppError, AppResult};

/// Run a system command with a timeout.
///
/// Uses spawn + poll + kill so a hung subprocess (e.g. `tasklist` on a busy
/// machine) can never freeze an operation. Output is collected once the child
/// has exited.
pub fn run_command_with_timeout(
    program: &str,
    args: &[&str],
    timeout_secs: u64,
) -> AppResult<Output> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| AppError::CommandFailed(format!("{}: {}", program, e)))?;

    let deadline = Instant::now() + Duration::from_secs(timeout_secs);
    loop {
        match child.try_wait() {
            Ok(Some(_)) => break,
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(AppError::CommandFailed(format!(
                        "{} timed out after {}s",
                        program, timeout_secs
                    )));
                }
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(e) => {
                return Err(AppError::CommandFailed(format!("{}: {}", program, e)));
            }
        }
    }

    child
        .wait_with_output()
        .map_err(|e| AppError::CommandFailed(format!("{}: {}", program, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_command_failure() {
        let result = run_command_with_timeout("definitely-not-a-real-binary-4242", &[], 1);
        assert!(matches!(result, Err(AppError::CommandFailed(_))));
    }

    #[cfg(unix)]
    #[test]
    fn captures_stdout() {
        let output = run_command_with_timeout("echo", &["hello"], 5).unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn kills_on_timeout() {
        let result = run_command_with_timeout("sleep", &["5"], 0);
        assert!(matches!(result, Err(AppError::CommandFailed(msg)) if msg.contains("timed out")));
    }
}
