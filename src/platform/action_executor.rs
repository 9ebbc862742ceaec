//! Executes a gated `ActionRequest` against the real OS: locking the
//! session, beeping, or issuing a desktop notification. On Linux, tries a
//! prioritised list of lock commands; first zero exit code wins.

use crate::action::{ActionRequest, ActionType};

/// `run(cmd) → exit_code`. Collaborator concern — the core only ever emits
/// an `ActionRequest`; it never shells out itself.
pub trait CommandRunner {
    fn run(&self, cmd: &str) -> i32;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, cmd: &str) -> i32 {
        #[cfg(unix)]
        let status = std::process::Command::new("sh").arg("-c").arg(cmd).status();
        #[cfg(windows)]
        let status = std::process::Command::new("cmd").arg("/C").arg(cmd).status();

        match status {
            Ok(status) => status.code().unwrap_or(-1),
            Err(_) => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    pub ok: bool,
    pub detail: String,
}

const LINUX_LOCK_COMMANDS: [&str; 3] = [
    "loginctl lock-session",
    "gnome-screensaver-command -l",
    "xdg-screensaver lock",
];

/// Executes gated action requests against the host platform. `Beep` and
/// `Notify` are handled locally without delegating to the lock command list;
/// `LockScreen` tries the platform's lock commands in priority order.
pub struct PlatformActionExecutor<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> PlatformActionExecutor<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn execute(&self, request: &ActionRequest) -> ActionResult {
        match request.action_type {
            ActionType::None => ActionResult {
                ok: true,
                detail: "none".to_string(),
            },
            ActionType::Beep => {
                print!("\x07");
                ActionResult {
                    ok: true,
                    detail: "soft".to_string(),
                }
            }
            ActionType::Notify => {
                self.runner.run(&notify_command(&request.reason));
                ActionResult {
                    ok: true,
                    detail: "notify".to_string(),
                }
            }
            ActionType::LockScreen => self.lock_screen(),
        }
    }

    #[cfg(target_os = "windows")]
    fn lock_screen(&self) -> ActionResult {
        ActionResult {
            ok: self.runner.run("rundll32.exe user32.dll,LockWorkStation") == 0,
            detail: "LockWorkStation".to_string(),
        }
    }

    #[cfg(not(target_os = "windows"))]
    fn lock_screen(&self) -> ActionResult {
        for cmd in LINUX_LOCK_COMMANDS {
            if self.runner.run(cmd) == 0 {
                return ActionResult {
                    ok: true,
                    detail: format!("lock-ok:{}", cmd),
                };
            }
        }
        ActionResult {
            ok: false,
            detail: "lock commands failed".to_string(),
        }
    }
}

fn notify_command(reason: &str) -> String {
    format!("notify-send 'SonarLock' '{}'", reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakeRunner {
        results: RefCell<Vec<i32>>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeRunner {
        fn new(results: Vec<i32>) -> Self {
            Self {
                results: RefCell::new(results),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, cmd: &str) -> i32 {
            self.calls.borrow_mut().push(cmd.to_string());
            if self.results.borrow().is_empty() {
                -1
            } else {
                self.results.borrow_mut().remove(0)
            }
        }
    }

    fn request(action_type: ActionType) -> ActionRequest {
        ActionRequest {
            action_type,
            timestamp_sec: 1.0,
            reason: "triggered_motion".to_string(),
        }
    }

    #[test]
    fn beep_and_none_never_invoke_the_command_runner() {
        let runner = FakeRunner::new(vec![]);
        let executor = PlatformActionExecutor::new(runner);
        assert!(executor.execute(&request(ActionType::Beep)).ok);
        assert!(executor.execute(&request(ActionType::None)).ok);
        assert!(executor.runner.calls.borrow().is_empty());
    }

    #[test]
    fn lock_screen_tries_commands_until_one_succeeds() {
        let runner = FakeRunner::new(vec![1, 1, 0]);
        let executor = PlatformActionExecutor::new(runner);
        let result = executor.lock_screen();
        assert!(result.ok);
        assert_eq!(executor.runner.calls.borrow().len(), 3);
    }

    #[test]
    fn lock_screen_reports_failure_when_all_commands_fail() {
        let runner = FakeRunner::new(vec![1, 1, 1]);
        let executor = PlatformActionExecutor::new(runner);
        let result = executor.lock_screen();
        assert!(!result.ok);
    }

    #[test]
    fn lock_failure_is_local_and_does_not_panic() {
        let runner = FakeRunner::new(vec![]);
        let executor = PlatformActionExecutor::new(runner);
        let result = executor.execute(&request(ActionType::LockScreen));
        assert!(!result.ok);
    }
}
