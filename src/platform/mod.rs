//! OS-facing collaborators: the command runner and action executor that
//! turn a gated `ActionRequest` into a real lock/beep/notification.

pub mod action_executor;

pub use action_executor::{ActionResult, CommandRunner, PlatformActionExecutor, SystemCommandRunner};
