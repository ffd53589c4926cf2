//! Gatekeeping between a validated command and the dispatcher.
//!
//! Checks run in a fixed order after parameter validation:
//! 1. lock: a locked library refuses everything outside the lock-exempt set;
//! 2. depth: a command that appends tasks is refused once the outstanding
//!    work (current task plus queue) already exceeds the configured limit.

use crate::command::CommandName;
use crate::error::CommandError;

/// Default task limit for the queue.
pub const DEFAULT_MAX_QUEUE_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionConfig {
    /// Upper bound on outstanding tasks.
    pub max_queue_depth: usize,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            max_queue_depth: DEFAULT_MAX_QUEUE_DEPTH,
        }
    }
}

impl AdmissionConfig {
    /// Decide whether `command` may proceed to dispatch.
    pub fn admit(
        &self,
        command: CommandName,
        running: bool,
        outstanding: usize,
    ) -> Result<(), CommandError> {
        if !running && !command.is_lock_exempt() {
            return Err(CommandError::Locked);
        }
        if command.queued_tasks() > 0 && outstanding > self.max_queue_depth {
            return Err(CommandError::QueueFull {
                depth: outstanding,
                limit: self.max_queue_depth,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_library_refuses_motion_commands() {
        let config = AdmissionConfig::default();
        for name in CommandName::ALL {
            let result = config.admit(name, false, 0);
            if name.is_lock_exempt() {
                assert!(result.is_ok(), "{name} should be exempt");
            } else {
                assert_eq!(result, Err(CommandError::Locked), "{name}");
            }
        }
    }

    #[test]
    fn lock_check_precedes_depth_check() {
        let config = AdmissionConfig { max_queue_depth: 4 };
        assert_eq!(config.admit(CommandName::Load, false, 100), Err(CommandError::Locked));
    }

    #[test]
    fn depth_limit_looks_at_current_depth_only() {
        let config = AdmissionConfig { max_queue_depth: 8 };
        assert!(config.admit(CommandName::Load, true, 7).is_ok());
        assert!(config.admit(CommandName::Load, true, 8).is_ok());
        assert_eq!(
            config.admit(CommandName::Load, true, 9),
            Err(CommandError::QueueFull { depth: 9, limit: 8 })
        );
        assert_eq!(
            config.admit(CommandName::Scan, true, 9),
            Err(CommandError::QueueFull { depth: 9, limit: 8 })
        );
    }

    #[test]
    fn non_queueing_commands_ignore_depth() {
        let config = AdmissionConfig { max_queue_depth: 4 };
        assert!(config.admit(CommandName::Park, true, 50).is_ok());
        assert!(config.admit(CommandName::Lock, true, 50).is_ok());
        assert!(config.admit(CommandName::Inventory, false, 50).is_ok());
    }
}
