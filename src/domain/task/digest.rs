//! Plain-text digest of a chat's tasks.

use super::Task;

/// Concatenates the digest entries of `tasks` in order.
pub fn format_digest_block(tasks: &[Task]) -> String {
    tasks.iter().map(Task::describe).collect()
}
