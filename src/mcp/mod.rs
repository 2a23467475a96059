//! Model Context Protocol server.
//!
//! Exposes message generation and committing as tools, and the repository
//! state as read-only resources, over newline-delimited JSON-RPC 2.0 on
//! stdin/stdout.
//!
//! | Kind     | Name                      | Effect                                  |
//! |----------|---------------------------|-----------------------------------------|
//! | tool     | `generate_commit_message` | Proposes a message, changes nothing     |
//! | tool     | `create_commit`           | Stages all, commits, reports the hash   |
//! | resource | `git://status`            | `git status` text                       |
//! | resource | `git://diff`              | Staged and unstaged diff                |
//! | resource | `git://recent-commits`    | Recent one-line history                 |

pub mod protocol;
mod server;
pub mod tools;

pub use server::{McpServer, SERVER_NAME};
