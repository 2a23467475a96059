//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module    | Commands handled                       |
//! |-----------|----------------------------------------|
//! | `commit`  | bare `gic [hint...]`, `--dry-run`      |
//! | `auth`    | `Auth`                                 |
//! | `config`  | `Config`                               |
//! | `mcp`     | `Mcp`                                  |
//! | `version` | `Version`                              |

pub mod auth;
pub mod commit;
pub mod config;
pub mod mcp;
pub mod version;

pub use auth::cmd_auth;
pub use commit::cmd_commit;
pub use config::cmd_config;
pub use mcp::cmd_mcp;
pub use version::cmd_version;
