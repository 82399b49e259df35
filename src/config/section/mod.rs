//! Configuration section definitions.
//!
//! Each module corresponds to a section in `staticgate.toml`:
//!
//! | Module  | TOML Section | Purpose                              |
//! |---------|--------------|--------------------------------------|
//! | `files` | `[files]`    | Root, hide patterns, index names     |
//! | `serve` | `[serve]`    | HTTP server (interface, port, pool)  |

mod files;
mod serve;

pub use files::FilesConfig;
pub use serve::ServeConfig;
