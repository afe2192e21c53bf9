/*!
Subcommand modules for the `invoke` CLI.

Layout:
  src/cmd/
    mod.rs          (this file: module declarations + re-exports)
    subject.rs      (Subject enum + helpers)
    list.rs         (ListArgs + execute_list)
    get.rs          (GetArgs  + execute_get)
    exec.rs         (ExecArgs + execute_exec)
    shared.rs       (target resolution, payload collection, row rendering)
    format.rs       (colors, boxed headers, tables)

Conventions:
  - Each subcommand module exposes exactly one public `execute_*` function
    that returns `anyhow::Result<()>`.
  - Argument structs derive `clap::Args` and are kept minimal.
*/

pub mod exec;
pub mod format;
pub mod get;
pub mod list;
pub mod shared;
pub mod subject;

pub use exec::{ExecArgs, execute_exec};
pub use get::{GetArgs, execute_get};
pub use list::{ListArgs, execute_list};
