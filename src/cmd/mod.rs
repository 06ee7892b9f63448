//! CLI command implementations.
//!
//! | Module | Commands handled            |
//! |--------|------------------------------|
//! | `run`  | `Deploy`, `Update`, `Teardown` |
//! | `plan` | `Plan`                       |

pub mod plan;
pub mod run;

pub use plan::cmd_plan;
pub use run::{Lifecycle, run_lifecycle, run_teardown};
