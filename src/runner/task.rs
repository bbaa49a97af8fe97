// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Running building blocks as isolated tasks.
//!
//! A task never propagates a failure of the block. Errors and panics are logged
//! and every declared output file is replaced by a failure marker
//! so that the consumers of the outputs can detect the failure.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::auxiliary::write_failed_output;
use crate::errors::BlockError;

/// Return code of a task that failed with an error or a panic.
pub const TASK_FAILED: i32 = 1;

/// Run `block` as an isolated task.
///
/// ## Returns
/// Return code of the block or [`TASK_FAILED`] if the block returned an error or panicked.
/// In the latter case, all `outputs` are overwritten with failure markers.
pub fn run_task<P, F>(name: &str, outputs: &[P], block: F) -> i32
where
    P: AsRef<Path>,
    F: FnOnce() -> Result<i32, BlockError>,
{
    let result = panic::catch_unwind(AssertUnwindSafe(block));

    let message = match result {
        Ok(Ok(code)) => return code,
        Ok(Err(e)) => e.to_string(),
        Err(payload) => match payload.downcast_ref::<&str>() {
            Some(x) => (*x).to_owned(),
            None => payload
                .downcast_ref::<String>()
                .cloned()
                .unwrap_or_else(|| "unknown panic".to_owned()),
        },
    };

    log::error!("Task {} failed: {}", name, message);

    for output in outputs {
        if let Err(e) = write_failed_output(output) {
            log::error!(
                "Could not write failure marker into '{}': {}",
                output.as_ref().display(),
                e
            );
        }
    }

    TASK_FAILED
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TopologyError;
    use tempfile::TempDir;

    #[test]
    fn success() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("output.gro");

        assert_eq!(run_task("success", &[&output], || Ok(0)), 0);
        assert!(!output.exists());
    }

    #[test]
    fn nonzero_code_propagated() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("output.gro");

        assert_eq!(run_task("nonzero", &[&output], || Ok(3)), 3);
        assert!(!output.exists());
    }

    #[test]
    fn error_writes_markers() {
        let dir = TempDir::new().unwrap();
        let outputs = [dir.path().join("a.zip"), dir.path().join("b.itp")];

        let code = run_task("error", &outputs, || {
            Err(TopologyError::ChainItpNotFound("A".to_owned()).into())
        });

        assert_eq!(code, TASK_FAILED);
        for output in &outputs {
            assert_eq!(std::fs::read_to_string(output).unwrap(), "Error\n");
        }
    }

    #[test]
    fn panic_writes_markers() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("output.tpr");

        let code = run_task("panic", &[&output], || panic!("block panicked"));

        assert_eq!(code, TASK_FAILED);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "Error\n");
    }
}
