//! # External Process Invocation
//!
//! Runs a resolved tool with an explicit argument vector, never through a
//! shell, and turns spawn failures and non-zero exits into
//! `PopError::ExternalProcess` with the captured stderr.
//!
//! ## Example:
//! ```rust,no_run
//! use population_gif::{args, process::ToolInvocation};
//!
//! # async fn demo() -> Result<(), population_gif::PopError> {
//! let output = ToolInvocation::new("ffmpeg", "ffmpeg")
//!     .args(args!["-version"])
//!     .run()
//!     .await?;
//! println!("{}", String::from_utf8_lossy(&output.stdout));
//! # Ok(())
//! # }
//! ```

use crate::error::PopError;
use std::path::PathBuf;
use std::process::Output;
use std::time::Instant;
use tracing::debug;

/// Converts any iterable of displayable items into owned arguments
pub fn to_string_vec<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}

/// Build an argument vector from mixed literals and values
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        $crate::process::to_string_vec([$($item.to_string()),*])
    };
}

/// One invocation of an external tool
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    tool: String,
    program: PathBuf,
    args: Vec<String>,
}

impl ToolInvocation {
    pub fn new(tool: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.args.extend(args);
        self
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Human-readable command line, for logs only
    pub fn describe(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                line.push_str(&format!(" \"{}\"", arg));
            } else {
                line.push(' ');
                line.push_str(arg);
            }
        }
        line
    }

    /// Run to completion and fail on a non-zero exit status
    pub async fn run(&self) -> Result<Output, PopError> {
        debug!("Running: {}", self.describe());
        let start_time = Instant::now();

        let output = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| PopError::ExternalProcess {
                tool: self.tool.clone(),
                message: format!("could not start {}: {}", self.program.display(), e),
            })?;

        let duration = start_time.elapsed();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PopError::ExternalProcess {
                tool: self.tool.clone(),
                message: format!("{} after {:.1}s: {}", output.status, duration.as_secs_f64(), stderr.trim()),
            });
        }

        debug!("{} finished in {:.1}s", self.tool, duration.as_secs_f64());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_macro() {
        let delay = 20;
        let result = args!["-delay", delay, "-loop", 0];
        assert_eq!(result, vec!["-delay", "20", "-loop", "0"]);
    }

    #[test]
    fn test_to_string_vec_empty() {
        let result: Vec<String> = to_string_vec(Vec::<&str>::new());
        assert!(result.is_empty());
    }

    #[test]
    fn test_describe_quotes_whitespace() {
        let invocation = ToolInvocation::new("ffmpeg", "/usr/bin/ffmpeg")
            .arg("-filter_complex")
            .arg("fps=10,split [o1] [o2]");
        assert_eq!(
            invocation.describe(),
            "/usr/bin/ffmpeg -filter_complex \"fps=10,split [o1] [o2]\""
        );
    }

    #[tokio::test]
    async fn test_spawn_failure_is_external_process_error() {
        let err = ToolInvocation::new("ghost", "/nonexistent/ghost-tool")
            .run()
            .await
            .unwrap_err();
        match err {
            PopError::ExternalProcess { tool, .. } => assert_eq!(tool, "ghost"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_reported() {
        let err = ToolInvocation::new("false", "/bin/sh")
            .args(args!["-c", "echo broken >&2; exit 3"])
            .run()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_arguments_are_not_shell_interpreted() {
        let output = ToolInvocation::new("echo", "/bin/sh")
            .args(args!["-c", "printf '%s' \"$0\"", "a; rm -rf x"])
            .run()
            .await
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout), "a; rm -rf x");
    }
}
