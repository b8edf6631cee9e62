//! Kernel configuration.

/// Configuration for kernel initialization.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Name of this kernel (for identification in logs).
    pub name: String,

    /// Scope key prefix under which user-defined functions are stored.
    ///
    /// A function `greet` lives in scope as `fn-greet` by default.
    pub function_prefix: String,

    /// Search path for external commands. `None` reads `PATH` at startup.
    pub path: Option<String>,

    /// Give the root evaluator duplicates of this process's stdin and stdout
    /// as its ports. When false, both root ports are unused.
    pub inherit_stdio: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            function_prefix: "fn-".to_string(),
            path: None,
            inherit_stdio: false,
        }
    }
}

impl KernelConfig {
    /// A config with the given name and default settings.
    pub fn named(name: &str) -> Self {
        Self { name: name.to_string(), ..Self::default() }
    }

    /// A config for running scripts against the real terminal.
    pub fn interactive() -> Self {
        Self {
            name: "interactive".to_string(),
            inherit_stdio: true,
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = KernelConfig::default();
        assert_eq!(config.function_prefix, "fn-");
        assert!(config.path.is_none());
        assert!(!config.inherit_stdio);
    }

    #[test]
    fn interactive_inherits_stdio() {
        let config = KernelConfig::interactive().with_path("/usr/bin");
        assert!(config.inherit_stdio);
        assert_eq!(config.path.as_deref(), Some("/usr/bin"));
    }
}
