//! Configuration for structured (XML) output

/// Configuration options for XML output
#[derive(Debug, Clone, PartialEq)]
pub struct XmlConfig {
    /// Whether to emit the `<?xml ...?>` declaration
    pub declaration: bool,

    /// Whether to format output with indentation
    pub pretty_print: bool,

    /// Spaces per nesting level when pretty printing
    pub indent: usize,
}

impl Default for XmlConfig {
    fn default() -> Self {
        Self {
            declaration: false,
            pretty_print: true,
            indent: 2,
        }
    }
}

impl XmlConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the XML declaration is written
    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }

    /// Set whether to pretty-print output
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Set the indentation width
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = XmlConfig::default();
        assert!(!config.declaration);
        assert!(config.pretty_print);
        assert_eq!(config.indent, 2);
    }

    #[test]
    fn test_builder_pattern() {
        let config = XmlConfig::new()
            .with_declaration(true)
            .with_pretty_print(false)
            .with_indent(4);

        assert!(config.declaration);
        assert!(!config.pretty_print);
        assert_eq!(config.indent, 4);
    }
}
