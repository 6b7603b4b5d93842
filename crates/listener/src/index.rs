//! The default landing page.

/// Renders `<h1>{name} App up and running!</h1>` followed by one
/// `name: version` line per registered component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPage {
    name: String,
    versions: Vec<(String, String)>,
}

impl IndexPage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            versions: Vec::new(),
        }
    }

    /// Show the application's own version.
    pub fn with_version(self, version: impl Into<String>) -> Self {
        let name = self.name.clone();
        self.with_component(name, version)
    }

    /// Show the version of a library or other component.
    ///
    /// Lines appear in the order they were added. Adding the same component
    /// twice replaces its version in place.
    pub fn with_component(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        let name = name.into();
        let version = version.into();
        match self.versions.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = version,
            None => self.versions.push((name, version)),
        }
        self
    }

    pub fn render(&self) -> String {
        let mut page = format!("<h1>{} App up and running!</h1>", self.name);
        if !self.versions.is_empty() {
            let lines: Vec<String> = self
                .versions
                .iter()
                .map(|(name, version)| format!("{name}: {version}"))
                .collect();
            page.push('\n');
            page.push_str(&lines.join("\n"));
        }
        page
    }
}
