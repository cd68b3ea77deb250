//! Flag parsing for forwarded bulk-run arguments
//!
//! Only used to word diagnostics; the arguments themselves are forwarded
//! untouched.

/// Target and project selector found in the forwarded arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSelection {
    pub target: String,
    pub projects: Option<String>,
}

impl TaskSelection {
    /// `None` when no `--target` is present
    pub fn parse(args: &[String]) -> Option<Self> {
        let target = flag_value(args, "--target", Some("-t"))?;
        let projects = flag_value(args, "--projects", Some("-p"));
        Some(Self { target, projects })
    }

    /// Tag value of a `tag:<value>` selector
    pub fn tag(&self) -> Option<&str> {
        self.projects
            .as_deref()
            .and_then(|selector| selector.strip_prefix("tag:"))
            .filter(|tag| !tag.is_empty())
    }

    /// Short description for messages
    pub fn describe(&self) -> String {
        match (self.tag(), &self.projects) {
            (Some(tag), _) => format!("'{}' for projects tagged '{tag}'", self.target),
            (None, Some(projects)) => format!("'{}' for projects '{projects}'", self.target),
            (None, None) => format!("'{}'", self.target),
        }
    }
}

/// Value of `--name=value`, `--name value` or `-s value`
fn flag_value(args: &[String], long: &str, short: Option<&str>) -> Option<String> {
    let prefix = format!("{long}=");
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }
        if let Some(value) = arg.strip_prefix(&prefix) {
            return Some(value.to_string()).filter(|v| !v.is_empty());
        }
        if arg == long || short.is_some_and(|s| arg == s) {
            return iter
                .next()
                .filter(|value| !value.starts_with('-'))
                .cloned();
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_equals_form() {
        let selection = TaskSelection::parse(&args(&["--target=lint", "--projects=tag:python"])).unwrap();
        assert_eq!(selection.target, "lint");
        assert_eq!(selection.tag(), Some("python"));
    }

    #[test]
    fn test_separate_value_form() {
        let selection =
            TaskSelection::parse(&args(&["--parallel=3", "--target", "test", "--projects", "api,web"])).unwrap();
        assert_eq!(selection.target, "test");
        assert_eq!(selection.projects.as_deref(), Some("api,web"));
        assert_eq!(selection.tag(), None);
    }

    #[test]
    fn test_short_flags() {
        let selection = TaskSelection::parse(&args(&["-t", "build", "-p", "tag:dotnet"])).unwrap();
        assert_eq!(selection.target, "build");
        assert_eq!(selection.tag(), Some("dotnet"));
    }

    #[test]
    fn test_missing_target() {
        assert!(TaskSelection::parse(&args(&["--projects=tag:python"])).is_none());
        assert!(TaskSelection::parse(&args(&["--target"])).is_none());
        assert!(TaskSelection::parse(&args(&["--target=", "--all"])).is_none());
    }

    #[test]
    fn test_stops_at_double_dash() {
        assert!(TaskSelection::parse(&args(&["--", "--target=test"])).is_none());
    }

    #[test]
    fn test_describe() {
        let selection = TaskSelection::parse(&args(&["--target=test", "--projects=tag:python"])).unwrap();
        assert_eq!(selection.describe(), "'test' for projects tagged 'python'");
    }
}
