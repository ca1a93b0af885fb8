use serde::{Serialize, Serializer};

/// Severity class understood by the dashboard message widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Style {
    Info,
    Success,
    Danger,
    Warning,
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Info => "is-info",
            Style::Success => "is-success",
            Style::Danger => "is-danger",
            Style::Warning => "is-warning",
        }
    }
}

impl Serialize for Style {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

pub fn style_for(status: &str) -> Style {
    // Unknown statuses are shown, just with the fallback colour.
    match status.to_ascii_lowercase().as_str() {
        "new" => Style::Info,
        "update" => Style::Success,
        "error" => Style::Danger,
        _ => Style::Warning,
    }
}

#[cfg(test)]
mod tests {
    use super::{style_for, Style};

    #[test]
    fn known_statuses_ignore_case() {
        assert_eq!(style_for("new"), Style::Info);
        assert_eq!(style_for("NEW"), Style::Info);
        assert_eq!(style_for("Update"), Style::Success);
        assert_eq!(style_for("error"), Style::Danger);
    }

    #[test]
    fn unknown_statuses_fall_back_to_warning() {
        assert_eq!(style_for("banana"), Style::Warning);
        assert_eq!(style_for(""), Style::Warning);
    }

    #[test]
    fn serializes_as_css_class() {
        let value = serde_json::to_value(Style::Success).expect("serialize");
        assert_eq!(value, serde_json::json!("is-success"));
        assert_eq!(Style::Danger.as_str(), "is-danger");
    }
}
