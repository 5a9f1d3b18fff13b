//! The deletion audit record.

use chrono::{DateTime, SecondsFormat, Utc};

/// Column names of the CSV audit log, in field order.
pub const CSV_HEADER: [&str; 7] = [
    "Timestamp",
    "Repository",
    "Image Name",
    "Tag",
    "Component ID",
    "Rule",
    "Dry Run",
];

/// One deletion decision, real or simulated.
///
/// Records are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionRecord {
    timestamp: DateTime<Utc>,
    repository: String,
    image_name: String,
    tag: String,
    component_id: String,
    rule: String,
    dry_run: bool,
}

impl DeletionRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(
        repository: impl Into<String>,
        image_name: impl Into<String>,
        tag: impl Into<String>,
        component_id: impl Into<String>,
        rule: impl Into<String>,
        dry_run: bool,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            repository: repository.into(),
            image_name: image_name.into(),
            tag: tag.into(),
            component_id: component_id.into(),
            rule: rule.into(),
            dry_run,
        }
    }

    /// Replaces the timestamp.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Repository the component belongs to.
    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Image name.
    #[must_use]
    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    /// Tag that was (or would have been) removed.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Registry identifier of the component.
    #[must_use]
    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    /// Name of the rule that selected the component.
    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// True when the deletion was simulated.
    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Renders the record as CSV fields in [`CSV_HEADER`] order.
    #[must_use]
    pub fn to_row(&self) -> [String; 7] {
        [
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.repository.clone(),
            self.image_name.clone(),
            self.tag.clone(),
            self.component_id.clone(),
            self.rule.clone(),
            self.dry_run.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_row_field_order() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 2, 0, 5).unwrap();
        let record = DeletionRecord::new("docker-hosted", "prod-app", "v1", "abc123", "prod", false)
            .with_timestamp(ts);

        assert_eq!(
            record.to_row(),
            [
                "2024-03-09T02:00:05Z".to_string(),
                "docker-hosted".to_string(),
                "prod-app".to_string(),
                "v1".to_string(),
                "abc123".to_string(),
                "prod".to_string(),
                "false".to_string(),
            ]
        );
    }

    #[test]
    fn test_dry_run_rendering() {
        let record = DeletionRecord::new("r", "i", "t", "c", "rule", true);
        assert_eq!(record.to_row()[6], "true");
        assert!(record.dry_run());
    }
}
