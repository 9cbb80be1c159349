//! Minimal POM metadata extraction.
//!
//! Only the artifact's own `groupId`, `artifactId` and `version` are read.
//! These are the elements directly below `<project>`; values nested inside
//! `<parent>` or `<dependencies>` are ignored.

use camino::Utf8Path;
use thiserror::Error;

/// Errors raised while reading POM metadata.
#[derive(Debug, Error)]
pub enum PomError {
    /// The POM could not be read from disk.
    #[error("failed to read POM: {0}")]
    Io(#[from] std::io::Error),

    /// The POM is not well-formed XML.
    #[error("malformed POM: {reason}")]
    Malformed {
        /// Parser diagnostic.
        reason: String,
    },

    /// A required coordinate field is absent or blank.
    #[error("POM has no {field}")]
    MissingField {
        /// Name of the missing element.
        field: &'static str,
    },
}

/// Coordinates declared by a POM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PomMetadata {
    /// `project/groupId`.
    pub group_id: String,
    /// `project/artifactId`.
    pub artifact_id: String,
    /// `project/version`.
    pub version: String,
}

impl PomMetadata {
    /// Read and parse the POM at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PomError::Io`] if the file cannot be read,
    /// [`PomError::Malformed`] if it is not UTF-8 XML, and
    /// [`PomError::MissingField`] if a coordinate field is absent.
    pub fn read(path: &Utf8Path) -> Result<Self, PomError> {
        let bytes = std::fs::read(path)?;
        let text = std::str::from_utf8(&bytes).map_err(|e| PomError::Malformed {
            reason: format!("not valid UTF-8: {e}"),
        })?;
        Self::parse(text)
    }

    /// Parse POM text.
    ///
    /// # Errors
    ///
    /// Returns [`PomError::Malformed`] for invalid XML and
    /// [`PomError::MissingField`] when a coordinate element is missing.
    ///
    /// # Examples
    ///
    /// ```
    /// use gmaven_updater::pom::PomMetadata;
    ///
    /// let pom = PomMetadata::parse(
    ///     "<project>\n  <groupId>androidx.core</groupId>\n  \
    ///      <artifactId>core</artifactId>\n  <version>1.9.0</version>\n</project>",
    /// )
    /// .expect("valid POM");
    /// assert_eq!(pom.artifact_id, "core");
    /// ```
    pub fn parse(text: &str) -> Result<Self, PomError> {
        let document = roxmltree::Document::parse(text).map_err(|e| PomError::Malformed {
            reason: e.to_string(),
        })?;
        let project = document.root_element();

        let field = |name: &'static str| -> Result<String, PomError> {
            project
                .children()
                .filter(roxmltree::Node::is_element)
                .find(|node| node.tag_name().name() == name)
                .and_then(|node| node.text())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
                .ok_or(PomError::MissingField { field: name })
        };

        Ok(Self {
            group_id: field("groupId")?,
            artifact_id: field("artifactId")?,
            version: field("version")?,
        })
    }

    /// Logical key `groupId:artifactId`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const FULL_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <parent>
    <groupId>androidx.parent</groupId>
    <artifactId>parent</artifactId>
    <version>9.9.9</version>
  </parent>
  <groupId>androidx.core</groupId>
  <artifactId>core</artifactId>
  <version>1.9.0</version>
  <packaging>aar</packaging>
  <dependencies>
    <dependency>
      <groupId>androidx.annotation</groupId>
      <artifactId>annotation</artifactId>
      <version>1.2.0</version>
    </dependency>
  </dependencies>
</project>
"#;

    #[test]
    fn parse_reads_project_level_fields() {
        let pom = PomMetadata::parse(FULL_POM).expect("valid POM");
        assert_eq!(
            pom,
            PomMetadata {
                group_id: "androidx.core".to_owned(),
                artifact_id: "core".to_owned(),
                version: "1.9.0".to_owned(),
            }
        );
        assert_eq!(pom.key(), "androidx.core:core");
    }

    #[rstest]
    #[case::group("groupId")]
    #[case::artifact("artifactId")]
    #[case::version("version")]
    fn parse_reports_missing_field(#[case] field: &'static str) {
        let pom = format!(
            "<project>{}{}{}</project>",
            if field == "groupId" { "" } else { "<groupId>g</groupId>" },
            if field == "artifactId" { "" } else { "<artifactId>a</artifactId>" },
            if field == "version" { "" } else { "<version>1.0.0</version>" },
        );
        let err = PomMetadata::parse(&pom).expect_err("expected missing field");
        assert!(matches!(err, PomError::MissingField { field: f } if f == field));
    }

    #[test]
    fn parent_coordinates_are_not_inherited() {
        let pom = "<project><parent><groupId>g</groupId></parent>\
                   <artifactId>a</artifactId><version>1</version></project>";
        let err = PomMetadata::parse(pom).expect_err("expected missing groupId");
        assert!(matches!(err, PomError::MissingField { field: "groupId" }));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let pom = "<project><groupId> </groupId><artifactId>a</artifactId>\
                   <version>1</version></project>";
        assert!(PomMetadata::parse(pom).is_err());
    }

    #[test]
    fn malformed_xml_is_reported() {
        let err = PomMetadata::parse("<project><groupId>").expect_err("expected parse error");
        assert!(matches!(err, PomError::Malformed { .. }));
    }

    #[test]
    fn non_utf8_pom_is_malformed_not_io() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8Path::from_path(dir.path())
            .expect("utf8 temp dir")
            .join("legacy-1.0.pom");
        std::fs::write(&path, b"<project><name>Caf\xe9</name></project>").expect("write pom");

        let err = PomMetadata::read(&path).expect_err("expected decode error");
        assert!(matches!(err, PomError::Malformed { .. }), "got {err:?}");
    }

    #[test]
    fn unreadable_pom_is_io() {
        let err = PomMetadata::read(Utf8Path::new("/nonexistent/missing.pom"))
            .expect_err("expected read error");
        assert!(matches!(err, PomError::Io(_)));
    }
}
