//! Payload filename parsing.

use crate::error::FormatError;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// `name-version.(jar|aar)` where the version is `X.Y.Z`, optionally
/// followed by a qualifier such as `-rc01` and dash-separated numeric
/// build tags.
const ARTIFACT_FILE_PATTERN: &str =
    r"^(.+?)-(\d+\.\d+\.\d+(?:-\w+\d+)?(?:-[\d.]+)*)\.(jar|aar)$";

/// Binary payload format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// Android archive; needs extraction.
    Aar,
    /// Plain Java archive; used as-is.
    Jar,
}

impl PayloadKind {
    /// File extension without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Aar => "aar",
            Self::Jar => "jar",
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Components of a payload filename.
///
/// # Examples
///
/// ```
/// use gmaven_updater::archive::filename::{ArtifactFileName, PayloadKind};
///
/// let name = ArtifactFileName::parse("core-ktx-1.9.0-rc01.aar").expect("valid name");
/// assert_eq!(name.base_name(), "core-ktx");
/// assert_eq!(name.version(), "1.9.0-rc01");
/// assert_eq!(name.kind(), PayloadKind::Aar);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFileName {
    base_name: String,
    version: String,
    kind: PayloadKind,
}

impl ArtifactFileName {
    /// Parse a payload filename.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::MalformedFileName`] when the name does not
    /// match the expected shape.
    pub fn parse(file_name: &str) -> Result<Self, FormatError> {
        let malformed = || FormatError::MalformedFileName {
            file_name: file_name.to_owned(),
        };
        let captures = pattern().captures(file_name).ok_or_else(malformed)?;
        let kind = match &captures[3] {
            "aar" => PayloadKind::Aar,
            "jar" => PayloadKind::Jar,
            _ => return Err(malformed()),
        };

        Ok(Self {
            base_name: captures[1].to_owned(),
            version: captures[2].to_owned(),
            kind,
        })
    }

    /// Library part before the version.
    #[must_use]
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Version as embedded in the filename.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Payload format.
    #[must_use]
    pub fn kind(&self) -> PayloadKind {
        self.kind
    }
}

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(ARTIFACT_FILE_PATTERN).expect("constant pattern compiles"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain_aar("core-1.9.0.aar", "core", "1.9.0", PayloadKind::Aar)]
    #[case::plain_jar("annotation-1.5.0.jar", "annotation", "1.5.0", PayloadKind::Jar)]
    #[case::qualifier("core-1.10.0-beta01.aar", "core", "1.10.0-beta01", PayloadKind::Aar)]
    #[case::dashed_name(
        "lifecycle-runtime-ktx-2.6.1.aar",
        "lifecycle-runtime-ktx",
        "2.6.1",
        PayloadKind::Aar
    )]
    #[case::build_tag(
        "symbol-processing-api-1.9.0-1.0.13.jar",
        "symbol-processing-api",
        "1.9.0-1.0.13",
        PayloadKind::Jar
    )]
    fn parses_valid_names(
        #[case] file_name: &str,
        #[case] base: &str,
        #[case] version: &str,
        #[case] kind: PayloadKind,
    ) {
        let parsed = ArtifactFileName::parse(file_name).expect("valid name");
        assert_eq!(parsed.base_name(), base);
        assert_eq!(parsed.version(), version);
        assert_eq!(parsed.kind(), kind);
    }

    #[rstest]
    #[case::no_version("core.aar")]
    #[case::two_part_version("core-1.9.aar")]
    #[case::wrong_extension("core-1.9.0.zip")]
    #[case::pom("core-1.9.0.pom")]
    #[case::jre_suffix("guava-31.1-jre.jar")]
    fn rejects_malformed_names(#[case] file_name: &str) {
        let err = ArtifactFileName::parse(file_name).expect_err("expected malformed name");
        assert_eq!(
            err,
            FormatError::MalformedFileName {
                file_name: file_name.to_owned()
            }
        );
    }
}
