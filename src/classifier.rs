#![forbid(unsafe_code)]

//! Location classification
//!
//! Decides whether a source position belongs to first-party code (and which
//! part of it) or to vendored, generated or system code the checks must stay
//! out of. Classification is a pure function of the location and the
//! immutable tables in [`LocationsConfig`].

use crate::config::LocationsConfig;
use crate::host::source::{SCRATCH_SPACE, SourceLocation};
use crate::types::{LocationType, NormalizedPath};

/// Spelling-file suffixes that mark an implementation (non-header) file
const IMPLEMENTATION_SUFFIXES: &[&str] = &[".cc", ".cpp", ".mm"];

/// Classifies source locations against the configured directory tables
#[derive(Debug, Clone, Copy)]
pub struct LocationClassifier<'a> {
    config: &'a LocationsConfig,
}

impl<'a> LocationClassifier<'a> {
    pub fn new(config: &'a LocationsConfig) -> Self {
        Self { config }
    }

    /// Classify a source location
    ///
    /// System headers, locations without a filename and the host's scratch
    /// buffer are always third-party: macros that paste tokens are not held
    /// against the code that invokes them.
    pub fn classify(&self, location: &SourceLocation) -> LocationType {
        if location.system {
            return LocationType::ThirdParty;
        }

        let filename = location.filename();
        if filename.is_empty() || filename == SCRATCH_SPACE {
            return LocationType::ThirdParty;
        }

        self.classify_path(filename)
    }

    /// Classify a path string with no further location metadata
    pub fn classify_path(&self, path: &str) -> LocationType {
        if path.is_empty() || path == SCRATCH_SPACE {
            return LocationType::ThirdParty;
        }
        self.classify_normalized(&NormalizedPath::new(path))
    }

    fn classify_normalized(&self, path: &NormalizedPath) -> LocationType {
        if path.contains(&self.config.generated_marker) {
            return LocationType::ThirdParty;
        }

        // The relaxed root sits inside a banned directory, so it is tested
        // first. Its exempt sub-path gets the full default checks.
        if path.contains(&self.config.relaxed_root) {
            if path.contains(&self.config.relaxed_exempt) {
                return LocationType::FirstPartyDefault;
            }
            return LocationType::FirstPartyRelaxed;
        }

        if self
            .config
            .banned_directories
            .iter()
            .any(|dir| path.contains(dir))
        {
            return LocationType::ThirdParty;
        }

        LocationType::FirstPartyDefault
    }
}

/// Returns true if `location`, or any site it was macro-expanded at, is
/// spelled in an implementation file
pub fn in_implementation_file(location: &SourceLocation) -> bool {
    let mut current = Some(location);
    while let Some(loc) = current {
        let filename = loc.filename();
        if IMPLEMENTATION_SUFFIXES
            .iter()
            .any(|suffix| filename.ends_with(suffix))
        {
            return true;
        }
        current = loc.immediate_expansion();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(path: &str) -> LocationType {
        let config = LocationsConfig::default();
        LocationClassifier::new(&config).classify(&SourceLocation::new(path, 1, 1))
    }

    #[test]
    fn test_first_party_default() {
        assert_eq!(classify("base/memory/foo.cc"), LocationType::FirstPartyDefault);
        assert_eq!(classify("/src/chrome/browser/x.h"), LocationType::FirstPartyDefault);
    }

    #[test]
    fn test_banned_directories() {
        assert_eq!(classify("third_party/abseil/x.h"), LocationType::ThirdParty);
        assert_eq!(classify("/src/v8/include/v8.h"), LocationType::ThirdParty);
        assert_eq!(classify("testing/gtest/gtest.h"), LocationType::ThirdParty);
        // Markers are directory components, not substrings of names
        assert_eq!(classify("src/myv8/x.cc"), LocationType::FirstPartyDefault);
    }

    #[test]
    fn test_generated_files() {
        assert_eq!(classify("out/Debug/gen/foo.h"), LocationType::ThirdParty);
        assert_eq!(
            classify("out/gen/third_party/blink/x.h"),
            LocationType::ThirdParty
        );
    }

    #[test]
    fn test_relaxed_subsystem_and_exemption() {
        assert_eq!(
            classify("third_party/blink/renderer/core/node.h"),
            LocationType::FirstPartyRelaxed
        );
        assert_eq!(
            classify("third_party/blink/browser/frame.cc"),
            LocationType::FirstPartyDefault
        );
    }

    #[test]
    fn test_normalization_invariance() {
        let pairs = [
            ("third_party\\blink\\renderer\\a.h", "/third_party/blink/renderer/a.h"),
            ("base\\a.cc", "base/a.cc"),
            ("v8\\src\\a.cc", "/v8/src/a.cc"),
            ("out\\gen\\a.h", "out/gen/a.h"),
        ];
        for (a, b) in pairs {
            assert_eq!(classify(a), classify(b), "{} vs {}", a, b);
            assert_eq!(classify(a), classify(a));
        }
    }

    #[test]
    fn test_unresolvable_locations_are_third_party() {
        let config = LocationsConfig::default();
        let classifier = LocationClassifier::new(&config);

        assert_eq!(
            classifier.classify(&SourceLocation::unknown()),
            LocationType::ThirdParty
        );
        assert_eq!(
            classifier.classify(&SourceLocation::new(SCRATCH_SPACE, 1, 1)),
            LocationType::ThirdParty
        );
        assert_eq!(
            classifier.classify(&SourceLocation::new("base/a.h", 1, 1).in_system_header()),
            LocationType::ThirdParty
        );
    }

    #[test]
    fn test_in_implementation_file_walks_expansions() {
        let header = SourceLocation::new("base/macros.h", 3, 1);
        assert!(!in_implementation_file(&header));

        let expanded = SourceLocation::new("base/macros.h", 3, 1)
            .expanded_at(SourceLocation::new("base/foo.cc", 20, 4));
        assert!(in_implementation_file(&expanded));

        let objc = SourceLocation::new("ui/view.mm", 1, 1);
        assert!(in_implementation_file(&objc));

        let nested = SourceLocation::new(SCRATCH_SPACE, 1, 1).expanded_at(
            SourceLocation::new("a.h", 2, 2).expanded_at(SourceLocation::new("b.cpp", 9, 9)),
        );
        assert!(in_implementation_file(&nested));
        assert!(!in_implementation_file(&SourceLocation::unknown()));
    }
}
