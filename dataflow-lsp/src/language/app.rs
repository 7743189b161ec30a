//! App import manifests: `type.name=uri` and `type.name.metadata=uri` lines.

use std::collections::HashMap;

use url::Url;

use crate::text::{Document, Range};

/// One `key=uri` line of a manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestLine {
    pub uri: String,
    pub key_range: Range,
}

/// An app, merged from its app and metadata lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppEntry {
    pub app_type: String,
    pub name: String,
    pub version: String,
    pub app: Option<ManifestLine>,
    pub metadata: Option<ManifestLine>,
}

/// Parse a manifest. Entries are merged by type, name and version and keep
/// the order in which they first appear; malformed lines are skipped.
#[must_use]
pub fn parse_manifest(document: &dyn Document) -> Vec<AppEntry> {
    let mut entries: Vec<AppEntry> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for line in 0..document.line_count() {
        let Some(text) = document.line(line) else {
            continue;
        };
        let parts: Vec<&str> = text.split('=').collect();
        let [key, uri] = parts.as_slice() else {
            continue;
        };
        let key_start = key.chars().take_while(|c| c.is_whitespace()).count();
        let key = key.trim();
        let uri = uri.trim();
        let key_parts: Vec<&str> = key.split('.').collect();
        let (app_type, name, is_metadata) = match key_parts.as_slice() {
            [app_type, name] => (*app_type, *name, false),
            [app_type, name, "metadata"] => (*app_type, *name, true),
            _ => continue,
        };
        if app_type.is_empty() || name.is_empty() || uri.is_empty() {
            continue;
        }

        let version = version_of(uri);
        let manifest_line = ManifestLine {
            uri: uri.to_string(),
            key_range: Range::on_line(line, key_start, key_start + key.chars().count()),
        };
        let merge_key = format!("{app_type}.{name}#{version}");
        let position = *index.entry(merge_key).or_insert_with(|| {
            entries.push(AppEntry {
                app_type: app_type.to_string(),
                name: name.to_string(),
                version: version.clone(),
                app: None,
                metadata: None,
            });
            entries.len() - 1
        });
        if let Some(entry) = entries.get_mut(position) {
            if is_metadata {
                entry.metadata = Some(manifest_line);
            } else {
                entry.app = Some(manifest_line);
            }
        }
    }
    entries
}

/// Version carried by an app uri, empty when none can be told.
///
/// A `-metadata` suffix is dropped so an app and its metadata artifact
/// agree.
#[must_use]
pub fn version_of(uri: &str) -> String {
    let Some((scheme, rest)) = uri.split_once(':') else {
        return String::new();
    };
    let version = match scheme {
        "maven" => rest
            .trim_start_matches('/')
            .rsplit_once(':')
            .map(|(_, version)| version.to_string())
            .unwrap_or_default(),
        "docker" => {
            let image = rest.trim_start_matches('/');
            let last = image.rsplit('/').next().unwrap_or(image);
            last.rsplit_once(':')
                .map_or_else(|| "latest".to_string(), |(_, tag)| tag.to_string())
        }
        "http" | "https" => Url::parse(uri)
            .ok()
            .and_then(|url| {
                url.path_segments()
                    .and_then(|mut segments| segments.next_back().map(str::to_string))
            })
            .map(|file| {
                let stem = file.rsplit_once('.').map_or(file.as_str(), |(stem, _)| stem);
                version_from_file(stem).to_string()
            })
            .unwrap_or_default(),
        _ => String::new(),
    };
    version
        .strip_suffix("-metadata")
        .map_or(version.clone(), str::to_string)
}

/// Text after the last `-` that is followed by a digit.
fn version_from_file(stem: &str) -> &str {
    let bytes = stem.as_bytes();
    (0..bytes.len())
        .rev()
        .find(|&i| bytes.get(i) == Some(&b'-') && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
        .and_then(|i| stem.get(i + 1..))
        .unwrap_or("")
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::text::TextDocument;

    fn manifest(text: &str) -> Vec<AppEntry> {
        parse_manifest(&TextDocument::new("file:///apps.scdfa", 0, text))
    }

    #[rstest]
    #[case("maven://org.springframework.cloud.stream.app:time-source-rabbit:2.0.1.RELEASE", "2.0.1.RELEASE")]
    #[case("maven://org.springframework.cloud.stream.app:time-source-rabbit:jar:metadata:2.0.2.RELEASE", "2.0.2.RELEASE")]
    #[case("docker:springcloudstream/time-source-rabbit:2.1.0.RELEASE", "2.1.0.RELEASE")]
    #[case("docker:springcloudstream/time-source-rabbit", "latest")]
    #[case("https://repo.example.com/libs/time-source-rabbit-2.1.0.RELEASE.jar", "2.1.0.RELEASE")]
    #[case("https://repo.example.com/libs/time-source-rabbit-2.1.0.RELEASE-metadata.jar", "2.1.0.RELEASE")]
    #[case("https://repo.example.com/libs/time-source.jar", "")]
    #[case("file:///tmp/time.jar", "")]
    #[case("no-scheme", "")]
    fn versions(#[case] uri: &str, #[case] expected: &str) {
        assert_eq!(version_of(uri), expected);
    }

    #[test]
    fn merges_app_and_metadata() {
        let entries = manifest(
            "source.time=maven://org.springframework.cloud.stream.app:time-source-rabbit:2.1.0.RELEASE\n\
             source.time.metadata=maven://org.springframework.cloud.stream.app:time-source-rabbit:jar:metadata:2.1.0.RELEASE\n\
             sink.log=maven://org.springframework.cloud.stream.app:log-sink-rabbit:2.1.0.RELEASE\n\
             sink.log.metadata=maven://org.springframework.cloud.stream.app:log-sink-rabbit:jar:metadata:2.1.0.RELEASE\n",
        );
        assert_eq!(entries.len(), 2);
        assert_eq!(
            (entries[0].app_type.as_str(), entries[0].name.as_str(), entries[0].version.as_str()),
            ("source", "time", "2.1.0.RELEASE")
        );
        assert_eq!(
            entries[0].app.as_ref().map(|line| line.key_range),
            Some(Range::on_line(0, 0, 11))
        );
        assert_eq!(
            entries[0].metadata.as_ref().map(|line| line.key_range),
            Some(Range::on_line(1, 0, 20))
        );
        assert_eq!(entries[1].name, "log");
    }

    #[test]
    fn versions_are_kept_apart() {
        let entries = manifest(
            "source.time=docker:springcloudstream/time-source-rabbit:2.0.0\n\
             source.time=docker:springcloudstream/time-source-rabbit:2.1.0\n",
        );
        let versions: Vec<_> = entries.iter().map(|entry| entry.version.as_str()).collect();
        assert_eq!(versions, ["2.0.0", "2.1.0"]);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let entries = manifest(
            "source.time=maven://a:b:1.0\n\
             source.time.metadata=source.time.metadata=maven://a:b:1.0\n\
             justakey\n\
             source=maven://a:b:1.0\n\
             a.b.c.d=maven://a:b:1.0\n\
             \n\
             sink.log=maven://a:log:1.0\n",
        );
        let names: Vec<_> = entries.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, ["time", "log"]);
        assert_eq!(entries[0].metadata, None);
    }
}
