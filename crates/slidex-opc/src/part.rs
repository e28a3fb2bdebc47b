//! Part names and part payloads
//!
//! Part names are absolute, slash-separated paths inside the package
//! (`/ppt/slides/slide1.xml`). The ZIP entry for a part is the same path
//! without the leading slash.

use std::fmt;

/// Absolute name of a part inside a package
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartName(String);

impl PartName {
    /// Create a part name, adding the leading slash if missing
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.starts_with('/') {
            Self(name)
        } else {
            Self(format!("/{}", name))
        }
    }

    /// Create a part name from a ZIP entry path (`ppt/slides/slide1.xml`)
    pub fn from_zip_path(path: &str) -> Self {
        Self::new(path)
    }

    /// Resolve a relationship target against the directory of its owner
    ///
    /// Absolute targets (`/ppt/media/image1.png`) are taken as-is; relative
    /// targets are joined to `base_dir` and `.`/`..` segments collapsed.
    pub fn resolve(base_dir: &str, target: &str) -> Self {
        let joined = if target.starts_with('/') {
            target.to_string()
        } else if base_dir.is_empty() || base_dir == "/" {
            format!("/{}", target)
        } else {
            format!("{}/{}", base_dir.trim_end_matches('/'), target)
        };

        let mut segments: Vec<&str> = Vec::new();
        for segment in joined.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }

        Self(format!("/{}", segments.join("/")))
    }

    /// The name as a string (`/ppt/slides/slide1.xml`)
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The ZIP entry path (`ppt/slides/slide1.xml`)
    pub fn zip_path(&self) -> &str {
        self.0.trim_start_matches('/')
    }

    /// Directory containing this part (`/ppt/slides`)
    pub fn base_dir(&self) -> &str {
        match self.0.rfind('/') {
            Some(0) | None => "/",
            Some(idx) => &self.0[..idx],
        }
    }

    /// Last path segment (`slide1.xml`)
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Lowercased file extension, if any
    pub fn extension(&self) -> Option<String> {
        let file_name = self.file_name();
        file_name
            .rfind('.')
            .filter(|&idx| idx + 1 < file_name.len())
            .map(|idx| file_name[idx + 1..].to_ascii_lowercase())
    }

    /// Name of the relationships part describing this part's outgoing edges
    ///
    /// `/ppt/slides/slide1.xml` -> `/ppt/slides/_rels/slide1.xml.rels`
    pub fn rels_part_name(&self) -> PartName {
        let dir = self.base_dir();
        if dir == "/" {
            PartName(format!("/_rels/{}.rels", self.file_name()))
        } else {
            PartName(format!("{}/_rels/{}.rels", dir, self.file_name()))
        }
    }

    /// Owner of a relationships part, if `self` is one
    ///
    /// Returns `Some(None)` for the package-level `/_rels/.rels`.
    pub fn rels_owner(&self) -> Option<Option<PartName>> {
        let file_name = self.file_name();
        let owner_file = file_name.strip_suffix(".rels")?;
        let dir = self.base_dir();
        let owner_dir = dir.strip_suffix("/_rels").or_else(|| {
            if dir == "/_rels" {
                Some("")
            } else {
                None
            }
        })?;

        if owner_file.is_empty() {
            return if owner_dir.is_empty() {
                Some(None)
            } else {
                None
            };
        }

        Some(Some(PartName(format!("{}/{}", owner_dir, owner_file))))
    }

    /// Relative reference from a directory to this part
    ///
    /// `/ppt/media/image1.png` relative to `/ppt/slides` is
    /// `../media/image1.png`.
    pub fn relative_to(&self, base_dir: &str) -> String {
        let from: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
        let to: Vec<&str> = self.0.split('/').filter(|s| !s.is_empty()).collect();

        let common = from
            .iter()
            .zip(to.iter())
            .take_while(|(a, b)| a == b)
            .count();
        // The last segment of `to` is the file itself and must stay
        let common = common.min(to.len().saturating_sub(1));

        let mut parts: Vec<&str> = Vec::new();
        for _ in common..from.len() {
            parts.push("..");
        }
        parts.extend(&to[common..]);
        parts.join("/")
    }
}

impl fmt::Display for PartName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PartName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One named resource in a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Unique path within the package
    pub name: PartName,
    /// MIME-like content type
    pub content_type: String,
    /// Raw bytes
    pub blob: Vec<u8>,
}

impl Part {
    /// Create a new part
    pub fn new(name: PartName, content_type: impl Into<String>, blob: Vec<u8>) -> Self {
        Self {
            name,
            content_type: content_type.into(),
            blob,
        }
    }

    /// Whether the part holds XML (by content type)
    pub fn is_xml(&self) -> bool {
        self.content_type.ends_with("+xml") || self.content_type.ends_with("/xml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_adds_leading_slash() {
        assert_eq!(PartName::new("ppt/slides/slide1.xml").as_str(), "/ppt/slides/slide1.xml");
        assert_eq!(PartName::new("/ppt/slides/slide1.xml").as_str(), "/ppt/slides/slide1.xml");
    }

    #[test]
    fn test_path_components() {
        let name = PartName::new("/ppt/media/image1.PNG");
        assert_eq!(name.zip_path(), "ppt/media/image1.PNG");
        assert_eq!(name.base_dir(), "/ppt/media");
        assert_eq!(name.file_name(), "image1.PNG");
        assert_eq!(name.extension(), Some("png".to_string()));

        let root = PartName::new("/[Content_Types].xml");
        assert_eq!(root.base_dir(), "/");
    }

    #[test]
    fn test_resolve_relative_targets() {
        assert_eq!(
            PartName::resolve("/ppt/slides", "../media/image1.png").as_str(),
            "/ppt/media/image1.png"
        );
        assert_eq!(
            PartName::resolve("/ppt", "slides/slide1.xml").as_str(),
            "/ppt/slides/slide1.xml"
        );
        assert_eq!(
            PartName::resolve("/", "ppt/presentation.xml").as_str(),
            "/ppt/presentation.xml"
        );
        assert_eq!(
            PartName::resolve("/ppt/slides", "/ppt/media/a.png").as_str(),
            "/ppt/media/a.png"
        );
        assert_eq!(
            PartName::resolve("/ppt/slides", "./../charts/./chart1.xml").as_str(),
            "/ppt/charts/chart1.xml"
        );
    }

    #[test]
    fn test_relative_to() {
        let image = PartName::new("/ppt/media/image1.png");
        assert_eq!(image.relative_to("/ppt/slides"), "../media/image1.png");
        assert_eq!(image.relative_to("/ppt/media"), "image1.png");
        assert_eq!(image.relative_to("/"), "ppt/media/image1.png");

        let slide = PartName::new("/ppt/slides/slide2.xml");
        assert_eq!(slide.relative_to("/ppt"), "slides/slide2.xml");
    }

    #[test]
    fn test_relative_and_resolve_agree() {
        let target = PartName::new("/ppt/embeddings/oleObject3.bin");
        for base in ["/ppt/slides", "/ppt", "/", "/ppt/charts/nested"] {
            let rel = target.relative_to(base);
            assert_eq!(PartName::resolve(base, &rel), target, "base {}", base);
        }
    }

    #[test]
    fn test_rels_part_name_roundtrip() {
        let slide = PartName::new("/ppt/slides/slide1.xml");
        let rels = slide.rels_part_name();
        assert_eq!(rels.as_str(), "/ppt/slides/_rels/slide1.xml.rels");
        assert_eq!(rels.rels_owner(), Some(Some(slide)));

        let root = PartName::new("/_rels/.rels");
        assert_eq!(root.rels_owner(), Some(None));

        let plain = PartName::new("/ppt/presentation.xml");
        assert_eq!(plain.rels_owner(), None);
    }

    #[test]
    fn test_part_is_xml() {
        let xml = Part::new(
            PartName::new("/ppt/slides/slide1.xml"),
            "application/vnd.openxmlformats-officedocument.presentationml.slide+xml",
            Vec::new(),
        );
        assert!(xml.is_xml());

        let png = Part::new(PartName::new("/ppt/media/image1.png"), "image/png", Vec::new());
        assert!(!png.is_xml());
    }
}
