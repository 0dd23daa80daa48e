//! Accepted upload types.
//!
//! One table maps each extension to its MIME type and display label. Selection
//! validation, the picker accept filter and the type label all read from it.

use serde::{Deserialize, Deserializer, Serialize, de};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Mp4,
    Jpg,
    Jpeg,
    Png,
}

struct KindEntry {
    kind: FileKind,
    extension: &'static str,
    mime: &'static str,
    label: &'static str,
}

static KINDS: [KindEntry; 5] = [
    KindEntry { kind: FileKind::Pdf, extension: "pdf", mime: "application/pdf", label: "PDF" },
    KindEntry { kind: FileKind::Mp4, extension: "mp4", mime: "video/mp4", label: "MP4" },
    KindEntry { kind: FileKind::Jpg, extension: "jpg", mime: "image/jpeg", label: "JPG" },
    KindEntry { kind: FileKind::Jpeg, extension: "jpeg", mime: "image/jpeg", label: "JPEG" },
    KindEntry { kind: FileKind::Png, extension: "png", mime: "image/png", label: "PNG" },
];

const BYTES_PER_MB: u64 = 1024 * 1024;

impl FileKind {
    fn entry(self) -> &'static KindEntry {
        let index = match self {
            FileKind::Pdf => 0,
            FileKind::Mp4 => 1,
            FileKind::Jpg => 2,
            FileKind::Jpeg => 3,
            FileKind::Png => 4,
        };
        &KINDS[index]
    }

    pub fn all() -> impl Iterator<Item = FileKind> {
        KINDS.iter().map(|e| e.kind)
    }

    /// Case-insensitive lookup of a bare extension (`"PDF"`, `"png"`).
    pub fn from_extension(ext: &str) -> Option<Self> {
        KINDS
            .iter()
            .find(|e| e.extension.eq_ignore_ascii_case(ext))
            .map(|e| e.kind)
    }

    /// Kind of a file name, judged only by the text after its last dot.
    pub fn from_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    pub fn extension(self) -> &'static str {
        self.entry().extension
    }

    pub fn mime(self) -> &'static str {
        self.entry().mime
    }

    pub fn label(self) -> &'static str {
        self.entry().label
    }
}

/// Accepts any casing of a table extension (`"pdf"`, `"PDF"`).
impl<'de> Deserialize<'de> for FileKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ext = String::deserialize(deserializer)?;
        FileKind::from_extension(&ext)
            .ok_or_else(|| de::Error::unknown_variant(&ext, &["pdf", "mp4", "jpg", "jpeg", "png"]))
    }
}

pub fn is_valid_file_type(name: &str) -> bool {
    FileKind::from_name(name).is_some()
}

/// Value for a file picker's `accept` attribute.
pub fn accepted_extensions() -> String {
    KINDS
        .iter()
        .map(|e| format!(".{}", e.extension))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn accepted_mime_types() -> Vec<&'static str> {
    let mut mimes: Vec<&'static str> = Vec::new();
    for entry in &KINDS {
        if !mimes.contains(&entry.mime) {
            mimes.push(entry.mime);
        }
    }
    mimes
}

pub fn supported_formats_label() -> String {
    KINDS.iter().map(|e| e.label).collect::<Vec<_>>().join(", ")
}

pub fn file_type_label(name: &str) -> &'static str {
    FileKind::from_name(name).map_or("Unknown", FileKind::label)
}

/// Size in megabytes, truncated (not rounded) to two decimals.
pub fn format_megabytes(size: u64) -> String {
    let hundredths = (u128::from(size) * 100) / u128::from(BYTES_PER_MB);
    format!("{}.{:02} MB", hundredths / 100, hundredths % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_table_extensions_in_any_case() {
        assert_eq!(FileKind::from_name("report.pdf"), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_name("Holiday.JPEG"), Some(FileKind::Jpeg));
        assert_eq!(FileKind::from_name("clip.Mp4"), Some(FileKind::Mp4));
        assert_eq!(FileKind::from_name("archive.tar.png"), Some(FileKind::Png));
        assert!(is_valid_file_type("scan.JPG"));
    }

    #[test]
    fn rejects_unknown_or_missing_extensions() {
        assert!(!is_valid_file_type("movie.mov"));
        assert!(!is_valid_file_type("README"));
        assert!(!is_valid_file_type("notes.pdf.txt"));
        assert!(!is_valid_file_type("trailing."));
        assert_eq!(file_type_label("movie.mov"), "Unknown");
    }

    #[test]
    fn picker_hints_come_from_the_table() {
        assert_eq!(accepted_extensions(), ".pdf,.mp4,.jpg,.jpeg,.png");
        assert_eq!(
            accepted_mime_types(),
            vec!["application/pdf", "video/mp4", "image/jpeg", "image/png"]
        );
        assert_eq!(supported_formats_label(), "PDF, MP4, JPG, JPEG, PNG");
        assert_eq!(file_type_label("a.jpeg"), "JPEG");
        assert_eq!(FileKind::Jpg.mime(), FileKind::Jpeg.mime());
    }

    #[test]
    fn table_rows_match_their_variants() {
        for kind in FileKind::all() {
            assert_eq!(FileKind::from_extension(kind.extension()), Some(kind));
            assert_eq!(kind.label(), kind.extension().to_ascii_uppercase());
        }
    }

    #[test]
    fn megabytes_are_truncated_to_two_places() {
        assert_eq!(format_megabytes(0), "0.00 MB");
        assert_eq!(format_megabytes(1_048_576), "1.00 MB");
        assert_eq!(format_megabytes(5_242_879), "4.99 MB");
        assert_eq!(format_megabytes(1_572_864), "1.50 MB");
        assert_eq!(format_megabytes(10_000), "0.00 MB");
    }

    #[test]
    fn kind_serializes_as_lowercase_extension() {
        assert_eq!(serde_json::to_string(&FileKind::Jpeg).unwrap(), "\"jpeg\"");
        let kind: FileKind = serde_json::from_str("\"mp4\"").unwrap();
        assert_eq!(kind, FileKind::Mp4);
        let kind: FileKind = serde_json::from_str("\"PDF\"").unwrap();
        assert_eq!(kind, FileKind::Pdf);
        assert!(serde_json::from_str::<FileKind>("\"gif\"").is_err());
    }
}
