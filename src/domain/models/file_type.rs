/// A selectable value for the `file_type` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTypeOption {
    pub label: &'static str,
    pub value: &'static str,
}

const fn option(label: &'static str, value: &'static str) -> FileTypeOption {
    FileTypeOption { label, value }
}

/// Clears the `file_type` filter.
pub const ALL_TYPES: FileTypeOption = option("All Types", "");

/// MIME types the server accepts for uploads.
pub const FILE_TYPE_OPTIONS: &[FileTypeOption] = &[
    option("PNG", "image/png"),
    option("JPEG", "image/jpeg"),
    option("GIF", "image/gif"),
    option("PDF", "application/pdf"),
    option("TXT", "text/plain"),
    option("CSV", "text/csv"),
    option("BMP", "image/bmp"),
    option("TIFF", "image/tiff"),
    option("WEBP", "image/webp"),
    option("MP3", "audio/mpeg"),
    option("OGG", "audio/ogg"),
    option("WAV", "audio/wav"),
    option("MP4", "video/mp4"),
    option("AVI", "video/x-msvideo"),
    option("WEBM", "video/webm"),
    option("ZIP", "application/zip"),
    option("GZ", "application/gzip"),
    option("JSON", "application/json"),
    option("XML", "application/xml"),
    option("DOC", "application/msword"),
    option("XLS", "application/vnd.ms-excel"),
    option("PPT", "application/vnd.ms-powerpoint"),
    option(
        "DOCX",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    option(
        "XLSX",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    option(
        "PPTX",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
];

/// Resolves either a label (`png`, case-insensitive) or a MIME value to the
/// MIME string used in queries.
pub fn resolve_file_type(input: &str) -> Option<&'static str> {
    if input.eq_ignore_ascii_case("all") || input.is_empty() {
        return Some(ALL_TYPES.value);
    }
    FILE_TYPE_OPTIONS
        .iter()
        .find(|o| o.value == input || o.label.eq_ignore_ascii_case(input))
        .map(|o| o.value)
}
