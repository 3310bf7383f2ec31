use std::path::{Path, PathBuf};
use std::sync::Arc;

use gpui::{Image, ImageFormat};

/// Stable identifier for one pending attachment.
///
/// Preview population runs asynchronously and must target attachments by
/// identity, not by list position, so interleaved batches and removals
/// cannot mis-route a late file read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttachmentId(pub u64);

impl AttachmentId {
    /// Creates a typed attachment identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Broad file grouping used to pick the chip rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentKind {
    Image,
    Document,
    Other,
}

impl AttachmentKind {
    /// Short uppercase tag shown on non-image chips.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Image => "IMG",
            Self::Document => "DOC",
            Self::Other => "FILE",
        }
    }
}

/// One user-selected file held in memory for the session.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub id: AttachmentId,
    pub path: PathBuf,
    pub name: String,
    pub size_bytes: u64,
    pub kind: AttachmentKind,
    /// Decoded image payload, populated off-thread after the file is read.
    pub preview: Option<Arc<Image>>,
}

impl Attachment {
    fn from_path(id: AttachmentId, path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let size_bytes = std::fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);

        Self {
            id,
            path: path.to_path_buf(),
            name,
            size_bytes,
            kind: classify(path),
            preview: None,
        }
    }

    /// Size label matching the chip layout ("0.42 MB").
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.size_bytes as f64 / 1024.0 / 1024.0)
    }
}

/// Classifies a file by extension, the desktop analog of MIME sniffing.
pub fn classify(path: &Path) -> AttachmentKind {
    if image_format(path).is_some() {
        return AttachmentKind::Image;
    }

    match extension(path).as_deref() {
        Some("pdf" | "doc" | "docx" | "txt" | "md" | "rtf" | "odt" | "csv") => {
            AttachmentKind::Document
        }
        _ => AttachmentKind::Other,
    }
}

/// Maps image extensions onto the decoder format used for previews.
pub fn image_format(path: &Path) -> Option<ImageFormat> {
    match extension(path).as_deref() {
        Some("png") => Some(ImageFormat::Png),
        Some("jpg" | "jpeg") => Some(ImageFormat::Jpeg),
        Some("gif") => Some(ImageFormat::Gif),
        Some("webp") => Some(ImageFormat::Webp),
        Some("bmp") => Some(ImageFormat::Bmp),
        Some("svg") => Some(ImageFormat::Svg),
        Some("tif" | "tiff") => Some(ImageFormat::Tiff),
        _ => None,
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

/// Pending composer attachments.
///
/// Batches are append-only; removal is by index; previews land by id.
/// `take_all` hands the ordered snapshot to the outgoing message and leaves
/// the set empty, which is the only bulk-clear operation.
#[derive(Debug, Default)]
pub struct AttachmentSet {
    next_id: u64,
    items: Vec<Attachment>,
}

impl AttachmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Attachment] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends one batch in selection order and returns the new entries.
    pub fn attach_batch(&mut self, paths: &[PathBuf]) -> Vec<Attachment> {
        let mut added = Vec::with_capacity(paths.len());
        for path in paths {
            let id = AttachmentId::new(self.next_id);
            self.next_id += 1;
            let attachment = Attachment::from_path(id, path);
            self.items.push(attachment.clone());
            added.push(attachment);
        }
        added
    }

    /// Stores a finished preview read. No-op when the attachment was
    /// removed (or sent) before the read completed.
    pub fn set_preview(&mut self, id: AttachmentId, preview: Arc<Image>) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.preview = Some(preview);
                true
            }
            None => false,
        }
    }

    /// Removes the attachment at `index`, effective immediately.
    pub fn remove(&mut self, index: usize) -> Option<Attachment> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Empties the set and returns the snapshot in attach order.
    pub fn take_all(&mut self) -> Vec<Attachment> {
        std::mem::take(&mut self.items)
    }
}

/// Reads and wraps an image file for the in-memory preview.
///
/// Failures are swallowed: an attachment without a preview simply renders
/// as a file chip.
pub async fn load_preview(path: PathBuf) -> Option<Image> {
    let format = image_format(&path)?;
    match tokio::fs::read(&path).await {
        Ok(bytes) => Some(Image::from_bytes(format, bytes)),
        Err(error) => {
            tracing::debug!("failed to read attachment preview {:?}: {}", path, error);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    fn fake_preview() -> Arc<Image> {
        Arc::new(Image::from_bytes(ImageFormat::Png, vec![0x89, 0x50, 0x4e, 0x47]))
    }

    #[test]
    fn classification_covers_the_three_kinds() {
        assert_eq!(classify(Path::new("photo.PNG")), AttachmentKind::Image);
        assert_eq!(classify(Path::new("scan.jpeg")), AttachmentKind::Image);
        assert_eq!(classify(Path::new("notes.pdf")), AttachmentKind::Document);
        assert_eq!(classify(Path::new("readme.txt")), AttachmentKind::Document);
        assert_eq!(classify(Path::new("build.tar.gz")), AttachmentKind::Other);
        assert_eq!(classify(Path::new("no_extension")), AttachmentKind::Other);
    }

    #[test]
    fn batches_append_in_order_with_unique_ids() {
        let mut set = AttachmentSet::new();
        set.attach_batch(&paths(&["a.png", "b.pdf"]));
        set.attach_batch(&paths(&["c.zip"]));

        let names = set
            .items()
            .iter()
            .map(|item| item.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, ["a.png", "b.pdf", "c.zip"]);

        let mut ids = set.items().iter().map(|item| item.id).collect::<Vec<_>>();
        ids.dedup();
        assert_eq!(ids.len(), 3);
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn preview_lands_by_id_across_interleaved_batches() {
        let mut set = AttachmentSet::new();
        let first = set.attach_batch(&paths(&["a.png"]));
        // Second batch arrives before the first preview read completes.
        set.attach_batch(&paths(&["b.png", "c.png"]));

        assert!(set.set_preview(first[0].id, fake_preview()));
        assert!(set.items()[0].preview.is_some());
        assert!(set.items()[1].preview.is_none());
        assert!(set.items()[2].preview.is_none());
    }

    #[test]
    fn preview_for_a_removed_attachment_is_a_no_op() {
        let mut set = AttachmentSet::new();
        let added = set.attach_batch(&paths(&["a.png", "b.png"]));

        set.remove(0);
        assert!(!set.set_preview(added[0].id, fake_preview()));
        // The survivor is untouched.
        assert_eq!(set.items()[0].name, "b.png");
        assert!(set.items()[0].preview.is_none());
    }

    #[test]
    fn removal_is_by_index_and_immediate() {
        let mut set = AttachmentSet::new();
        set.attach_batch(&paths(&["a.png", "b.pdf", "c.zip"]));

        let removed = set.remove(1).expect("index 1 exists");
        assert_eq!(removed.name, "b.pdf");
        assert_eq!(set.len(), 2);
        assert!(set.remove(7).is_none());
    }

    #[test]
    fn take_all_snapshots_in_order_and_clears() {
        let mut set = AttachmentSet::new();
        set.attach_batch(&paths(&["a.png", "b.pdf"]));

        let snapshot = set.take_all();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].name, "a.png");
        assert_eq!(snapshot[1].name, "b.pdf");
        assert!(set.is_empty());
    }

    #[test]
    fn size_label_formats_megabytes() {
        let mut attachment = Attachment::from_path(AttachmentId::new(1), Path::new("a.bin"));
        attachment.size_bytes = 3 * 1024 * 1024 / 2;
        assert_eq!(attachment.size_label(), "1.50 MB");
    }
}
